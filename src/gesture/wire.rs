//! Sign dictionary file format, shared by build.rs and the runtime loader.
//!
//! The build script includes this file via `#[path]` to validate the bundled
//! dictionaries, so it may only depend on `serde` and `std`.

// Some helpers are only used by build.rs
#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Transform channel of a joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Property {
    Position,
    Rotation,
    Scale,
}

impl Property {
    pub const fn as_str(self) -> &'static str {
        match self {
            Property::Position => "position",
            Property::Rotation => "rotation",
            Property::Scale => "scale",
        }
    }
}

/// Spatial axis of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Total number of axes per channel
    pub const COUNT: usize = 3;

    /// Convert to vector component index
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Which way a channel travels toward its limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "+")]
    Increase,
    #[serde(alias = "-")]
    Decrease,
}

/// One authored instruction.
///
/// Accepts the object form or the compact `[joint, property, axis, limit, sign]` tuple.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum InstructionRepr {
    Compact(String, Property, Axis, f32, Direction),
    Full {
        joint: String,
        property: Property,
        axis: Axis,
        limit: f32,
        direction: Direction,
    },
}

/// A direct channel assignment (rest pose)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChannelRepr {
    pub joint: String,
    pub property: Property,
    pub axis: Axis,
    pub value: f32,
}

/// A sign is a list of phases, each phase a list of instructions
pub type SignRepr = Vec<Vec<InstructionRepr>>;

/// Top-level dictionary file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DictionaryFile {
    #[serde(default)]
    pub rest_pose: Vec<ChannelRepr>,
    #[serde(default)]
    pub letters: BTreeMap<String, SignRepr>,
    #[serde(default)]
    pub words: BTreeMap<String, SignRepr>,
}

/// Collect key and rest-pose problems in a dictionary file.
///
/// Instructions are checked after conversion by `Dictionary::validate`.
pub fn validate_file(file: &DictionaryFile) -> Vec<String> {
    let mut errors = Vec::new();

    let mut seen_letters = BTreeSet::new();
    for key in file.letters.keys() {
        let mut chars = key.chars();
        if !matches!((chars.next(), chars.next()), (Some(_), None)) {
            errors.push(format!("letter key `{}` must be a single character", key));
        }
        if !seen_letters.insert(key.to_uppercase()) {
            errors.push(format!("letter `{}` is defined more than once", key));
        }
    }

    let mut seen_words = BTreeSet::new();
    for key in file.words.keys() {
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            errors.push(format!("word key `{}` must be a single non-empty word", key));
        }
        if !seen_words.insert(key.to_uppercase()) {
            errors.push(format!("word `{}` is defined more than once", key));
        }
    }

    for (i, channel) in file.rest_pose.iter().enumerate() {
        if channel.joint.is_empty() {
            errors.push(format!("rest pose entry {}: empty joint name", i));
        }
        if !channel.value.is_finite() {
            errors.push(format!("rest pose entry {}: value is not finite", i));
        }
    }

    errors
}

//! Posable skeleton collaborator
//!
//! The sequencer never sees meshes or bone hierarchies, only named joints
//! whose transform channels can be read and written one axis at a time.

use crate::error::SequencerError;
use crate::gesture::{Axis, ChannelValue, Property};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Anything the player can pose: a JS avatar, an in-memory rig, a test double.
pub trait Skeleton {
    /// Current value of one channel of a joint
    fn channel(&self, joint: &str, property: Property, axis: Axis) -> Result<f32, SequencerError>;

    /// Overwrite one channel of a joint
    fn set_channel(
        &mut self,
        joint: &str,
        property: Property,
        axis: Axis,
        value: f32,
    ) -> Result<(), SequencerError>;
}

/// Local transform of a single joint (Euler rotation in radians)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointTransform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for JointTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl JointTransform {
    pub fn get(&self, property: Property) -> Vec3 {
        match property {
            Property::Position => self.position,
            Property::Rotation => self.rotation,
            Property::Scale => self.scale,
        }
    }

    pub fn get_mut(&mut self, property: Property) -> &mut Vec3 {
        match property {
            Property::Position => &mut self.position,
            Property::Rotation => &mut self.rotation,
            Property::Scale => &mut self.scale,
        }
    }
}

/// In-memory skeleton keyed by joint name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rig {
    joints: HashMap<String, JointTransform>,
}

impl Rig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rig with every named joint at its default transform
    pub fn with_joints<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            joints: names
                .into_iter()
                .map(|name| (name.into(), JointTransform::default()))
                .collect(),
        }
    }

    pub fn joint(&self, name: &str) -> Option<&JointTransform> {
        self.joints.get(name)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

impl Skeleton for Rig {
    fn channel(&self, joint: &str, property: Property, axis: Axis) -> Result<f32, SequencerError> {
        self.joints
            .get(joint)
            .map(|t| t.get(property)[axis.index()])
            .ok_or_else(|| SequencerError::UnknownJoint(joint.to_string()))
    }

    fn set_channel(
        &mut self,
        joint: &str,
        property: Property,
        axis: Axis,
        value: f32,
    ) -> Result<(), SequencerError> {
        let transform = self
            .joints
            .get_mut(joint)
            .ok_or_else(|| SequencerError::UnknownJoint(joint.to_string()))?;
        transform.get_mut(property)[axis.index()] = value;
        Ok(())
    }
}

/// Assign every rest-pose channel, skipping joints the skeleton lacks.
///
/// Returns the number of channels applied.
pub fn apply_rest_pose<S: Skeleton + ?Sized>(skeleton: &mut S, pose: &[ChannelValue]) -> usize {
    let mut applied = 0;
    for channel in pose {
        match skeleton.set_channel(&channel.joint, channel.property, channel.axis, channel.value) {
            Ok(()) => applied += 1,
            Err(e) => log::warn!("Rest pose skipped: {}", e),
        }
    }
    applied
}

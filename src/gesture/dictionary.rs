use super::instruction::{Axis, JointInstruction, Property};
use super::script::GestureScript;
use super::wire::{self, ChannelRepr, DictionaryFile, SignRepr};
use crate::error::{DictionaryError, SequencerError};
use std::collections::{BTreeMap, HashMap};

/// Authored animation for one letter or word.
///
/// Each phase becomes one Motion script, played in order with a dwell
/// between them (e.g. "form the handshape", then "return to rest").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignEntry {
    phases: Vec<Vec<JointInstruction>>,
}

impl SignEntry {
    pub fn new(phases: Vec<Vec<JointInstruction>>) -> Self {
        Self { phases }
    }

    /// Entry with a single phase
    pub fn single(instructions: Vec<JointInstruction>) -> Self {
        Self {
            phases: vec![instructions],
        }
    }

    pub fn phases(&self) -> &[Vec<JointInstruction>] {
        &self.phases
    }

    /// Motion scripts for this sign, one per phase
    pub fn scripts(&self) -> impl Iterator<Item = GestureScript> + '_ {
        self.phases
            .iter()
            .map(|phase| GestureScript::Motion(phase.clone()))
    }

    pub fn instruction_count(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }

    /// Check every instruction of every phase
    pub fn validate(&self) -> Result<(), SequencerError> {
        self.phases
            .iter()
            .flatten()
            .try_for_each(JointInstruction::validate)
    }
}

impl From<SignRepr> for SignEntry {
    fn from(repr: SignRepr) -> Self {
        Self::new(
            repr.into_iter()
                .map(|phase| phase.into_iter().map(JointInstruction::from).collect())
                .collect(),
        )
    }
}

/// A direct channel assignment, used for the rest pose
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelValue {
    pub joint: String,
    pub property: Property,
    pub axis: Axis,
    pub value: f32,
}

impl From<ChannelRepr> for ChannelValue {
    fn from(repr: ChannelRepr) -> Self {
        Self {
            joint: repr.joint,
            property: repr.property,
            axis: repr.axis,
            value: repr.value,
        }
    }
}

/// Symbol to gesture lookup tables.
///
/// Keys are stored uppercase. Letters are hashed by char; words are kept
/// sorted so the UI listing is stable.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    letters: HashMap<char, SignEntry>,
    words: BTreeMap<String, SignEntry>,
    rest_pose: Vec<ChannelValue>,
}

fn upper(ch: char) -> char {
    let mut up = ch.to_uppercase();
    match (up.next(), up.next()) {
        (Some(c), None) => c,
        _ => ch,
    }
}

impl Dictionary {
    /// Create empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a dictionary from JSON
    pub fn from_json(json: &str) -> Result<Self, DictionaryError> {
        let file: DictionaryFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    pub fn from_file(file: DictionaryFile) -> Result<Self, DictionaryError> {
        let errors = wire::validate_file(&file);
        if !errors.is_empty() {
            return Err(DictionaryError::Invalid(errors.join("\n")));
        }

        let mut dictionary = Self::new();
        for (key, sign) in file.letters {
            // validate_file guarantees exactly one char
            if let Some(ch) = key.chars().next() {
                dictionary.letters.insert(upper(ch), sign.into());
            }
        }
        for (key, sign) in file.words {
            dictionary.words.insert(key.to_uppercase(), sign.into());
        }
        dictionary.rest_pose = file.rest_pose.into_iter().map(Into::into).collect();
        dictionary
            .validate()
            .map_err(|e| DictionaryError::Invalid(e.to_string()))?;

        log::info!(
            "Loaded sign dictionary: {} letters, {} words",
            dictionary.letters.len(),
            dictionary.words.len()
        );
        Ok(dictionary)
    }

    pub fn with_letter(mut self, ch: char, entry: SignEntry) -> Self {
        self.letters.insert(upper(ch), entry);
        self
    }

    pub fn with_word(mut self, word: &str, entry: SignEntry) -> Self {
        self.words.insert(word.to_uppercase(), entry);
        self
    }

    pub fn with_rest_pose(mut self, rest_pose: Vec<ChannelValue>) -> Self {
        self.rest_pose = rest_pose;
        self
    }

    pub fn letter(&self, ch: char) -> Option<&SignEntry> {
        self.letters.get(&upper(ch))
    }

    pub fn word(&self, word: &str) -> Option<&SignEntry> {
        self.words.get(&word.to_uppercase())
    }

    /// Resolve a directly selected symbol: a single char is a letter first,
    /// anything else is looked up as a word.
    pub fn symbol(&self, symbol: &str) -> Option<&SignEntry> {
        let mut chars = symbol.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if let Some(entry) = self.letter(ch) {
                return Some(entry);
            }
        }
        self.word(symbol)
    }

    /// Available words, sorted, for UI listing
    pub fn word_list(&self) -> Vec<&str> {
        self.words.keys().map(String::as_str).collect()
    }

    /// Available letters, sorted
    pub fn letter_list(&self) -> Vec<char> {
        let mut letters: Vec<char> = self.letters.keys().copied().collect();
        letters.sort_unstable();
        letters
    }

    pub fn rest_pose(&self) -> &[ChannelValue] {
        &self.rest_pose
    }

    /// Check every sign's instructions, naming the first offending symbol
    pub fn validate(&self) -> Result<(), SequencerError> {
        for (ch, entry) in &self.letters {
            entry.validate().map_err(|e| in_sign(&ch.to_string(), e))?;
        }
        for (word, entry) in &self.words {
            entry.validate().map_err(|e| in_sign(word, e))?;
        }
        Ok(())
    }
}

fn in_sign(symbol: &str, error: SequencerError) -> SequencerError {
    match error {
        SequencerError::InvalidInstruction { joint, message } => {
            SequencerError::InvalidInstruction {
                joint,
                message: format!("{} (sign `{}`)", message, symbol),
            }
        }
        other => other,
    }
}

//! Error types for the gesture sequencer

use thiserror::Error;

/// Main error type for the sequencer
#[derive(Error, Debug)]
pub enum SequencerError {
    #[error("joint `{0}` not found on the active skeleton")]
    UnknownJoint(String),

    #[error("no sign for symbol `{0}`")]
    UnknownSymbol(String),

    #[error("playback busy: {0} scripts still pending")]
    Busy(usize),

    #[error("no skeleton attached")]
    NoSkeleton,

    #[error("invalid instruction for joint `{joint}`: {message}")]
    InvalidInstruction { joint: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),
}

/// Dictionary loading errors
#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("failed to parse dictionary: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid dictionary:\n{0}")]
    Invalid(String),
}

use super::instruction::JointInstruction;
use serde::{Deserialize, Serialize};

/// One visual unit of playback: a letter's or word's gesture, or text to surface.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum GestureScript {
    /// Surface this text to the host without touching the skeleton
    TextMarker(String),
    /// Joint instructions stepped together until every one retires
    Motion(Vec<JointInstruction>),
}

impl GestureScript {
    pub fn text(text: impl Into<String>) -> Self {
        GestureScript::TextMarker(text.into())
    }

    pub fn motion(instructions: Vec<JointInstruction>) -> Self {
        GestureScript::Motion(instructions)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            GestureScript::TextMarker(text) => Some(text),
            GestureScript::Motion(_) => None,
        }
    }

    pub fn is_text_marker(&self) -> bool {
        matches!(self, GestureScript::TextMarker(_))
    }

    /// Pending instructions (zero for text markers)
    pub fn instruction_count(&self) -> usize {
        match self {
            GestureScript::TextMarker(_) => 0,
            GestureScript::Motion(instructions) => instructions.len(),
        }
    }
}

use super::wire::InstructionRepr;
pub use super::wire::{Axis, Direction, Property};
use crate::error::SequencerError;
use serde::{Deserialize, Serialize};

/// Atomic directive: walk one skeletal channel toward `limit`.
///
/// The limit must be reachable from the start value by stepping in
/// `direction`. This is not checked at authoring time: an instruction whose
/// channel already sits past its limit retires on the first frame.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "InstructionRepr", into = "InstructionRepr")]
pub struct JointInstruction {
    pub joint: String,
    pub property: Property,
    pub axis: Axis,
    pub limit: f32,
    pub direction: Direction,
}

/// Result of stepping one instruction for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// Channel moves to this value; instruction stays pending
    Move(f32),
    /// Limit reached (or already past it); instruction retires
    Reached,
}

impl JointInstruction {
    pub fn new(
        joint: impl Into<String>,
        property: Property,
        axis: Axis,
        limit: f32,
        direction: Direction,
    ) -> Self {
        Self {
            joint: joint.into(),
            property,
            axis,
            limit,
            direction,
        }
    }

    /// Shorthand for a rotation instruction, the common case in sign authoring
    pub fn rotate(joint: impl Into<String>, axis: Axis, limit: f32, direction: Direction) -> Self {
        Self::new(joint, Property::Rotation, axis, limit, direction)
    }

    /// Step the channel by `speed` toward the limit, clamping at the limit.
    ///
    /// `speed` is expected to be positive; the controller guarantees this.
    /// A step too small to change `current` at its magnitude snaps to the
    /// limit, so every instruction terminates.
    pub fn advance(&self, current: f32, speed: f32) -> Advance {
        let next = match self.direction {
            Direction::Increase if current < self.limit => (current + speed).min(self.limit),
            Direction::Decrease if current > self.limit => (current - speed).max(self.limit),
            _ => return Advance::Reached,
        };
        if next == current {
            Advance::Move(self.limit)
        } else {
            Advance::Move(next)
        }
    }

    /// Whether the channel value already satisfies this instruction
    pub fn is_reached(&self, current: f32) -> bool {
        match self.direction {
            Direction::Increase => current >= self.limit,
            Direction::Decrease => current <= self.limit,
        }
    }

    /// Number of moving frames needed from `start` at `speed`
    pub fn frames_to_reach(&self, start: f32, speed: f32) -> usize {
        if self.is_reached(start) || speed <= 0.0 {
            return 0;
        }
        ((self.limit - start).abs() / speed).ceil() as usize
    }

    pub fn validate(&self) -> Result<(), SequencerError> {
        if self.joint.is_empty() {
            return Err(SequencerError::InvalidInstruction {
                joint: self.joint.clone(),
                message: "empty joint name".to_string(),
            });
        }
        if !self.limit.is_finite() {
            return Err(SequencerError::InvalidInstruction {
                joint: self.joint.clone(),
                message: format!("limit {} is not finite", self.limit),
            });
        }
        Ok(())
    }
}

impl From<InstructionRepr> for JointInstruction {
    fn from(repr: InstructionRepr) -> Self {
        match repr {
            InstructionRepr::Compact(joint, property, axis, limit, direction) => {
                Self::new(joint, property, axis, limit, direction)
            }
            InstructionRepr::Full {
                joint,
                property,
                axis,
                limit,
                direction,
            } => Self::new(joint, property, axis, limit, direction),
        }
    }
}

impl From<JointInstruction> for InstructionRepr {
    fn from(instruction: JointInstruction) -> Self {
        InstructionRepr::Full {
            joint: instruction.joint,
            property: instruction.property,
            axis: instruction.axis,
            limit: instruction.limit,
            direction: instruction.direction,
        }
    }
}

//! FIFO of gesture scripts awaiting playback

use crate::gesture::GestureScript;
use std::collections::VecDeque;

/// Pending gesture scripts, played strictly in insertion order.
///
/// Appended by the compiler and drained only by the player.
#[derive(Debug, Clone, Default)]
pub struct AnimationQueue {
    scripts: VecDeque<GestureScript>,
}

impl AnimationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, script: GestureScript) {
        self.scripts.push_back(script);
    }

    pub fn front(&self) -> Option<&GestureScript> {
        self.scripts.front()
    }

    /// Head script, mutable so the player can retire instructions in place
    pub fn front_mut(&mut self) -> Option<&mut GestureScript> {
        self.scripts.front_mut()
    }

    pub fn pop_front(&mut self) -> Option<GestureScript> {
        self.scripts.pop_front()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    pub fn clear(&mut self) {
        self.scripts.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &GestureScript> {
        self.scripts.iter()
    }

    /// Total joint instructions still pending across all scripts
    pub fn pending_instructions(&self) -> usize {
        self.scripts.iter().map(GestureScript::instruction_count).sum()
    }

    /// Text of every queued marker, in playback order
    pub fn text_markers(&self) -> impl Iterator<Item = &str> {
        self.scripts.iter().filter_map(GestureScript::as_text)
    }
}

impl Extend<GestureScript> for AnimationQueue {
    fn extend<I: IntoIterator<Item = GestureScript>>(&mut self, iter: I) {
        self.scripts.extend(iter);
    }
}

impl FromIterator<GestureScript> for AnimationQueue {
    fn from_iter<I: IntoIterator<Item = GestureScript>>(iter: I) -> Self {
        Self {
            scripts: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for AnimationQueue {
    type Item = GestureScript;
    type IntoIter = std::collections::vec_deque::IntoIter<GestureScript>;

    fn into_iter(self) -> Self::IntoIter {
        self.scripts.into_iter()
    }
}

use crate::config::PlaybackConfig;
use crate::gesture::{Advance, GestureScript, JointInstruction};
use crate::queue::AnimationQueue;
use crate::scheduler::{FrameOutcome, LoopToken};
use crate::skeleton::Skeleton;

/// Renderer and text surface the player reports to
pub trait Host {
    /// Append human-readable text for a gesture that is starting
    fn surface_text(&mut self, text: &str);
    /// Ask for the current pose to be drawn
    fn request_render(&mut self);
    /// Clear previously surfaced text before a new sequence
    fn reset_text(&mut self) {}
}

/// Host that buffers text and counts render requests
#[derive(Debug, Clone, Default)]
pub struct TextBufferHost {
    pub text: String,
    pub renders: usize,
}

impl Host for TextBufferHost {
    fn surface_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn request_render(&mut self) {
        self.renders += 1;
    }

    fn reset_text(&mut self) {
        self.text.clear();
    }
}

/// Player state machine, derived from [`PlaybackState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    /// No loop scheduled
    Idle,
    /// Advancing joints toward the head script's targets
    Stepping,
    /// Inside the pause between scripts
    Dwelling,
}

/// Per-skeleton playback state, owned by the controller
#[derive(Debug, Clone, Default)]
pub struct PlaybackState {
    pub queue: AnimationQueue,
    pub config: PlaybackConfig,
    dwell_until: Option<f64>,
    running: bool,
    active_loop: Option<LoopToken>,
}

impl PlaybackState {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            config: config.sanitized(),
            ..Self::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the inter-script pause is still in effect at `now_ms`
    pub fn is_dwelling(&self, now_ms: f64) -> bool {
        self.dwell_until.is_some_and(|until| now_ms < until)
    }

    /// Monotonic deadline of the current pause, if one is armed
    pub fn dwell_until(&self) -> Option<f64> {
        self.dwell_until
    }

    pub fn active_loop(&self) -> Option<LoopToken> {
        self.active_loop
    }

    pub fn owns_loop(&self, token: LoopToken) -> bool {
        self.active_loop == Some(token)
    }

    pub fn phase(&self, now_ms: f64) -> PlayerPhase {
        if !self.running {
            PlayerPhase::Idle
        } else if self.is_dwelling(now_ms) {
            PlayerPhase::Dwelling
        } else {
            PlayerPhase::Stepping
        }
    }

    /// Mark a new loop as running, unless one already is or there is no work.
    pub(crate) fn begin_loop(&mut self) -> Option<LoopToken> {
        if self.running || self.queue.is_empty() {
            return None;
        }
        let token = LoopToken::next();
        self.running = true;
        self.active_loop = Some(token);
        Some(token)
    }

    /// Stop re-scheduling. Queue and pause are kept.
    pub(crate) fn halt(&mut self) {
        self.running = false;
        self.active_loop = None;
    }

    /// Drop all pending work and flags
    pub fn reset(&mut self) {
        self.queue.clear();
        self.dwell_until = None;
        self.halt();
    }
}

enum Head {
    Text,
    Moving(usize),
    Finished,
}

/// Run one player frame.
///
/// Consumes the queue head: surfaces text markers, steps joint instructions
/// toward their limits, retires finished scripts and arms the pause. Returns
/// [`FrameOutcome::Stopped`] without rendering once the queue is empty.
pub fn step<S, H>(
    state: &mut PlaybackState,
    skeleton: &mut S,
    host: &mut H,
    now_ms: f64,
) -> FrameOutcome
where
    S: Skeleton + ?Sized,
    H: Host + ?Sized,
{
    if state.queue.is_empty() {
        state.halt();
        return FrameOutcome::Stopped;
    }

    if let Some(until) = state.dwell_until {
        if now_ms < until {
            host.request_render();
            return FrameOutcome::Dwelling;
        }
        state.dwell_until = None;
    }

    let speed = state.config.effective_speed();
    let head = match state.queue.front_mut() {
        Some(GestureScript::TextMarker(text)) => {
            host.surface_text(text.as_str());
            Head::Text
        }
        Some(GestureScript::Motion(instructions)) => {
            let moved = step_instructions(instructions, skeleton, speed);
            if instructions.is_empty() {
                Head::Finished
            } else {
                Head::Moving(moved)
            }
        }
        None => Head::Finished,
    };

    let outcome = match head {
        Head::Text => {
            state.queue.pop_front();
            FrameOutcome::SurfacedText
        }
        Head::Moving(moved) => FrameOutcome::Stepped { moved },
        Head::Finished => {
            state.queue.pop_front();
            let pause_ms = state.config.pause_ms;
            state.dwell_until = (pause_ms > 0).then(|| now_ms + f64::from(pause_ms));
            FrameOutcome::Completed
        }
    };

    host.request_render();
    outcome
}

/// Advance every pending instruction by one frame, in list order.
///
/// Reached instructions and ones whose joint cannot be resolved are removed.
/// Returns how many channels moved.
fn step_instructions<S: Skeleton + ?Sized>(
    instructions: &mut Vec<JointInstruction>,
    skeleton: &mut S,
    speed: f32,
) -> usize {
    let mut moved = 0;
    instructions.retain(|ins| {
        let current = match skeleton.channel(&ins.joint, ins.property, ins.axis) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Dropping instruction: {}", e);
                return false;
            }
        };
        match ins.advance(current, speed) {
            Advance::Move(value) => {
                match skeleton.set_channel(&ins.joint, ins.property, ins.axis, value) {
                    Ok(()) => {
                        moved += 1;
                        true
                    }
                    Err(e) => {
                        log::warn!("Dropping instruction: {}", e);
                        false
                    }
                }
            }
            Advance::Reached => false,
        }
    });
    moved
}

//! Cooperative frame scheduling
//!
//! A playback loop is a task that re-submits itself once per display frame
//! while [`FrameOutcome::reschedules`] holds. Every loop is identified by a
//! [`LoopToken`]; the controller only honours the token of the loop it most
//! recently started, so a frame that was already queued when playback was
//! stopped or the avatar swapped cannot step the skeleton.

use crate::animation::Host;
use crate::controller::PlaybackController;
use crate::skeleton::Skeleton;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LOOP_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one spawned playback loop.
///
/// Ids are unique for the whole process, so a token can never match a loop
/// of another controller or one started after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopToken(u64);

impl LoopToken {
    pub(crate) fn next() -> Self {
        Self(NEXT_LOOP_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

/// What one player frame did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Queue drained, loop stale or no skeleton; do not reschedule
    Stopped,
    /// Inside the inter-script pause; skeleton untouched
    Dwelling,
    /// Queue head was a text marker, surfaced to the host
    SurfacedText,
    /// Head script advanced; `moved` channels were written
    Stepped { moved: usize },
    /// Head script finished and the dwell was armed
    Completed,
}

impl FrameOutcome {
    /// Whether the loop should run again next frame
    pub fn reschedules(self) -> bool {
        !matches!(self, FrameOutcome::Stopped)
    }
}

/// Drives frames at a fixed interval against a simulated monotonic clock.
///
/// Stands in for the browser's animation-frame callback natively.
#[derive(Debug, Clone)]
pub struct FixedStepDriver {
    now_ms: f64,
    frame_ms: f64,
}

impl FixedStepDriver {
    pub fn new(frame_ms: f64) -> Self {
        Self {
            now_ms: 0.0,
            frame_ms,
        }
    }

    /// Driver ticking at 60 frames per second
    pub fn sixty_hz() -> Self {
        Self::new(1000.0 / 60.0)
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Run a single frame at the current time, then advance the clock
    pub fn frame<S, H>(
        &mut self,
        controller: &mut PlaybackController<S>,
        token: LoopToken,
        host: &mut H,
    ) -> FrameOutcome
    where
        S: Skeleton,
        H: Host + ?Sized,
    {
        let outcome = controller.tick(token, self.now_ms, host);
        self.now_ms += self.frame_ms;
        outcome
    }

    /// Run frames until the loop stops.
    ///
    /// Returns the frames used, or `None` if `max_frames` ran out first.
    pub fn run_until_stopped<S, H>(
        &mut self,
        controller: &mut PlaybackController<S>,
        token: LoopToken,
        host: &mut H,
        max_frames: usize,
    ) -> Option<usize>
    where
        S: Skeleton,
        H: Host + ?Sized,
    {
        for used in 1..=max_frames {
            if !self.frame(controller, token, host).reschedules() {
                return Some(used);
            }
        }
        None
    }
}

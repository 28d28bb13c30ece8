//! LearnSign gesture sequencer - Wasm Core
//!
//! Turns typed text into sign-language gestures and plays them back on a
//! posable avatar skeleton, one display frame at a time.

pub mod animation;
#[cfg(target_arch = "wasm32")]
pub mod bindings;
pub mod compiler;
pub mod config;
pub mod controller;
pub mod error;
#[cfg(target_arch = "wasm32")]
mod frame_loop;
pub mod gesture;
pub mod queue;
pub mod scheduler;
pub mod skeleton;
#[cfg(target_arch = "wasm32")]
mod state;

pub use animation::{Host, PlaybackState, PlayerPhase, TextBufferHost, step};
pub use compiler::{compile, compile_into};
pub use config::PlaybackConfig;
pub use controller::PlaybackController;
pub use error::{DictionaryError, SequencerError};
pub use gesture::{
    Advance, Axis, ChannelValue, Dictionary, Direction, GestureScript, JointInstruction, Property,
    SignEntry,
};
pub use glam::Vec3;
pub use queue::AnimationQueue;
pub use scheduler::{FixedStepDriver, FrameOutcome, LoopToken};
pub use skeleton::{JointTransform, Rig, Skeleton, apply_rest_pose};

// Re-exports for WASM API
#[cfg(target_arch = "wasm32")]
pub use bindings::{
    JsRenderer, JsSkeleton, attach_avatar, clear_queue, detach_avatar, get_pause_ms,
    get_playback_config, get_speed, init_sequencer, is_playing, letter_list, load_dictionary,
    pending_scripts, set_pause_ms, set_playback_config, set_speed, sign_text, stop_playback,
    trigger_sign, word_list,
};

/// Route `log` output to the browser console (or nowhere natively).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(level: log::Level) {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            // Set up panic hook for better error messages in browser console
            console_error_panic_hook::set_once();
            console_log::init_with_level(level).ok();
        } else {
            log::set_max_level(level.to_level_filter());
        }
    }
}

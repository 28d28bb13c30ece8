//! Browser-side application state with context passing pattern
//!
//! The core types (`PlaybackController`, `Dictionary`, the player) take
//! explicit references and never touch globals. Only the wasm bindings and
//! the frame loop reach into `APP_STATE`, and they do so through
//! `with_app_state` / `with_app_state_mut` so every borrow is scoped to one
//! closure.

use std::cell::RefCell;

use crate::bindings::{JsRenderer, JsSkeleton};
use crate::config::PlaybackConfig;
use crate::controller::PlaybackController;
use crate::error::SequencerError;
use crate::gesture::Dictionary;

pub struct AppState {
    /// Queue, knobs, dictionary and the attached avatar
    pub controller: PlaybackController<JsSkeleton>,
    /// Scene renderer and processed-text surface
    pub renderer: JsRenderer,
}

impl AppState {
    pub fn new(dictionary: Dictionary, renderer: JsRenderer) -> Result<Self, SequencerError> {
        Ok(Self {
            controller: PlaybackController::new(dictionary, PlaybackConfig::default())?,
            renderer,
        })
    }
}

// Global state access, thin wrapper for WASM bindings only
thread_local! {
    static APP_STATE: RefCell<Option<AppState>> = const { RefCell::new(None) };
}

/// Execute a closure with immutable access to AppState
///
/// Returns None if AppState is not initialized
pub fn with_app_state<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&AppState) -> R,
{
    APP_STATE.with(|state| {
        let borrowed = state.borrow();
        borrowed.as_ref().map(f)
    })
}

/// Execute a closure with mutable access to AppState
///
/// Returns None if AppState is not initialized
pub fn with_app_state_mut<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut AppState) -> R,
{
    APP_STATE.with(|state| {
        let mut borrowed = state.borrow_mut();
        borrowed.as_mut().map(f)
    })
}

/// Install a fresh AppState, dropping any previous one.
///
/// Frame callbacks still queued for the old state carry tokens the new
/// controller never issued, so they stop on their next tick.
pub fn initialize_app_state(state: AppState) {
    APP_STATE.with(|slot| {
        *slot.borrow_mut() = Some(state);
    });
}

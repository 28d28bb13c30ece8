//! JavaScript-facing API
//!
//! Thin wrappers: each export pulls what it needs out of `AppState`, calls
//! the core, and converts errors to `JsValue` strings. Any loop token handed
//! back by the controller is given to `frame_loop::spawn` only after the
//! state borrow is released.

use wasm_bindgen::prelude::*;

use crate::animation::Host;
use crate::config::PlaybackConfig;
use crate::error::SequencerError;
use crate::frame_loop;
use crate::gesture::{Axis, Dictionary, Property};
use crate::scheduler::LoopToken;
use crate::skeleton::Skeleton;
use crate::state::{AppState, initialize_app_state, with_app_state, with_app_state_mut};

#[wasm_bindgen]
extern "C" {
    /// Avatar skeleton owned by the page's 3D scene.
    ///
    /// `getChannel` returns `undefined` and `setChannel` returns `false` when
    /// the joint is not part of the loaded model.
    pub type JsSkeleton;

    #[wasm_bindgen(method, js_name = getChannel)]
    fn read_channel(this: &JsSkeleton, joint: &str, property: &str, axis: &str) -> Option<f64>;

    #[wasm_bindgen(method, js_name = setChannel)]
    fn write_channel(
        this: &JsSkeleton,
        joint: &str,
        property: &str,
        axis: &str,
        value: f64,
    ) -> bool;

    /// Scene renderer plus the processed-text display
    pub type JsRenderer;

    #[wasm_bindgen(method, js_name = render)]
    fn render_scene(this: &JsRenderer);

    #[wasm_bindgen(method, js_name = appendText)]
    fn append_text(this: &JsRenderer, text: &str);

    #[wasm_bindgen(method, js_name = clearText)]
    fn clear_text(this: &JsRenderer);
}

impl Skeleton for JsSkeleton {
    fn channel(&self, joint: &str, property: Property, axis: Axis) -> Result<f32, SequencerError> {
        self.read_channel(joint, property.as_str(), axis.as_str())
            .map(|value| value as f32)
            .ok_or_else(|| SequencerError::UnknownJoint(joint.to_string()))
    }

    fn set_channel(
        &mut self,
        joint: &str,
        property: Property,
        axis: Axis,
        value: f32,
    ) -> Result<(), SequencerError> {
        if self.write_channel(joint, property.as_str(), axis.as_str(), f64::from(value)) {
            Ok(())
        } else {
            Err(SequencerError::UnknownJoint(joint.to_string()))
        }
    }
}

impl Host for JsRenderer {
    fn surface_text(&mut self, text: &str) {
        self.append_text(text);
    }

    fn request_render(&mut self) {
        self.render_scene();
    }

    fn reset_text(&mut self) {
        self.clear_text();
    }
}

fn to_js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn not_initialized() -> JsValue {
    JsValue::from_str("Sequencer not initialized, call init_sequencer first")
}

fn spawn_if_started(token: Option<LoopToken>) -> Result<(), JsValue> {
    match token {
        Some(token) => frame_loop::spawn(token),
        None => Ok(()),
    }
}

/// Set up logging, parse the sign dictionary and register the renderer.
///
/// Calling it again replaces all state, including any attached avatar.
#[wasm_bindgen]
pub fn init_sequencer(dictionary_json: &str, renderer: JsRenderer) -> Result<(), JsValue> {
    crate::init_logging(log::Level::Info);

    let dictionary = Dictionary::from_json(dictionary_json).map_err(to_js_error)?;
    initialize_app_state(AppState::new(dictionary, renderer).map_err(to_js_error)?);
    log::info!("Sequencer initialized");
    Ok(())
}

/// Swap the sign dictionary. Already queued scripts keep playing.
#[wasm_bindgen]
pub fn load_dictionary(dictionary_json: &str) -> Result<(), JsValue> {
    with_app_state_mut(|app| app.controller.load_dictionary(dictionary_json))
        .ok_or_else(not_initialized)?
        .map_err(to_js_error)
}

/// Attach a newly loaded avatar. Pending playback is discarded.
#[wasm_bindgen]
pub fn attach_avatar(skeleton: JsSkeleton) -> Result<(), JsValue> {
    with_app_state_mut(|app| {
        app.controller.attach_skeleton(skeleton);
        app.renderer.request_render();
    })
    .ok_or_else(not_initialized)
}

#[wasm_bindgen]
pub fn detach_avatar() {
    with_app_state_mut(|app| app.controller.detach_skeleton());
}

/// Translate `text` into gestures and play them after anything already queued
#[wasm_bindgen]
pub fn sign_text(text: &str) -> Result<(), JsValue> {
    let token = with_app_state_mut(|app| {
        if !app.controller.is_playing() {
            app.renderer.reset_text();
        }
        app.controller.sign_text(text)
    })
    .ok_or_else(not_initialized)?
    .map_err(to_js_error)?;

    spawn_if_started(token)
}

/// Play one letter or word on demand.
///
/// Returns `false` without queueing anything while other gestures are pending.
#[wasm_bindgen]
pub fn trigger_sign(symbol: &str) -> Result<bool, JsValue> {
    let result = with_app_state_mut(|app| app.controller.trigger_symbol(symbol))
        .ok_or_else(not_initialized)?;

    match result {
        Ok(token) => {
            spawn_if_started(token)?;
            Ok(true)
        }
        Err(SequencerError::Busy(pending)) => {
            log::debug!("Ignoring `{}`, {} scripts still queued", symbol, pending);
            Ok(false)
        }
        Err(e) => Err(to_js_error(e)),
    }
}

#[wasm_bindgen]
pub fn set_speed(speed: f32) {
    with_app_state_mut(|app| app.controller.set_speed(speed));
}

#[wasm_bindgen]
pub fn get_speed() -> f32 {
    with_app_state(|app| app.controller.speed()).unwrap_or(crate::config::DEFAULT_SPEED)
}

#[wasm_bindgen]
pub fn set_pause_ms(pause_ms: u32) {
    with_app_state_mut(|app| app.controller.set_pause_ms(pause_ms));
}

#[wasm_bindgen]
pub fn get_pause_ms() -> u32 {
    with_app_state(|app| app.controller.pause_ms()).unwrap_or(crate::config::DEFAULT_PAUSE_MS)
}

/// Replace both knobs from a `{ speed, pause_ms }` object. Missing fields
/// fall back to their defaults.
#[wasm_bindgen]
pub fn set_playback_config(config: JsValue) -> Result<(), JsValue> {
    let config: PlaybackConfig = serde_wasm_bindgen::from_value(config)?;
    with_app_state_mut(|app| app.controller.set_config(config)).ok_or_else(not_initialized)
}

#[wasm_bindgen]
pub fn get_playback_config() -> Result<JsValue, JsValue> {
    let config = with_app_state(|app| app.controller.config()).unwrap_or_default();
    Ok(serde_wasm_bindgen::to_value(&config)?)
}

/// Stop the running loop. The queue is kept; the next `sign_text` resumes it.
#[wasm_bindgen]
pub fn stop_playback() {
    with_app_state_mut(|app| app.controller.stop());
}

/// Drop every pending script and stop playback
#[wasm_bindgen]
pub fn clear_queue() {
    with_app_state_mut(|app| app.controller.clear());
}

#[wasm_bindgen]
pub fn is_playing() -> bool {
    with_app_state(|app| app.controller.is_playing()).unwrap_or(false)
}

#[wasm_bindgen]
pub fn pending_scripts() -> usize {
    with_app_state(|app| app.controller.pending_scripts()).unwrap_or(0)
}

/// Whole-word signs, alphabetically
#[wasm_bindgen]
pub fn word_list() -> js_sys::Array {
    with_app_state(|app| {
        app.controller
            .dictionary()
            .word_list()
            .into_iter()
            .map(JsValue::from_str)
            .collect()
    })
    .unwrap_or_else(js_sys::Array::new)
}

/// Letters with a sign, alphabetically
#[wasm_bindgen]
pub fn letter_list() -> js_sys::Array {
    with_app_state(|app| {
        app.controller
            .dictionary()
            .letter_list()
            .into_iter()
            .map(|ch| JsValue::from_str(&ch.to_string()))
            .collect()
    })
    .unwrap_or_else(js_sys::Array::new)
}

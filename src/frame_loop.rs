//! `requestAnimationFrame` driver for playback loops

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::scheduler::{FrameOutcome, LoopToken};
use crate::state::with_app_state_mut;

type FrameCallback = Closure<dyn FnMut(f64)>;

fn request_frame(callback: &FrameCallback) -> Result<i32, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    window.request_animation_frame(callback.as_ref().unchecked_ref())
}

fn abandon(token: LoopToken, error: JsValue) -> JsValue {
    log::error!("Frame loop {} could not be scheduled: {:?}", token.id(), error);
    with_app_state_mut(|app| app.controller.stop());
    error
}

/// Start a self-resubmitting frame loop for `token`.
///
/// The callback holds a handle to its own slot and clears it once the
/// controller reports `Stopped`, which frees the closure.
pub fn spawn(token: LoopToken) -> Result<(), JsValue> {
    let slot: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
    let handle = Rc::clone(&slot);

    *slot.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
        let outcome = with_app_state_mut(|app| {
            app.controller.tick(token, timestamp, &mut app.renderer)
        })
        .unwrap_or(FrameOutcome::Stopped);

        if !outcome.reschedules() {
            let _ = handle.borrow_mut().take();
            return;
        }

        let scheduled = match handle.borrow().as_ref() {
            Some(callback) => request_frame(callback).map(|_| ()),
            None => Ok(()),
        };
        if let Err(e) = scheduled {
            abandon(token, e);
            let _ = handle.borrow_mut().take();
        }
    }));

    let scheduled = match slot.borrow().as_ref() {
        Some(callback) => request_frame(callback).map(|_| ()),
        None => Ok(()),
    };
    if let Err(e) = scheduled {
        let _ = slot.borrow_mut().take();
        return Err(abandon(token, e));
    }

    log::debug!("Frame loop {} started", token.id());
    Ok(())
}

// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot browser scheduling: `requestAnimationFrame` and `setTimeout`.
//!
//! The engine keeps at most one frame and one resize timer pending, so each
//! [`OneShot`] owns a single JS closure that is re-registered on every
//! request. The id of the live registration is kept in a shared cell; the
//! closure hands it back to the engine, which discards callbacks whose id is
//! no longer the pending one.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use parallax_core::time::Duration;

// Global bindings; no `Window` lookup per request.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);

    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, delay_ms: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Api {
    AnimationFrame,
    Timeout,
}

/// A reusable one-shot registration with the browser.
pub(crate) struct OneShot {
    api: Api,
    closure: Closure<dyn FnMut()>,
    live: Rc<Cell<i32>>,
}

impl OneShot {
    /// A `requestAnimationFrame` slot. `callback` receives the id of the
    /// registration that fired.
    pub(crate) fn frame(callback: impl FnMut(i32) + 'static) -> Self {
        Self::new(Api::AnimationFrame, callback)
    }

    /// A `setTimeout` slot. `callback` receives the id of the timer that
    /// fired.
    pub(crate) fn timeout(callback: impl FnMut(i32) + 'static) -> Self {
        Self::new(Api::Timeout, callback)
    }

    fn new(api: Api, mut callback: impl FnMut(i32) + 'static) -> Self {
        let live = Rc::new(Cell::new(0));
        let id = Rc::clone(&live);
        let closure = Closure::wrap(Box::new(move || callback(id.get())) as Box<dyn FnMut()>);
        Self { api, closure, live }
    }

    /// Registers the closure. `delay` is ignored for animation frames.
    pub(crate) fn schedule(&self, delay: Duration) -> i32 {
        let callback = self.closure.as_ref().unchecked_ref();
        let id = match self.api {
            Api::AnimationFrame => request_animation_frame(callback),
            Api::Timeout => set_timeout(callback, delay_ms(delay)),
        };
        self.live.set(id);
        id
    }

    /// Cancels registration `id` if it has not run yet.
    pub(crate) fn cancel(&self, id: i32) {
        match self.api {
            Api::AnimationFrame => cancel_animation_frame(id),
            Api::Timeout => clear_timeout(id),
        }
    }
}

impl core::fmt::Debug for OneShot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OneShot")
            .field("api", &self.api)
            .field("live", &self.live.get())
            .finish_non_exhaustive()
    }
}

/// Converts a delay to the millisecond argument of `setTimeout`.
pub(crate) fn delay_ms(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_is_whole_milliseconds() {
        assert_eq!(delay_ms(Duration::from_millis(200)), 200);
        assert_eq!(delay_ms(Duration(1_500)), 1, "sub-millisecond part dropped");
        assert_eq!(delay_ms(Duration(u64::MAX)), i32::MAX, "saturates");
    }
}

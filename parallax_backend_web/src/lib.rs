// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for parallax.
//!
//! This crate runs the `parallax_core` engine in the browser:
//!
//! - [`DomHost`]: the host traits over `web-sys` (DOM queries and style
//!   writes, `requestAnimationFrame`, `setTimeout`, `IntersectionObserver`,
//!   window scroll and resize listeners)
//! - [`ScrollEffects`]: the control surface exported to JavaScript
//! - [`ConsoleSink`]: trace events to the browser console
//!
//! Loading the module starts an engine automatically once the document is
//! ready; the instance is available to scripts through
//! [`scroll_effects`].
//!
//! # Crate features
//!
//! - `console-trace` (disabled by default): Enables engine tracing and
//!   attaches a [`ConsoleSink`] to the automatically started engine.

mod console;
mod host;
mod observer;
mod raf;

use std::cell::RefCell;
use std::rc::Rc;

use parallax_core::config::EngineConfig;
use parallax_core::engine::Engine;
use parallax_core::time::HostTime;
use parallax_core::trace::TraceSink;
use wasm_bindgen::prelude::*;

pub use console::ConsoleSink;
pub use host::{DomHost, SharedEngine};

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks.
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis_f64(raf::performance_now())
}

/// The five control operations, exported to JavaScript.
///
/// Cloning yields another handle to the same engine. Each operation borrows
/// the engine for its duration; one invoked re-entrantly from inside an
/// engine callback is skipped.
#[wasm_bindgen]
#[derive(Clone, Debug)]
pub struct ScrollEffects {
    engine: SharedEngine,
}

#[wasm_bindgen]
impl ScrollEffects {
    /// Creates an idle engine over the current window with the default
    /// configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Self, JsValue> {
        Self::with_config(EngineConfig::web())
    }

    /// Collects annotated elements, starts reveals and, where the
    /// environment allows, scroll-driven motion.
    pub fn init(&self) {
        self.with(Engine::init);
    }

    /// Rebuilds the registry after the page changed.
    pub fn refresh(&self) {
        self.with(Engine::refresh);
    }

    /// Forces motion on.
    pub fn enable(&self) {
        self.with(Engine::enable);
    }

    /// Forces motion off and removes every written style property.
    pub fn disable(&self) {
        self.with(Engine::disable);
    }

    /// Detaches everything. Idempotent.
    pub fn destroy(&self) {
        self.with(Engine::destroy);
    }

    /// Whether scroll-driven motion is running.
    #[wasm_bindgen(getter)]
    pub fn enabled(&self) -> bool {
        self.engine
            .try_borrow()
            .map(|engine| engine.is_enabled())
            .unwrap_or(false)
    }
}

impl ScrollEffects {
    /// Creates an idle engine over the current window.
    pub fn with_config(config: EngineConfig) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let engine = Rc::new_cyclic(|weak| {
            RefCell::new(Engine::new(
                DomHost::new(window, document, weak.clone()),
                config,
            ))
        });
        Ok(Self { engine })
    }

    /// The shared engine.
    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    /// Routes engine diagnostics to `sink`.
    pub fn set_trace_sink(&self, sink: Box<dyn TraceSink>) {
        if let Ok(mut engine) = self.engine.try_borrow_mut() {
            engine.set_trace_sink(sink);
        }
    }

    fn with(&self, f: impl FnOnce(&mut Engine<DomHost>)) {
        if let Ok(mut engine) = self.engine.try_borrow_mut() {
            f(&mut engine);
        }
    }
}

thread_local! {
    static AUTO: RefCell<Option<ScrollEffects>> = const { RefCell::new(None) };
}

/// The automatically started instance, once the module has loaded.
#[wasm_bindgen(js_name = scrollEffects)]
pub fn scroll_effects() -> Option<ScrollEffects> {
    AUTO.with(|auto| auto.borrow().clone())
}

/// Module entry point: creates the engine and initializes it once the
/// document has been parsed.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let effects = ScrollEffects::new()?;
    if cfg!(feature = "console-trace") {
        effects.set_trace_sink(Box::new(ConsoleSink::new()));
    }
    AUTO.with(|auto| *auto.borrow_mut() = Some(effects.clone()));

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let ready_state = js_sys::Reflect::get(&document, &JsValue::from_str("readyState"))?;
    if ready_state.as_string().as_deref() == Some("loading") {
        let on_ready = Closure::once_into_js(move || effects.init());
        document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
    } else {
        effects.init();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_defaults_are_the_web_preset() {
        // Native tests cannot reach a window; the exported constructor relies
        // on the same preset.
        assert_eq!(EngineConfig::default(), EngineConfig::web());
    }
}

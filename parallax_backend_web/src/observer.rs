// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `IntersectionObserver` wrapper.
//!
//! One [`DomObserver`] exists per reveal category. Its callback converts the
//! browser's entries into [`IntersectionEntry`] values and forwards them to
//! `Engine::on_intersection` tagged with the category's [`ObserverId`].

use js_sys::Array;
use parallax_core::host::{IntersectionEntry, ObserverId, ObserverOptions};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::host::{WeakEngine, with_engine};

/// A live intersection observer and the closure it calls.
pub(crate) struct DomObserver {
    id: ObserverId,
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array)>,
}

impl DomObserver {
    /// Creates the observer. Fails where `IntersectionObserver` is
    /// unavailable or rejects the options.
    pub(crate) fn new(
        id: ObserverId,
        options: &ObserverOptions,
        engine: WeakEngine,
    ) -> Result<Self, JsValue> {
        let callback = Closure::wrap(Box::new(move |entries: Array| {
            let entries = convert(&entries);
            with_engine(&engine, |e| {
                e.on_intersection(id, &entries);
            });
        }) as Box<dyn FnMut(Array)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(options.root_margin);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        Ok(Self {
            id,
            observer,
            _callback: callback,
        })
    }

    pub(crate) fn id(&self) -> ObserverId {
        self.id
    }

    pub(crate) fn observe(&self, node: &Element) {
        self.observer.observe(node);
    }

    pub(crate) fn unobserve(&self, node: &Element) {
        self.observer.unobserve(node);
    }
}

impl Drop for DomObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

fn convert(entries: &Array) -> Vec<IntersectionEntry<Element>> {
    entries
        .iter()
        .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
        .map(|entry| IntersectionEntry {
            target: entry.target(),
            is_intersecting: entry.is_intersecting(),
        })
        .collect()
}

// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The DOM host.
//!
//! [`DomHost`] implements the `parallax_core` host traits over `web-sys`.
//! It holds a weak handle to the engine that owns it; every browser callback
//! (animation frame, resize timer, scroll and resize listeners, intersection
//! observers) upgrades that handle and forwards to the matching `Engine::on_*`
//! method. A callback that finds the engine already borrowed skips the event.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use kurbo::{Rect, Size};
use parallax_core::engine::Engine;
use parallax_core::host::{
    Document, EventLoop, FrameRequest, ObserverId, ObserverOptions, Observers, Selector, Signal,
    TimerId, Viewport,
};
use parallax_core::split::TextSegment;
use parallax_core::time::{Duration, HostTime};
use parallax_core::viewport::Capabilities;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Element, HtmlElement, Window};

use crate::observer::DomObserver;
use crate::raf::OneShot;

/// The engine as shared with browser callbacks.
pub type SharedEngine = Rc<RefCell<Engine<DomHost>>>;

pub(crate) type WeakEngine = Weak<RefCell<Engine<DomHost>>>;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

/// Runs `f` on the engine if it is still alive and not already borrowed.
pub(crate) fn with_engine(engine: &WeakEngine, f: impl FnOnce(&mut Engine<DomHost>)) {
    let Some(engine) = engine.upgrade() else {
        return;
    };
    let Ok(mut engine) = engine.try_borrow_mut() else {
        return;
    };
    f(&mut engine);
}

/// A window event listener that can be attached and detached repeatedly.
struct Listener {
    event: &'static str,
    closure: Closure<dyn FnMut()>,
    attached: bool,
}

impl Listener {
    fn new(event: &'static str, callback: impl FnMut() + 'static) -> Self {
        Self {
            event,
            closure: Closure::wrap(Box::new(callback) as Box<dyn FnMut()>),
            attached: false,
        }
    }

    fn set_attached(&mut self, window: &Window, attached: bool) {
        if self.attached == attached {
            return;
        }
        let callback = self.closure.as_ref().unchecked_ref();
        if attached {
            let options = AddEventListenerOptions::new();
            options.set_passive(true);
            let _ = window.add_event_listener_with_callback_and_add_event_listener_options(
                self.event, callback, &options,
            );
        } else {
            let _ = window.remove_event_listener_with_callback(self.event, callback);
        }
        self.attached = attached;
    }
}

/// Implements the host traits over the browser window and document.
pub struct DomHost {
    window: Window,
    document: web_sys::Document,
    frame: OneShot,
    timer: OneShot,
    scroll: Listener,
    resize: Listener,
    observers: Vec<DomObserver>,
    engine: WeakEngine,
}

impl core::fmt::Debug for DomHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomHost")
            .field("frame", &self.frame)
            .field("timer", &self.timer)
            .field("scroll_attached", &self.scroll.attached)
            .field("resize_attached", &self.resize.attached)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl DomHost {
    /// Creates a host whose callbacks are delivered to `engine`.
    ///
    /// Called from inside [`Rc::new_cyclic`], so `engine` cannot be upgraded
    /// yet; the callbacks only upgrade it when they fire.
    pub(crate) fn new(window: Window, document: web_sys::Document, engine: WeakEngine) -> Self {
        let frame = {
            let engine = engine.clone();
            OneShot::frame(move |id| {
                with_engine(&engine, |e| {
                    e.on_frame(FrameRequest(id.cast_unsigned()));
                });
            })
        };
        let timer = {
            let engine = engine.clone();
            OneShot::timeout(move |id| {
                with_engine(&engine, |e| {
                    e.on_timer(TimerId(id.cast_unsigned()));
                });
            })
        };
        let scroll = {
            let engine = engine.clone();
            let window = window.clone();
            Listener::new("scroll", move || {
                let offset = window.scroll_y().unwrap_or(0.0);
                with_engine(&engine, |e| {
                    e.on_scroll(offset);
                });
            })
        };
        let resize = {
            let engine = engine.clone();
            Listener::new("resize", move || with_engine(&engine, Engine::on_resize))
        };
        Self {
            window,
            document,
            frame,
            timer,
            scroll,
            resize,
            observers: Vec::new(),
            engine,
        }
    }

    fn observer(&self, id: ObserverId) -> Option<&DomObserver> {
        self.observers.iter().find(|o| o.id() == id)
    }
}

/// Collects a `NodeList` into elements, skipping non-element nodes.
fn elements(list: &web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Renders a `transition-delay` value.
pub(crate) fn css_delay(delay: Duration) -> String {
    format!("{}ms", delay.as_millis())
}

impl Document for DomHost {
    type Node = Element;

    fn query_all(&self, selector: &Selector) -> Vec<Element> {
        self.document
            .query_selector_all(&selector.to_css())
            .map(|list| elements(&list))
            .unwrap_or_default()
    }

    fn query_within(&self, root: &Element, selector: &Selector) -> Vec<Element> {
        root.query_selector_all(&selector.to_css())
            .map(|list| elements(&list))
            .unwrap_or_default()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        let _ = node.set_attribute(name, value);
    }

    fn bounding_rect(&self, node: &Element) -> Rect {
        let r = node.get_bounding_client_rect();
        Rect::new(r.left(), r.top(), r.right(), r.bottom())
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn replace_children(&mut self, node: &Element, segments: &[TextSegment]) {
        node.set_text_content(None);
        for segment in segments {
            match segment {
                TextSegment::Text(text) => {
                    let text = self.document.create_text_node(text);
                    let _ = node.append_child(&text);
                }
                TextSegment::Span { text, class, delay } => {
                    let Ok(span) = self.document.create_element("span") else {
                        continue;
                    };
                    span.set_class_name(class);
                    span.set_text_content(Some(text.as_str()));
                    if let (Some(delay), Some(html)) = (delay, span.dyn_ref::<HtmlElement>()) {
                        let _ = html
                            .style()
                            .set_property("transition-delay", &css_delay(*delay));
                    }
                    let _ = node.append_child(&span);
                }
            }
        }
    }

    fn add_class(&mut self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn set_style(&mut self, node: &Element, property: &str, value: &str) {
        if let Some(html) = node.dyn_ref::<HtmlElement>() {
            let _ = html.style().set_property(property, value);
        }
    }

    fn remove_style(&mut self, node: &Element, property: &str) {
        if let Some(html) = node.dyn_ref::<HtmlElement>() {
            let _ = html.style().remove_property(property);
        }
    }
}

impl Viewport for DomHost {
    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn viewport_size(&self) -> Size {
        let dimension = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Size::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn capabilities(&self) -> Capabilities {
        let touch_events = js_sys::Reflect::has(&self.window, &JsValue::from_str("ontouchstart")).ok();
        let max_touch_points = u32::try_from(self.window.navigator().max_touch_points()).ok();
        let prefers_reduced_motion = self
            .window
            .match_media(REDUCED_MOTION_QUERY)
            .ok()
            .flatten()
            .map(|list| list.matches());
        Capabilities {
            touch_events,
            max_touch_points,
            prefers_reduced_motion,
        }
    }
}

impl EventLoop for DomHost {
    fn now(&self) -> HostTime {
        crate::now()
    }

    fn request_frame(&mut self) -> FrameRequest {
        FrameRequest(self.frame.schedule(Duration::ZERO).cast_unsigned())
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.frame.cancel(request.0.cast_signed());
    }

    fn start_timer(&mut self, delay: Duration) -> TimerId {
        TimerId(self.timer.schedule(delay).cast_unsigned())
    }

    fn cancel_timer(&mut self, timer: TimerId) {
        self.timer.cancel(timer.0.cast_signed());
    }

    fn listen(&mut self, signal: Signal, active: bool) {
        match signal {
            Signal::Scroll => self.scroll.set_attached(&self.window, active),
            Signal::Resize => self.resize.set_attached(&self.window, active),
        }
    }
}

impl Observers for DomHost {
    fn create_observer(&mut self, id: ObserverId, options: &ObserverOptions) {
        self.disconnect(id);
        // A browser without IntersectionObserver leaves the category inert.
        if let Ok(observer) = DomObserver::new(id, options, self.engine.clone()) {
            self.observers.push(observer);
        }
    }

    fn observe(&mut self, id: ObserverId, node: &Element) {
        if let Some(observer) = self.observer(id) {
            observer.observe(node);
        }
    }

    fn unobserve(&mut self, id: ObserverId, node: &Element) {
        if let Some(observer) = self.observer(id) {
            observer.unobserve(node);
        }
    }

    fn disconnect(&mut self, id: ObserverId) {
        self.observers.retain(|o| o.id() != id);
    }
}

impl Drop for DomHost {
    fn drop(&mut self) {
        self.scroll.set_attached(&self.window, false);
        self.resize.set_attached(&self.window, false);
    }
}

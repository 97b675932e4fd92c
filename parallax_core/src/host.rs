// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for platform integrations.
//!
//! The engine never talks to a browser directly. Everything it consumes from
//! the page is expressed as a trait implemented by a host:
//!
//! - [`Document`]: element discovery by marker, attributes, bounding
//!   geometry, style-property writes, class writes, and the text rewrite used
//!   by word/character splitting.
//!
//! - [`Viewport`]: scroll offset, viewport size and capability signals.
//!   Read only at init, refresh and resize; never per frame.
//!
//! - [`EventLoop`]: the per-frame callback primitive (with cancellation),
//!   one-shot timers for the resize quiet period, a monotonic clock, and
//!   attaching/detaching the scroll and resize listeners.
//!
//! - [`Observers`]: the asynchronous intersection-notification primitive.
//!
//! [`Host`] is implemented for any type providing all four.
//!
//! # Callbacks
//!
//! Hosts deliver asynchronous events by calling back into the engine:
//! [`on_scroll`](crate::engine::Engine::on_scroll),
//! [`on_resize`](crate::engine::Engine::on_resize),
//! [`on_frame`](crate::engine::Engine::on_frame),
//! [`on_timer`](crate::engine::Engine::on_timer) and
//! [`on_intersection`](crate::engine::Engine::on_intersection). Identifiers
//! handed out by the host ([`FrameRequest`], [`TimerId`]) or by the engine
//! ([`ObserverId`]) route each callback to its origin.
//!
//! # Crate boundaries
//!
//! `parallax_core` owns the data model, formulas, scheduling and this
//! contract. `parallax_backend_web` implements it with `web-sys`;
//! [`headless`](crate::headless) implements it in memory for tests and
//! native tooling.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Rect, Size};

use crate::split::TextSegment;
use crate::time::{Duration, HostTime};
use crate::viewport::Capabilities;

/// A declarative element marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Elements carrying the attribute.
    Attribute(&'static str),
    /// Elements carrying any of the attributes.
    AnyAttribute(&'static [&'static str]),
    /// Elements carrying the class.
    Class(&'static str),
    /// Elements carrying `class` but not `excluded`.
    ClassExcluding {
        /// Required class.
        class: &'static str,
        /// Class that disqualifies a match.
        excluded: &'static str,
    },
}

impl Selector {
    /// Renders the selector as CSS for `querySelectorAll`.
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Attribute(name) => format!("[{name}]"),
            Self::AnyAttribute(names) => names
                .iter()
                .map(|name| format!("[{name}]"))
                .collect::<Vec<_>>()
                .join(", "),
            Self::Class(class) => format!(".{class}"),
            Self::ClassExcluding { class, excluded } => format!(".{class}:not(.{excluded})"),
        }
    }

    /// Evaluates the selector against an element described by predicates.
    pub fn matches(&self, has_attribute: impl Fn(&str) -> bool, has_class: impl Fn(&str) -> bool) -> bool {
        match self {
            Self::Attribute(name) => has_attribute(name),
            Self::AnyAttribute(names) => names.iter().any(|name| has_attribute(name)),
            Self::Class(class) => has_class(class),
            Self::ClassExcluding { class, excluded } => has_class(class) && !has_class(excluded),
        }
    }
}

/// Element discovery, geometry and write access.
///
/// Writes to nodes that are no longer in the document must be harmless.
pub trait Document {
    /// Handle to a document node. Cheap to clone; equality is identity.
    type Node: Clone + PartialEq + fmt::Debug;

    /// All matching elements in document order.
    fn query_all(&self, selector: &Selector) -> Vec<Self::Node>;

    /// Matching descendants of `root` in document order.
    fn query_within(&self, root: &Self::Node, selector: &Selector) -> Vec<Self::Node>;

    /// The value of an attribute, if present.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Sets an attribute.
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    /// The element's bounding box relative to the viewport.
    fn bounding_rect(&self, node: &Self::Node) -> Rect;

    /// The element's text content.
    fn text_content(&self, node: &Self::Node) -> String;

    /// Replaces the element's children with the given segments, in order.
    fn replace_children(&mut self, node: &Self::Node, segments: &[TextSegment]);

    /// Adds a class. Adding a present class is a no-op.
    fn add_class(&mut self, node: &Self::Node, class: &str);

    /// Sets a style property (custom properties included).
    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str);

    /// Removes a style property entirely.
    fn remove_style(&mut self, node: &Self::Node, property: &str);
}

/// Viewport metrics and capability signals.
pub trait Viewport {
    /// Current vertical scroll offset.
    fn scroll_offset(&self) -> f64;

    /// Current viewport size.
    fn viewport_size(&self) -> Size;

    /// Current capability signals.
    fn capabilities(&self) -> Capabilities;
}

/// Identifies a pending per-frame callback.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameRequest(pub u32);

impl fmt::Debug for FrameRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameRequest({})", self.0)
    }
}

/// Identifies a pending one-shot timer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimerId(pub u32);

impl fmt::Debug for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerId({})", self.0)
    }
}

/// Identifies an intersection observer created for one reveal category.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObserverId(pub u32);

impl fmt::Debug for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObserverId({})", self.0)
    }
}

/// Host notifications the engine subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Scroll events on the viewport.
    Scroll,
    /// Viewport resize events.
    Resize,
}

/// Scheduling, timers, clock and listener management.
pub trait EventLoop {
    /// Current monotonic time.
    fn now(&self) -> HostTime;

    /// Requests one callback before the next visual update. The host answers
    /// with [`Engine::on_frame`](crate::engine::Engine::on_frame).
    fn request_frame(&mut self) -> FrameRequest;

    /// Cancels a not-yet-run frame request.
    fn cancel_frame(&mut self, request: FrameRequest);

    /// Starts a one-shot timer. The host answers with
    /// [`Engine::on_timer`](crate::engine::Engine::on_timer).
    fn start_timer(&mut self, delay: Duration) -> TimerId;

    /// Cancels a not-yet-fired timer.
    fn cancel_timer(&mut self, timer: TimerId);

    /// Attaches (`active`) or detaches the listener for `signal`.
    fn listen(&mut self, signal: Signal, active: bool);
}

/// Configuration of one intersection observer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the target's area that must be visible to count as
    /// intersecting.
    pub threshold: f64,
    /// Margin applied to the viewport, CSS `rootMargin` syntax.
    pub root_margin: &'static str,
}

/// One intersection-state change delivered by the host.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionEntry<N> {
    /// The observed element.
    pub target: N,
    /// Whether the element now intersects.
    pub is_intersecting: bool,
}

/// The asynchronous intersection-notification primitive.
///
/// Changes are delivered later through
/// [`Engine::on_intersection`](crate::engine::Engine::on_intersection) with
/// the [`ObserverId`] passed to [`create_observer`](Self::create_observer).
pub trait Observers: Document {
    /// Creates an observer with the given options.
    fn create_observer(&mut self, id: ObserverId, options: &ObserverOptions);

    /// Starts observing `node`.
    fn observe(&mut self, id: ObserverId, node: &Self::Node);

    /// Stops observing `node`.
    fn unobserve(&mut self, id: ObserverId, node: &Self::Node);

    /// Stops observing everything and releases the observer.
    fn disconnect(&mut self, id: ObserverId);
}

/// Everything the engine needs from its environment.
pub trait Host: Observers + Viewport + EventLoop {}

impl<T: Observers + Viewport + EventLoop> Host for T {}

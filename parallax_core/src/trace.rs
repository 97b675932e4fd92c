// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the engine.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! engine calls at each stage: scroll notifications, recompute passes,
//! resize handling, lifecycle operations, registry collection and reveals.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Tracer`] owns an optional boxed sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing and the sink is dropped
//! on construction. When **on**, each method performs a single `Option`
//! branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use kurbo::Size;

use crate::motion::MotionKind;
use crate::scheduler::ScrollDecision;
use crate::time::HostTime;
use crate::visibility::RevealKind;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why a recompute pass ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassTrigger {
    /// A coalesced scroll frame.
    Frame,
    /// The immediate pass at the end of `init`.
    Init,
    /// The immediate pass at the end of `refresh`.
    Refresh,
    /// The immediate pass at the end of `enable`.
    Enable,
    /// Resize re-enabled motion.
    Resize,
}

/// Which control operation ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleOp {
    /// `init`.
    Init,
    /// `refresh`.
    Refresh,
    /// `enable`.
    Enable,
    /// `disable`.
    Disable,
    /// `destroy`.
    Destroy,
}

/// What happened in a reveal category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RevealPhase {
    /// Elements started being observed.
    Observe,
    /// Intersection entries were applied.
    Trigger,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every scroll notification.
#[derive(Clone, Copy, Debug)]
pub struct ScrollEvent {
    /// Host time of the notification.
    pub timestamp: HostTime,
    /// Reported scroll offset.
    pub offset: f64,
    /// How the scheduler handled it.
    pub decision: ScrollDecision,
}

/// Emitted after each recompute pass.
#[derive(Clone, Copy, Debug)]
pub struct FramePassEvent {
    /// Monotonic pass counter.
    pub pass_index: u64,
    /// Why the pass ran.
    pub trigger: PassTrigger,
    /// Host time at the start of the pass.
    pub start: HostTime,
    /// Host time at the end of the pass.
    pub end: HostTime,
    /// Scroll offset the pass used.
    pub scroll_offset: f64,
    /// Entries whose channels were written.
    pub written: u32,
    /// Entries skipped by a guard band.
    pub skipped: u32,
}

/// Emitted when the debounced resize handler runs.
#[derive(Clone, Copy, Debug)]
pub struct ResizeEvent {
    /// Host time of the handler.
    pub timestamp: HostTime,
    /// New viewport size.
    pub viewport: Size,
    /// Entries remeasured.
    pub remeasured: usize,
    /// Whether motion was enabled before.
    pub was_enabled: bool,
    /// Whether motion is enabled now.
    pub enabled: bool,
}

/// Emitted for each control operation.
#[derive(Clone, Copy, Debug)]
pub struct LifecycleEvent {
    /// Host time of the operation.
    pub timestamp: HostTime,
    /// Which operation.
    pub op: LifecycleOp,
    /// Whether motion is enabled afterwards.
    pub enabled: bool,
}

/// Emitted after a registry category is collected.
#[derive(Clone, Copy, Debug)]
pub struct CollectEvent {
    /// Host time of the collection.
    pub timestamp: HostTime,
    /// Which category.
    pub kind: MotionKind,
    /// Entries registered.
    pub count: usize,
}

/// Emitted when a reveal category observes or triggers elements.
#[derive(Clone, Copy, Debug)]
pub struct RevealEvent {
    /// Host time of the event.
    pub timestamp: HostTime,
    /// Which category.
    pub kind: RevealKind,
    /// Observe or trigger.
    pub phase: RevealPhase,
    /// Elements observed or triggered.
    pub count: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the engine.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called for every scroll notification.
    fn on_scroll(&mut self, e: &ScrollEvent) {
        _ = e;
    }

    /// Called after every recompute pass.
    fn on_frame_pass(&mut self, e: &FramePassEvent) {
        _ = e;
    }

    /// Called when the debounced resize handler runs.
    fn on_resize(&mut self, e: &ResizeEvent) {
        _ = e;
    }

    /// Called for each control operation.
    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        _ = e;
    }

    /// Called after a registry category is collected.
    fn on_collect(&mut self, e: &CollectEvent) {
        _ = e;
    }

    /// Called when a reveal category observes or triggers elements.
    fn on_reveal(&mut self, e: &RevealEvent) {
        _ = e;
    }
}

/// Shares one sink between the engine and the code that reads it back.
impl<S: TraceSink + ?Sized> TraceSink for Rc<RefCell<S>> {
    fn on_scroll(&mut self, e: &ScrollEvent) {
        self.borrow_mut().on_scroll(e);
    }

    fn on_frame_pass(&mut self, e: &FramePassEvent) {
        self.borrow_mut().on_frame_pass(e);
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        self.borrow_mut().on_resize(e);
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        self.borrow_mut().on_lifecycle(e);
    }

    fn on_collect(&mut self, e: &CollectEvent) {
        self.borrow_mut().on_collect(e);
    }

    fn on_reveal(&mut self, e: &RevealEvent) {
        self.borrow_mut().on_reveal(e);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Owns an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

macro_rules! emit {
    ($self:ident, $method:ident, $e:ident) => {{
        #[cfg(feature = "trace")]
        if let Some(s) = &mut $self.sink {
            s.$method($e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (&$self, $e);
        }
    }};
}

impl Tracer {
    /// Creates a tracer that dispatches to `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            drop(sink);
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns `true` if events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`ScrollEvent`].
    #[inline]
    pub fn scroll(&mut self, e: &ScrollEvent) {
        emit!(self, on_scroll, e);
    }

    /// Emits a [`FramePassEvent`].
    #[inline]
    pub fn frame_pass(&mut self, e: &FramePassEvent) {
        emit!(self, on_frame_pass, e);
    }

    /// Emits a [`ResizeEvent`].
    #[inline]
    pub fn resize(&mut self, e: &ResizeEvent) {
        emit!(self, on_resize, e);
    }

    /// Emits a [`LifecycleEvent`].
    #[inline]
    pub fn lifecycle(&mut self, e: &LifecycleEvent) {
        emit!(self, on_lifecycle, e);
    }

    /// Emits a [`CollectEvent`].
    #[inline]
    pub fn collect(&mut self, e: &CollectEvent) {
        emit!(self, on_collect, e);
    }

    /// Emits a [`RevealEvent`].
    #[inline]
    pub fn reveal(&mut self, e: &RevealEvent) {
        emit!(self, on_reveal, e);
    }
}

#[cfg(all(test, feature = "trace"))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct Counting {
        scrolls: Vec<f64>,
        passes: u32,
    }

    impl TraceSink for Counting {
        fn on_scroll(&mut self, e: &ScrollEvent) {
            self.scrolls.push(e.offset);
        }

        fn on_frame_pass(&mut self, _e: &FramePassEvent) {
            self.passes += 1;
        }
    }

    #[test]
    fn shared_sink_receives_events() {
        let sink = Rc::new(RefCell::new(Counting::default()));
        let mut tracer = Tracer::new(Box::new(Rc::clone(&sink)));
        assert!(tracer.is_active());

        tracer.scroll(&ScrollEvent {
            timestamp: HostTime(10),
            offset: 120.0,
            decision: ScrollDecision::RequestFrame,
        });
        tracer.frame_pass(&FramePassEvent {
            pass_index: 0,
            trigger: PassTrigger::Frame,
            start: HostTime(20),
            end: HostTime(25),
            scroll_offset: 120.0,
            written: 3,
            skipped: 1,
        });
        // Events the sink does not override are dropped silently.
        tracer.lifecycle(&LifecycleEvent {
            timestamp: HostTime(30),
            op: LifecycleOp::Disable,
            enabled: false,
        });

        assert_eq!(sink.borrow().scrolls, [120.0]);
        assert_eq!(sink.borrow().passes, 1);
    }

    #[test]
    fn none_is_inactive() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_active());
        tracer.collect(&CollectEvent {
            timestamp: HostTime(0),
            kind: MotionKind::DriveSlide,
            count: 2,
        });
    }
}

// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame coalescing and resize debouncing.
//!
//! [`FrameScheduler`] is the single synchronization point between host input
//! and the recompute pass. It is a plain state machine; the
//! [`Engine`](crate::engine::Engine) forwards host notifications to it and
//! performs whatever host calls it asks for.
//!
//! # Scroll path
//!
//! ```text
//!   scroll(offset) ──► record offset ──► pending? ──no──► request frame
//!                                            │
//!                                           yes ──► coalesced (no work)
//!
//!   frame(id) ──► id == pending? ──► pass with latest offset ──► clear pending
//! ```
//!
//! However many notifications arrive between two frames, at most one pass
//! runs and it uses the most recent offset.
//!
//! # Resize path
//!
//! Every resize restarts a one-shot timer; only the timer that survives the
//! quiet period fires the remeasure.

use crate::host::{FrameRequest, TimerId};

/// What the engine should do after a scroll notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDecision {
    /// Motion is disabled; nothing happens.
    Ignored,
    /// A frame is already pending; the offset was recorded for it.
    Coalesced,
    /// Request a frame and report it with
    /// [`frame_requested`](FrameScheduler::frame_requested).
    RequestFrame,
}

/// Coalesces scroll notifications into frames and debounces resizes.
#[derive(Clone, Debug, Default)]
pub struct FrameScheduler {
    enabled: bool,
    pending: Option<FrameRequest>,
    latest_offset: f64,
    resize_timer: Option<TimerId>,
    notifications: u64,
    passes: u64,
}

impl FrameScheduler {
    /// Creates a disabled scheduler with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether scroll notifications schedule passes.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables scroll processing.
    ///
    /// Disabling does not cancel a pending frame; the engine takes it with
    /// [`cancel_frame`](Self::cancel_frame) and cancels it with the host.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether a frame is pending (a pass is scheduled but has not run).
    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.pending.is_some()
    }

    /// The offset the next pass will use.
    #[must_use]
    pub fn latest_offset(&self) -> f64 {
        self.latest_offset
    }

    /// Overrides the recorded offset without scheduling anything.
    pub fn set_latest_offset(&mut self, offset: f64) {
        self.latest_offset = offset;
    }

    /// Total scroll notifications received while enabled.
    #[must_use]
    pub fn notifications(&self) -> u64 {
        self.notifications
    }

    /// Total passes started from frames.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Records a scroll notification.
    pub fn notify_scroll(&mut self, offset: f64) -> ScrollDecision {
        if !self.enabled {
            return ScrollDecision::Ignored;
        }
        self.notifications += 1;
        self.latest_offset = offset;
        if self.pending.is_some() {
            ScrollDecision::Coalesced
        } else {
            ScrollDecision::RequestFrame
        }
    }

    /// Records the host's identifier for the requested frame.
    pub fn frame_requested(&mut self, request: FrameRequest) {
        self.pending = Some(request);
    }

    /// Handles a frame callback. Returns the offset to process, or `None` if
    /// the callback is stale (cancelled, superseded or arriving while
    /// disabled). The pending flag is cleared either way when `request`
    /// matches.
    pub fn begin_pass(&mut self, request: FrameRequest) -> Option<f64> {
        if self.pending != Some(request) {
            return None;
        }
        self.pending = None;
        if !self.enabled {
            return None;
        }
        self.passes += 1;
        Some(self.latest_offset)
    }

    /// Takes the pending frame so the engine can cancel it with the host.
    pub fn cancel_frame(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }

    /// Records a resize notification. Returns the previous timer, which the
    /// engine cancels before starting a new one.
    pub fn notify_resize(&mut self) -> Option<TimerId> {
        self.resize_timer.take()
    }

    /// Records the timer started for the quiet period.
    pub fn resize_timer_started(&mut self, timer: TimerId) {
        self.resize_timer = Some(timer);
    }

    /// Handles a timer callback. Returns `true` if it is the live resize timer
    /// and the remeasure should run.
    pub fn resize_timer_fired(&mut self, timer: TimerId) -> bool {
        if self.resize_timer == Some(timer) {
            self.resize_timer = None;
            true
        } else {
            false
        }
    }

    /// Takes the live resize timer so the engine can cancel it with the host.
    pub fn cancel_resize(&mut self) -> Option<TimerId> {
        self.resize_timer.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_scheduler_ignores_scroll() {
        let mut s = FrameScheduler::new();
        assert_eq!(s.notify_scroll(100.0), ScrollDecision::Ignored);
        assert_eq!(s.notifications(), 0);
        assert!(!s.is_scrolling());
    }

    #[test]
    fn notifications_coalesce_to_latest_offset() {
        let mut s = FrameScheduler::new();
        s.set_enabled(true);
        assert_eq!(s.notify_scroll(10.0), ScrollDecision::RequestFrame);
        s.frame_requested(FrameRequest(7));
        for offset in [20.0, 30.0, 45.0] {
            assert_eq!(s.notify_scroll(offset), ScrollDecision::Coalesced);
        }
        assert!(s.is_scrolling());
        assert_eq!(s.begin_pass(FrameRequest(7)), Some(45.0), "latest offset wins");
        assert!(!s.is_scrolling());
        assert_eq!(s.passes(), 1);

        // The next notification schedules a new frame.
        assert_eq!(s.notify_scroll(50.0), ScrollDecision::RequestFrame);
    }

    #[test]
    fn stale_frames_are_ignored() {
        let mut s = FrameScheduler::new();
        s.set_enabled(true);
        s.notify_scroll(10.0);
        s.frame_requested(FrameRequest(1));
        assert_eq!(s.begin_pass(FrameRequest(0)), None, "unknown request");
        assert_eq!(s.cancel_frame(), Some(FrameRequest(1)));
        assert_eq!(s.begin_pass(FrameRequest(1)), None, "cancelled request");
        assert_eq!(s.passes(), 0);
    }

    #[test]
    fn frame_after_disable_clears_pending_without_pass() {
        let mut s = FrameScheduler::new();
        s.set_enabled(true);
        s.notify_scroll(10.0);
        s.frame_requested(FrameRequest(3));
        s.set_enabled(false);
        assert_eq!(s.begin_pass(FrameRequest(3)), None);
        assert!(!s.is_scrolling());
    }

    #[test]
    fn resize_timer_restarts() {
        let mut s = FrameScheduler::new();
        assert_eq!(s.notify_resize(), None);
        s.resize_timer_started(TimerId(1));
        assert_eq!(s.notify_resize(), Some(TimerId(1)), "previous timer to cancel");
        s.resize_timer_started(TimerId(2));
        assert!(!s.resize_timer_fired(TimerId(1)), "superseded timer");
        assert!(s.resize_timer_fired(TimerId(2)));
        assert!(!s.resize_timer_fired(TimerId(2)), "fires once");
    }
}

// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fan-out to two sinks.

use parallax_core::trace::{
    CollectEvent, FramePassEvent, LifecycleEvent, ResizeEvent, RevealEvent, ScrollEvent, TraceSink,
};

/// Forwards every event to `first`, then to `second`.
///
/// Nest tees to reach more sinks.
#[derive(Debug, Default)]
pub struct TeeSink<A, B> {
    /// Receives events first.
    pub first: A,
    /// Receives events second.
    pub second: B,
}

impl<A: TraceSink, B: TraceSink> TeeSink<A, B> {
    /// Creates a tee over two sinks.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: TraceSink, B: TraceSink> TraceSink for TeeSink<A, B> {
    fn on_scroll(&mut self, e: &ScrollEvent) {
        self.first.on_scroll(e);
        self.second.on_scroll(e);
    }

    fn on_frame_pass(&mut self, e: &FramePassEvent) {
        self.first.on_frame_pass(e);
        self.second.on_frame_pass(e);
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        self.first.on_resize(e);
        self.second.on_resize(e);
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        self.first.on_lifecycle(e);
        self.second.on_lifecycle(e);
    }

    fn on_collect(&mut self, e: &CollectEvent) {
        self.first.on_collect(e);
        self.second.on_collect(e);
    }

    fn on_reveal(&mut self, e: &RevealEvent) {
        self.first.on_reveal(e);
        self.second.on_reveal(e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{RecorderSink, decode};
    use parallax_core::time::HostTime;
    use parallax_core::trace::LifecycleOp;

    #[test]
    fn both_sides_see_every_event() {
        let mut tee = TeeSink::new(RecorderSink::new(), RecorderSink::new());
        tee.on_lifecycle(&LifecycleEvent {
            timestamp: HostTime(1),
            op: LifecycleOp::Destroy,
            enabled: false,
        });
        assert_eq!(decode(tee.first.as_bytes()).count(), 1);
        assert_eq!(tee.first.as_bytes(), tee.second.as_bytes());
    }
}

// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are host time ticks, i.e. microseconds.

use std::io::Write;

use parallax_core::scheduler::ScrollDecision;
use parallax_core::time::HostTime;
use parallax_core::trace::{
    CollectEvent, FramePassEvent, LifecycleEvent, ResizeEvent, RevealEvent, ScrollEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    scrolls: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("scrolls", &self.scrolls)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            scrolls: true,
        }
    }

    /// Whether scroll notifications are printed (on by default).
    #[must_use]
    pub fn with_scrolls(mut self, scrolls: bool) -> Self {
        self.scrolls = scrolls;
        self
    }

    /// Consumes the sink and returns its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn ms(t: HostTime) -> f64 {
    t.ticks() as f64 / 1000.0
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_scroll(&mut self, e: &ScrollEvent) {
        if !self.scrolls {
            return;
        }
        let decision = match e.decision {
            ScrollDecision::Ignored => "ignored",
            ScrollDecision::Coalesced => "coalesced",
            ScrollDecision::RequestFrame => "frame",
        };
        let _ = writeln!(
            self.writer,
            "[scroll] offset={} at {:.3}ms -> {decision}",
            e.offset,
            ms(e.timestamp),
        );
    }

    fn on_frame_pass(&mut self, e: &FramePassEvent) {
        let _ = writeln!(
            self.writer,
            "[pass] #{} {:?} offset={} written={} skipped={} took={}µs",
            e.pass_index,
            e.trigger,
            e.scroll_offset,
            e.written,
            e.skipped,
            e.end.saturating_duration_since(e.start).ticks(),
        );
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        let _ = writeln!(
            self.writer,
            "[resize] {}x{} remeasured={} enabled={}->{} at {:.3}ms",
            e.viewport.width,
            e.viewport.height,
            e.remeasured,
            e.was_enabled,
            e.enabled,
            ms(e.timestamp),
        );
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        let _ = writeln!(
            self.writer,
            "[lifecycle] {:?} enabled={} at {:.3}ms",
            e.op,
            e.enabled,
            ms(e.timestamp),
        );
    }

    fn on_collect(&mut self, e: &CollectEvent) {
        let _ = writeln!(
            self.writer,
            "[collect] {} count={}",
            e.kind.as_str(),
            e.count,
        );
    }

    fn on_reveal(&mut self, e: &RevealEvent) {
        let _ = writeln!(
            self.writer,
            "[reveal] {} {:?} count={} at {:.3}ms",
            e.kind.as_str(),
            e.phase,
            e.count,
            ms(e.timestamp),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parallax_core::trace::PassTrigger;

    #[test]
    fn pretty_print_pass() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_frame_pass(&FramePassEvent {
            pass_index: 7,
            trigger: PassTrigger::Enable,
            start: HostTime(2_000),
            end: HostTime(2_150),
            scroll_offset: 80.0,
            written: 3,
            skipped: 0,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.starts_with("[pass] #7 Enable"), "got: {output}");
        assert!(output.contains("took=150µs"), "got: {output}");
    }

    #[test]
    fn scrolls_can_be_muted() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).with_scrolls(false);
        sink.on_scroll(&ScrollEvent {
            timestamp: HostTime(0),
            offset: 1.0,
            decision: ScrollDecision::RequestFrame,
        });
        assert!(sink.into_writer().is_empty());
    }
}

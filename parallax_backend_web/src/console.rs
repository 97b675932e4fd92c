// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser-console trace sink.
//!
//! [`ConsoleSink`] writes one `console.debug` line per engine event. Events
//! only reach it when `parallax_core` is built with its `trace` feature,
//! which this crate's `console-trace` feature turns on (and which also makes
//! [`start`](crate::start) attach a sink automatically).

use parallax_core::scheduler::ScrollDecision;
use parallax_core::trace::{
    CollectEvent, FramePassEvent, LifecycleEvent, ResizeEvent, RevealEvent, ScrollEvent, TraceSink,
};
use wasm_bindgen::JsValue;

/// A [`TraceSink`] that logs to the browser console.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink {
    /// Also log scroll notifications, which are by far the most frequent
    /// event.
    pub scrolls: bool,
}

impl ConsoleSink {
    /// A sink that logs everything but scroll notifications.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn log(line: &str) {
    web_sys::console::debug_1(&JsValue::from_str(line));
}

fn ms(ticks: u64) -> String {
    format!("{:.3}ms", ticks as f64 / 1000.0)
}

pub(crate) fn describe_scroll(e: &ScrollEvent) -> String {
    let decision = match e.decision {
        ScrollDecision::Ignored => "ignored",
        ScrollDecision::Coalesced => "coalesced",
        ScrollDecision::RequestFrame => "frame requested",
    };
    format!("[parallax] {} scroll {} ({decision})", ms(e.timestamp.ticks()), e.offset)
}

pub(crate) fn describe_pass(e: &FramePassEvent) -> String {
    format!(
        "[parallax] {} pass #{} {:?} at {}: {} written, {} skipped, took {}",
        ms(e.start.ticks()),
        e.pass_index,
        e.trigger,
        e.scroll_offset,
        e.written,
        e.skipped,
        ms(e.end.saturating_duration_since(e.start).ticks()),
    )
}

impl TraceSink for ConsoleSink {
    fn on_scroll(&mut self, e: &ScrollEvent) {
        if self.scrolls {
            log(&describe_scroll(e));
        }
    }

    fn on_frame_pass(&mut self, e: &FramePassEvent) {
        log(&describe_pass(e));
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        log(&format!(
            "[parallax] {} resize {}x{}: {} remeasured, enabled {} -> {}",
            ms(e.timestamp.ticks()),
            e.viewport.width,
            e.viewport.height,
            e.remeasured,
            e.was_enabled,
            e.enabled,
        ));
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        log(&format!(
            "[parallax] {} {:?} (enabled: {})",
            ms(e.timestamp.ticks()),
            e.op,
            e.enabled
        ));
    }

    fn on_collect(&mut self, e: &CollectEvent) {
        log(&format!(
            "[parallax] {} collected {} {}",
            ms(e.timestamp.ticks()),
            e.count,
            e.kind.as_str()
        ));
    }

    fn on_reveal(&mut self, e: &RevealEvent) {
        log(&format!(
            "[parallax] {} {} {:?} {}",
            ms(e.timestamp.ticks()),
            e.kind.as_str(),
            e.phase,
            e.count
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parallax_core::time::HostTime;
    use parallax_core::trace::PassTrigger;

    #[test]
    fn pass_line_reports_counts_and_duration() {
        let line = describe_pass(&FramePassEvent {
            pass_index: 4,
            trigger: PassTrigger::Frame,
            start: HostTime(16_000),
            end: HostTime(16_250),
            scroll_offset: 320.0,
            written: 7,
            skipped: 2,
        });
        assert_eq!(
            line,
            "[parallax] 16.000ms pass #4 Frame at 320: 7 written, 2 skipped, took 0.250ms"
        );
    }

    #[test]
    fn scroll_line_names_the_decision() {
        let line = describe_scroll(&ScrollEvent {
            timestamp: HostTime(1_500),
            offset: 42.5,
            decision: ScrollDecision::Coalesced,
        });
        assert_eq!(line, "[parallax] 1.500ms scroll 42.5 (coalesced)");
    }
}

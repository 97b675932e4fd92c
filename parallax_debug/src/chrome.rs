// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Frame passes become complete (`X`) slices on the engine thread, collection
//! counts become counter (`C`) tracks, and everything else is an instant.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use parallax_core::scheduler::ScrollDecision;

use crate::recorder::{RecordedEvent, decode};

const TID_ENGINE: u32 = 0;
const TID_INPUT: u32 = 1;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Host time ticks are microseconds, which is the unit the format expects,
/// so timestamps are written unchanged.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Scroll(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Scroll",
                    "cat": "Input",
                    "ts": e.timestamp.ticks(),
                    "pid": 0,
                    "tid": TID_INPUT,
                    "s": "t",
                    "args": {
                        "offset": e.offset,
                        "decision": decision_name(e.decision),
                    }
                }));
            }
            RecordedEvent::FramePass(e) => {
                events.push(json!({
                    "ph": "X",
                    "name": format!("Pass ({:?})", e.trigger),
                    "cat": "Frame",
                    "ts": e.start.ticks(),
                    "dur": e.end.saturating_duration_since(e.start).ticks(),
                    "pid": 0,
                    "tid": TID_ENGINE,
                    "args": {
                        "pass_index": e.pass_index,
                        "scroll_offset": e.scroll_offset,
                        "written": e.written,
                        "skipped": e.skipped,
                    }
                }));
            }
            RecordedEvent::Resize(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Resize",
                    "cat": "Viewport",
                    "ts": e.timestamp.ticks(),
                    "pid": 0,
                    "tid": TID_ENGINE,
                    "s": "p",
                    "args": {
                        "width": e.viewport.width,
                        "height": e.viewport.height,
                        "remeasured": e.remeasured,
                        "was_enabled": e.was_enabled,
                        "enabled": e.enabled,
                    }
                }));
            }
            RecordedEvent::Lifecycle(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.op),
                    "cat": "Lifecycle",
                    "ts": e.timestamp.ticks(),
                    "pid": 0,
                    "tid": TID_ENGINE,
                    "s": "g",
                    "args": {
                        "enabled": e.enabled,
                    }
                }));
            }
            RecordedEvent::Collect(e) => {
                let mut args = serde_json::Map::new();
                args.insert(e.kind.as_str().into(), json!(e.count));
                events.push(json!({
                    "ph": "C",
                    "name": "Registry",
                    "cat": "Registry",
                    "ts": e.timestamp.ticks(),
                    "pid": 0,
                    "tid": TID_ENGINE,
                    "args": args,
                }));
            }
            RecordedEvent::Reveal(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("Reveal {:?}", e.phase),
                    "cat": "Reveal",
                    "ts": e.timestamp.ticks(),
                    "pid": 0,
                    "tid": TID_ENGINE,
                    "s": "t",
                    "args": {
                        "kind": e.kind.as_str(),
                        "count": e.count,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn decision_name(d: ScrollDecision) -> &'static str {
    match d {
        ScrollDecision::Ignored => "ignored",
        ScrollDecision::Coalesced => "coalesced",
        ScrollDecision::RequestFrame => "request_frame",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use parallax_core::motion::MotionKind;
    use parallax_core::time::HostTime;
    use parallax_core::trace::{
        CollectEvent, FramePassEvent, LifecycleEvent, LifecycleOp, PassTrigger, ScrollEvent,
        TraceSink,
    };

    fn export_to_values(rec: &RecorderSink) -> Vec<Value> {
        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_lifecycle(&LifecycleEvent {
            timestamp: HostTime(0),
            op: LifecycleOp::Init,
            enabled: true,
        });
        rec.on_scroll(&ScrollEvent {
            timestamp: HostTime(1_000),
            offset: 250.0,
            decision: ScrollDecision::RequestFrame,
        });
        rec.on_frame_pass(&FramePassEvent {
            pass_index: 1,
            trigger: PassTrigger::Frame,
            start: HostTime(16_000),
            end: HostTime(16_400),
            scroll_offset: 250.0,
            written: 5,
            skipped: 1,
        });

        let parsed = export_to_values(&rec);
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "Init");

        assert_eq!(parsed[1]["name"], "Scroll");
        assert_eq!(parsed[1]["tid"], TID_INPUT);
        assert_eq!(parsed[1]["args"]["decision"], "request_frame");

        assert_eq!(parsed[2]["ph"], "X");
        assert_eq!(parsed[2]["name"], "Pass (Frame)");
        assert_eq!(parsed[2]["ts"], 16_000);
        assert_eq!(parsed[2]["dur"], 400);
        assert_eq!(parsed[2]["args"]["written"], 5);
    }

    #[test]
    fn collect_becomes_counter_track() {
        let mut rec = RecorderSink::new();
        rec.on_collect(&CollectEvent {
            timestamp: HostTime(5),
            kind: MotionKind::DriveSlide,
            count: 4,
        });

        let parsed = export_to_values(&rec);
        assert_eq!(parsed[0]["ph"], "C");
        assert_eq!(parsed[0]["args"][MotionKind::DriveSlide.as_str()], 4);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}

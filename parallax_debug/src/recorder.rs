// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use kurbo::Size;
use parallax_core::motion::MotionKind;
use parallax_core::scheduler::ScrollDecision;
use parallax_core::time::HostTime;
use parallax_core::trace::{
    CollectEvent, FramePassEvent, LifecycleEvent, LifecycleOp, PassTrigger, ResizeEvent,
    RevealEvent, RevealPhase, ScrollEvent, TraceSink,
};
use parallax_core::visibility::RevealKind;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_SCROLL: u8 = 1;
const TAG_FRAME_PASS: u8 = 2;
const TAG_RESIZE: u8 = 3;
const TAG_LIFECYCLE: u8 = 4;
const TAG_COLLECT: u8 = 5;
const TAG_REVEAL: u8 = 6;

// ---------------------------------------------------------------------------
// Enum codes
// ---------------------------------------------------------------------------

fn decision_code(d: ScrollDecision) -> u8 {
    match d {
        ScrollDecision::Ignored => 0,
        ScrollDecision::Coalesced => 1,
        ScrollDecision::RequestFrame => 2,
    }
}

fn trigger_code(t: PassTrigger) -> u8 {
    match t {
        PassTrigger::Frame => 0,
        PassTrigger::Init => 1,
        PassTrigger::Refresh => 2,
        PassTrigger::Enable => 3,
        PassTrigger::Resize => 4,
    }
}

fn op_code(op: LifecycleOp) -> u8 {
    match op {
        LifecycleOp::Init => 0,
        LifecycleOp::Refresh => 1,
        LifecycleOp::Enable => 2,
        LifecycleOp::Disable => 3,
        LifecycleOp::Destroy => 4,
    }
}

fn motion_code(kind: MotionKind) -> u8 {
    match kind {
        MotionKind::SimpleParallax => 0,
        MotionKind::ScrollParallax => 1,
        MotionKind::DriveSlide => 2,
        MotionKind::CharDrive => 3,
    }
}

fn reveal_code(kind: RevealKind) -> u8 {
    match kind {
        RevealKind::Reveal => 0,
        RevealKind::Stagger => 1,
        RevealKind::Words => 2,
        RevealKind::Chars => 3,
        RevealKind::Section => 4,
        RevealKind::Slide => 5,
    }
}

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_count(&mut self, v: usize) {
        self.write_u64(u64::try_from(v).unwrap_or(u64::MAX));
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }
}

impl TraceSink for RecorderSink {
    fn on_scroll(&mut self, e: &ScrollEvent) {
        self.write_u8(TAG_SCROLL);
        self.write_u64(e.timestamp.ticks());
        self.write_f64(e.offset);
        self.write_u8(decision_code(e.decision));
    }

    fn on_frame_pass(&mut self, e: &FramePassEvent) {
        self.write_u8(TAG_FRAME_PASS);
        self.write_u64(e.pass_index);
        self.write_u8(trigger_code(e.trigger));
        self.write_u64(e.start.ticks());
        self.write_u64(e.end.ticks());
        self.write_f64(e.scroll_offset);
        self.write_u32(e.written);
        self.write_u32(e.skipped);
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        self.write_u8(TAG_RESIZE);
        self.write_u64(e.timestamp.ticks());
        self.write_f64(e.viewport.width);
        self.write_f64(e.viewport.height);
        self.write_count(e.remeasured);
        self.write_bool(e.was_enabled);
        self.write_bool(e.enabled);
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        self.write_u8(TAG_LIFECYCLE);
        self.write_u64(e.timestamp.ticks());
        self.write_u8(op_code(e.op));
        self.write_bool(e.enabled);
    }

    fn on_collect(&mut self, e: &CollectEvent) {
        self.write_u8(TAG_COLLECT);
        self.write_u64(e.timestamp.ticks());
        self.write_u8(motion_code(e.kind));
        self.write_count(e.count);
    }

    fn on_reveal(&mut self, e: &RevealEvent) {
        self.write_u8(TAG_REVEAL);
        self.write_u64(e.timestamp.ticks());
        self.write_u8(reveal_code(e.kind));
        self.write_u8(match e.phase {
            RevealPhase::Observe => 0,
            RevealPhase::Trigger => 1,
        });
        self.write_count(e.count);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`ScrollEvent`].
    Scroll(ScrollEvent),
    /// A [`FramePassEvent`].
    FramePass(FramePassEvent),
    /// A [`ResizeEvent`].
    Resize(ResizeEvent),
    /// A [`LifecycleEvent`].
    Lifecycle(LifecycleEvent),
    /// A [`CollectEvent`].
    Collect(CollectEvent),
    /// A [`RevealEvent`].
    Reveal(RevealEvent),
}

impl RecordedEvent {
    /// The host time at which the event happened (pass start for passes).
    #[must_use]
    pub fn timestamp(&self) -> HostTime {
        match self {
            Self::Scroll(e) => e.timestamp,
            Self::FramePass(e) => e.start,
            Self::Resize(e) => e.timestamp,
            Self::Lifecycle(e) => e.timestamp,
            Self::Collect(e) => e.timestamp,
            Self::Reveal(e) => e.timestamp,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_count(&mut self) -> Option<usize> {
        Some(usize::try_from(self.read_u64()?).unwrap_or(usize::MAX))
    }

    fn read_f64(&mut self) -> Option<f64> {
        Some(f64::from_bits(self.read_u64()?))
    }

    fn read_time(&mut self) -> Option<HostTime> {
        Some(HostTime(self.read_u64()?))
    }

    fn read_decision(&mut self) -> Option<ScrollDecision> {
        Some(match self.read_u8()? {
            0 => ScrollDecision::Ignored,
            1 => ScrollDecision::Coalesced,
            _ => ScrollDecision::RequestFrame,
        })
    }

    fn read_trigger(&mut self) -> Option<PassTrigger> {
        Some(match self.read_u8()? {
            0 => PassTrigger::Frame,
            1 => PassTrigger::Init,
            2 => PassTrigger::Refresh,
            3 => PassTrigger::Enable,
            _ => PassTrigger::Resize,
        })
    }

    fn read_op(&mut self) -> Option<LifecycleOp> {
        Some(match self.read_u8()? {
            0 => LifecycleOp::Init,
            1 => LifecycleOp::Refresh,
            2 => LifecycleOp::Enable,
            3 => LifecycleOp::Disable,
            _ => LifecycleOp::Destroy,
        })
    }

    fn read_motion(&mut self) -> Option<MotionKind> {
        Some(match self.read_u8()? {
            0 => MotionKind::SimpleParallax,
            1 => MotionKind::ScrollParallax,
            2 => MotionKind::DriveSlide,
            _ => MotionKind::CharDrive,
        })
    }

    fn read_reveal(&mut self) -> Option<RevealKind> {
        Some(match self.read_u8()? {
            0 => RevealKind::Reveal,
            1 => RevealKind::Stagger,
            2 => RevealKind::Words,
            3 => RevealKind::Chars,
            4 => RevealKind::Section,
            _ => RevealKind::Slide,
        })
    }

    fn read_phase(&mut self) -> Option<RevealPhase> {
        Some(match self.read_u8()? {
            0 => RevealPhase::Observe,
            _ => RevealPhase::Trigger,
        })
    }

    fn decode_scroll(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Scroll(ScrollEvent {
            timestamp: self.read_time()?,
            offset: self.read_f64()?,
            decision: self.read_decision()?,
        }))
    }

    fn decode_frame_pass(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FramePass(FramePassEvent {
            pass_index: self.read_u64()?,
            trigger: self.read_trigger()?,
            start: self.read_time()?,
            end: self.read_time()?,
            scroll_offset: self.read_f64()?,
            written: self.read_u32()?,
            skipped: self.read_u32()?,
        }))
    }

    fn decode_resize(&mut self) -> Option<RecordedEvent> {
        let timestamp = self.read_time()?;
        let width = self.read_f64()?;
        let height = self.read_f64()?;
        Some(RecordedEvent::Resize(ResizeEvent {
            timestamp,
            viewport: Size::new(width, height),
            remeasured: self.read_count()?,
            was_enabled: self.read_bool()?,
            enabled: self.read_bool()?,
        }))
    }

    fn decode_lifecycle(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Lifecycle(LifecycleEvent {
            timestamp: self.read_time()?,
            op: self.read_op()?,
            enabled: self.read_bool()?,
        }))
    }

    fn decode_collect(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Collect(CollectEvent {
            timestamp: self.read_time()?,
            kind: self.read_motion()?,
            count: self.read_count()?,
        }))
    }

    fn decode_reveal(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Reveal(RevealEvent {
            timestamp: self.read_time()?,
            kind: self.read_reveal()?,
            phase: self.read_phase()?,
            count: self.read_count()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_SCROLL => self.decode_scroll(),
            TAG_FRAME_PASS => self.decode_frame_pass(),
            TAG_RESIZE => self.decode_resize(),
            TAG_LIFECYCLE => self.decode_lifecycle(),
            TAG_COLLECT => self.decode_collect(),
            TAG_REVEAL => self.decode_reveal(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

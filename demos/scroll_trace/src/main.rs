// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synthetic scroll session that exercises the engine and its diagnostics.
//!
//! Builds an in-memory page with every kind of annotated element, drives the
//! engine through scrolling, intersection, resize and control operations on a
//! [`HeadlessHost`], and traces everything to both a
//! [`PrettyPrintSink`] on stderr and a [`RecorderSink`]. The recording is
//! then exported as Chrome trace JSON.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter};
use std::rc::Rc;

use kurbo::Size;
use parallax_core::config::EngineConfig;
use parallax_core::engine::Engine;
use parallax_core::headless::{HeadlessHost, HeadlessNode};
use parallax_core::host::Document as _;
use parallax_core::time::Duration;

use parallax_debug::pretty::PrettyPrintSink;
use parallax_debug::recorder::{RecorderSink, decode};
use parallax_debug::tee::TeeSink;

/// Scroll distance per simulated input event.
const STEP: f64 = 40.0;
/// Input events per animation frame (fast wheel scrolling).
const EVENTS_PER_FRAME: usize = 3;
const FRAME: Duration = Duration::from_millis(16);

fn marked(host: &mut HeadlessHost, tag: &str, marker: &str, value: &str, top: f64) -> HeadlessNode {
    let body = host.body();
    let node = host.append(body, tag);
    host.set_attribute(&node, marker, value);
    host.set_layout(&node, top, 240.0);
    node
}

fn build_page(host: &mut HeadlessHost) {
    marked(host, "div", "data-parallax", "0.4", 200.0);
    marked(host, "div", "data-parallax", "", 900.0);
    marked(host, "div", "data-scroll-parallax", "slow", 400.0);
    let fast = marked(host, "div", "data-scroll-parallax", "fast", 1300.0);
    host.set_attribute(&fast, "data-scroll-direction", "reverse");
    marked(host, "section", "data-drive", "left", 1800.0);
    marked(host, "section", "data-drive", "right", 2600.0);
    let heading = marked(host, "h2", "data-char-drive", "", 3200.0);
    host.set_text(&heading, "Scroll to drive");

    marked(host, "div", "data-reveal", "", 700.0);
    let group = marked(host, "ul", "data-stagger", "", 1500.0);
    for i in 0..4 {
        let item = host.append(group, "li");
        host.set_layout(&item, 1500.0 + f64::from(i) * 60.0, 60.0);
    }
    let words = marked(host, "p", "data-word-reveal", "", 2200.0);
    host.set_text(&words, "Words arrive one at a time");
    let chars = marked(host, "p", "data-char-reveal", "", 2900.0);
    host.set_text(&chars, "Letters");
    marked(host, "section", "data-section", "", 3600.0);
    marked(host, "div", "data-slide-left", "", 4000.0);
    marked(host, "div", "data-slide-right", "", 4300.0);
}

/// Delivers pending intersection changes for every live observer.
fn deliver_intersections(engine: &mut Engine<HeadlessHost>) {
    for id in engine.host().observer_ids() {
        let entries = engine.host().intersections(id);
        if !entries.is_empty() {
            engine.on_intersection(id, &entries);
        }
    }
}

/// Scrolls from `from` to `to`, pumping one frame per few input events.
fn scroll(engine: &mut Engine<HeadlessHost>, from: f64, to: f64) {
    let direction = if to >= from { 1.0 } else { -1.0 };
    let mut offset = from;
    let mut events = 0;
    while (to - offset) * direction > 0.0 {
        offset = if direction > 0.0 {
            (offset + STEP).min(to)
        } else {
            (offset - STEP).max(to)
        };
        engine.host_mut().set_scroll_offset(offset);
        engine.on_scroll(offset);
        events += 1;
        if events % EVENTS_PER_FRAME == 0 || offset == to {
            engine.host_mut().advance(FRAME);
            if let Some(request) = engine.host_mut().take_frame() {
                engine.on_frame(request);
            }
            deliver_intersections(engine);
        }
    }
}

fn resize(engine: &mut Engine<HeadlessHost>, size: Size) {
    engine.host_mut().set_viewport(size);
    engine.on_resize();
    for timer in engine.host_mut().advance(Duration::from_millis(250)) {
        engine.on_timer(timer);
    }
}

fn main() -> io::Result<()> {
    // -- sinks -------------------------------------------------------------
    let recorder = Rc::new(RefCell::new(RecorderSink::new()));
    let pretty = PrettyPrintSink::stderr().with_scrolls(false);

    // -- page and engine ---------------------------------------------------
    let mut host = HeadlessHost::desktop();
    build_page(&mut host);
    let mut engine = Engine::new(host, EngineConfig::web());
    engine.set_trace_sink(Box::new(TeeSink::new(pretty, Rc::clone(&recorder))));

    // -- session -----------------------------------------------------------
    engine.init();
    deliver_intersections(&mut engine);

    scroll(&mut engine, 0.0, 2400.0);

    // Narrow window: motion turns off, reveals keep working.
    resize(&mut engine, Size::new(700.0, 900.0));
    scroll(&mut engine, 2400.0, 3400.0);

    resize(&mut engine, Size::new(1440.0, 900.0));
    scroll(&mut engine, 3400.0, 4200.0);
    scroll(&mut engine, 4200.0, 1000.0);

    engine.disable();
    scroll(&mut engine, 1000.0, 800.0);
    engine.enable();
    engine.refresh();
    engine.destroy();

    // -- export Chrome trace -----------------------------------------------
    let bytes = recorder.borrow().as_bytes().to_vec();
    let path = "scroll_trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    parallax_debug::chrome::export(&bytes, &mut writer)?;

    println!(
        "Wrote {path} ({} events, {} passes)",
        decode(&bytes).count(),
        engine.scheduler().passes(),
    );
    Ok(())
}

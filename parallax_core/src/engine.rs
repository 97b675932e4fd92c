// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine context and its control surface.
//!
//! [`Engine`] owns one [`Host`] and all engine state: the configuration, the
//! element [`Registry`], the [`VisibilityBridge`], the split ledger, the
//! [`FrameScheduler`] and the cached [`ViewportMetrics`]. There are no
//! process-wide singletons; two engines over two hosts are independent.
//!
//! # Control operations
//!
//! [`init`](Engine::init), [`refresh`](Engine::refresh),
//! [`enable`](Engine::enable), [`disable`](Engine::disable) and
//! [`destroy`](Engine::destroy).
//!
//! # Host callbacks
//!
//! [`on_scroll`](Engine::on_scroll), [`on_frame`](Engine::on_frame),
//! [`on_resize`](Engine::on_resize), [`on_timer`](Engine::on_timer) and
//! [`on_intersection`](Engine::on_intersection). Callbacks arriving before
//! `init` or after `destroy` are ignored.
//!
//! # Recompute pass
//!
//! A pass walks the four catalogs with the latest scroll offset and the cached
//! viewport size and writes each entry's channels. It never queries layout.
//! Passes run from coalesced scroll frames and immediately at the end of
//! `init`, `refresh`, `enable` and an enabling resize.

use alloc::boxed::Box;

use crate::channel::{
    CHAR_OPACITY, CHAR_TRANSFORM, DRIVE_CHANNELS, DRIVE_OPACITY, DRIVE_ROTATE, DRIVE_X,
    PARALLAX_OFFSET, SCROLL_OFFSET, char_transform,
};
use crate::config::EngineConfig;
use crate::host::{FrameRequest, Host, IntersectionEntry, ObserverId, Signal, TimerId};
use crate::motion::{
    FrameInput, Motion, MotionKind, center_distance, char_motion, drive_slide,
    effective_distance, scroll_parallax, simple_parallax,
};
use crate::registry::Registry;
use crate::scheduler::{FrameScheduler, ScrollDecision};
use crate::split::SplitLedger;
use crate::trace::{
    CollectEvent, FramePassEvent, LifecycleEvent, LifecycleOp, PassTrigger, ResizeEvent,
    RevealEvent, RevealPhase, ScrollEvent, TraceSink, Tracer,
};
use crate::viewport::{ViewportMetrics, motion_allowed};
use crate::visibility::{RevealKind, RevealOutcome, VisibilityBridge};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Running,
    Destroyed,
}

/// Counts produced by one recompute pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Entries whose channels were written.
    pub written: u32,
    /// Entries skipped by a guard band.
    pub skipped: u32,
}

/// Scroll-driven motion and visibility reveals over one host.
#[derive(Debug)]
pub struct Engine<H: Host> {
    host: H,
    config: EngineConfig,
    registry: Registry<H::Node>,
    bridge: VisibilityBridge<H::Node>,
    ledger: SplitLedger<H::Node>,
    scheduler: FrameScheduler,
    metrics: ViewportMetrics,
    lifecycle: Lifecycle,
    forced: Option<bool>,
    channels_written: bool,
    pass_index: u64,
    tracer: Tracer,
}

impl<H: Host> Engine<H> {
    /// Creates an idle engine. Nothing touches the host until
    /// [`init`](Self::init).
    pub fn new(host: H, config: EngineConfig) -> Self {
        Self {
            host,
            config,
            registry: Registry::new(),
            bridge: VisibilityBridge::new(),
            ledger: SplitLedger::default(),
            scheduler: FrameScheduler::new(),
            metrics: ViewportMetrics::default(),
            lifecycle: Lifecycle::Idle,
            forced: None,
            channels_written: false,
            pass_index: 0,
            tracer: Tracer::none(),
        }
    }

    /// Routes diagnostics to `sink`. Without the `trace` feature the sink is
    /// dropped.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably. Tests use this to move the viewport or edit the
    /// document between callbacks.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consumes the engine and returns the host.
    pub fn into_host(self) -> H {
        self.host
    }

    /// The configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The element registry.
    pub fn registry(&self) -> &Registry<H::Node> {
        &self.registry
    }

    /// The reveal state.
    pub fn bridge(&self) -> &VisibilityBridge<H::Node> {
        &self.bridge
    }

    /// The frame scheduler.
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// The cached viewport metrics.
    pub fn metrics(&self) -> &ViewportMetrics {
        &self.metrics
    }

    /// Whether scroll-driven motion is currently running.
    pub fn is_enabled(&self) -> bool {
        self.scheduler.is_enabled()
    }

    /// Whether the engine is between `init` and `destroy`.
    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    // -- control surface ---------------------------------------------------

    /// Starts the engine.
    ///
    /// Reads the viewport, attaches the resize listener and starts the
    /// visibility reveals. If the environment allows motion (or
    /// [`enable`](Self::enable) forced it), collects the registry, runs one
    /// pass and attaches the scroll listener.
    ///
    /// A no-op on a running engine. After [`destroy`](Self::destroy) the
    /// engine starts from scratch.
    pub fn init(&mut self) {
        match self.lifecycle {
            Lifecycle::Running => return,
            Lifecycle::Destroyed => self.reset(),
            Lifecycle::Idle => {}
        }
        self.lifecycle = Lifecycle::Running;
        self.read_viewport();
        self.host.listen(Signal::Resize, true);
        self.start_reveals();
        if self.motion_wanted() {
            self.activate(PassTrigger::Init);
        }
        self.trace_lifecycle(LifecycleOp::Init);
    }

    /// Rebuilds the registry from the current document, picks up new reveal
    /// elements and runs one pass if motion is enabled.
    pub fn refresh(&mut self) {
        if !self.is_running() {
            return;
        }
        self.read_viewport();
        // Entries may leave the registry; the pass below rewrites survivors.
        self.clear_channels();
        if self.is_enabled() {
            self.collect();
        } else {
            self.registry.clear();
        }
        self.start_reveals();
        if self.is_enabled() {
            self.run_pass(PassTrigger::Refresh);
        }
        self.trace_lifecycle(LifecycleOp::Refresh);
    }

    /// Forces motion on. The override survives later resizes.
    pub fn enable(&mut self) {
        self.forced = Some(true);
        if self.is_running() {
            self.activate(PassTrigger::Enable);
            self.trace_lifecycle(LifecycleOp::Enable);
        }
    }

    /// Forces motion off. The override survives later resizes.
    ///
    /// Removes every written channel, cancels a pending frame and detaches
    /// the scroll listener. The registry is kept, so [`enable`](Self::enable)
    /// restores the same output without a refresh.
    pub fn disable(&mut self) {
        self.forced = Some(false);
        if self.is_running() {
            self.deactivate();
            self.trace_lifecycle(LifecycleOp::Disable);
        }
    }

    /// Stops everything: clears channels, detaches both listeners, cancels
    /// the pending frame and resize timer, disconnects the observers and
    /// empties the registry. Idempotent.
    pub fn destroy(&mut self) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        self.deactivate();
        if let Some(timer) = self.scheduler.cancel_resize() {
            self.host.cancel_timer(timer);
        }
        self.host.listen(Signal::Resize, false);
        self.bridge.stop(&mut self.host);
        self.registry.clear();
        self.lifecycle = Lifecycle::Destroyed;
        self.trace_lifecycle(LifecycleOp::Destroy);
    }

    // -- host callbacks ----------------------------------------------------

    /// Handles a scroll notification carrying the new offset.
    pub fn on_scroll(&mut self, offset: f64) -> ScrollDecision {
        if !self.is_running() {
            return ScrollDecision::Ignored;
        }
        let decision = self.scheduler.notify_scroll(offset);
        if decision == ScrollDecision::RequestFrame {
            let request = self.host.request_frame();
            self.scheduler.frame_requested(request);
        }
        let event = ScrollEvent {
            timestamp: self.host.now(),
            offset,
            decision,
        };
        self.tracer.scroll(&event);
        decision
    }

    /// Handles a frame callback. Returns the pass counts, or `None` if the
    /// callback was stale.
    pub fn on_frame(&mut self, request: FrameRequest) -> Option<PassStats> {
        let offset = self.scheduler.begin_pass(request)?;
        if !self.is_running() {
            return None;
        }
        self.metrics.set_scroll_offset(offset);
        Some(self.run_pass(PassTrigger::Frame))
    }

    /// Handles a resize notification by restarting the quiet-period timer.
    pub fn on_resize(&mut self) {
        if !self.is_running() {
            return;
        }
        if let Some(previous) = self.scheduler.notify_resize() {
            self.host.cancel_timer(previous);
        }
        let timer = self.host.start_timer(self.config.resize_quiet);
        self.scheduler.resize_timer_started(timer);
    }

    /// Handles a timer callback. Returns `true` if it was the live resize
    /// timer and the viewport was re-evaluated.
    pub fn on_timer(&mut self, timer: TimerId) -> bool {
        if !self.scheduler.resize_timer_fired(timer) || !self.is_running() {
            return false;
        }
        self.read_viewport();
        let remeasured = self
            .registry
            .remeasure(&self.host, self.metrics.scroll_offset());
        let was_enabled = self.is_enabled();
        let wanted = self.motion_wanted();
        match (was_enabled, wanted) {
            (true, false) => self.deactivate(),
            (false, true) => self.activate(PassTrigger::Resize),
            (true, true) => {
                self.run_pass(PassTrigger::Resize);
            }
            (false, false) => {}
        }
        let event = ResizeEvent {
            timestamp: self.host.now(),
            viewport: self.metrics.size(),
            remeasured,
            was_enabled,
            enabled: self.is_enabled(),
        };
        self.tracer.resize(&event);
        true
    }

    /// Delivers intersection changes for observer `id`.
    pub fn on_intersection(
        &mut self,
        id: ObserverId,
        entries: &[IntersectionEntry<H::Node>],
    ) -> Option<RevealOutcome> {
        if !self.is_running() {
            return None;
        }
        let outcome = self
            .bridge
            .on_intersection(&mut self.host, &self.config, id, entries)?;
        if outcome.triggered > 0 {
            self.trace_reveal(outcome.kind, RevealPhase::Trigger, outcome.triggered);
        }
        Some(outcome)
    }

    // -- internals ---------------------------------------------------------

    fn reset(&mut self) {
        self.registry.clear();
        self.bridge = VisibilityBridge::new();
        self.scheduler = FrameScheduler::new();
        self.forced = None;
        self.channels_written = false;
    }

    fn read_viewport(&mut self) {
        self.metrics = ViewportMetrics::new(self.host.scroll_offset(), self.host.viewport_size());
        self.scheduler.set_latest_offset(self.metrics.scroll_offset());
    }

    fn motion_wanted(&self) -> bool {
        self.forced.unwrap_or_else(|| {
            motion_allowed(
                self.metrics.width(),
                &self.host.capabilities(),
                self.config.mobile_breakpoint,
            )
        })
    }

    fn activate(&mut self, trigger: PassTrigger) {
        self.scheduler.set_enabled(true);
        if !self.registry.is_collected() {
            self.collect();
        }
        self.host.listen(Signal::Scroll, true);
        self.run_pass(trigger);
    }

    fn deactivate(&mut self) {
        self.scheduler.set_enabled(false);
        if let Some(request) = self.scheduler.cancel_frame() {
            self.host.cancel_frame(request);
        }
        self.host.listen(Signal::Scroll, false);
        self.clear_channels();
    }

    fn collect(&mut self) {
        let counts = self.registry.collect_all(
            &mut self.host,
            &self.config,
            self.metrics.scroll_offset(),
            &mut self.ledger,
        );
        let timestamp = self.host.now();
        for (kind, count) in MotionKind::ALL.into_iter().zip(counts) {
            self.tracer.collect(&CollectEvent {
                timestamp,
                kind,
                count,
            });
        }
    }

    fn start_reveals(&mut self) {
        let counts = self
            .bridge
            .start(&mut self.host, &self.config, &mut self.ledger);
        for (kind, count) in RevealKind::ALL.into_iter().zip(counts) {
            if count > 0 {
                self.trace_reveal(kind, RevealPhase::Observe, count);
            }
        }
    }

    fn run_pass(&mut self, trigger: PassTrigger) -> PassStats {
        let start = self.host.now();
        let input = FrameInput {
            scroll_offset: self.metrics.scroll_offset(),
            viewport: self.metrics.size(),
        };
        let host = &mut self.host;
        let mut stats = PassStats::default();

        for entry in self.registry.iter() {
            match &entry.motion {
                Motion::SimpleParallax { speed } => {
                    match simple_parallax(&input, &entry.baseline, *speed, self.config.parallax_guard) {
                        Some(offset) => {
                            host.set_style(&entry.node, PARALLAX_OFFSET.name, &PARALLAX_OFFSET.format(offset));
                            stats.written += 1;
                        }
                        None => stats.skipped += 1,
                    }
                }
                Motion::ScrollParallax { tier, direction } => {
                    match scroll_parallax(&input, &entry.baseline, *tier, *direction, self.config.scroll_guard) {
                        Some(offset) => {
                            host.set_style(&entry.node, SCROLL_OFFSET.name, &SCROLL_OFFSET.format(offset));
                            stats.written += 1;
                        }
                        None => stats.skipped += 1,
                    }
                }
                Motion::DriveSlide {
                    direction,
                    intensity,
                } => {
                    let out = drive_slide(&input, &entry.baseline, *direction, *intensity);
                    host.set_style(&entry.node, DRIVE_X.name, &DRIVE_X.format(out.offset_x));
                    host.set_style(&entry.node, DRIVE_ROTATE.name, &DRIVE_ROTATE.format(out.rotate_deg));
                    host.set_style(&entry.node, DRIVE_OPACITY.name, &DRIVE_OPACITY.format(out.opacity));
                    stats.written += 1;
                }
                Motion::CharDrive { chars } => {
                    let effective = effective_distance(center_distance(&input, &entry.baseline));
                    for (index, ch) in (0_u32..).zip(chars) {
                        let out = char_motion(effective, index);
                        host.set_style(
                            ch,
                            CHAR_TRANSFORM,
                            &char_transform(out.translate_x_percent, out.rotate_y_deg, out.scale),
                        );
                        host.set_style(ch, CHAR_OPACITY.name, &CHAR_OPACITY.format(out.opacity));
                    }
                    stats.written += 1;
                }
            }
        }

        if stats.written > 0 {
            self.channels_written = true;
        }
        let event = FramePassEvent {
            pass_index: self.pass_index,
            trigger,
            start,
            end: self.host.now(),
            scroll_offset: input.scroll_offset,
            written: stats.written,
            skipped: stats.skipped,
        };
        self.pass_index += 1;
        self.tracer.frame_pass(&event);
        stats
    }

    /// Removes every channel the passes may have written.
    fn clear_channels(&mut self) {
        if !self.channels_written {
            return;
        }
        let host = &mut self.host;
        for entry in self.registry.iter() {
            match &entry.motion {
                Motion::SimpleParallax { .. } => host.remove_style(&entry.node, PARALLAX_OFFSET.name),
                Motion::ScrollParallax { .. } => host.remove_style(&entry.node, SCROLL_OFFSET.name),
                Motion::DriveSlide { .. } => {
                    for channel in DRIVE_CHANNELS {
                        host.remove_style(&entry.node, channel.name);
                    }
                }
                Motion::CharDrive { chars } => {
                    for ch in chars {
                        host.remove_style(ch, CHAR_TRANSFORM);
                        host.remove_style(ch, CHAR_OPACITY.name);
                    }
                }
            }
        }
        self.channels_written = false;
    }

    fn trace_lifecycle(&mut self, op: LifecycleOp) {
        let event = LifecycleEvent {
            timestamp: self.host.now(),
            op,
            enabled: self.is_enabled(),
        };
        self.tracer.lifecycle(&event);
    }

    fn trace_reveal(&mut self, kind: RevealKind, phase: RevealPhase, count: usize) {
        let event = RevealEvent {
            timestamp: self.host.now(),
            kind,
            phase,
            count,
        };
        self.tracer.reveal(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessHost, HeadlessNode};
    use crate::host::{Document as _, EventLoop as _};
    use crate::time::Duration;
    use crate::viewport::Capabilities;
    use alloc::string::String;
    use alloc::vec::Vec;
    use kurbo::Size;

    fn parallax(host: &mut HeadlessHost, speed: &str, top: f64, height: f64) -> HeadlessNode {
        let body = host.body();
        let el = host.append(body, "div");
        host.set_attribute(&el, "data-parallax", speed);
        host.set_layout(&el, top, height);
        el
    }

    fn style(engine: &Engine<HeadlessHost>, node: &HeadlessNode, property: &str) -> Option<String> {
        engine.host().style(node, property).map(String::from)
    }

    fn scroll_to(engine: &mut Engine<HeadlessHost>, offset: f64) -> ScrollDecision {
        engine.host_mut().set_scroll_offset(offset);
        engine.on_scroll(offset)
    }

    fn pump_frame(engine: &mut Engine<HeadlessHost>) -> Option<PassStats> {
        let request = engine.host_mut().take_frame()?;
        engine.on_frame(request)
    }

    fn resize(engine: &mut Engine<HeadlessHost>, size: Size) -> bool {
        engine.host_mut().set_viewport(size);
        engine.on_resize();
        let fired = engine.host_mut().advance(Duration::from_millis(200));
        fired.into_iter().any(|t| engine.on_timer(t))
    }

    #[test]
    fn init_on_desktop_writes_immediately() {
        let mut host = HeadlessHost::desktop();
        let el = parallax(&mut host, "", 500.0, 100.0);
        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();

        assert!(engine.is_enabled());
        assert!(engine.host().is_listening(Signal::Scroll));
        assert!(engine.host().is_listening(Signal::Resize));
        // center offset 500 - 400 + 50 = 150; 150 × 0.3 × -0.5
        assert_eq!(style(&engine, &el, "--parallax-offset").as_deref(), Some("-22.5px"));
    }

    #[test]
    fn mobile_touch_and_reduced_motion_disable_motion_but_not_reveals() {
        let narrow = HeadlessHost::new(Size::new(768.0, 1000.0), Capabilities::DESKTOP);
        let mut touch = HeadlessHost::desktop();
        touch.set_capabilities(Capabilities {
            max_touch_points: Some(5),
            ..Capabilities::DESKTOP
        });
        let mut reduced = HeadlessHost::desktop();
        reduced.set_capabilities(Capabilities {
            prefers_reduced_motion: Some(true),
            ..Capabilities::DESKTOP
        });
        let mut unknown = HeadlessHost::desktop();
        unknown.set_capabilities(Capabilities {
            prefers_reduced_motion: None,
            ..Capabilities::DESKTOP
        });

        for mut host in [narrow, touch, reduced, unknown] {
            let el = parallax(&mut host, "0.5", 100.0, 100.0);
            let body = host.body();
            let card = host.append(body, "div");
            host.set_attribute(&card, "data-reveal", "");

            let mut engine = Engine::new(host, EngineConfig::web());
            engine.init();
            assert!(!engine.is_enabled());
            assert!(engine.registry().is_empty(), "nothing collected");
            assert_eq!(style(&engine, &el, "--parallax-offset"), None);
            assert!(!engine.host().is_listening(Signal::Scroll));
            assert!(engine.host().is_listening(Signal::Resize), "resize re-evaluates");
            assert_eq!(engine.host().observer_count(), 1, "reveals still run");
            assert_eq!(scroll_to(&mut engine, 300.0), ScrollDecision::Ignored);
            assert_eq!(engine.host().pending_frames(), 0);
        }
    }

    #[test]
    fn scroll_notifications_coalesce_into_one_pass() {
        let mut host = HeadlessHost::desktop();
        let el = parallax(&mut host, "1", 1000.0, 100.0);
        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();

        assert_eq!(scroll_to(&mut engine, 100.0), ScrollDecision::RequestFrame);
        for offset in [150.0, 200.0, 250.0, 300.0] {
            assert_eq!(scroll_to(&mut engine, offset), ScrollDecision::Coalesced);
        }
        assert_eq!(engine.host().pending_frames(), 1, "one frame for five notifications");

        let stats = pump_frame(&mut engine).unwrap();
        assert_eq!(stats.written, 1);
        assert_eq!(engine.scheduler().passes(), 1);
        // top 1000 - 300 = 700; 700 - 400 + 50 = 350; 350 × 1 × -0.5
        assert_eq!(style(&engine, &el, "--parallax-offset").as_deref(), Some("-175px"));
        assert_eq!(pump_frame(&mut engine), None, "nothing left pending");
    }

    #[test]
    fn guard_band_excludes_far_elements() {
        let mut host = HeadlessHost::desktop();
        let far = parallax(&mut host, "0.3", 1100.0, 100.0);
        let near = parallax(&mut host, "0.3", 900.0, 100.0);
        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();

        assert_eq!(style(&engine, &far, "--parallax-offset"), None);
        assert!(style(&engine, &near, "--parallax-offset").is_some());
    }

    #[test]
    fn negative_scroll_is_treated_as_zero() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        let el = host.append(body, "div");
        host.set_attribute(&el, "data-scroll-parallax", "fast");
        host.set_layout(&el, 100.0, 100.0);
        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();

        scroll_to(&mut engine, -40.0);
        pump_frame(&mut engine);
        assert_eq!(style(&engine, &el, "--scroll-offset").as_deref(), Some("0px"));
    }

    #[test]
    fn disable_clears_every_channel_and_enable_restores_output() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        let simple = parallax(&mut host, "0.4", 300.0, 100.0);
        let continuous = host.append(body, "div");
        host.set_attribute(&continuous, "data-scroll-parallax", "slow");
        host.set_layout(&continuous, 600.0, 100.0);
        let drive = host.append(body, "div");
        host.set_attribute(&drive, "data-drive", "right");
        host.set_layout(&drive, 1500.0, 200.0);
        let heading = host.append(body, "h2");
        host.set_attribute(&heading, "data-char-drive", "");
        host.set_text(&heading, "Hey you");
        host.set_layout(&heading, 1700.0, 80.0);

        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();
        scroll_to(&mut engine, 250.0);
        pump_frame(&mut engine);

        let chars = engine
            .host()
            .query_within(&heading, &crate::registry::CHAR_SELECTOR);
        assert_eq!(chars.len(), 6);
        let snapshot = |engine: &Engine<HeadlessHost>| -> Vec<Option<String>> {
            let mut values = Vec::new();
            values.push(style(engine, &simple, "--parallax-offset"));
            values.push(style(engine, &continuous, "--scroll-offset"));
            for channel in DRIVE_CHANNELS {
                values.push(style(engine, &drive, channel.name));
            }
            for ch in &chars {
                values.push(style(engine, ch, "transform"));
                values.push(style(engine, ch, "opacity"));
            }
            values
        };
        let before = snapshot(&engine);
        assert!(before.iter().all(Option::is_some));

        engine.disable();
        assert!(!engine.is_enabled());
        assert!(snapshot(&engine).iter().all(Option::is_none), "removed entirely");
        assert_eq!(engine.registry().len(), 4, "registry kept");

        engine.enable();
        assert_eq!(snapshot(&engine), before, "same output without refresh");
        // 250 × 0.05
        assert_eq!(style(&engine, &continuous, "--scroll-offset").as_deref(), Some("12.5px"));

        engine.destroy();
        assert!(snapshot(&engine).iter().all(Option::is_none), "destroy clears too");
    }

    #[test]
    fn refresh_removes_channels_of_elements_that_lost_their_marker() {
        let mut host = HeadlessHost::desktop();
        let dropped = parallax(&mut host, "", 500.0, 100.0);
        let kept = parallax(&mut host, "0.3", 500.0, 100.0);
        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();
        assert_eq!(style(&engine, &dropped, "--parallax-offset").as_deref(), Some("-22.5px"));

        engine.host_mut().remove_attribute(&dropped, "data-parallax");
        engine.refresh();
        assert_eq!(engine.registry().len(), 1);
        assert_eq!(style(&engine, &dropped, "--parallax-offset"), None, "no stale offset");
        assert_eq!(style(&engine, &kept, "--parallax-offset").as_deref(), Some("-22.5px"));

        engine.disable();
        assert_eq!(style(&engine, &dropped, "--parallax-offset"), None);
        assert_eq!(style(&engine, &kept, "--parallax-offset"), None);
    }

    #[test]
    fn disable_cancels_the_pending_frame() {
        let mut host = HeadlessHost::desktop();
        parallax(&mut host, "0.3", 400.0, 100.0);
        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();

        scroll_to(&mut engine, 50.0);
        assert_eq!(engine.host().pending_frames(), 1);
        engine.disable();
        assert_eq!(engine.host().pending_frames(), 0);
        assert!(!engine.host().is_listening(Signal::Scroll));
        assert_eq!(engine.on_frame(FrameRequest(1)), None, "late callback ignored");
    }

    #[test]
    fn per_character_stagger_saturates() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        let heading = host.append(body, "h1");
        host.set_attribute(&heading, "data-char-drive", "");
        host.set_text(&heading, "abcdefghijklmnopqrst");
        // Center at 1200: two half-viewports below center, effective distance 1.
        host.set_layout(&heading, 1150.0, 100.0);

        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();
        let chars = engine
            .host()
            .query_within(&heading, &crate::registry::CHAR_SELECTOR);
        assert_eq!(chars.len(), 20);
        let last = &chars[19];
        assert_eq!(
            style(&engine, last, "transform").as_deref(),
            Some("translateX(-80%) rotateY(12deg) scale(0.85)")
        );
        assert_eq!(style(&engine, last, "opacity").as_deref(), Some("0.6"));
    }

    #[test]
    fn resize_is_debounced_and_reevaluates_environment() {
        let mut host = HeadlessHost::desktop();
        let el = parallax(&mut host, "0.3", 500.0, 100.0);
        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();

        // A burst of resizes leaves exactly one live timer.
        for _ in 0..3 {
            engine.on_resize();
            assert!(engine.host_mut().advance(Duration::from_millis(50)).is_empty());
        }
        assert_eq!(engine.host().pending_timers(), 1);

        assert!(resize(&mut engine, Size::new(600.0, 900.0)), "narrow now");
        assert!(!engine.is_enabled());
        assert_eq!(style(&engine, &el, "--parallax-offset"), None);
        assert!(!engine.host().is_listening(Signal::Scroll));

        assert!(resize(&mut engine, Size::new(1400.0, 900.0)));
        assert!(engine.is_enabled(), "wide again");
        // center offset 500 - 450 + 50 = 100; 100 × 0.3 × -0.5
        assert_eq!(style(&engine, &el, "--parallax-offset").as_deref(), Some("-15px"));
    }

    #[test]
    fn forced_state_survives_resize() {
        let mut host = HeadlessHost::desktop();
        parallax(&mut host, "0.3", 500.0, 100.0);
        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();

        engine.disable();
        resize(&mut engine, Size::new(1600.0, 900.0));
        assert!(!engine.is_enabled(), "disable is sticky");

        let mut host = HeadlessHost::new(Size::new(400.0, 800.0), Capabilities::DESKTOP);
        let el = parallax(&mut host, "0.3", 500.0, 100.0);
        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();
        engine.enable();
        assert!(engine.is_enabled(), "forced on a narrow viewport");
        assert!(style(&engine, &el, "--parallax-offset").is_some());
        resize(&mut engine, Size::new(390.0, 800.0));
        assert!(engine.is_enabled(), "enable is sticky");
    }

    #[test]
    fn init_twice_is_a_noop() {
        let mut host = HeadlessHost::desktop();
        parallax(&mut host, "0.3", 500.0, 100.0);
        let body = host.body();
        let card = host.append(body, "div");
        host.set_attribute(&card, "data-reveal", "");
        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();
        let writes = engine.host().style_writes();

        engine.init();
        assert_eq!(engine.host().style_writes(), writes, "no second pass");
        assert_eq!(engine.host().observer_count(), 1);
        assert_eq!(engine.registry().len(), 1);
    }

    #[test]
    fn refresh_picks_up_new_elements() {
        let mut host = HeadlessHost::desktop();
        parallax(&mut host, "0.3", 500.0, 100.0);
        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();

        let late = parallax(engine.host_mut(), "0.3", 300.0, 100.0);
        let body = engine.host().body();
        let card = engine.host_mut().append(body, "div");
        engine.host_mut().set_attribute(&card, "data-reveal", "");
        engine.refresh();

        assert_eq!(engine.registry().entries(MotionKind::SimpleParallax).len(), 2);
        assert!(style(&engine, &late, "--parallax-offset").is_some());
        let id = engine.bridge().observer(RevealKind::Reveal).unwrap();
        assert!(engine.host().is_observing(id, &card));
    }

    #[test]
    fn reveals_route_through_the_engine() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        let card = host.append(body, "div");
        host.set_attribute(&card, "data-reveal", "");
        host.set_layout(&card, 1200.0, 200.0);
        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();
        let id = engine.bridge().observer(RevealKind::Reveal).unwrap();

        let entries = engine.host().intersections(id);
        let outcome = engine.on_intersection(id, &entries).unwrap();
        assert_eq!(outcome.triggered, 0, "below the fold");

        engine.host_mut().set_scroll_offset(600.0);
        let entries = engine.host().intersections(id);
        let outcome = engine.on_intersection(id, &entries).unwrap();
        assert_eq!(outcome.triggered, 1);
        assert!(engine.host().has_class(&card, "is-visible"));
    }

    #[test]
    fn destroy_releases_everything_and_is_idempotent() {
        let mut host = HeadlessHost::desktop();
        let el = parallax(&mut host, "0.3", 500.0, 100.0);
        let body = host.body();
        let card = host.append(body, "div");
        host.set_attribute(&card, "data-reveal", "");
        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();
        scroll_to(&mut engine, 30.0);
        engine.on_resize();

        engine.destroy();
        engine.destroy();
        let host = engine.host();
        assert!(!host.is_listening(Signal::Scroll));
        assert!(!host.is_listening(Signal::Resize));
        assert_eq!(host.pending_frames(), 0);
        assert_eq!(host.pending_timers(), 0);
        assert_eq!(host.observer_count(), 0);
        assert_eq!(host.style(&el, "--parallax-offset"), None);
        assert!(engine.registry().is_empty());
        assert_eq!(engine.on_scroll(60.0), ScrollDecision::Ignored);
        assert_eq!(engine.on_frame(FrameRequest(1)), None);
    }

    #[test]
    fn init_after_destroy_starts_fresh() {
        let mut host = HeadlessHost::desktop();
        let el = parallax(&mut host, "0.3", 500.0, 100.0);
        let mut engine = Engine::new(host, EngineConfig::web());
        engine.init();
        engine.disable();
        engine.destroy();

        engine.init();
        assert!(engine.is_running());
        assert!(engine.is_enabled(), "override forgotten");
        assert_eq!(engine.registry().len(), 1);
        assert!(style(&engine, &el, "--parallax-offset").is_some());
    }

    #[test]
    fn callbacks_before_init_are_ignored() {
        let mut host = HeadlessHost::desktop();
        parallax(&mut host, "0.3", 500.0, 100.0);
        let mut engine = Engine::new(host, EngineConfig::web());
        assert_eq!(engine.on_scroll(10.0), ScrollDecision::Ignored);
        engine.on_resize();
        assert_eq!(engine.host().pending_timers(), 0);
        assert_eq!(engine.host().now().ticks(), 0);
    }
}

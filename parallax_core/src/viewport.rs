// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cached viewport metrics and host capability signals.
//!
//! [`ViewportMetrics`] is the engine's cached view of the scroll offset and
//! viewport size. The size is refreshed only at init, refresh and by the
//! debounced resize handler; the scroll offset is refreshed by scroll
//! notifications. Frames never query the host, so the per-frame cost does not
//! depend on how expensive host queries are.
//!
//! [`Capabilities`] carries the signals that decide whether scroll-driven
//! motion should run at all.

use kurbo::Size;

/// Cached scroll offset and viewport size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportMetrics {
    scroll_offset: f64,
    size: Size,
}

impl ViewportMetrics {
    /// Creates metrics from a scroll offset and viewport size.
    ///
    /// Negative offsets (overscroll bounce) are clamped to zero.
    #[must_use]
    pub fn new(scroll_offset: f64, size: Size) -> Self {
        Self {
            scroll_offset: clamp_offset(scroll_offset),
            size,
        }
    }

    /// Vertical scroll distance from the top of the document, `>= 0`.
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Viewport width in CSS pixels.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.size.width
    }

    /// Viewport height in CSS pixels.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// Viewport size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Records a new scroll offset.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = clamp_offset(offset);
    }

    /// Records a new viewport size.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }
}

fn clamp_offset(offset: f64) -> f64 {
    if offset.is_finite() { offset.max(0.0) } else { 0.0 }
}

/// Host capability signals.
///
/// `None` means the host could not report the signal. An unknown touch signal
/// is treated as "no touch"; an unknown reduced-motion preference is treated
/// as "reduce motion", the conservative choice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether the host exposes touch events (`ontouchstart` or equivalent).
    pub touch_events: Option<bool>,
    /// Maximum simultaneous touch points reported by the host.
    pub max_touch_points: Option<u32>,
    /// Whether the user prefers reduced motion.
    pub prefers_reduced_motion: Option<bool>,
}

impl Capabilities {
    /// A desktop host with a pointer and no motion preference.
    pub const DESKTOP: Self = Self {
        touch_events: Some(false),
        max_touch_points: Some(0),
        prefers_reduced_motion: Some(false),
    };

    /// Returns `true` if any touch signal is present.
    #[must_use]
    pub fn has_touch(&self) -> bool {
        self.touch_events == Some(true) || self.max_touch_points.is_some_and(|n| n > 0)
    }

    /// Returns `true` if motion should be reduced.
    #[must_use]
    pub fn reduces_motion(&self) -> bool {
        self.prefers_reduced_motion.unwrap_or(true)
    }
}

/// Decides whether scroll-driven motion may run.
///
/// Motion is off on narrow viewports (at or below `mobile_breakpoint`), on
/// touch hosts, and when reduced motion is preferred.
#[must_use]
pub fn motion_allowed(viewport_width: f64, capabilities: &Capabilities, mobile_breakpoint: f64) -> bool {
    let mobile = viewport_width <= mobile_breakpoint || capabilities.has_touch();
    !mobile && !capabilities.reduces_motion()
}

// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Motion categories and their offset/transform formulas.
//!
//! Each registered element carries a [`Motion`], a tagged variant holding the
//! parameters of one of four categories. The formulas are pure functions of
//! a [`FrameInput`] (cached scroll offset and viewport size) and the
//! element's cached [`Baseline`]; the engine dispatches on the variant once per
//! entry per frame and writes the results to the
//! [channels](crate::channel).
//!
//! All arithmetic is `f64` and no rounding is applied.

use alloc::vec::Vec;

use kurbo::Size;

/// Half-width of the central band in which drive effects are at rest.
pub const DEAD_ZONE: f64 = 0.8;

/// Normalized distance at which the drive ramp saturates.
pub const RAMP_END: f64 = 2.0;

/// Default simple-parallax speed when the marker carries no usable value.
pub const DEFAULT_SPEED: f64 = 0.3;

/// Per-character stagger added to the effective distance, per index.
pub const CHAR_STAGGER: f64 = 0.015;

/// Inputs shared by every calculator during one pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
    /// Latest recorded scroll offset.
    pub scroll_offset: f64,
    /// Cached viewport size.
    pub viewport: Size,
}

/// Cached layout of an element in document space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Baseline {
    /// Absolute top: bounding-rect top plus scroll offset at measurement time.
    pub top: f64,
    /// Bounding height at measurement time.
    pub height: f64,
}

impl Baseline {
    /// Top edge relative to the viewport for the given scroll offset.
    #[must_use]
    pub fn viewport_top(&self, scroll_offset: f64) -> f64 {
        self.top - scroll_offset
    }

    /// Returns `true` if the element overlaps the closed band
    /// `[-guard, viewport height + guard]`. Touching an edge counts.
    #[must_use]
    pub fn within_guard_band(&self, input: &FrameInput, guard: f64) -> bool {
        let top = self.viewport_top(input.scroll_offset);
        top <= input.viewport.height + guard && top + self.height >= -guard
    }
}

/// Discrete speed tiers for continuous scroll parallax.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpeedTier {
    /// Multiplier 0.05.
    Slow,
    /// Multiplier 0.1.
    #[default]
    Medium,
    /// Multiplier 0.15.
    Fast,
}

impl SpeedTier {
    /// Parses a marker value; anything unrecognized is [`Medium`](Self::Medium).
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("slow") => Self::Slow,
            Some("fast") => Self::Fast,
            _ => Self::Medium,
        }
    }

    /// The scroll multiplier for this tier.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Slow => 0.05,
            Self::Medium => 0.1,
            Self::Fast => 0.15,
        }
    }
}

/// Direction sign for continuous scroll parallax.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    /// Moves with the scroll (`+1`).
    #[default]
    Normal,
    /// Moves against the scroll (`-1`).
    Reverse,
}

impl ScrollDirection {
    /// Parses a marker value; only `reverse` flips the sign.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("reverse") => Self::Reverse,
            _ => Self::Normal,
        }
    }

    /// `+1.0` or `-1.0`.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Normal => 1.0,
            Self::Reverse => -1.0,
        }
    }
}

/// Slide direction for the drive category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DriveDirection {
    /// Slides and tilts toward negative x.
    Left,
    /// Slides and tilts toward positive x.
    #[default]
    Right,
}

impl DriveDirection {
    /// Parses a marker value; anything but `left` drives right.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("left") => Self::Left,
            _ => Self::Right,
        }
    }

    /// `-1.0` for left, `+1.0` for right.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Identifies a motion category without its parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionKind {
    /// Offset relative to viewport center.
    SimpleParallax,
    /// Offset proportional to absolute scroll.
    ScrollParallax,
    /// Dead-zone slide, tilt and fade.
    DriveSlide,
    /// Dead-zone motion applied per character.
    CharDrive,
}

impl MotionKind {
    /// All categories in processing order.
    pub const ALL: [Self; 4] = [
        Self::SimpleParallax,
        Self::ScrollParallax,
        Self::DriveSlide,
        Self::CharDrive,
    ];

    /// Short label for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SimpleParallax => "parallax",
            Self::ScrollParallax => "scroll-parallax",
            Self::DriveSlide => "drive",
            Self::CharDrive => "char-drive",
        }
    }
}

/// Category parameters of a registered element.
#[derive(Clone, Debug, PartialEq)]
pub enum Motion<N> {
    /// Offset relative to viewport center, scaled by `speed`.
    SimpleParallax {
        /// Speed factor (default [`DEFAULT_SPEED`]).
        speed: f64,
    },
    /// Offset proportional to absolute scroll.
    ScrollParallax {
        /// Speed tier.
        tier: SpeedTier,
        /// Direction sign.
        direction: ScrollDirection,
    },
    /// Dead-zone slide.
    DriveSlide {
        /// Slide direction.
        direction: DriveDirection,
        /// Horizontal travel scale.
        intensity: f64,
    },
    /// Dead-zone motion per character.
    CharDrive {
        /// Non-space character nodes in reading order.
        chars: Vec<N>,
    },
}

impl<N> Motion<N> {
    /// The category of this motion.
    #[must_use]
    pub fn kind(&self) -> MotionKind {
        match self {
            Self::SimpleParallax { .. } => MotionKind::SimpleParallax,
            Self::ScrollParallax { .. } => MotionKind::ScrollParallax,
            Self::DriveSlide { .. } => MotionKind::DriveSlide,
            Self::CharDrive { .. } => MotionKind::CharDrive,
        }
    }
}

/// Parses a simple-parallax speed, falling back to [`DEFAULT_SPEED`].
#[must_use]
pub fn parse_speed(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(DEFAULT_SPEED)
}

/// Parses a drive intensity, falling back to `1.0`.
#[must_use]
pub fn parse_intensity(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(1.0)
}

/// Simple parallax offset, or `None` outside the guard band.
#[must_use]
pub fn simple_parallax(input: &FrameInput, baseline: &Baseline, speed: f64, guard: f64) -> Option<f64> {
    if !baseline.within_guard_band(input, guard) {
        return None;
    }
    let top = baseline.viewport_top(input.scroll_offset);
    let center_offset = top - input.viewport.height / 2.0 + baseline.height / 2.0;
    Some(center_offset * speed * -0.5)
}

/// Continuous scroll parallax offset, or `None` outside the guard band.
#[must_use]
pub fn scroll_parallax(
    input: &FrameInput,
    baseline: &Baseline,
    tier: SpeedTier,
    direction: ScrollDirection,
    guard: f64,
) -> Option<f64> {
    if !baseline.within_guard_band(input, guard) {
        return None;
    }
    Some(input.scroll_offset * tier.multiplier() * direction.sign())
}

/// Signed distance of the element center from the viewport center, in units
/// of half the viewport height. Nominally in `[-1, 1]`; exceeds it near
/// document edges.
#[must_use]
pub fn center_distance(input: &FrameInput, baseline: &Baseline) -> f64 {
    let half = input.viewport.height / 2.0;
    let element_center = baseline.viewport_top(input.scroll_offset) + baseline.height / 2.0;
    (element_center - half) / half
}

/// Maps a center distance through the dead zone onto a clamped ramp.
///
/// Zero for `|d| <= DEAD_ZONE`; beyond it rises linearly, reaching exactly
/// `±1` at `|d| = RAMP_END` and staying there.
#[must_use]
pub fn effective_distance(distance: f64) -> f64 {
    let magnitude = abs(distance);
    if magnitude <= DEAD_ZONE {
        return 0.0;
    }
    let ramp = ((magnitude - DEAD_ZONE) / (RAMP_END - DEAD_ZONE)).min(1.0);
    ramp * sign(distance)
}

/// Drive-slide outputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriveOutput {
    /// Horizontal offset in pixels.
    pub offset_x: f64,
    /// Rotation in degrees.
    pub rotate_deg: f64,
    /// Opacity, never below 0.5.
    pub opacity: f64,
}

/// Computes the drive-slide outputs for one element.
#[must_use]
pub fn drive_slide(
    input: &FrameInput,
    baseline: &Baseline,
    direction: DriveDirection,
    intensity: f64,
) -> DriveOutput {
    let effective = effective_distance(center_distance(input, baseline));
    let dir = direction.sign();
    DriveOutput {
        offset_x: effective * (input.viewport.width * 0.4 * intensity) * dir,
        rotate_deg: effective * 3.0 * dir,
        opacity: (1.0 - abs(effective) * 0.15).max(0.5),
    }
}

/// Per-character outputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharOutput {
    /// Horizontal translation in percent of the character width.
    pub translate_x_percent: f64,
    /// Rotation about the y axis in degrees.
    pub rotate_y_deg: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Opacity, never below 0.3.
    pub opacity: f64,
}

/// Computes the outputs for the non-space character at `index` given the
/// element's effective distance.
#[must_use]
pub fn char_motion(effective: f64, index: u32) -> CharOutput {
    let stagger = f64::from(index) * CHAR_STAGGER;
    let offset = if effective == 0.0 {
        0.0
    } else {
        stagger * sign(effective)
    };
    let c = (effective + offset).clamp(-1.0, 1.0);
    CharOutput {
        translate_x_percent: c * -80.0,
        rotate_y_deg: c * 12.0,
        scale: 1.0 - abs(c) * 0.15,
        opacity: (1.0 - abs(c) * 0.4).max(0.3),
    }
}

fn abs(x: f64) -> f64 {
    if x < 0.0 { -x } else { x }
}

fn sign(x: f64) -> f64 {
    if x < 0.0 { -1.0 } else { 1.0 }
}

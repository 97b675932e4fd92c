// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style-variable channels written by the engine.
//!
//! Every motion category writes its results to named per-element channels.
//! Most channels are CSS custom properties consumed by presentation rules
//! outside this crate; the per-character category writes the `transform` and
//! `opacity` properties of each character directly, since every character
//! needs an independent value.
//!
//! # Clearing
//!
//! Disabling the engine removes every channel it may have written. Removal
//! (rather than writing a neutral value) lets the stylesheet's own defaults
//! apply again, so no transform persists after disabling.

use alloc::format;
use alloc::string::String;

/// The unit a channel value is rendered with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    /// CSS pixels.
    Px,
    /// Degrees.
    Deg,
    /// Unitless number.
    Number,
}

/// A named, per-element output written by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Channel {
    /// The style property name.
    pub name: &'static str,
    /// Unit appended when rendering a value.
    pub unit: Unit,
}

impl Channel {
    /// Creates a channel descriptor.
    #[must_use]
    pub const fn new(name: &'static str, unit: Unit) -> Self {
        Self { name, unit }
    }

    /// Renders `value` for this channel without rounding.
    #[must_use]
    pub fn format(self, value: f64) -> String {
        match self.unit {
            Unit::Px => format!("{value}px"),
            Unit::Deg => format!("{value}deg"),
            Unit::Number => format!("{value}"),
        }
    }
}

/// Simple parallax: element offset relative to viewport center.
pub const PARALLAX_OFFSET: Channel = Channel::new("--parallax-offset", Unit::Px);

/// Continuous scroll parallax: offset proportional to absolute scroll.
pub const SCROLL_OFFSET: Channel = Channel::new("--scroll-offset", Unit::Px);

/// Drive slide: horizontal offset.
pub const DRIVE_X: Channel = Channel::new("--drive-x", Unit::Px);

/// Drive slide: rotation.
pub const DRIVE_ROTATE: Channel = Channel::new("--drive-rotate", Unit::Deg);

/// Drive slide: opacity.
pub const DRIVE_OPACITY: Channel = Channel::new("--drive-opacity", Unit::Number);

/// Per-character drive: composed transform, written on each character.
pub const CHAR_TRANSFORM: &str = "transform";

/// Per-character drive: opacity, written on each character.
pub const CHAR_OPACITY: Channel = Channel::new("opacity", Unit::Number);

/// All channels written by the drive-slide category.
pub const DRIVE_CHANNELS: [Channel; 3] = [DRIVE_X, DRIVE_ROTATE, DRIVE_OPACITY];

/// Renders the composed per-character transform.
#[must_use]
pub fn char_transform(translate_x_percent: f64, rotate_y_deg: f64, scale: f64) -> String {
    format!("translateX({translate_x_percent}%) rotateY({rotate_y_deg}deg) scale({scale})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_render_unrounded_with_units() {
        assert_eq!(PARALLAX_OFFSET.format(-12.5), "-12.5px");
        assert_eq!(DRIVE_ROTATE.format(1.25), "1.25deg");
        assert_eq!(DRIVE_OPACITY.format(0.9625), "0.9625");
        assert_eq!(CHAR_OPACITY.format(0.6), "0.6");
    }

    #[test]
    fn char_transform_composes_in_order() {
        assert_eq!(
            char_transform(-80.0, 12.0, 0.85),
            "translateX(-80%) rotateY(12deg) scale(0.85)"
        );
    }
}

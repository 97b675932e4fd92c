// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.
//!
//! [`EngineConfig::web`] holds the defaults used in the browser. Every field
//! is public so pages with a different markup vocabulary or breakpoints can
//! start from the preset and override what they need.

use crate::host::{ObserverOptions, Selector};
use crate::split::SplitMode;
use crate::time::Duration;
use crate::visibility::RevealKind;

/// Marker attributes for the four motion categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionMarkers {
    /// Simple parallax; the value is the speed.
    pub parallax: &'static str,
    /// Continuous scroll parallax; the value is `slow`, `medium` or `fast`.
    pub scroll_parallax: &'static str,
    /// Optional companion of `scroll_parallax`; `reverse` flips direction.
    pub scroll_direction: &'static str,
    /// Drive slide; the value is `left` or `right`.
    pub drive: &'static str,
    /// Optional companion of `drive`; the value scales horizontal travel.
    pub drive_intensity: &'static str,
    /// Per-character drive.
    pub char_drive: &'static str,
}

impl MotionMarkers {
    /// The default `data-*` vocabulary.
    pub const DEFAULT: Self = Self {
        parallax: "data-parallax",
        scroll_parallax: "data-scroll-parallax",
        scroll_direction: "data-scroll-direction",
        drive: "data-drive",
        drive_intensity: "data-drive-intensity",
        char_drive: "data-char-drive",
    };
}

/// Configuration of one reveal category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealConfig {
    /// Which elements belong to the category.
    pub selector: Selector,
    /// Intersection observer threshold and margin.
    pub options: ObserverOptions,
    /// Class added when the element intersects.
    pub class: &'static str,
    /// Persistent categories keep observing after the first trigger.
    pub persistent: bool,
    /// Text preprocessing applied before observation.
    pub split: Option<SplitMode>,
}

/// Bottom margin that makes reveals fire slightly after the element enters.
const REVEAL_MARGIN: &str = "0px 0px -50px 0px";

/// Configuration of the six reveal categories.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealSet {
    /// Single fade-in.
    pub reveal: RevealConfig,
    /// Group fade-in with CSS-staggered children.
    pub stagger: RevealConfig,
    /// Word-by-word text reveal.
    pub words: RevealConfig,
    /// Character-by-character text reveal.
    pub chars: RevealConfig,
    /// Persistent section reveal.
    pub section: RevealConfig,
    /// Slide-in variants.
    pub slide: RevealConfig,
}

impl RevealSet {
    /// The default markers, thresholds and margins.
    pub const DEFAULT: Self = Self {
        reveal: RevealConfig {
            selector: Selector::Attribute("data-reveal"),
            options: ObserverOptions {
                threshold: 0.15,
                root_margin: REVEAL_MARGIN,
            },
            class: "is-visible",
            persistent: false,
            split: None,
        },
        stagger: RevealConfig {
            selector: Selector::Attribute("data-stagger"),
            options: ObserverOptions {
                threshold: 0.1,
                root_margin: REVEAL_MARGIN,
            },
            class: "is-visible",
            persistent: false,
            split: None,
        },
        words: RevealConfig {
            selector: Selector::Attribute("data-word-reveal"),
            options: ObserverOptions {
                threshold: 0.2,
                root_margin: REVEAL_MARGIN,
            },
            class: "is-visible",
            persistent: false,
            split: Some(SplitMode::Words),
        },
        chars: RevealConfig {
            selector: Selector::Attribute("data-char-reveal"),
            options: ObserverOptions {
                threshold: 0.2,
                root_margin: REVEAL_MARGIN,
            },
            class: "is-visible",
            persistent: false,
            split: Some(SplitMode::Chars),
        },
        section: RevealConfig {
            selector: Selector::Attribute("data-section"),
            options: ObserverOptions {
                threshold: 0.1,
                root_margin: "0px",
            },
            class: "in-view",
            persistent: true,
            split: None,
        },
        slide: RevealConfig {
            selector: Selector::AnyAttribute(&[
                "data-slide-left",
                "data-slide-right",
                "data-slide-stagger",
            ]),
            options: ObserverOptions {
                threshold: 0.15,
                root_margin: REVEAL_MARGIN,
            },
            class: "is-visible",
            persistent: false,
            split: None,
        },
    };

    /// The configuration of one category.
    #[must_use]
    pub const fn get(&self, kind: RevealKind) -> &RevealConfig {
        match kind {
            RevealKind::Reveal => &self.reveal,
            RevealKind::Stagger => &self.stagger,
            RevealKind::Words => &self.words,
            RevealKind::Chars => &self.chars,
            RevealKind::Section => &self.section,
            RevealKind::Slide => &self.slide,
        }
    }
}

/// Configuration for the [`Engine`](crate::engine::Engine).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    /// Viewports at or below this width are treated as mobile and get no
    /// scroll-driven motion.
    pub mobile_breakpoint: f64,
    /// Quiet period after the last resize before baselines are remeasured.
    pub resize_quiet: Duration,
    /// Guard band of the simple parallax category, in pixels.
    pub parallax_guard: f64,
    /// Guard band of the continuous scroll parallax category, in pixels.
    pub scroll_guard: f64,
    /// Per-word `transition-delay` step.
    pub word_delay: Duration,
    /// Per-character `transition-delay` step.
    pub char_delay: Duration,
    /// Motion marker attributes.
    pub markers: MotionMarkers,
    /// Reveal categories.
    pub reveals: RevealSet,
}

impl EngineConfig {
    /// Default configuration for the browser.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            mobile_breakpoint: 768.0,
            resize_quiet: Duration::from_millis(200),
            parallax_guard: 200.0,
            scroll_guard: 300.0,
            word_delay: Duration::from_millis(60),
            char_delay: Duration::from_millis(30),
            markers: MotionMarkers::DEFAULT,
            reveals: RevealSet::DEFAULT,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::web()
    }
}

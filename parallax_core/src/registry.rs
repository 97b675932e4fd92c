// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element registry: four catalogs of annotated elements.
//!
//! Each catalog holds the [`ElementEntry`]s of one [`MotionKind`] in document
//! order. An entry caches the element's [`Baseline`] geometry, measured once
//! at collection and again only by [`Registry::remeasure`], so frames never
//! touch layout.
//!
//! Catalogs are rebuilt wholesale by [`Registry::collect`]; an element with
//! several category markers has one independent entry per catalog.

use alloc::vec::Vec;

use crate::config::EngineConfig;
use crate::host::{Document, Selector};
use crate::motion::{
    Baseline, DriveDirection, Motion, MotionKind, ScrollDirection, SpeedTier, parse_intensity,
    parse_speed,
};
use crate::split::{CHAR_CLASS, SPACE_CLASS, SplitLedger, SplitMode};

/// Matches the non-space character spans created by character splitting.
pub const CHAR_SELECTOR: Selector = Selector::ClassExcluding {
    class: CHAR_CLASS,
    excluded: SPACE_CLASS,
};

/// One registered element of one category.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementEntry<N> {
    /// The element. Not owned; it may leave the document at any time.
    pub node: N,
    /// Cached geometry.
    pub baseline: Baseline,
    /// Category parameters.
    pub motion: Motion<N>,
}

/// Measures `node` in document space.
///
/// The result equals the bounding-rect top plus `scroll_offset` at the moment
/// of measurement.
pub fn measure<D: Document>(doc: &D, node: &D::Node, scroll_offset: f64) -> Baseline {
    let rect = doc.bounding_rect(node);
    Baseline {
        top: rect.y0 + scroll_offset,
        height: rect.height(),
    }
}

/// The four motion catalogs.
#[derive(Clone, Debug)]
pub struct Registry<N> {
    simple: Vec<ElementEntry<N>>,
    scroll: Vec<ElementEntry<N>>,
    drive: Vec<ElementEntry<N>>,
    chars: Vec<ElementEntry<N>>,
    collected: bool,
}

impl<N> Default for Registry<N> {
    fn default() -> Self {
        Self {
            simple: Vec::new(),
            scroll: Vec::new(),
            drive: Vec::new(),
            chars: Vec::new(),
            collected: false,
        }
    }
}

impl<N: Clone + PartialEq> Registry<N> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The entries of one category, in document order.
    #[must_use]
    pub fn entries(&self, kind: MotionKind) -> &[ElementEntry<N>] {
        match kind {
            MotionKind::SimpleParallax => &self.simple,
            MotionKind::ScrollParallax => &self.scroll,
            MotionKind::DriveSlide => &self.drive,
            MotionKind::CharDrive => &self.chars,
        }
    }

    fn entries_mut(&mut self, kind: MotionKind) -> &mut Vec<ElementEntry<N>> {
        match kind {
            MotionKind::SimpleParallax => &mut self.simple,
            MotionKind::ScrollParallax => &mut self.scroll,
            MotionKind::DriveSlide => &mut self.drive,
            MotionKind::CharDrive => &mut self.chars,
        }
    }

    /// All entries, category by category.
    pub fn iter(&self) -> impl Iterator<Item = &ElementEntry<N>> {
        self.simple
            .iter()
            .chain(&self.scroll)
            .chain(&self.drive)
            .chain(&self.chars)
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.simple.len() + self.scroll.len() + self.drive.len() + self.chars.len()
    }

    /// Returns `true` if no category has entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once a collection pass has run since the last
    /// [`clear`](Self::clear).
    #[must_use]
    pub fn is_collected(&self) -> bool {
        self.collected
    }

    /// Rebuilds one category from the document and returns its entry count.
    ///
    /// The category is cleared first, so repeated calls are idempotent. The
    /// per-character category splits its elements into character spans
    /// through `ledger` if that has not happened yet; elements without any
    /// non-space character are skipped.
    pub fn collect<D>(
        &mut self,
        doc: &mut D,
        kind: MotionKind,
        config: &EngineConfig,
        scroll_offset: f64,
        ledger: &mut SplitLedger<N>,
    ) -> usize
    where
        D: Document<Node = N>,
    {
        let markers = &config.markers;
        let marker = match kind {
            MotionKind::SimpleParallax => markers.parallax,
            MotionKind::ScrollParallax => markers.scroll_parallax,
            MotionKind::DriveSlide => markers.drive,
            MotionKind::CharDrive => markers.char_drive,
        };

        let mut entries = Vec::new();
        for node in doc.query_all(&Selector::Attribute(marker)) {
            let motion = match kind {
                MotionKind::SimpleParallax => Motion::SimpleParallax {
                    speed: parse_speed(doc.attribute(&node, marker).as_deref()),
                },
                MotionKind::ScrollParallax => Motion::ScrollParallax {
                    tier: SpeedTier::parse(doc.attribute(&node, marker).as_deref()),
                    direction: ScrollDirection::parse(
                        doc.attribute(&node, markers.scroll_direction).as_deref(),
                    ),
                },
                MotionKind::DriveSlide => Motion::DriveSlide {
                    direction: DriveDirection::parse(doc.attribute(&node, marker).as_deref()),
                    intensity: parse_intensity(
                        doc.attribute(&node, markers.drive_intensity).as_deref(),
                    ),
                },
                MotionKind::CharDrive => {
                    ledger.ensure(doc, &node, SplitMode::Chars, config.char_delay);
                    let chars = doc.query_within(&node, &CHAR_SELECTOR);
                    if chars.is_empty() {
                        continue;
                    }
                    Motion::CharDrive { chars }
                }
            };
            let baseline = measure(doc, &node, scroll_offset);
            entries.push(ElementEntry {
                node,
                baseline,
                motion,
            });
        }

        let count = entries.len();
        *self.entries_mut(kind) = entries;
        count
    }

    /// Rebuilds every category. Returns the entry counts in
    /// [`MotionKind::ALL`] order.
    pub fn collect_all<D>(
        &mut self,
        doc: &mut D,
        config: &EngineConfig,
        scroll_offset: f64,
        ledger: &mut SplitLedger<N>,
    ) -> [usize; 4]
    where
        D: Document<Node = N>,
    {
        let counts = MotionKind::ALL.map(|kind| self.collect(doc, kind, config, scroll_offset, ledger));
        self.collected = true;
        counts
    }

    /// Remeasures every entry's baseline in place. Returns the number of
    /// entries measured.
    pub fn remeasure<D>(&mut self, doc: &D, scroll_offset: f64) -> usize
    where
        D: Document<Node = N>,
    {
        let mut count = 0;
        for kind in MotionKind::ALL {
            for entry in self.entries_mut(kind) {
                entry.baseline = measure(doc, &entry.node, scroll_offset);
                count += 1;
            }
        }
        count
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        for kind in MotionKind::ALL {
            self.entries_mut(kind).clear();
        }
        self.collected = false;
    }
}

// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility-driven reveals.
//!
//! [`VisibilityBridge`] drives six reveal categories on top of the host's
//! intersection observers. It runs independently of the scroll scheduler and
//! only ever adds classes, so it shares no write channel with the motion
//! categories and tolerates any interleaving with scroll frames.
//!
//! # Contracts
//!
//! - **One-shot** categories add their class the first time an element
//!   intersects, then stop observing it. Later notifications for that element
//!   (already queued by the host, or after a refresh) are ignored.
//! - **Persistent** categories add their class every time the element
//!   intersects and keep observing. The bridge never removes the class.
//!
//! Word and character categories split their elements' text before
//! observation begins (see [`split`](crate::split)).
//!
//! Each category creates its observer lazily: a category with no matching
//! elements costs nothing.

use alloc::vec::Vec;

use crate::config::EngineConfig;
use crate::host::{IntersectionEntry, ObserverId, Observers};
use crate::split::{SplitLedger, SplitMode};

/// The six reveal categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RevealKind {
    /// Single fade-in.
    Reveal,
    /// Group fade-in; children stagger through CSS delays.
    Stagger,
    /// Word-by-word text reveal.
    Words,
    /// Character-by-character text reveal.
    Chars,
    /// Persistent section reveal.
    Section,
    /// Slide-in variants.
    Slide,
}

impl RevealKind {
    /// All categories in setup order.
    pub const ALL: [Self; 6] = [
        Self::Reveal,
        Self::Stagger,
        Self::Words,
        Self::Chars,
        Self::Section,
        Self::Slide,
    ];

    /// Short label for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reveal => "reveal",
            Self::Stagger => "stagger",
            Self::Words => "words",
            Self::Chars => "chars",
            Self::Section => "section",
            Self::Slide => "slide",
        }
    }
}

#[derive(Clone, Debug)]
struct ActiveObserver<N> {
    id: ObserverId,
    kind: RevealKind,
    observed: Vec<N>,
}

/// Outcome of delivering intersection entries to the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealOutcome {
    /// Category of the observer the entries came from.
    pub kind: RevealKind,
    /// Entries that added the category's class.
    pub triggered: usize,
    /// Entries ignored (not intersecting, or already revealed).
    pub ignored: usize,
}

/// Reveal state across all six categories.
#[derive(Clone, Debug)]
pub struct VisibilityBridge<N> {
    observers: Vec<ActiveObserver<N>>,
    revealed: Vec<(RevealKind, N)>,
    next_id: u32,
}

impl<N> Default for VisibilityBridge<N> {
    fn default() -> Self {
        Self {
            observers: Vec::new(),
            revealed: Vec::new(),
            next_id: 0,
        }
    }
}

impl<N: Clone + PartialEq> VisibilityBridge<N> {
    /// Creates an idle bridge.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovers elements of every category, splits text where required and
    /// starts observing. Returns the number of newly observed elements per
    /// category, in [`RevealKind::ALL`] order.
    ///
    /// Calling this again (on refresh) only adds elements that are neither
    /// observed nor, for one-shot categories, already revealed.
    pub fn start<D>(&mut self, doc: &mut D, config: &EngineConfig, ledger: &mut SplitLedger<N>) -> [usize; 6]
    where
        D: Observers<Node = N>,
    {
        RevealKind::ALL.map(|kind| self.start_kind(doc, kind, config, ledger))
    }

    fn start_kind<D>(
        &mut self,
        doc: &mut D,
        kind: RevealKind,
        config: &EngineConfig,
        ledger: &mut SplitLedger<N>,
    ) -> usize
    where
        D: Observers<Node = N>,
    {
        let reveal = config.reveals.get(kind);
        let nodes = doc.query_all(&reveal.selector);

        if let Some(mode) = reveal.split {
            let step = match mode {
                SplitMode::Words => config.word_delay,
                SplitMode::Chars => config.char_delay,
            };
            for node in &nodes {
                ledger.ensure(doc, node, mode, step);
            }
        }

        let pending: Vec<N> = nodes
            .into_iter()
            .filter(|node| reveal.persistent || !self.is_revealed(kind, node))
            .filter(|node| !self.is_observed(kind, node))
            .collect();
        if pending.is_empty() {
            return 0;
        }

        let index = match self.observers.iter().position(|o| o.kind == kind) {
            Some(index) => index,
            None => {
                let id = ObserverId(self.next_id);
                self.next_id += 1;
                doc.create_observer(id, &reveal.options);
                self.observers.push(ActiveObserver {
                    id,
                    kind,
                    observed: Vec::new(),
                });
                self.observers.len() - 1
            }
        };

        let observer = &mut self.observers[index];
        for node in &pending {
            doc.observe(observer.id, node);
        }
        let count = pending.len();
        observer.observed.extend(pending);
        count
    }

    /// Applies intersection changes delivered for observer `id`.
    ///
    /// Returns `None` for unknown observers (for example, callbacks that
    /// arrive after [`stop`](Self::stop)).
    pub fn on_intersection<D>(
        &mut self,
        doc: &mut D,
        config: &EngineConfig,
        id: ObserverId,
        entries: &[IntersectionEntry<N>],
    ) -> Option<RevealOutcome>
    where
        D: Observers<Node = N>,
    {
        let index = self.observers.iter().position(|o| o.id == id)?;
        let kind = self.observers[index].kind;
        let reveal = config.reveals.get(kind);

        let mut outcome = RevealOutcome {
            kind,
            triggered: 0,
            ignored: 0,
        };
        for entry in entries {
            if !entry.is_intersecting {
                outcome.ignored += 1;
                continue;
            }
            if reveal.persistent {
                doc.add_class(&entry.target, reveal.class);
                outcome.triggered += 1;
                continue;
            }
            if self.is_revealed(kind, &entry.target) {
                outcome.ignored += 1;
                continue;
            }
            doc.add_class(&entry.target, reveal.class);
            doc.unobserve(id, &entry.target);
            self.observers[index].observed.retain(|n| n != &entry.target);
            self.revealed.push((kind, entry.target.clone()));
            outcome.triggered += 1;
        }
        Some(outcome)
    }

    /// Disconnects every observer. Reveal history is kept, so a later
    /// [`start`](Self::start) does not re-observe revealed elements.
    pub fn stop<D>(&mut self, doc: &mut D)
    where
        D: Observers<Node = N>,
    {
        for observer in self.observers.drain(..) {
            doc.disconnect(observer.id);
        }
    }

    /// Returns `true` if `node` was revealed by one-shot category `kind`.
    #[must_use]
    pub fn is_revealed(&self, kind: RevealKind, node: &N) -> bool {
        self.revealed.iter().any(|(k, n)| *k == kind && n == node)
    }

    fn is_observed(&self, kind: RevealKind, node: &N) -> bool {
        self.observers
            .iter()
            .any(|o| o.kind == kind && o.observed.contains(node))
    }

    /// The observer created for `kind`, if any.
    #[must_use]
    pub fn observer(&self, kind: RevealKind) -> Option<ObserverId> {
        self.observers.iter().find(|o| o.kind == kind).map(|o| o.id)
    }

    /// Number of live observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessHost;
    use crate::host::Document as _;

    fn entry<N>(target: N, is_intersecting: bool) -> IntersectionEntry<N> {
        IntersectionEntry {
            target,
            is_intersecting,
        }
    }

    #[test]
    fn categories_without_matches_stay_inert() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        let card = host.append(body, "div");
        host.set_attribute(&card, "data-reveal", "");

        let mut bridge = VisibilityBridge::new();
        let mut ledger = SplitLedger::default();
        let counts = bridge.start(&mut host, &EngineConfig::web(), &mut ledger);
        assert_eq!(counts, [1, 0, 0, 0, 0, 0]);
        assert_eq!(bridge.observer_count(), 1);
        assert_eq!(host.observer_count(), 1, "no observers for empty categories");
    }

    #[test]
    fn one_shot_reveal_adds_class_once_and_unobserves() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        let card = host.append(body, "div");
        host.set_attribute(&card, "data-reveal", "");

        let config = EngineConfig::web();
        let mut bridge = VisibilityBridge::new();
        let mut ledger = SplitLedger::default();
        bridge.start(&mut host, &config, &mut ledger);
        let id = bridge.observer(RevealKind::Reveal).unwrap();
        assert!(host.is_observing(id, &card));

        let outcome = bridge
            .on_intersection(&mut host, &config, id, &[entry(card, false)])
            .unwrap();
        assert_eq!(outcome.triggered, 0);
        assert!(!host.has_class(&card, "is-visible"));

        bridge.on_intersection(&mut host, &config, id, &[entry(card, true)]);
        assert!(host.has_class(&card, "is-visible"));
        assert!(!host.is_observing(id, &card), "one-shot stops observing");
        let writes = host.class_writes();

        // Scrolling away and back: a late notification changes nothing.
        let outcome = bridge
            .on_intersection(&mut host, &config, id, &[entry(card, false), entry(card, true)])
            .unwrap();
        assert_eq!(outcome.triggered, 0);
        assert_eq!(outcome.ignored, 2);
        assert!(host.has_class(&card, "is-visible"));
        assert_eq!(host.class_writes(), writes, "class not re-added");
    }

    #[test]
    fn sections_are_persistent() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        let section = host.append(body, "section");
        host.set_attribute(&section, "data-section", "");

        let config = EngineConfig::web();
        let mut bridge = VisibilityBridge::new();
        let mut ledger = SplitLedger::default();
        bridge.start(&mut host, &config, &mut ledger);
        let id = bridge.observer(RevealKind::Section).unwrap();

        bridge.on_intersection(&mut host, &config, id, &[entry(section, true)]);
        bridge.on_intersection(&mut host, &config, id, &[entry(section, false)]);
        assert!(host.has_class(&section, "in-view"), "bridge never removes");
        let outcome = bridge
            .on_intersection(&mut host, &config, id, &[entry(section, true)])
            .unwrap();
        assert_eq!(outcome.triggered, 1);
        assert!(host.is_observing(id, &section), "still observed");
    }

    #[test]
    fn slide_variants_share_one_observer() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        for marker in ["data-slide-left", "data-slide-right", "data-slide-stagger"] {
            let el = host.append(body, "div");
            host.set_attribute(&el, marker, "");
        }
        let mut bridge = VisibilityBridge::new();
        let mut ledger = SplitLedger::default();
        let counts = bridge.start(&mut host, &EngineConfig::web(), &mut ledger);
        assert_eq!(counts[5], 3);
        assert_eq!(bridge.observer_count(), 1);
    }

    #[test]
    fn text_reveals_split_before_observing_and_only_once() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        let words = host.append(body, "p");
        host.set_attribute(&words, "data-word-reveal", "");
        host.set_text(&words, "Quiet words arrive");
        let chars = host.append(body, "h1");
        host.set_attribute(&chars, "data-char-reveal", "");
        host.set_text(&chars, "Hi there");

        let config = EngineConfig::web();
        let mut bridge = VisibilityBridge::new();
        let mut ledger = SplitLedger::default();
        bridge.start(&mut host, &config, &mut ledger);

        let word_children = host.children(&words).len();
        let char_children = host.children(&chars).len();
        assert_eq!(word_children, 5, "three words and two spaces");
        assert_eq!(char_children, 8, "seven letters and a placeholder");
        assert_eq!(
            host.style(&host.children(&words)[4], "transition-delay"),
            Some("120ms"),
            "third word waits 2 × 60ms"
        );
        assert_eq!(host.attribute(&chars, "data-split").as_deref(), Some("chars"));

        // A second pass, as on refresh, neither re-wraps nor re-observes.
        let counts = bridge.start(&mut host, &config, &mut ledger);
        assert_eq!(counts, [0; 6]);
        assert_eq!(host.children(&words).len(), word_children);
        assert_eq!(host.children(&chars).len(), char_children);

        // A fresh bridge and ledger still respect the marker attribute.
        let mut other = VisibilityBridge::new();
        let mut fresh = SplitLedger::default();
        other.start(&mut host, &config, &mut fresh);
        assert_eq!(host.children(&chars).len(), char_children);
    }

    #[test]
    fn refresh_skips_revealed_elements() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        let first = host.append(body, "div");
        host.set_attribute(&first, "data-stagger", "");

        let config = EngineConfig::web();
        let mut bridge = VisibilityBridge::new();
        let mut ledger = SplitLedger::default();
        bridge.start(&mut host, &config, &mut ledger);
        let id = bridge.observer(RevealKind::Stagger).unwrap();
        bridge.on_intersection(&mut host, &config, id, &[entry(first, true)]);

        let second = host.append(body, "div");
        host.set_attribute(&second, "data-stagger", "");
        let counts = bridge.start(&mut host, &config, &mut ledger);
        assert_eq!(counts[1], 1, "only the new element");
        assert!(host.is_observing(id, &second));
        assert!(!host.is_observing(id, &first));
    }

    #[test]
    fn stop_disconnects_and_ignores_late_callbacks() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        let card = host.append(body, "div");
        host.set_attribute(&card, "data-reveal", "");

        let config = EngineConfig::web();
        let mut bridge = VisibilityBridge::new();
        let mut ledger = SplitLedger::default();
        bridge.start(&mut host, &config, &mut ledger);
        let id = bridge.observer(RevealKind::Reveal).unwrap();
        bridge.stop(&mut host);

        assert_eq!(host.observer_count(), 0);
        assert_eq!(
            bridge.on_intersection(&mut host, &config, id, &[entry(card, true)]),
            None
        );
        assert!(!host.has_class(&card, "is-visible"));
    }
}

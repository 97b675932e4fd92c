// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory host.
//!
//! [`HeadlessHost`] implements every host trait over a small node tree with
//! explicit layout, a virtual clock and manually pumped frame and timer
//! queues. Tests and native tooling drive the engine through it exactly as a
//! browser would: move the scroll offset, call
//! [`Engine::on_scroll`](crate::engine::Engine::on_scroll), then deliver the
//! frame returned by [`take_frame`](HeadlessHost::take_frame).
//!
//! Layout is document-space: [`set_layout`](HeadlessHost::set_layout) gives
//! an element's absolute top and height, and the bounding rect subtracts the
//! current scroll offset.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Rect, Size};

use crate::host::{
    Document, EventLoop, FrameRequest, IntersectionEntry, ObserverId, ObserverOptions, Observers,
    Selector, Signal, TimerId, Viewport,
};
use crate::split::TextSegment;
use crate::time::{Duration, HostTime};
use crate::viewport::Capabilities;

/// Handle to a node of a [`HeadlessHost`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeadlessNode(u32);

impl fmt::Debug for HeadlessNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeadlessNode({})", self.0)
    }
}

impl HeadlessNode {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, Default)]
struct NodeData {
    /// `None` for text nodes.
    tag: Option<String>,
    text: String,
    parent: Option<HeadlessNode>,
    children: Vec<HeadlessNode>,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    styles: Vec<(String, String)>,
    top: f64,
    height: f64,
    attached: bool,
}

#[derive(Clone, Debug)]
struct ObserverState {
    id: ObserverId,
    options: ObserverOptions,
    targets: Vec<HeadlessNode>,
}

/// An in-memory document, viewport and event loop.
#[derive(Clone, Debug)]
pub struct HeadlessHost {
    nodes: Vec<NodeData>,
    scroll_offset: f64,
    viewport: Size,
    capabilities: Capabilities,
    clock: HostTime,
    next_frame: u32,
    frames: Vec<FrameRequest>,
    next_timer: u32,
    timers: Vec<(TimerId, HostTime)>,
    observers: Vec<ObserverState>,
    listening: Vec<Signal>,
    class_writes: u64,
    style_writes: u64,
}

impl HeadlessHost {
    /// Creates a host with an empty `body` element.
    #[must_use]
    pub fn new(viewport: Size, capabilities: Capabilities) -> Self {
        let body = NodeData {
            tag: Some("body".to_string()),
            attached: true,
            ..NodeData::default()
        };
        Self {
            nodes: vec![body],
            scroll_offset: 0.0,
            viewport,
            capabilities,
            clock: HostTime(0),
            next_frame: 1,
            frames: Vec::new(),
            next_timer: 1,
            timers: Vec::new(),
            observers: Vec::new(),
            listening: Vec::new(),
            class_writes: 0,
            style_writes: 0,
        }
    }

    /// A 1280×800 desktop viewport with pointer input and no motion
    /// preference.
    #[must_use]
    pub fn desktop() -> Self {
        Self::new(Size::new(1280.0, 800.0), Capabilities::DESKTOP)
    }

    /// The root element.
    #[must_use]
    pub fn body(&self) -> HeadlessNode {
        HeadlessNode(0)
    }

    fn push(&mut self, parent: HeadlessNode, data: NodeData) -> HeadlessNode {
        let node = HeadlessNode(
            u32::try_from(self.nodes.len()).unwrap_or(u32::MAX),
        );
        let attached = self.node(parent).is_some_and(|p| p.attached);
        self.nodes.push(NodeData {
            parent: Some(parent),
            attached,
            ..data
        });
        if let Some(p) = self.nodes.get_mut(parent.index()) {
            p.children.push(node);
        }
        node
    }

    /// Appends a new element with the given tag as the last child of
    /// `parent`.
    pub fn append(&mut self, parent: HeadlessNode, tag: &str) -> HeadlessNode {
        self.push(
            parent,
            NodeData {
                tag: Some(tag.to_string()),
                ..NodeData::default()
            },
        )
    }

    fn append_text(&mut self, parent: HeadlessNode, text: &str) -> HeadlessNode {
        self.push(
            parent,
            NodeData {
                text: text.to_string(),
                ..NodeData::default()
            },
        )
    }

    /// Replaces the children of `node` with one text node.
    pub fn set_text(&mut self, node: &HeadlessNode, text: &str) {
        self.detach_children(*node);
        self.append_text(*node, text);
    }

    /// Sets the document-space top and the height of `node`.
    pub fn set_layout(&mut self, node: &HeadlessNode, top: f64, height: f64) {
        if let Some(data) = self.nodes.get_mut(node.index()) {
            data.top = top;
            data.height = height;
        }
    }

    /// Moves the viewport. The engine learns about it only through
    /// [`Engine::on_scroll`](crate::engine::Engine::on_scroll).
    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }

    /// Resizes the viewport.
    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = size;
    }

    /// Replaces the capability signals.
    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
    }

    /// Removes `node` and its subtree from the document. The handles stay
    /// valid; writes to them are ignored.
    pub fn remove(&mut self, node: HeadlessNode) {
        if let Some(parent) = self.node(node).and_then(|d| d.parent) {
            if let Some(p) = self.nodes.get_mut(parent.index()) {
                p.children.retain(|c| *c != node);
            }
        }
        self.mark_detached(node);
    }

    fn detach_children(&mut self, node: HeadlessNode) {
        let children = match self.nodes.get_mut(node.index()) {
            Some(data) => core::mem::take(&mut data.children),
            None => return,
        };
        for child in children {
            self.mark_detached(child);
        }
    }

    fn mark_detached(&mut self, node: HeadlessNode) {
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if let Some(data) = self.nodes.get_mut(n.index()) {
                data.attached = false;
                stack.extend(data.children.iter().copied());
            }
        }
    }

    fn node(&self, node: HeadlessNode) -> Option<&NodeData> {
        self.nodes.get(node.index())
    }

    fn live_mut(&mut self, node: HeadlessNode) -> Option<&mut NodeData> {
        self.nodes.get_mut(node.index()).filter(|d| d.attached)
    }

    /// Child nodes of `node`, text nodes included.
    #[must_use]
    pub fn children(&self, node: &HeadlessNode) -> Vec<HeadlessNode> {
        self.node(*node)
            .map(|d| d.children.clone())
            .unwrap_or_default()
    }

    /// Drops attribute `name` from `node`, as page scripts do when an element
    /// stops being annotated.
    pub fn remove_attribute(&mut self, node: &HeadlessNode, name: &str) {
        if let Some(data) = self.nodes.get_mut(node.index()) {
            data.attributes.retain(|(n, _)| n != name);
        }
    }

    /// The current value of a style property.
    #[must_use]
    pub fn style(&self, node: &HeadlessNode, property: &str) -> Option<&str> {
        self.node(*node)?
            .styles
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if `node` carries `class`.
    #[must_use]
    pub fn has_class(&self, node: &HeadlessNode, class: &str) -> bool {
        self.node(*node)
            .is_some_and(|d| d.classes.iter().any(|c| c == class))
    }

    /// Number of class additions requested so far, no-ops included.
    #[must_use]
    pub fn class_writes(&self) -> u64 {
        self.class_writes
    }

    /// Number of style writes and removals so far.
    #[must_use]
    pub fn style_writes(&self) -> u64 {
        self.style_writes
    }

    /// Returns `true` if observer `id` is watching `node`.
    #[must_use]
    pub fn is_observing(&self, id: ObserverId, node: &HeadlessNode) -> bool {
        self.observers
            .iter()
            .any(|o| o.id == id && o.targets.contains(node))
    }

    /// Number of live observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Identifiers of the live observers, in creation order.
    #[must_use]
    pub fn observer_ids(&self) -> Vec<ObserverId> {
        self.observers.iter().map(|o| o.id).collect()
    }

    /// Returns `true` if the listener for `signal` is attached.
    #[must_use]
    pub fn is_listening(&self, signal: Signal) -> bool {
        self.listening.contains(&signal)
    }

    /// Takes the oldest pending frame request, as the browser would run it.
    pub fn take_frame(&mut self) -> Option<FrameRequest> {
        if self.frames.is_empty() {
            None
        } else {
            Some(self.frames.remove(0))
        }
    }

    /// Number of frame requests not yet taken or cancelled.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of timers not yet fired or cancelled.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Advances the virtual clock and returns the timers that expired, in
    /// deadline order.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerId> {
        self.clock = self.clock + by;
        let now = self.clock;
        let mut fired: Vec<(TimerId, HostTime)> = Vec::new();
        self.timers.retain(|&(id, deadline)| {
            if deadline <= now {
                fired.push((id, deadline));
                false
            } else {
                true
            }
        });
        fired.sort_by_key(|&(id, deadline)| (deadline, id));
        fired.into_iter().map(|(id, _)| id).collect()
    }

    /// The current intersection state of every node observed by `id`.
    ///
    /// An element intersects when the visible fraction of its height within
    /// the viewport, shrunk or grown by the observer's vertical root margin,
    /// reaches the threshold. Zero-height elements intersect when their edge
    /// lies inside that box.
    #[must_use]
    pub fn intersections(&self, id: ObserverId) -> Vec<IntersectionEntry<HeadlessNode>> {
        let Some(observer) = self.observers.iter().find(|o| o.id == id) else {
            return Vec::new();
        };
        let (margin_top, margin_bottom) = vertical_margins(observer.options.root_margin);
        let lo = -margin_top;
        let hi = self.viewport.height + margin_bottom;
        observer
            .targets
            .iter()
            .map(|&target| {
                let rect = self.bounding_rect(&target);
                let visible = rect.y1.min(hi) - rect.y0.max(lo);
                let is_intersecting = if rect.height() > 0.0 {
                    visible > 0.0 && visible / rect.height() >= observer.options.threshold
                } else {
                    rect.y0 >= lo && rect.y0 <= hi
                };
                IntersectionEntry {
                    target,
                    is_intersecting,
                }
            })
            .collect()
    }

    fn is_element(&self, node: HeadlessNode) -> bool {
        self.node(node).is_some_and(|d| d.tag.is_some())
    }

    fn matches(&self, node: HeadlessNode, selector: &Selector) -> bool {
        let Some(data) = self.node(node) else {
            return false;
        };
        data.tag.is_some()
            && selector.matches(
                |name| data.attributes.iter().any(|(n, _)| n == name),
                |class| data.classes.iter().any(|c| c == class),
            )
    }

    /// Descendants of `root` in document order, `root` excluded.
    fn descendants(&self, root: HeadlessNode) -> Vec<HeadlessNode> {
        let mut out = Vec::new();
        let mut stack: Vec<HeadlessNode> = self.children(&root).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(&node).into_iter().rev());
        }
        out
    }
}

/// Parses the top and bottom of a CSS `rootMargin` shorthand made of pixel
/// values. Unparseable parts count as zero.
fn vertical_margins(root_margin: &str) -> (f64, f64) {
    let values: Vec<f64> = root_margin
        .split_whitespace()
        .map(|part| part.trim_end_matches("px").parse::<f64>().unwrap_or(0.0))
        .collect();
    match values.as_slice() {
        [] => (0.0, 0.0),
        [all] => (*all, *all),
        [vertical, _] => (*vertical, *vertical),
        [top, _, bottom, ..] => (*top, *bottom),
    }
}

impl Document for HeadlessHost {
    type Node = HeadlessNode;

    fn query_all(&self, selector: &Selector) -> Vec<HeadlessNode> {
        let body = self.body();
        core::iter::once(body)
            .chain(self.descendants(body))
            .filter(|&n| self.matches(n, selector))
            .collect()
    }

    fn query_within(&self, root: &HeadlessNode, selector: &Selector) -> Vec<HeadlessNode> {
        self.descendants(*root)
            .into_iter()
            .filter(|&n| self.matches(n, selector))
            .collect()
    }

    fn attribute(&self, node: &HeadlessNode, name: &str) -> Option<String> {
        self.node(*node)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&mut self, node: &HeadlessNode, name: &str, value: &str) {
        let Some(data) = self.nodes.get_mut(node.index()) else {
            return;
        };
        match data.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => data.attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn bounding_rect(&self, node: &HeadlessNode) -> Rect {
        match self.node(*node) {
            Some(data) if data.attached => {
                let y0 = data.top - self.scroll_offset;
                Rect::new(0.0, y0, self.viewport.width, y0 + data.height)
            }
            _ => Rect::ZERO,
        }
    }

    fn text_content(&self, node: &HeadlessNode) -> String {
        let Some(data) = self.node(*node) else {
            return String::new();
        };
        if data.tag.is_none() {
            return data.text.clone();
        }
        self.descendants(*node)
            .into_iter()
            .filter(|&n| !self.is_element(n))
            .filter_map(|n| self.node(n).map(|d| d.text.as_str()))
            .collect()
    }

    fn replace_children(&mut self, node: &HeadlessNode, segments: &[TextSegment]) {
        if self.live_mut(*node).is_none() {
            return;
        }
        self.detach_children(*node);
        for segment in segments {
            match segment {
                TextSegment::Text(text) => {
                    self.append_text(*node, text);
                }
                TextSegment::Span { text, class, delay } => {
                    let span = self.append(*node, "span");
                    if let Some(data) = self.nodes.get_mut(span.index()) {
                        data.classes = class.split_whitespace().map(ToString::to_string).collect();
                        if let Some(delay) = delay {
                            data.styles.push((
                                "transition-delay".to_string(),
                                format!("{}ms", delay.as_millis()),
                            ));
                        }
                    }
                    self.append_text(span, text);
                }
            }
        }
    }

    fn add_class(&mut self, node: &HeadlessNode, class: &str) {
        let Some(data) = self.live_mut(*node) else {
            return;
        };
        if !data.classes.iter().any(|c| c == class) {
            data.classes.push(class.to_string());
        }
        self.class_writes += 1;
    }

    fn set_style(&mut self, node: &HeadlessNode, property: &str, value: &str) {
        let Some(data) = self.live_mut(*node) else {
            return;
        };
        match data.styles.iter_mut().find(|(n, _)| n == property) {
            Some((_, v)) => *v = value.to_string(),
            None => data.styles.push((property.to_string(), value.to_string())),
        }
        self.style_writes += 1;
    }

    fn remove_style(&mut self, node: &HeadlessNode, property: &str) {
        let Some(data) = self.live_mut(*node) else {
            return;
        };
        data.styles.retain(|(n, _)| n != property);
        self.style_writes += 1;
    }
}

impl Viewport for HeadlessHost {
    fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

impl EventLoop for HeadlessHost {
    fn now(&self) -> HostTime {
        self.clock
    }

    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next_frame);
        self.next_frame += 1;
        self.frames.push(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.frames.retain(|r| *r != request);
    }

    fn start_timer(&mut self, delay: Duration) -> TimerId {
        let timer = TimerId(self.next_timer);
        self.next_timer += 1;
        self.timers.push((timer, self.clock + delay));
        timer
    }

    fn cancel_timer(&mut self, timer: TimerId) {
        self.timers.retain(|(id, _)| *id != timer);
    }

    fn listen(&mut self, signal: Signal, active: bool) {
        self.listening.retain(|s| *s != signal);
        if active {
            self.listening.push(signal);
        }
    }
}

impl Observers for HeadlessHost {
    fn create_observer(&mut self, id: ObserverId, options: &ObserverOptions) {
        self.observers.retain(|o| o.id != id);
        self.observers.push(ObserverState {
            id,
            options: *options,
            targets: Vec::new(),
        });
    }

    fn observe(&mut self, id: ObserverId, node: &HeadlessNode) {
        if let Some(o) = self.observers.iter_mut().find(|o| o.id == id) {
            if !o.targets.contains(node) {
                o.targets.push(*node);
            }
        }
    }

    fn unobserve(&mut self, id: ObserverId, node: &HeadlessNode) {
        if let Some(o) = self.observers.iter_mut().find(|o| o.id == id) {
            o.targets.retain(|t| t != node);
        }
    }

    fn disconnect(&mut self, id: ObserverId) {
        self.observers.retain(|o| o.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_document_order() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        let outer = host.append(body, "div");
        let inner = host.append(outer, "div");
        let last = host.append(body, "div");
        for n in [outer, inner, last] {
            host.set_attribute(&n, "data-reveal", "");
        }
        assert_eq!(
            host.query_all(&Selector::Attribute("data-reveal")),
            [outer, inner, last]
        );
        assert_eq!(
            host.query_within(&outer, &Selector::Attribute("data-reveal")),
            [inner]
        );
    }

    #[test]
    fn bounding_rect_follows_scroll() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        let el = host.append(body, "div");
        host.set_layout(&el, 500.0, 100.0);
        host.set_scroll_offset(120.0);
        let rect = host.bounding_rect(&el);
        assert_eq!(rect.y0, 380.0);
        assert_eq!(rect.height(), 100.0);
    }

    #[test]
    fn removed_nodes_ignore_writes_and_leave_queries() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        let el = host.append(body, "div");
        host.set_attribute(&el, "data-parallax", "");
        host.remove(el);
        host.set_style(&el, "--parallax-offset", "4px");
        host.add_class(&el, "is-visible");
        assert_eq!(host.style(&el, "--parallax-offset"), None);
        assert!(!host.has_class(&el, "is-visible"));
        assert!(host.query_all(&Selector::Attribute("data-parallax")).is_empty());
    }

    #[test]
    fn text_content_spans_split_children() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        let p = host.append(body, "p");
        host.set_text(&p, "old");
        host.replace_children(
            &p,
            &[
                TextSegment::Span {
                    text: "new".to_string(),
                    class: "word",
                    delay: Some(Duration::from_millis(0)),
                },
                TextSegment::Text(" ".to_string()),
                TextSegment::Span {
                    text: "text".to_string(),
                    class: "word",
                    delay: Some(Duration::from_millis(60)),
                },
            ],
        );
        assert_eq!(host.text_content(&p), "new text");
        let children = host.children(&p);
        assert_eq!(children.len(), 3);
        assert!(host.has_class(&children[2], "word"));
        assert_eq!(host.style(&children[2], "transition-delay"), Some("60ms"));
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut host = HeadlessHost::desktop();
        let late = host.start_timer(Duration::from_millis(200));
        let early = host.start_timer(Duration::from_millis(50));
        let cancelled = host.start_timer(Duration::from_millis(10));
        host.cancel_timer(cancelled);
        assert!(host.advance(Duration::from_millis(40)).is_empty());
        assert_eq!(host.advance(Duration::from_millis(200)), [early, late]);
        assert_eq!(host.pending_timers(), 0);
        assert_eq!(host.now(), HostTime::from_millis_f64(240.0));
    }

    #[test]
    fn frames_are_fifo_and_cancellable() {
        let mut host = HeadlessHost::desktop();
        let a = host.request_frame();
        let b = host.request_frame();
        host.cancel_frame(a);
        assert_eq!(host.take_frame(), Some(b));
        assert_eq!(host.take_frame(), None);
    }

    #[test]
    fn intersections_respect_threshold_and_margin() {
        let mut host = HeadlessHost::desktop();
        let body = host.body();
        let near = host.append(body, "div");
        host.set_layout(&near, 780.0, 100.0);
        let inside = host.append(body, "div");
        host.set_layout(&inside, 200.0, 100.0);

        let id = ObserverId(0);
        host.create_observer(
            id,
            &ObserverOptions {
                threshold: 0.15,
                root_margin: "0px 0px -50px 0px",
            },
        );
        host.observe(id, &near);
        host.observe(id, &inside);

        let entries = host.intersections(id);
        assert!(!entries[0].is_intersecting, "below the shrunken bottom edge");
        assert!(entries[1].is_intersecting);

        host.set_scroll_offset(100.0);
        assert!(host.intersections(id)[0].is_intersecting);
    }

    #[test]
    fn root_margin_parsing() {
        assert_eq!(vertical_margins("0px"), (0.0, 0.0));
        assert_eq!(vertical_margins("0px 0px -50px 0px"), (0.0, -50.0));
        assert_eq!(vertical_margins("10px 5px"), (10.0, 10.0));
    }
}

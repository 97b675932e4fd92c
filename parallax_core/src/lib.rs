// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-driven motion and visibility reveals for annotated documents.
//!
//! `parallax_core` turns scroll position into per-element visual offsets
//! (parallax, dead-zone slides, per-character motion) and toggles reveal
//! classes when elements enter the viewport. It is `no_std` compatible (with
//! `alloc`) and never talks to a platform directly: every page interaction
//! goes through the traits in [`host`].
//!
//! # Architecture
//!
//! ```text
//!   Host scroll ──► Engine::on_scroll ──► FrameScheduler (coalesce)
//!                                              │ request_frame
//!                                              ▼
//!   Host frame ──► Engine::on_frame ──► pass over Registry ──► set_style
//!
//!   Host resize ──► Engine::on_resize ──► quiet-period timer
//!                                              │ on_timer
//!                                              ▼
//!                       remeasure baselines, re-evaluate enabled
//!
//!   Host intersection ──► Engine::on_intersection ──► VisibilityBridge
//!                                                          │
//!                                                          ▼
//!                                                      add_class
//! ```
//!
//! **[`engine`]**: The [`Engine`](engine::Engine) context, with its control
//! surface (`init`, `refresh`, `enable`, `disable`, `destroy`) and host callbacks.
//!
//! **[`registry`]**: Four catalogs of annotated elements with cached
//! document-space geometry.
//!
//! **[`motion`]**: The pure offset and transform calculators.
//!
//! **[`channel`]**: Names and units of the written style properties.
//!
//! **[`scheduler`]**: Frame coalescing and resize debouncing.
//!
//! **[`visibility`]**: Intersection-driven reveals; **[`split`]**: the
//! word and character text rewrite they depend on.
//!
//! **[`viewport`]**: Cached viewport metrics and capability signals.
//!
//! **[`config`]**: [`EngineConfig`](config::EngineConfig) with the browser
//! preset.
//!
//! **[`host`]**: The host traits; **[`headless`]**: an in-memory host for
//! tests and native tooling.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod channel;
pub mod config;
pub mod engine;
pub mod headless;
pub mod host;
pub mod motion;
pub mod registry;
pub mod scheduler;
pub mod split;
pub mod time;
pub mod trace;
pub mod viewport;
pub mod visibility;

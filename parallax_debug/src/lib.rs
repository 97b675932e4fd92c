// Copyright 2026 the Parallax Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debug and diagnostics tools for parallax.
//!
//! This crate provides [`TraceSink`](parallax_core::trace::TraceSink)
//! implementations for inspecting what the engine does each pass:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable line output
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`]
//! - [`chrome::export`]: Chrome Trace Event Format JSON from a recording
//! - [`tee::TeeSink`]: feeds two sinks at once

pub mod chrome;
pub mod pretty;
pub mod recorder;
pub mod tee;

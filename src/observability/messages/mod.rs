// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable text and
//! [`StructuredLog`] to emit it at its level with structured fields.
//!
//! * `translator` - translator wiring, run loop and item logs
//! * `coordinator` - background transform passes driven by polls
//! * `loopback` - loopback harness runs

use tracing::Span;

pub mod coordinator;
pub mod loopback;
pub mod translator;

/// Emit a message as a `tracing` event, or open a span carrying its fields.
pub trait StructuredLog {
    fn log(&self);

    fn span(&self, name: &str) -> Span;
}

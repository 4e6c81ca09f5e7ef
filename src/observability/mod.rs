// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for the diagnostic and
//! operational logging of translators. Message types follow a struct-based
//! pattern with a `Display` implementation so log text is defined in one
//! place and every event carries structured fields.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::translator` - translator wiring, run loop and item logs
//! * `messages::coordinator` - background transform passes driven by polls
//! * `messages::loopback` - loopback harness runs
//!
//! # Usage
//!
//! ```rust
//! use layered_translator::config::Mode;
//! use layered_translator::observability::messages::translator::ConfigurationMisuse;
//! use layered_translator::observability::messages::StructuredLog;
//!
//! ConfigurationMisuse {
//!     translator: "unpack_3_to_8",
//!     operation: "try_inbound",
//!     mode: Mode::Passive,
//! }
//! .log();
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber, honouring `RUST_LOG`.
///
/// Falls back to `default_directive` when `RUST_LOG` is unset or invalid.
/// Calling it twice is harmless; the second install is ignored.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

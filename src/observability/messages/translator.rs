// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for translator lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Translator wiring (mode resolution, taps, item logs)
//! * The passive run loop
//! * Configuration misuse
//! * Item log failures and teardown

use crate::config::Mode;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::Span;

/// Translator built and its channels wired.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use layered_translator::config::Mode;
/// use layered_translator::observability::messages::translator::TranslatorBuilt;
///
/// let msg = TranslatorBuilt {
///     translator: "pack_32_to_8",
///     mode: Mode::ActiveDirect,
///     inbound_tap: false,
///     outbound_tap: true,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct TranslatorBuilt<'a> {
    pub translator: &'a str,
    pub mode: Mode,
    pub inbound_tap: bool,
    pub outbound_tap: bool,
}

impl Display for TranslatorBuilt<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Translator '{}' built in {} mode: inbound_tap={}, outbound_tap={}",
            self.translator, self.mode, self.inbound_tap, self.outbound_tap
        )
    }
}

impl StructuredLog for TranslatorBuilt<'_> {
    fn log(&self) {
        tracing::info!(
            translator = self.translator,
            mode = self.mode.as_str(),
            inbound_tap = self.inbound_tap,
            outbound_tap = self.outbound_tap,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "translator",
            span_name = name,
            translator = self.translator,
            mode = self.mode.as_str(),
        )
    }
}

/// Passive run loop started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunLoopStarted<'a> {
    pub translator: &'a str,
}

impl Display for RunLoopStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Translator '{}' run loop started", self.translator)
    }
}

impl StructuredLog for RunLoopStarted<'_> {
    fn log(&self) {
        tracing::info!(translator = self.translator, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("run_loop", span_name = name, translator = self.translator)
    }
}

/// Run was requested on an active translator, where pulls drive the transform.
///
/// # Log Level
/// `debug!` - Expected, but useful when tracing pipeline startup
pub struct RunLoopSkipped<'a> {
    pub translator: &'a str,
    pub mode: Mode,
}

impl Display for RunLoopSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Translator '{}' has no run loop in {} mode; transform is driven by pulls",
            self.translator, self.mode
        )
    }
}

impl StructuredLog for RunLoopSkipped<'_> {
    fn log(&self) {
        tracing::debug!(translator = self.translator, mode = self.mode.as_str(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("run_loop", span_name = name, translator = self.translator)
    }
}

/// Passive run loop terminated by an error out of the transform.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct RunLoopTerminated<'a> {
    pub translator: &'a str,
    pub passes: u64,
    pub error: &'a dyn std::error::Error,
}

impl Display for RunLoopTerminated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Translator '{}' run loop terminated after {} passes: {}",
            self.translator, self.passes, self.error
        )
    }
}

impl StructuredLog for RunLoopTerminated<'_> {
    fn log(&self) {
        tracing::error!(
            translator = self.translator,
            passes = self.passes,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("run_loop", span_name = name, translator = self.translator)
    }
}

/// An operation was used in a mode that cannot support it.
///
/// # Log Level
/// `error!` - Programmer error; the operation is refused
///
/// # Example
/// ```
/// use layered_translator::config::Mode;
/// use layered_translator::observability::messages::translator::ConfigurationMisuse;
///
/// let msg = ConfigurationMisuse {
///     translator: "unpack_3_to_8",
///     operation: "try_inbound",
///     mode: Mode::Passive,
/// };
///
/// assert!(msg.to_string().contains("try_inbound"));
/// ```
pub struct ConfigurationMisuse<'a> {
    pub translator: &'a str,
    pub operation: &'static str,
    pub mode: Mode,
}

impl Display for ConfigurationMisuse<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Translator '{}' called '{}' in {} mode",
            self.translator, self.operation, self.mode
        )
    }
}

impl StructuredLog for ConfigurationMisuse<'_> {
    fn log(&self) {
        tracing::error!(
            translator = self.translator,
            operation = self.operation,
            mode = self.mode.as_str(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "configuration_misuse",
            span_name = name,
            translator = self.translator,
            operation = self.operation,
        )
    }
}

/// An outbound item had nowhere to go and was dropped.
///
/// Only reachable when a sequenced translator's ports are driven by hand,
/// since the transform is bypassed in that mode.
///
/// # Log Level
/// `warn!` - Data discarded
pub struct OutboundDiscarded<'a> {
    pub translator: &'a str,
    pub mode: Mode,
}

impl Display for OutboundDiscarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Translator '{}' discarded an outbound item: {} mode has no outbound channel",
            self.translator, self.mode
        )
    }
}

impl StructuredLog for OutboundDiscarded<'_> {
    fn log(&self) {
        tracing::warn!(translator = self.translator, mode = self.mode.as_str(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("outbound_discarded", span_name = name, translator = self.translator)
    }
}

/// Writing a record to an item log failed.
///
/// # Log Level
/// `warn!` - The item itself still flows; only the record is lost
pub struct ItemLogWriteFailed<'a> {
    pub path: &'a Path,
    pub error: &'a std::io::Error,
}

impl Display for ItemLogWriteFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to write item record to '{}': {}",
            self.path.display(),
            self.error
        )
    }
}

impl StructuredLog for ItemLogWriteFailed<'_> {
    fn log(&self) {
        tracing::warn!(path = %self.path.display(), error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("item_log", span_name = name, path = %self.path.display())
    }
}

/// Item log flushed and closed on teardown.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct ItemLogClosed<'a> {
    pub path: &'a Path,
    pub records: u64,
}

impl Display for ItemLogClosed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Closed item log '{}' after {} records",
            self.path.display(),
            self.records
        )
    }
}

impl StructuredLog for ItemLogClosed<'_> {
    fn log(&self) {
        tracing::debug!(path = %self.path.display(), records = self.records, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("item_log", span_name = name, path = %self.path.display())
    }
}

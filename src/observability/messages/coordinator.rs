// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the background coordinator.
//!
//! The coordinator runs transform passes on behalf of non-blocking polls in
//! `ActiveDirect` mode. These messages are mostly `debug!`/`trace!` because a
//! busy pipeline polls constantly.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Background worker spawned by the first poll.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct CoordinatorSpawned<'a> {
    pub translator: &'a str,
}

impl Display for CoordinatorSpawned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Translator '{}' spawned its background coordinator", self.translator)
    }
}

impl StructuredLog for CoordinatorSpawned<'_> {
    fn log(&self) {
        tracing::debug!(translator = self.translator, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("coordinator", span_name = name, translator = self.translator)
    }
}

/// A background transform pass started.
///
/// # Log Level
/// `trace!` - One per pass
pub struct PassStarted<'a> {
    pub translator: &'a str,
    pub requested: u64,
    pub done: u64,
}

impl Display for PassStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Translator '{}' background pass started: requested={}, done={}",
            self.translator, self.requested, self.done
        )
    }
}

impl StructuredLog for PassStarted<'_> {
    fn log(&self) {
        tracing::trace!(
            translator = self.translator,
            requested = self.requested,
            done = self.done,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "coordinator_pass",
            span_name = name,
            translator = self.translator,
            requested = self.requested,
        )
    }
}

/// A background transform pass completed.
///
/// # Log Level
/// `trace!` - One per pass
pub struct PassCompleted<'a> {
    pub translator: &'a str,
    pub requested: u64,
    pub passes: u64,
}

impl Display for PassCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Translator '{}' background pass completed: done={}, total passes={}",
            self.translator, self.requested, self.passes
        )
    }
}

impl StructuredLog for PassCompleted<'_> {
    fn log(&self) {
        tracing::trace!(
            translator = self.translator,
            done = self.requested,
            passes = self.passes,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("coordinator_pass", span_name = name, translator = self.translator)
    }
}

/// A background pass returned an error; the worker stops.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct PassFailed<'a> {
    pub translator: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for PassFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Translator '{}' background pass failed, coordinator stopping: {}",
            self.translator, self.error
        )
    }
}

impl StructuredLog for PassFailed<'_> {
    fn log(&self) {
        tracing::error!(translator = self.translator, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("coordinator_pass", span_name = name, translator = self.translator)
    }
}

/// Background worker stopped by teardown.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct CoordinatorStopped<'a> {
    pub translator: &'a str,
    pub passes: u64,
}

impl Display for CoordinatorStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Translator '{}' background coordinator stopped after {} passes",
            self.translator, self.passes
        )
    }
}

impl StructuredLog for CoordinatorStopped<'_> {
    fn log(&self) {
        tracing::debug!(translator = self.translator, passes = self.passes, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("coordinator", span_name = name, translator = self.translator)
    }
}

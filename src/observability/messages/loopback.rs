// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the loopback harness.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Loopback run starting.
///
/// # Log Level
/// `info!` - Important operational event
pub struct LoopbackStarted {
    pub words: usize,
    pub width: u8,
    pub seed: u64,
    pub polled: bool,
}

impl Display for LoopbackStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loopback started: {} words of {} bits, seed={}, polled={}",
            self.words, self.width, self.seed, self.polled
        )
    }
}

impl StructuredLog for LoopbackStarted {
    fn log(&self) {
        tracing::info!(
            words = self.words,
            width = self.width,
            seed = self.seed,
            polled = self.polled,
            "{}",
            self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "loopback",
            span_name = name,
            words = self.words,
            seed = self.seed,
            polled = self.polled
        )
    }
}

/// Every expected word came back from the analysis chain.
///
/// # Log Level
/// `info!` when the round trip matched, `warn!` otherwise
pub struct LoopbackCompleted {
    pub words_sent: usize,
    pub words_expected: usize,
    pub words_received: usize,
    pub mismatches: usize,
}

impl Display for LoopbackCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loopback completed: sent={}, expected={}, received={}, mismatches={}",
            self.words_sent, self.words_expected, self.words_received, self.mismatches
        )
    }
}

impl StructuredLog for LoopbackCompleted {
    fn log(&self) {
        if self.mismatches == 0 && self.words_expected == self.words_received {
            tracing::info!(
                words_sent = self.words_sent,
                words_expected = self.words_expected,
                words_received = self.words_received,
                "{}",
                self
            );
        } else {
            tracing::warn!(
                words_sent = self.words_sent,
                words_expected = self.words_expected,
                words_received = self.words_received,
                mismatches = self.mismatches,
                "{}",
                self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("loopback", span_name = name, words_sent = self.words_sent)
    }
}

/// A stage's run-loop task could not be joined during teardown.
///
/// # Log Level
/// `warn!` - Teardown continues
pub struct AnalysisTaskLost<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for AnalysisTaskLost<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Analysis run loop task could not be joined: {}", self.error)
    }
}

impl StructuredLog for AnalysisTaskLost<'_> {
    fn log(&self) {
        tracing::warn!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("loopback", span_name = name)
    }
}

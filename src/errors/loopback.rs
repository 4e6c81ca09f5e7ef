// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::errors::{ConfigError, TranslatorError};

#[derive(Debug, Error)]
pub enum LoopbackError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("The {chain} chain has no stages")]
    EmptyChain { chain: &'static str },

    #[error("Stage '{stage}' could not be wired: {source}")]
    Wiring {
        stage: String,
        #[source]
        source: TranslatorError,
    },

    /// An analysis run loop ended before every word came back
    #[error("Analysis stage '{stage}' stopped: {source}")]
    AnalysisStopped {
        stage: String,
        #[source]
        source: TranslatorError,
    },

    /// The generation coordinator stopped before the link was fully carried
    #[error("Generation stage '{stage}' stopped after {carried} of {expected} link items")]
    GenerationStopped {
        stage: String,
        carried: usize,
        expected: usize,
    },

    #[error("Analysis chain closed after {received} of {expected} words")]
    AnalysisClosed { received: usize, expected: usize },
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating a pipeline configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read configuration '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the expected schema
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A stage references a transform that does not exist
    #[error("Stage '{stage_id}' uses unknown transform '{transform}' (available: {available})")]
    UnknownTransform {
        stage_id: String,
        transform: String,
        available: String,
    },

    /// A stage option is missing or has the wrong type
    #[error("Stage '{stage_id}' option '{option}' is invalid: {reason}")]
    InvalidOption {
        stage_id: String,
        option: String,
        reason: String,
    },

    /// The configuration is structurally valid but semantically wrong
    #[error("Configuration validation failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::MAX_BIT_WIDTH;
use crate::config::StageConfig;
use crate::errors::ConfigError;
use crate::traits::Transform;
use crate::transforms::{BitWord, Identity, Regroup};

/// A stock transform resolved from stage configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Identity,
    Regroup { from_width: u8, to_width: u8 },
}

impl TransformKind {
    /// Parse the `transform` name and its options.
    ///
    /// `regroup` requires integer `from_width` and `to_width` options in `1..=32`.
    pub fn from_stage(stage: &StageConfig) -> Result<Self, ConfigError> {
        match stage.transform.as_str() {
            "identity" => Ok(TransformKind::Identity),
            "regroup" => Ok(TransformKind::Regroup {
                from_width: width_option(stage, "from_width")?,
                to_width: width_option(stage, "to_width")?,
            }),
            other => Err(ConfigError::UnknownTransform {
                stage_id: stage.id.clone(),
                transform: other.to_string(),
                available: TransformFactory::list_available_implementations().join(", "),
            }),
        }
    }

    /// Width of the words this transform emits when fed `input_width`-bit words.
    pub fn output_width(&self, input_width: u8) -> u8 {
        match self {
            TransformKind::Identity => input_width,
            TransformKind::Regroup { to_width, .. } => *to_width,
        }
    }

    /// Width this transform expects, if it cares.
    pub fn input_width(&self) -> Option<u8> {
        match self {
            TransformKind::Identity => None,
            TransformKind::Regroup { from_width, .. } => Some(*from_width),
        }
    }

    pub fn create(&self) -> Box<dyn Transform<BitWord, BitWord>> {
        match self {
            TransformKind::Identity => Box::new(Identity::<BitWord>::new()),
            TransformKind::Regroup {
                from_width,
                to_width,
            } => Box::new(Regroup::new(*from_width, *to_width)),
        }
    }
}

/// Factory for creating stock transforms from stage configuration
pub struct TransformFactory;

impl TransformFactory {
    /// Create a transform instance from configuration
    ///
    /// The `transform` field in the stage determines which transform to create:
    /// - "identity" -> Identity
    /// - "regroup" -> Regroup (requires `from_width` and `to_width` options)
    pub fn create_transform(
        stage: &StageConfig,
    ) -> Result<Box<dyn Transform<BitWord, BitWord>>, ConfigError> {
        Ok(TransformKind::from_stage(stage)?.create())
    }

    /// List all available transform implementations
    pub fn list_available_implementations() -> Vec<&'static str> {
        vec!["identity", "regroup"]
    }
}

fn width_option(stage: &StageConfig, option: &str) -> Result<u8, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidOption {
        stage_id: stage.id.clone(),
        option: option.to_string(),
        reason,
    };

    let value = stage
        .options
        .get(option)
        .ok_or_else(|| invalid("missing".to_string()))?;
    let width = value
        .as_u64()
        .ok_or_else(|| invalid(format!("expected an integer, got {:?}", value)))?;

    if width == 0 || width > u64::from(MAX_BIT_WIDTH) {
        return Err(invalid(format!(
            "width {} is outside 1..={}",
            width, MAX_BIT_WIDTH
        )));
    }
    Ok(width as u8)
}

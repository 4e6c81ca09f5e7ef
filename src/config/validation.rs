// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Validation of loopback configurations.
//!
//! Checks, in order:
//!
//! 1. **Stimulus**: word width within `1..=32`, at least one word
//! 2. **Chains**: both chains have at least one stage
//! 3. **Uniqueness**: stage ids are unique across both chains
//! 4. **Modes**: generation stages are `ActiveDirect`, analysis stages are `Passive`
//! 5. **Transforms**: every stage names a known transform with valid options
//! 6. **Widths**: each stage's input width matches what the previous stage
//!    emits, and the analysis chain ends at the stimulus width
//!
//! All problems are collected so a bad file is fixed in one go.

use std::collections::HashSet;

use crate::config::consts::MAX_BIT_WIDTH;
use crate::config::{LoopbackConfig, Mode, StageConfig};
use crate::transforms::TransformKind;

/// Validate a loopback configuration, returning every problem found.
pub fn validate_loopback_config(cfg: &LoopbackConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if cfg.stimulus.width == 0 || cfg.stimulus.width > MAX_BIT_WIDTH {
        errors.push(format!(
            "stimulus width {} is outside 1..={}",
            cfg.stimulus.width, MAX_BIT_WIDTH
        ));
    }
    if cfg.stimulus.words == 0 {
        errors.push("stimulus must generate at least one word".to_string());
    }

    if cfg.generation.is_empty() {
        errors.push("generation chain has no stages".to_string());
    }
    if cfg.analysis.is_empty() {
        errors.push("analysis chain has no stages".to_string());
    }

    let mut seen = HashSet::new();
    for stage in cfg.generation.iter().chain(&cfg.analysis) {
        if !seen.insert(stage.id.as_str()) {
            errors.push(format!("duplicate stage id '{}'", stage.id));
        }
    }

    for stage in &cfg.generation {
        if stage.translator.mode() != Mode::ActiveDirect {
            errors.push(format!(
                "generation stage '{}' must be ActiveDirect, found {}",
                stage.id,
                stage.translator.mode()
            ));
        }
    }
    for stage in &cfg.analysis {
        if stage.translator.mode() != Mode::Passive {
            errors.push(format!(
                "analysis stage '{}' must be Passive, found {}",
                stage.id,
                stage.translator.mode()
            ));
        }
    }

    let mut width = cfg.stimulus.width;
    for stage in cfg.generation.iter().chain(&cfg.analysis) {
        match TransformKind::from_stage(stage) {
            Ok(kind) => {
                check_input_width(stage, &kind, width, &mut errors);
                width = kind.output_width(width);
            }
            Err(error) => errors.push(error.to_string()),
        }
    }
    if width != cfg.stimulus.width {
        errors.push(format!(
            "analysis chain ends at {} bits but the stimulus is {} bits wide",
            width, cfg.stimulus.width
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_input_width(stage: &StageConfig, kind: &TransformKind, width: u8, errors: &mut Vec<String>) {
    if let Some(expected) = kind.input_width() {
        if expected != width {
            errors.push(format!(
                "stage '{}' expects {}-bit words but receives {}-bit words",
                stage.id, expected, width
            ));
        }
    }
}

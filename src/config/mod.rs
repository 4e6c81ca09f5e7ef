// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod translator;
mod validation;

pub mod consts;

pub use loader::{
    load_and_validate_config, load_config, LinkConfig, LoopbackConfig, StageConfig,
    StimulusConfig,
};
pub use translator::{Mode, TranslatorConfig};
pub use validation::validate_loopback_config;

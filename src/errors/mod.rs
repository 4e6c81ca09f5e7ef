// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod loopback;
mod translator;

pub use config::ConfigError;
pub use loopback::LoopbackError;
pub use translator::{ChannelKind, TranslatorError};

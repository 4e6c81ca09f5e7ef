// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The translation engine: [`Translator`], its [`Ports`] and the background
//! coordinator behind non-blocking polls.

mod builder;
mod coordinator;
mod ports;
mod translator;

#[cfg(test)]
mod integration_tests;

pub use builder::TranslatorBuilder;
pub use coordinator::CoordinatorStats;
pub use ports::Ports;
pub use translator::{ActiveTranslator, InboundHandle, Translator};

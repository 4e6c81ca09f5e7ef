// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Flow-control regime a translator runs under.
///
/// Resolved once from the `active` and `sequenced` flags and never changed
/// for the lifetime of the translator:
///
/// | active | sequenced | mode            |
/// |--------|-----------|-----------------|
/// | false  | *         | Passive         |
/// | true   | false     | ActiveDirect    |
/// | true   | true      | ActiveSequenced |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Items are pushed in and pushed out; the translator loops its transform.
    Passive,
    /// Items are pulled in and pulled out; the transform runs on demand.
    ActiveDirect,
    /// Items are pulled out of an external source; the transform is bypassed.
    ActiveSequenced,
}

impl Mode {
    /// Resolve the mode from the two configuration flags.
    pub fn resolve(active: bool, sequenced: bool) -> Self {
        match (active, sequenced) {
            (false, _) => Mode::Passive,
            (true, false) => Mode::ActiveDirect,
            (true, true) => Mode::ActiveSequenced,
        }
    }

    pub fn is_active(self) -> bool {
        !matches!(self, Mode::Passive)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Passive => "Passive",
            Mode::ActiveDirect => "ActiveDirect",
            Mode::ActiveSequenced => "ActiveSequenced",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-translator configuration.
///
/// A translator takes its own copy at build time and exposes it read-only,
/// so changes made to the original value afterwards have no effect.
///
/// # Fields
/// * `active` - pull-driven (true) or push-driven (false)
/// * `sequenced` - in active mode, bypass the transform for an inline source
/// * `inbound_tap` - forward a clone of every acquired inbound item to observers
/// * `outbound_tap` - forward a clone of every delivered outbound item to observers
/// * `inbound_log` - append the string form of every inbound item to this file
/// * `outbound_log` - append the string form of every outbound item to this file
///
/// # Example
/// ```yaml
/// active: true
/// sequenced: false
/// outbound_tap: true
/// outbound_log: logs/pack_32_to_8.log
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub active: bool,
    pub sequenced: bool,
    pub inbound_tap: bool,
    pub outbound_tap: bool,
    pub inbound_log: Option<PathBuf>,
    pub outbound_log: Option<PathBuf>,
}

impl TranslatorConfig {
    /// Passive configuration with no taps and no logs
    pub fn passive() -> Self {
        Self::default()
    }

    /// Active configuration that runs the transform directly
    pub fn active_direct() -> Self {
        Self {
            active: true,
            ..Self::default()
        }
    }

    /// Active configuration that delegates to an inline source
    pub fn active_sequenced() -> Self {
        Self {
            active: true,
            sequenced: true,
            ..Self::default()
        }
    }

    pub fn with_inbound_tap(mut self) -> Self {
        self.inbound_tap = true;
        self
    }

    pub fn with_outbound_tap(mut self) -> Self {
        self.outbound_tap = true;
        self
    }

    pub fn with_inbound_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.inbound_log = Some(path.into());
        self
    }

    pub fn with_outbound_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.outbound_log = Some(path.into());
        self
    }

    pub fn mode(&self) -> Mode {
        Mode::resolve(self.active, self.sequenced)
    }
}

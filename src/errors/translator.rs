// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by a translator while it is being wired or while it runs.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::Mode;

/// The channels a translator can own, used to name what is missing or misused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Push-fed inbound FIFO (Passive)
    InboundBuffer,
    /// Upstream pull source (Active)
    Upstream,
    /// Downstream push sink (Passive)
    Downstream,
    /// Internal outbound FIFO drained by pulls (ActiveDirect)
    OutboundBuffer,
    /// Externally driven item source that replaces the transform (ActiveSequenced)
    InlineSource,
    /// Observer fan-out for inbound items
    InboundTap,
    /// Observer fan-out for outbound items
    OutboundTap,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelKind::InboundBuffer => "inbound buffer",
            ChannelKind::Upstream => "upstream pull source",
            ChannelKind::Downstream => "downstream push sink",
            ChannelKind::OutboundBuffer => "outbound buffer",
            ChannelKind::InlineSource => "inline source",
            ChannelKind::InboundTap => "inbound tap",
            ChannelKind::OutboundTap => "outbound tap",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum TranslatorError {
    /// An operation was called that the configured mode cannot support.
    ///
    /// This is a programmer error and terminates the run loop.
    #[error("'{operation}' is not available in {mode} mode")]
    ConfigurationMisuse {
        operation: &'static str,
        mode: Mode,
    },

    /// The builder was not given a channel the resolved mode requires
    #[error("{mode} mode requires a {channel}")]
    MissingChannel { mode: Mode, channel: ChannelKind },

    /// The builder was given a channel the resolved mode never creates
    #[error("{mode} mode does not use a {channel}")]
    UnexpectedChannel { mode: Mode, channel: ChannelKind },

    /// An observer was attached to a tap that the configuration leaves disabled
    #[error("cannot attach an observer: the {channel} is disabled in configuration")]
    TapDisabled { channel: ChannelKind },

    /// An item log could not be opened
    #[error("failed to open item log '{}': {source}", path.display())]
    LogSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

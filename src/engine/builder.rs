// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::{Mode, TranslatorConfig};
use crate::engine::ports::{Inbound, ItemLog, Outbound, Ports, Tap};
use crate::engine::translator::{
    ActiveFlow, ActiveTranslator, Flow, InboundHandle, Stage, Translator,
};
use crate::errors::{ChannelKind, TranslatorError};
use crate::observability::messages::translator::TranslatorBuilt;
use crate::observability::messages::StructuredLog;
use crate::traits::{Item, PullSource, PushSink, Transform};

/// Wires a [`Translator`] to its peers.
///
/// Which peers are required follows from the configured mode:
///
/// | mode            | required          | optional   | rejected              |
/// |-----------------|-------------------|------------|-----------------------|
/// | Passive         | `downstream`      |            | `upstream`, `inline`  |
/// | ActiveDirect    | `upstream`        |            | `downstream`, `inline`|
/// | ActiveSequenced | `inline_source`   | `upstream` | `downstream`          |
///
/// Tap observers may only be attached when the matching tap is enabled in
/// the configuration.
pub struct TranslatorBuilder<I: Item, O: Item> {
    name: Option<String>,
    config: TranslatorConfig,
    transform: Box<dyn Transform<I, O>>,
    upstream: Option<Box<dyn PullSource<I>>>,
    downstream: Option<Box<dyn PushSink<O>>>,
    inline: Option<Box<dyn PullSource<O>>>,
    inbound_observers: Vec<Box<dyn PushSink<I>>>,
    outbound_observers: Vec<Box<dyn PushSink<O>>>,
}

impl<I: Item, O: Item> TranslatorBuilder<I, O> {
    pub(crate) fn new(config: TranslatorConfig, transform: Box<dyn Transform<I, O>>) -> Self {
        Self {
            name: None,
            config,
            transform,
            upstream: None,
            downstream: None,
            inline: None,
            inbound_observers: Vec::new(),
            outbound_observers: Vec::new(),
        }
    }

    /// Name used in logs. Defaults to the transform's name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Upstream pull source (active modes).
    pub fn upstream(mut self, upstream: impl PullSource<I> + 'static) -> Self {
        self.upstream = Some(Box::new(upstream));
        self
    }

    /// Downstream push sink (Passive).
    pub fn downstream(mut self, downstream: impl PushSink<O> + 'static) -> Self {
        self.downstream = Some(Box::new(downstream));
        self
    }

    /// External item source that replaces the transform (ActiveSequenced).
    pub fn inline_source(mut self, inline: impl PullSource<O> + 'static) -> Self {
        self.inline = Some(Box::new(inline));
        self
    }

    /// Observer receiving a clone of every acquired inbound item.
    pub fn inbound_observer(mut self, observer: impl PushSink<I> + 'static) -> Self {
        self.inbound_observers.push(Box::new(observer));
        self
    }

    /// Observer receiving a clone of every delivered outbound item.
    pub fn outbound_observer(mut self, observer: impl PushSink<O> + 'static) -> Self {
        self.outbound_observers.push(Box::new(observer));
        self
    }

    /// Resolve the mode, create exactly its channels and open the item logs.
    ///
    /// # Errors
    /// * [`TranslatorError::MissingChannel`] / [`TranslatorError::UnexpectedChannel`]
    ///   when the peers given don't match the mode
    /// * [`TranslatorError::TapDisabled`] when an observer targets a disabled tap
    /// * [`TranslatorError::LogSink`] when an item log cannot be opened
    pub fn build(self) -> Result<Translator<I, O>, TranslatorError> {
        let TranslatorBuilder {
            name,
            config,
            transform,
            upstream,
            downstream,
            inline,
            inbound_observers,
            outbound_observers,
        } = self;

        let mode = config.mode();
        let name: Arc<str> = name.unwrap_or_else(|| transform.name().to_string()).into();
        let mut channels = Vec::new();

        if !config.inbound_tap && !inbound_observers.is_empty() {
            return Err(TranslatorError::TapDisabled {
                channel: ChannelKind::InboundTap,
            });
        }
        if !config.outbound_tap && !outbound_observers.is_empty() {
            return Err(TranslatorError::TapDisabled {
                channel: ChannelKind::OutboundTap,
            });
        }

        let (inbound, outbound, flow) = match mode {
            Mode::Passive => {
                reject(mode, ChannelKind::Upstream, upstream.is_some())?;
                reject(mode, ChannelKind::InlineSource, inline.is_some())?;
                let downstream = require(mode, ChannelKind::Downstream, downstream)?;

                let (sender, receiver) = mpsc::unbounded_channel();
                channels.push(ChannelKind::InboundBuffer);
                channels.push(ChannelKind::Downstream);
                (
                    Inbound::Buffered(receiver),
                    Outbound::Push(downstream),
                    Flow::Passive {
                        inbound: InboundHandle::new(sender),
                    },
                )
            }
            Mode::ActiveDirect => {
                reject(mode, ChannelKind::Downstream, downstream.is_some())?;
                reject(mode, ChannelKind::InlineSource, inline.is_some())?;
                let upstream = require(mode, ChannelKind::Upstream, upstream)?;

                let (sender, receiver) = mpsc::unbounded_channel();
                channels.push(ChannelKind::Upstream);
                channels.push(ChannelKind::OutboundBuffer);
                (
                    Inbound::Pull(upstream),
                    Outbound::Buffered(sender),
                    Flow::Active(ActiveFlow::Direct {
                        outbound: receiver,
                        coordinator: None,
                    }),
                )
            }
            Mode::ActiveSequenced => {
                reject(mode, ChannelKind::Downstream, downstream.is_some())?;
                let inline = require(mode, ChannelKind::InlineSource, inline)?;

                let inbound = match upstream {
                    Some(upstream) => {
                        channels.push(ChannelKind::Upstream);
                        Inbound::Pull(upstream)
                    }
                    None => Inbound::Detached,
                };
                channels.push(ChannelKind::InlineSource);
                (
                    inbound,
                    Outbound::Bypassed,
                    Flow::Active(ActiveFlow::Sequenced { inline }),
                )
            }
        };

        let inbound_tap = config.inbound_tap.then(|| {
            channels.push(ChannelKind::InboundTap);
            Tap::new(inbound_observers)
        });
        let outbound_tap = config.outbound_tap.then(|| {
            channels.push(ChannelKind::OutboundTap);
            Tap::new(outbound_observers)
        });

        let inbound_log = config.inbound_log.as_deref().map(ItemLog::open).transpose()?;
        let outbound_log = config.outbound_log.as_deref().map(ItemLog::open).transpose()?;

        let ports = Ports::new(
            Arc::clone(&name),
            mode,
            inbound,
            outbound,
            inbound_tap,
            outbound_tap,
            inbound_log,
            outbound_log,
        );

        TranslatorBuilt {
            translator: &name,
            mode,
            inbound_tap: config.inbound_tap,
            outbound_tap: config.outbound_tap,
        }
        .log();

        Ok(Translator::from_parts(
            name,
            config,
            channels,
            Stage { transform, ports },
            flow,
        ))
    }

    /// [`build`](Self::build) followed by [`Translator::into_active`].
    ///
    /// # Errors
    /// Everything `build` reports, plus
    /// [`TranslatorError::ConfigurationMisuse`] when the configuration
    /// resolves to Passive.
    pub fn build_active(self) -> Result<ActiveTranslator<I, O>, TranslatorError> {
        self.build()?.into_active()
    }
}

fn require<T>(mode: Mode, channel: ChannelKind, value: Option<T>) -> Result<T, TranslatorError> {
    value.ok_or(TranslatorError::MissingChannel { mode, channel })
}

fn reject(mode: Mode, channel: ChannelKind, present: bool) -> Result<(), TranslatorError> {
    if present {
        return Err(TranslatorError::UnexpectedChannel { mode, channel });
    }
    Ok(())
}

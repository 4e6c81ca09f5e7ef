// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The translator: one [`Transform`] run under one of three flow-control
//! regimes.
//!
//! # Modes
//!
//! * **Passive** - an upstream pushes items in through an [`InboundHandle`],
//!   the translator loops its transform in [`Translator::run`], and outbound
//!   items are pushed to the downstream sink. Used on the analysis side.
//! * **ActiveDirect** - the translator pulls from its upstream and a
//!   downstream peer pulls from the translator through [`PullSource`].
//!   `get_next` runs the transform inline when nothing is buffered;
//!   `try_next` hands the work to a background coordinator so a polling
//!   caller never waits on the transform. Used on the generation side.
//! * **ActiveSequenced** - every pull is delegated to an inline source and
//!   the transform is bypassed.
//!
//! The mode is resolved once from [`TranslatorConfig`] when the translator is
//! built and cannot change afterwards; only the channels that mode needs are
//! ever created (see [`Translator::channels`]).
//!
//! The pull adapter only exists in the active modes, so it lives on a
//! separate type: [`Translator::into_active`] (or
//! [`TranslatorBuilder::build_active`]) yields an [`ActiveTranslator`], and a
//! Passive translator refuses the conversion with
//! [`TranslatorError::ConfigurationMisuse`].
//!
//! # Examples
//!
//! ## Passive identity translator
//! ```rust
//! use layered_translator::config::TranslatorConfig;
//! use layered_translator::engine::Translator;
//! use layered_translator::transforms::Identity;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (sink, mut received) = tokio::sync::mpsc::unbounded_channel();
//! let mut translator = Translator::builder(TranslatorConfig::passive(), Identity::new())
//!     .downstream(sink)
//!     .build()?;
//!
//! let inbound = translator.inbound_handle().expect("passive translators accept pushes");
//! tokio::spawn(async move { translator.run().await });
//!
//! inbound.deliver(7u32);
//! assert_eq!(received.recv().await, Some(7));
//! # Ok(())
//! # }
//! ```
//!
//! ## Active translator pulled by a downstream peer
//! ```rust
//! use layered_translator::adapters::VecSource;
//! use layered_translator::config::TranslatorConfig;
//! use layered_translator::engine::Translator;
//! use layered_translator::traits::PullSource;
//! use layered_translator::transforms::Identity;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut translator = Translator::builder(TranslatorConfig::active_direct(), Identity::new())
//!     .upstream(VecSource::new(vec![1u32, 2, 3]))
//!     .build_active()?;
//!
//! assert_eq!(translator.get_next().await, 1);
//! assert_eq!(translator.try_next().await, Some(2));
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

use crate::config::{Mode, TranslatorConfig};
use crate::engine::builder::TranslatorBuilder;
use crate::engine::coordinator::{Coordinator, CoordinatorStats};
use crate::engine::ports::Ports;
use crate::errors::{ChannelKind, TranslatorError};
use crate::observability::messages::coordinator::PassFailed;
use crate::observability::messages::translator::{
    ConfigurationMisuse, RunLoopSkipped, RunLoopStarted, RunLoopTerminated,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Item, PullSource, PushSink, Transform};

/// The transform together with the ports it runs against.
///
/// Shared between the translator and its background coordinator; the mutex
/// makes sure only one pass owns the transform state at a time.
pub(crate) struct Stage<I: Item, O: Item> {
    pub(crate) transform: Box<dyn Transform<I, O>>,
    pub(crate) ports: Ports<I, O>,
}

impl<I: Item, O: Item> Stage<I, O> {
    pub(crate) async fn run_pass(&mut self) -> Result<(), TranslatorError> {
        let Stage { transform, ports } = self;
        transform.transform(ports).await
    }
}

/// Push boundary of a passive translator.
///
/// Cheap to clone; items are buffered FIFO with no backpressure.
#[derive(Clone)]
pub struct InboundHandle<I: Item> {
    sender: UnboundedSender<I>,
}

impl<I: Item> InboundHandle<I> {
    pub(crate) fn new(sender: UnboundedSender<I>) -> Self {
        Self { sender }
    }

    pub fn deliver(&self, item: I) {
        // The receiver lives as long as the translator's ports.
        if self.sender.send(item).is_err() {
            tracing::debug!("translator dropped; inbound item discarded");
        }
    }
}

impl<I: Item> PushSink<I> for InboundHandle<I> {
    fn push(&mut self, item: I) {
        self.deliver(item);
    }
}

/// Mode-specific state that lives outside the transform.
pub(crate) enum Flow<I: Item, O: Item> {
    Passive { inbound: InboundHandle<I> },
    Active(ActiveFlow<O>),
}

pub(crate) enum ActiveFlow<O: Item> {
    Direct {
        outbound: UnboundedReceiver<O>,
        coordinator: Option<Coordinator>,
    },
    Sequenced {
        inline: Box<dyn PullSource<O>>,
    },
}

/// State shared by both translator handles.
struct Core<I: Item, O: Item> {
    name: Arc<str>,
    config: TranslatorConfig,
    mode: Mode,
    channels: Vec<ChannelKind>,
    stage: Arc<Mutex<Stage<I, O>>>,
}

/// A stream translator. See the [module documentation](self).
pub struct Translator<I: Item, O: Item> {
    core: Core<I, O>,
    flow: Flow<I, O>,
}

impl<I: Item, O: Item> Translator<I, O> {
    /// Start wiring a translator around `transform`.
    pub fn builder(
        config: TranslatorConfig,
        transform: impl Transform<I, O>,
    ) -> TranslatorBuilder<I, O> {
        TranslatorBuilder::new(config, Box::new(transform))
    }

    pub(crate) fn from_parts(
        name: Arc<str>,
        config: TranslatorConfig,
        channels: Vec<ChannelKind>,
        stage: Stage<I, O>,
        flow: Flow<I, O>,
    ) -> Self {
        Self {
            core: Core {
                name,
                mode: config.mode(),
                config,
                channels,
                stage: Arc::new(Mutex::new(stage)),
            },
            flow,
        }
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn mode(&self) -> Mode {
        self.core.mode
    }

    /// The configuration this translator was built with.
    pub fn config(&self) -> &TranslatorConfig {
        &self.core.config
    }

    /// Channels materialized at build time, in creation order.
    pub fn channels(&self) -> &[ChannelKind] {
        &self.core.channels
    }

    pub fn has_channel(&self, kind: ChannelKind) -> bool {
        self.core.channels.contains(&kind)
    }

    /// Push boundary for upstream producers. `None` unless Passive.
    pub fn inbound_handle(&self) -> Option<InboundHandle<I>> {
        match &self.flow {
            Flow::Passive { inbound } => Some(inbound.clone()),
            Flow::Active(_) => None,
        }
    }

    /// Turn an active translator into its pull adapter.
    ///
    /// # Errors
    /// [`TranslatorError::ConfigurationMisuse`] for a Passive translator,
    /// which has no pull adapter.
    pub fn into_active(self) -> Result<ActiveTranslator<I, O>, TranslatorError> {
        match self.flow {
            Flow::Active(flow) => Ok(ActiveTranslator {
                core: self.core,
                flow,
            }),
            Flow::Passive { .. } => {
                ConfigurationMisuse {
                    translator: &self.core.name,
                    operation: "pull",
                    mode: self.core.mode,
                }
                .log();
                Err(TranslatorError::ConfigurationMisuse {
                    operation: "pull",
                    mode: self.core.mode,
                })
            }
        }
    }

    /// Passive run loop: invoke the transform over and over for the life of
    /// the pipeline.
    ///
    /// Returns `Ok(())` straight away in the active modes, where pulls drive
    /// the transform. In Passive mode it only returns when a pass fails.
    /// Each pass is expected to suspend on `get_inbound` when no input is
    /// buffered.
    ///
    /// # Errors
    /// The first error a pass returns, typically
    /// [`TranslatorError::ConfigurationMisuse`].
    pub async fn run(&mut self) -> Result<(), TranslatorError> {
        let core = &self.core;
        if !matches!(self.flow, Flow::Passive { .. }) {
            RunLoopSkipped {
                translator: &core.name,
                mode: core.mode,
            }
            .log();
            return Ok(());
        }

        RunLoopStarted {
            translator: &core.name,
        }
        .log();

        let mut stage = core.stage.lock().await;
        let mut passes = 0u64;
        loop {
            if let Err(error) = stage.run_pass().await {
                RunLoopTerminated {
                    translator: &core.name,
                    passes,
                    error: &error,
                }
                .log();
                return Err(error);
            }
            passes += 1;
        }
    }

    /// Teardown: close the item logs.
    pub async fn close(&mut self) {
        self.core.stage.lock().await.ports.close_logs();
    }
}

/// An ActiveDirect or ActiveSequenced translator, pulled by its downstream
/// peer through [`PullSource`].
pub struct ActiveTranslator<I: Item, O: Item> {
    core: Core<I, O>,
    flow: ActiveFlow<O>,
}

impl<I: Item, O: Item> ActiveTranslator<I, O> {
    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn mode(&self) -> Mode {
        self.core.mode
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.core.config
    }

    pub fn channels(&self) -> &[ChannelKind] {
        &self.core.channels
    }

    pub fn has_channel(&self, kind: ChannelKind) -> bool {
        self.core.channels.contains(&kind)
    }

    /// Counters of the background coordinator, once the first poll has started it.
    pub fn coordinator_stats(&self) -> Option<CoordinatorStats> {
        match &self.flow {
            ActiveFlow::Direct {
                coordinator: Some(coordinator),
                ..
            } => Some(coordinator.stats()),
            _ => None,
        }
    }

    /// Whether a started coordinator has stopped running passes, which
    /// happens when a background pass fails. Later polls return `None`.
    pub fn coordinator_stopped(&self) -> bool {
        match &self.flow {
            ActiveFlow::Direct {
                coordinator: Some(coordinator),
                ..
            } => coordinator.is_stopped(),
            _ => false,
        }
    }

    /// Active translators have no run loop; this returns at once.
    pub async fn run(&mut self) -> Result<(), TranslatorError> {
        RunLoopSkipped {
            translator: &self.core.name,
            mode: self.core.mode,
        }
        .log();
        Ok(())
    }

    /// Teardown: stop the background coordinator and close the item logs.
    pub async fn close(&mut self) {
        if let ActiveFlow::Direct { coordinator, .. } = &mut self.flow {
            if let Some(mut coordinator) = coordinator.take() {
                coordinator.stop().await;
            }
        }

        self.core.stage.lock().await.ports.close_logs();
    }
}

/// Downstream pull boundary.
#[async_trait]
impl<I: Item, O: Item> PullSource<O> for ActiveTranslator<I, O> {
    /// Sequenced: the inline source's `get_next`. Direct: the next buffered
    /// item, running the transform inline until one is produced. Suspends
    /// for as long as the transform waits on its input.
    async fn get_next(&mut self) -> O {
        let core = &self.core;
        match &mut self.flow {
            ActiveFlow::Sequenced { inline } => inline.get_next().await,
            ActiveFlow::Direct { outbound, .. } => loop {
                if let Ok(item) = outbound.try_recv() {
                    return item;
                }

                // A background pass may hold the stage while it waits for more
                // input, after it has already delivered.
                let mut stage = tokio::select! {
                    biased;
                    Some(item) = outbound.recv() => return item,
                    stage = core.stage.lock() => stage,
                };
                if let Ok(item) = outbound.try_recv() {
                    return item;
                }
                if let Err(error) = stage.run_pass().await {
                    PassFailed {
                        translator: &core.name,
                        error: &error,
                    }
                    .log();
                    return std::future::pending().await;
                }
            },
        }
    }

    /// Sequenced: the inline source's `try_next`. Direct: request a
    /// background pass, give it two scheduling rounds, then read the buffer
    /// without waiting.
    async fn try_next(&mut self) -> Option<O> {
        match &mut self.flow {
            ActiveFlow::Sequenced { inline } => inline.try_next().await,
            ActiveFlow::Direct {
                outbound,
                coordinator,
            } => {
                let core = &self.core;
                let coordinator =
                    coordinator.get_or_insert_with(|| Coordinator::spawn(&core.name, &core.stage));
                coordinator.request();

                // First round lets the worker see the request and start a pass,
                // second lets that pass run up to its first suspension point.
                tokio::task::yield_now().await;
                tokio::task::yield_now().await;

                outbound.try_recv().ok()
            }
        }
    }

    fn item_done(&mut self, item: Option<&O>) {
        if let ActiveFlow::Sequenced { inline } = &mut self.flow {
            inline.item_done(item);
        }
    }

    async fn wait_for_sequences(&mut self) {
        match &mut self.flow {
            ActiveFlow::Sequenced { inline } => inline.wait_for_sequences().await,
            ActiveFlow::Direct { .. } => tokio::task::yield_now().await,
        }
    }

    fn has_available(&self) -> bool {
        match &self.flow {
            ActiveFlow::Sequenced { inline } => inline.has_available(),
            ActiveFlow::Direct { outbound, .. } => !outbound.is_empty(),
        }
    }

    fn put(&mut self, item: O) {
        if let ActiveFlow::Sequenced { inline } = &mut self.flow {
            inline.put(item);
        }
    }

    fn put_response(&mut self, item: O) {
        if let ActiveFlow::Sequenced { inline } = &mut self.flow {
            inline.put_response(item);
        }
    }
}

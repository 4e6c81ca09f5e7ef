// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Inbound acquisition and outbound delivery, as seen by a [`Transform`].
//!
//! A translator materializes exactly the channels its [`Mode`] needs and
//! hands them to the transform as a [`Ports`] value:
//!
//! ```text
//!               inbound                         outbound
//! Passive          push -> FIFO -> get_inbound   put_outbound -> push sink
//! ActiveDirect     upstream pull -> get_inbound  put_outbound -> FIFO -> pull
//! ActiveSequenced  upstream pull (optional)      (bypassed)
//! ```
//!
//! Every acquired inbound item is recorded in the inbound log and cloned to
//! the inbound tap; every delivered outbound item is cloned to the outbound
//! tap and recorded in the outbound log. Taps and logs are fixed at build
//! time.
//!
//! [`Transform`]: crate::traits::Transform

use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::config::Mode;
use crate::errors::TranslatorError;
use crate::observability::messages::translator::{
    ConfigurationMisuse, ItemLogClosed, ItemLogWriteFailed, OutboundDiscarded,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Item, PullSource, PushSink};

pub(crate) enum Inbound<I: Item> {
    /// Push-fed FIFO (Passive)
    Buffered(UnboundedReceiver<I>),
    /// Upstream peer (Active)
    Pull(Box<dyn PullSource<I>>),
    /// Sequenced translator wired without an upstream
    Detached,
}

pub(crate) enum Outbound<O: Item> {
    /// Downstream peer (Passive)
    Push(Box<dyn PushSink<O>>),
    /// FIFO drained by the pull adapter (ActiveDirect)
    Buffered(UnboundedSender<O>),
    /// No outbound channel (ActiveSequenced)
    Bypassed,
}

/// Fan-out of cloned items to independent observers.
pub(crate) struct Tap<T: Item> {
    observers: Vec<Box<dyn PushSink<T>>>,
}

impl<T: Item> Tap<T> {
    pub(crate) fn new(observers: Vec<Box<dyn PushSink<T>>>) -> Self {
        Self { observers }
    }

    fn forward(&mut self, item: &T) {
        for observer in &mut self.observers {
            observer.push(item.clone());
        }
    }
}

/// Append-only record of item string forms, one line per item.
pub(crate) struct ItemLog {
    path: PathBuf,
    writer: BufWriter<File>,
    records: u64,
}

impl ItemLog {
    pub(crate) fn open(path: &Path) -> Result<Self, TranslatorError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| TranslatorError::LogSink {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            records: 0,
        })
    }

    fn record(&mut self, item: &dyn Display) {
        match writeln!(self.writer, "{}", item) {
            Ok(()) => self.records += 1,
            Err(error) => ItemLogWriteFailed {
                path: &self.path,
                error: &error,
            }
            .log(),
        }
    }

    fn close(mut self) {
        if let Err(error) = self.writer.flush() {
            ItemLogWriteFailed {
                path: &self.path,
                error: &error,
            }
            .log();
        }
        ItemLogClosed {
            path: &self.path,
            records: self.records,
        }
        .log();
    }
}

/// The acquisition and delivery surface a transform works against.
///
/// Built by [`TranslatorBuilder`](crate::engine::TranslatorBuilder); a
/// transform only ever receives it by `&mut` for the duration of a pass.
pub struct Ports<I: Item, O: Item> {
    translator: Arc<str>,
    mode: Mode,
    inbound: Inbound<I>,
    outbound: Outbound<O>,
    inbound_tap: Option<Tap<I>>,
    outbound_tap: Option<Tap<O>>,
    inbound_log: Option<ItemLog>,
    outbound_log: Option<ItemLog>,
}

impl<I: Item, O: Item> Ports<I, O> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        translator: Arc<str>,
        mode: Mode,
        inbound: Inbound<I>,
        outbound: Outbound<O>,
        inbound_tap: Option<Tap<I>>,
        outbound_tap: Option<Tap<O>>,
        inbound_log: Option<ItemLog>,
        outbound_log: Option<ItemLog>,
    ) -> Self {
        Self {
            translator,
            mode,
            inbound,
            outbound,
            inbound_tap,
            outbound_tap,
            inbound_log,
            outbound_log,
        }
    }

    /// Name of the owning translator
    pub fn translator(&self) -> &str {
        &self.translator
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Suspend until an inbound item is available.
    ///
    /// Passive: next item from the push-fed FIFO, in arrival order.
    /// Active: the upstream's `get`. If the upstream has ended this never
    /// returns, which is the expected shape of a finished stream.
    pub async fn get_inbound(&mut self) -> I {
        let item = match &mut self.inbound {
            Inbound::Buffered(buffer) => match buffer.recv().await {
                Some(item) => item,
                None => std::future::pending().await,
            },
            Inbound::Pull(upstream) => upstream.get().await,
            Inbound::Detached => std::future::pending().await,
        };

        self.observe_inbound(&item);
        item
    }

    /// Non-blocking inbound poll.
    ///
    /// Yields once so peers scheduled in the same round can produce first,
    /// then takes an upstream item if one is ready.
    ///
    /// # Errors
    /// [`TranslatorError::ConfigurationMisuse`] in Passive mode, which has no
    /// pull-capable inbound source.
    pub async fn try_inbound(&mut self) -> Result<Option<I>, TranslatorError> {
        if self.mode == Mode::Passive {
            ConfigurationMisuse {
                translator: &self.translator,
                operation: "try_inbound",
                mode: self.mode,
            }
            .log();
            return Err(TranslatorError::ConfigurationMisuse {
                operation: "try_inbound",
                mode: self.mode,
            });
        }

        tokio::task::yield_now().await;

        let item = match &mut self.inbound {
            Inbound::Pull(upstream) => {
                let item = upstream.try_next().await;
                if let Some(item) = &item {
                    upstream.item_done(Some(item));
                }
                item
            }
            Inbound::Buffered(_) | Inbound::Detached => None,
        };

        if let Some(item) = &item {
            self.observe_inbound(item);
        }
        Ok(item)
    }

    /// Deliver a clone of `item`; the caller keeps its own copy.
    pub fn put_outbound(&mut self, item: &O) {
        self.put_outbound_no_clone(item.clone());
    }

    /// Deliver `item` itself. Never suspends.
    pub fn put_outbound_no_clone(&mut self, item: O) {
        if let Some(tap) = &mut self.outbound_tap {
            tap.forward(&item);
        }
        if let Some(log) = &mut self.outbound_log {
            log.record(&item);
        }

        match &mut self.outbound {
            Outbound::Push(downstream) => downstream.push(item),
            Outbound::Buffered(buffer) => {
                // The receiver lives in the translator, so this only fails during teardown.
                if buffer.send(item).is_err() {
                    tracing::debug!(translator = %self.translator, "outbound buffer closed; item discarded");
                }
            }
            Outbound::Bypassed => OutboundDiscarded {
                translator: &self.translator,
                mode: self.mode,
            }
            .log(),
        }
    }

    fn observe_inbound(&mut self, item: &I) {
        if let Some(log) = &mut self.inbound_log {
            log.record(item);
        }
        if let Some(tap) = &mut self.inbound_tap {
            tap.forward(item);
        }
    }

    /// Flush and close both item logs. Later items are no longer recorded.
    pub(crate) fn close_logs(&mut self) {
        if let Some(log) = self.inbound_log.take() {
            log.close();
        }
        if let Some(log) = self.outbound_log.take() {
            log.close();
        }
    }
}

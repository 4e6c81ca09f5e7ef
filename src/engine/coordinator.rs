// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Background coordinator for `ActiveDirect` translators.
//!
//! A non-blocking consumer (`try_next`) must never run the transform on its
//! own path, because the transform may suspend waiting for inbound items.
//! Instead each poll bumps a request counter and a long-lived worker runs
//! passes on its behalf:
//!
//! ```text
//! try_next:  requested += 1 -> yield -> yield -> read outbound FIFO
//!
//! worker:    loop {
//!                wait until requested != done
//!                seen = requested
//!                run one transform pass      (may suspend)
//!                done = seen
//!            }
//! ```
//!
//! Because `done` is set to the value seen when the pass *began*, any number
//! of polls that land while a pass is in flight leave exactly one unmatched
//! request behind, so they collapse into a single follow-up pass.
//!
//! The request counter is a `tokio::sync::watch` channel so the worker sleeps
//! until the next poll instead of spinning.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine::translator::Stage;
use crate::observability::messages::coordinator::{
    CoordinatorSpawned, CoordinatorStopped, PassCompleted, PassFailed, PassStarted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::Item;

/// Read-only snapshot of a coordinator's counters.
///
/// `done <= requested` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoordinatorStats {
    /// Polls received so far
    pub requested: u64,
    /// Request value observed at the start of the last completed pass
    pub done: u64,
    /// Background passes completed
    pub passes: u64,
}

#[derive(Default)]
struct Counters {
    done: AtomicU64,
    passes: AtomicU64,
}

pub(crate) struct Coordinator {
    translator: Arc<str>,
    requests: watch::Sender<u64>,
    counters: Arc<Counters>,
    shutdown: CancellationToken,
    worker: JoinHandle<()>,
}

impl Coordinator {
    /// Spawn the worker. It idles until the first request arrives.
    pub(crate) fn spawn<I: Item, O: Item>(
        translator: &Arc<str>,
        stage: &Arc<Mutex<Stage<I, O>>>,
    ) -> Self {
        let (requests, observed) = watch::channel(0u64);
        let counters = Arc::new(Counters::default());
        let shutdown = CancellationToken::new();

        let worker = {
            let translator = Arc::clone(translator);
            let stage = Arc::clone(stage);
            let counters = Arc::clone(&counters);
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = shutdown.cancelled() => {}
                    _ = Self::work(translator, stage, observed, counters) => {}
                }
            })
        };

        CoordinatorSpawned { translator }.log();

        Self {
            translator: Arc::clone(translator),
            requests,
            counters,
            shutdown,
            worker,
        }
    }

    /// Record one poll. Returns the new request count.
    pub(crate) fn request(&self) -> u64 {
        let mut requested = 0;
        self.requests.send_modify(|value| {
            *value += 1;
            requested = *value;
        });
        requested
    }

    pub(crate) fn stats(&self) -> CoordinatorStats {
        CoordinatorStats {
            requested: *self.requests.borrow(),
            done: self.counters.done.load(Ordering::Acquire),
            passes: self.counters.passes.load(Ordering::Acquire),
        }
    }

    /// The worker has ended, either after a failed pass or after `stop`.
    pub(crate) fn is_stopped(&self) -> bool {
        self.worker.is_finished()
    }

    /// Stop the worker and wait for it to release the transform.
    pub(crate) async fn stop(&mut self) {
        self.shutdown.cancel();
        // A cancelled or panicked worker has nothing left to report.
        let _ = (&mut self.worker).await;

        CoordinatorStopped {
            translator: &self.translator,
            passes: self.counters.passes.load(Ordering::Acquire),
        }
        .log();
    }

    async fn work<I: Item, O: Item>(
        translator: Arc<str>,
        stage: Arc<Mutex<Stage<I, O>>>,
        mut observed: watch::Receiver<u64>,
        counters: Arc<Counters>,
    ) {
        let mut done = 0u64;

        loop {
            let requested = match observed.wait_for(|requested| *requested != done).await {
                Ok(requested) => *requested,
                // Sender dropped: the translator is gone.
                Err(_) => break,
            };

            PassStarted {
                translator: &translator,
                requested,
                done,
            }
            .log();

            let result = stage.lock().await.run_pass().await;
            if let Err(error) = result {
                PassFailed {
                    translator: &translator,
                    error: &error,
                }
                .log();
                break;
            }

            done = requested;
            counters.done.store(done, Ordering::Release);
            let passes = counters.passes.fetch_add(1, Ordering::AcqRel) + 1;

            PassCompleted {
                translator: &translator,
                requested,
                passes,
            }
            .log();
        }
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.worker.abort();
    }
}

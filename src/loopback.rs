// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Loopback harness: a generation chain feeding an analysis chain.
//!
//! ```text
//! stimulus ─pull─> gen[0] ─pull─> ... ─pull─> gen[n]      (ActiveDirect)
//!                                                │ link
//!                                                v
//!              collector <─push─ ana[m] <─push─ ... <─push─ ana[0]   (Passive)
//! ```
//!
//! The link pulls from the last generation translator, either with blocking
//! `get_next` calls or with non-blocking `try_next` polls that go through the
//! background coordinator, and pushes every item into the first analysis
//! translator. The words collected at the end are compared with the
//! stimulus.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::adapters::VecSource;
use crate::config::{LoopbackConfig, StageConfig};
use crate::engine::{
    ActiveTranslator, CoordinatorStats, InboundHandle, Translator, TranslatorBuilder,
};
use crate::errors::{ChannelKind, LoopbackError, TranslatorError};
use crate::observability::messages::loopback::{
    AnalysisTaskLost, LoopbackCompleted, LoopbackStarted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{PullSource, PushSink};
use crate::transforms::{BitWord, TransformFactory, TransformKind};

/// Outcome of one loopback run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopbackReport {
    pub seed: u64,
    pub polled: bool,
    pub words_sent: usize,
    /// Words the chains can rebuild; a trailing partial word is dropped
    pub words_expected: usize,
    /// Items carried across the link
    pub link_items: usize,
    pub words_received: usize,
    /// Positions where the received word differs from the sent one
    pub mismatches: usize,
    pub first_mismatch: Option<usize>,
    /// `try_next` polls that came back empty (polled link only)
    pub empty_polls: u64,
    /// Counters of the last generation stage's coordinator (polled link only)
    pub coordinator: Option<CoordinatorStats>,
}

impl LoopbackReport {
    /// Every word the chains can rebuild came back unchanged.
    pub fn matched(&self) -> bool {
        self.words_received == self.words_expected && self.mismatches == 0
    }
}

pub struct LoopbackHarness {
    config: LoopbackConfig,
}

impl LoopbackHarness {
    pub fn new(config: LoopbackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoopbackConfig {
        &self.config
    }

    /// Random stimulus words for `seed`.
    pub fn stimulus(&self, seed: u64) -> Vec<BitWord> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..self.config.stimulus.words)
            .map(|_| BitWord::new(rng.gen::<u32>(), self.config.stimulus.width))
            .collect()
    }

    /// Build both chains, push the stimulus around the loop and tear down.
    ///
    /// The configuration should have been validated first; wiring problems
    /// that slip through are reported as errors.
    pub async fn run(&self) -> Result<LoopbackReport, LoopbackError> {
        let seed = self.config.stimulus.seed.unwrap_or_else(rand::random);
        let polled = self.config.link.polled;
        let stimulus = self.stimulus(seed);

        let (link_items, width) = expected_count(
            stimulus.len(),
            self.config.stimulus.width,
            &self.config.generation,
        )?;
        let (expected, _) = expected_count(link_items, width, &self.config.analysis)?;

        LoopbackStarted {
            words: stimulus.len(),
            width: self.config.stimulus.width,
            seed,
            polled,
        }
        .log();

        let mut generation = self.build_generation(VecSource::new(stimulus.clone()))?;
        let (entry, mut analysis) = self.start_analysis()?;

        let mut link = entry;
        let carried = carry(&mut generation, &mut link, link_items, polled).await;
        let received = match carried {
            Ok(_) => analysis.collect(expected).await,
            Err(_) => Ok(Vec::new()),
        };
        let coordinator = generation.coordinator_stats();

        analysis.shutdown().await;
        generation.close().await;

        let empty_polls = carried?;
        let received = received?;
        let mismatches: Vec<usize> = stimulus
            .iter()
            .zip(&received)
            .enumerate()
            .filter(|(_, (sent, got))| sent != got)
            .map(|(position, _)| position)
            .collect();

        let report = LoopbackReport {
            seed,
            polled,
            words_sent: stimulus.len(),
            words_expected: expected,
            link_items,
            words_received: received.len(),
            mismatches: mismatches.len(),
            first_mismatch: mismatches.first().copied(),
            empty_polls,
            coordinator,
        };

        LoopbackCompleted {
            words_sent: report.words_sent,
            words_expected: report.words_expected,
            words_received: report.words_received,
            mismatches: report.mismatches,
        }
        .log();

        Ok(report)
    }

    /// Chain the generation stages, each pulling from the one before it.
    fn build_generation(
        &self,
        stimulus: VecSource<BitWord>,
    ) -> Result<ActiveTranslator<BitWord, BitWord>, LoopbackError> {
        let mut stages = self.config.generation.iter();
        let first = stages
            .next()
            .ok_or(LoopbackError::EmptyChain { chain: "generation" })?;

        let mut head = wire(first, stage_builder(first)?.upstream(stimulus).build_active())?;
        for stage in stages {
            head = wire(stage, stage_builder(stage)?.upstream(head).build_active())?;
        }
        Ok(head)
    }

    /// Chain the analysis stages back to front, each pushing into the next,
    /// and spawn their run loops.
    fn start_analysis(&self) -> Result<(InboundHandle<BitWord>, AnalysisChain), LoopbackError> {
        if self.config.analysis.is_empty() {
            return Err(LoopbackError::EmptyChain { chain: "analysis" });
        }

        let (collector, collected) = mpsc::unbounded_channel();
        let mut downstream: Box<dyn PushSink<BitWord>> = Box::new(collector);
        let mut translators = Vec::with_capacity(self.config.analysis.len());

        for stage in self.config.analysis.iter().rev() {
            let translator = wire(stage, stage_builder(stage)?.downstream(downstream).build())?;
            let inbound = translator
                .inbound_handle()
                .ok_or_else(|| LoopbackError::Wiring {
                    stage: stage.id.clone(),
                    source: TranslatorError::MissingChannel {
                        mode: translator.mode(),
                        channel: ChannelKind::InboundBuffer,
                    },
                })?;
            downstream = Box::new(inbound);
            translators.push(translator);
        }

        let entry = translators
            .last()
            .and_then(|translator| translator.inbound_handle())
            .ok_or(LoopbackError::EmptyChain { chain: "analysis" })?;

        Ok((entry, AnalysisChain::spawn(translators, collected)))
    }
}

/// Running analysis translators and the sink at the end of the chain.
struct AnalysisChain {
    collected: mpsc::UnboundedReceiver<BitWord>,
    failures: mpsc::UnboundedReceiver<(String, TranslatorError)>,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl AnalysisChain {
    fn spawn(
        translators: Vec<Translator<BitWord, BitWord>>,
        collected: mpsc::UnboundedReceiver<BitWord>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let (failed, failures) = mpsc::unbounded_channel();

        let tasks = translators
            .into_iter()
            .map(|mut translator| {
                let shutdown = shutdown.clone();
                let failed = failed.clone();
                tokio::spawn(async move {
                    let outcome = tokio::select! {
                        _ = shutdown.cancelled() => Ok(()),
                        outcome = translator.run() => outcome,
                    };
                    translator.close().await;
                    if let Err(error) = outcome {
                        let _ = failed.send((translator.name().to_string(), error));
                    }
                })
            })
            .collect();

        Self {
            collected,
            failures,
            shutdown,
            tasks,
        }
    }

    /// Wait for `expected` words, or for a stage to stop early.
    async fn collect(&mut self, expected: usize) -> Result<Vec<BitWord>, LoopbackError> {
        let mut received = Vec::with_capacity(expected);
        while received.len() < expected {
            tokio::select! {
                word = self.collected.recv() => match word {
                    Some(word) => received.push(word),
                    None => {
                        return Err(LoopbackError::AnalysisClosed {
                            received: received.len(),
                            expected,
                        })
                    }
                },
                Some((stage, source)) = self.failures.recv() => {
                    return Err(LoopbackError::AnalysisStopped { stage, source });
                }
            }
        }
        Ok(received)
    }

    async fn shutdown(self) {
        self.shutdown.cancel();
        for task in self.tasks {
            if let Err(error) = task.await {
                AnalysisTaskLost { error: &error }.log();
            }
        }
    }
}

/// Pull `items` link items out of the generation chain into `link`.
///
/// Returns the number of polls that came back empty. A polled link gives up
/// once the background coordinator has stopped.
async fn carry(
    generation: &mut ActiveTranslator<BitWord, BitWord>,
    link: &mut impl PushSink<BitWord>,
    items: usize,
    polled: bool,
) -> Result<u64, LoopbackError> {
    let mut empty_polls = 0u64;
    let mut carried = 0usize;
    while carried < items {
        if !polled {
            link.push(generation.get().await);
            carried += 1;
            continue;
        }

        match generation.try_next().await {
            Some(item) => {
                link.push(item);
                carried += 1;
            }
            None if generation.coordinator_stopped() => {
                return Err(LoopbackError::GenerationStopped {
                    stage: generation.name().to_string(),
                    carried,
                    expected: items,
                });
            }
            None => empty_polls += 1,
        }
    }
    Ok(empty_polls)
}

fn stage_builder(stage: &StageConfig) -> Result<TranslatorBuilder<BitWord, BitWord>, LoopbackError> {
    let transform = TransformFactory::create_transform(stage)?;
    Ok(Translator::builder(stage.translator.clone(), transform).name(stage.id.clone()))
}

fn wire<T>(stage: &StageConfig, built: Result<T, TranslatorError>) -> Result<T, LoopbackError> {
    built.map_err(|source| LoopbackError::Wiring {
        stage: stage.id.clone(),
        source,
    })
}

/// Words that come out of `stages` when fed `count` words of `width` bits,
/// and their width. Trailing bits that don't fill a word are dropped.
fn expected_count(
    count: usize,
    width: u8,
    stages: &[StageConfig],
) -> Result<(usize, u8), LoopbackError> {
    let mut bits_per_word = u64::from(width);
    let mut count = count as u64;
    let mut width = width;

    for stage in stages {
        let kind = TransformKind::from_stage(stage)?;
        let out = kind.output_width(width);
        count = count * bits_per_word / u64::from(out);
        bits_per_word = u64::from(out);
        width = out;
    }
    Ok((count as usize, width))
}

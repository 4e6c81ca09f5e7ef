// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::adapters::VecSource;
use crate::config::{load_config, validate_loopback_config, LoopbackConfig, Mode, TranslatorConfig};
use crate::engine::{CoordinatorStats, Ports, Translator, TranslatorBuilder};
use crate::errors::{ChannelKind, TranslatorError};
use crate::loopback::LoopbackHarness;
use crate::traits::{Item, PullSource, Transform};
use crate::transforms::{BitWord, Identity, Regroup};

/// Integration tests for translators wired to real peers
#[cfg(test)]
mod tests {
    use super::*;

    /// Upstream fed by the test through an unbounded channel.
    struct ChannelSource<T> {
        receiver: mpsc::UnboundedReceiver<T>,
    }

    fn channel_source<T: Item>() -> (mpsc::UnboundedSender<T>, ChannelSource<T>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (sender, ChannelSource { receiver })
    }

    #[async_trait]
    impl<T: Item> PullSource<T> for ChannelSource<T> {
        async fn get_next(&mut self) -> T {
            match self.receiver.recv().await {
                Some(item) => item,
                None => std::future::pending().await,
            }
        }

        async fn try_next(&mut self) -> Option<T> {
            self.receiver.try_recv().ok()
        }

        fn has_available(&self) -> bool {
            !self.receiver.is_empty()
        }
    }

    /// Inline source that records every call made on it.
    struct RecordingSource {
        items: VecSource<u32>,
        calls: Arc<StdMutex<Vec<String>>>,
    }

    impl RecordingSource {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl PullSource<u32> for RecordingSource {
        async fn get_next(&mut self) -> u32 {
            self.record("get_next".to_string());
            self.items.get_next().await
        }

        async fn try_next(&mut self) -> Option<u32> {
            self.record("try_next".to_string());
            self.items.try_next().await
        }

        fn item_done(&mut self, item: Option<&u32>) {
            self.record(format!("item_done({:?})", item));
        }

        async fn wait_for_sequences(&mut self) {
            self.record("wait_for_sequences".to_string());
        }

        fn has_available(&self) -> bool {
            self.record("has_available".to_string());
            self.items.has_available()
        }

        fn put(&mut self, item: u32) {
            self.record(format!("put({})", item));
        }

        fn put_response(&mut self, item: u32) {
            self.record(format!("put_response({})", item));
        }
    }

    /// Polls its inbound side without blocking and forwards what it finds.
    struct Poller;

    #[async_trait]
    impl Transform<u32, u32> for Poller {
        async fn transform(&mut self, ports: &mut Ports<u32, u32>) -> Result<(), TranslatorError> {
            if let Some(item) = ports.try_inbound().await? {
                ports.put_outbound_no_clone(item);
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "poller"
        }
    }

    /// Delivers a clone of each item, then a modified version of its own copy.
    struct Echo;

    #[async_trait]
    impl Transform<String, String> for Echo {
        async fn transform(
            &mut self,
            ports: &mut Ports<String, String>,
        ) -> Result<(), TranslatorError> {
            let mut item = ports.get_inbound().await;
            ports.put_outbound(&item);
            item.push('!');
            ports.put_outbound_no_clone(item);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "echo"
        }
    }

    fn build_error<I: Item, O: Item>(builder: TranslatorBuilder<I, O>) -> TranslatorError {
        match builder.build() {
            Ok(translator) => panic!("expected a wiring error for '{}'", translator.name()),
            Err(error) => error,
        }
    }

    /// Run a passive translator until `shutdown` fires, then close it.
    fn spawn_passive<I: Item, O: Item>(
        mut translator: Translator<I, O>,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<Result<(), TranslatorError>> {
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = shutdown.cancelled() => Ok(()),
                outcome = translator.run() => outcome,
            };
            translator.close().await;
            outcome
        })
    }

    fn round_trip_config(polled: bool) -> LoopbackConfig {
        let mut cfg: LoopbackConfig =
            serde_yaml::from_str(include_str!("../../configs/loopback.yaml")).unwrap();
        cfg.link.polled = polled;
        cfg
    }

    #[tokio::test]
    async fn test_only_the_resolved_modes_channels_exist() {
        let (sink, _received) = mpsc::unbounded_channel();
        let passive = Translator::builder(TranslatorConfig::passive(), Identity::<u32>::new())
            .downstream(sink)
            .build()
            .unwrap();
        assert_eq!(passive.mode(), Mode::Passive);
        assert_eq!(
            passive.channels(),
            &[ChannelKind::InboundBuffer, ChannelKind::Downstream]
        );
        assert!(passive.inbound_handle().is_some());
        assert!(!passive.has_channel(ChannelKind::OutboundBuffer));

        let direct = Translator::builder(TranslatorConfig::active_direct(), Identity::<u32>::new())
            .upstream(VecSource::new(vec![1]))
            .build()
            .unwrap();
        assert_eq!(direct.mode(), Mode::ActiveDirect);
        assert_eq!(
            direct.channels(),
            &[ChannelKind::Upstream, ChannelKind::OutboundBuffer]
        );
        assert!(direct.inbound_handle().is_none());
        let direct = direct.into_active().unwrap();
        assert_eq!(direct.coordinator_stats(), None);
        assert!(!direct.coordinator_stopped());

        let sequenced = Translator::builder(
            TranslatorConfig::active_sequenced().with_outbound_tap(),
            Identity::<u32>::new(),
        )
        .inline_source(VecSource::new(vec![1]))
        .build()
        .unwrap();
        assert_eq!(sequenced.mode(), Mode::ActiveSequenced);
        assert_eq!(
            sequenced.channels(),
            &[ChannelKind::InlineSource, ChannelKind::OutboundTap]
        );

        let sequenced_with_upstream =
            Translator::builder(TranslatorConfig::active_sequenced(), Identity::<u32>::new())
                .upstream(VecSource::new(vec![1]))
                .inline_source(VecSource::new(vec![2]))
                .build()
                .unwrap();
        assert_eq!(
            sequenced_with_upstream.channels(),
            &[ChannelKind::Upstream, ChannelKind::InlineSource]
        );
    }

    #[tokio::test]
    async fn test_config_is_frozen_at_build() {
        let mut config = TranslatorConfig::passive();
        let (sink, _received) = mpsc::unbounded_channel();
        let translator = Translator::builder(config.clone(), Identity::<u32>::new())
            .downstream(sink)
            .build()
            .unwrap();

        config.active = true;
        assert_ne!(translator.config(), &config);
        assert_eq!(translator.mode(), Mode::Passive);
        assert!(!translator.config().active);
    }

    #[tokio::test]
    async fn test_wiring_errors() {
        let (sink, _received) = mpsc::unbounded_channel::<u32>();

        let error = build_error(Translator::builder(
            TranslatorConfig::passive(),
            Identity::<u32>::new(),
        ));
        assert!(matches!(
            error,
            TranslatorError::MissingChannel {
                mode: Mode::Passive,
                channel: ChannelKind::Downstream
            }
        ));

        let error = build_error(
            Translator::builder(TranslatorConfig::passive(), Identity::<u32>::new())
                .downstream(sink.clone())
                .upstream(VecSource::new(vec![1])),
        );
        assert!(matches!(
            error,
            TranslatorError::UnexpectedChannel {
                mode: Mode::Passive,
                channel: ChannelKind::Upstream
            }
        ));

        let error = build_error(Translator::builder(
            TranslatorConfig::active_direct(),
            Identity::<u32>::new(),
        ));
        assert!(matches!(
            error,
            TranslatorError::MissingChannel {
                mode: Mode::ActiveDirect,
                channel: ChannelKind::Upstream
            }
        ));

        let error = build_error(
            Translator::builder(TranslatorConfig::active_direct(), Identity::<u32>::new())
                .upstream(VecSource::new(vec![1]))
                .downstream(sink.clone()),
        );
        assert!(matches!(
            error,
            TranslatorError::UnexpectedChannel {
                mode: Mode::ActiveDirect,
                channel: ChannelKind::Downstream
            }
        ));

        let error = build_error(Translator::builder(
            TranslatorConfig::active_sequenced(),
            Identity::<u32>::new(),
        ));
        assert!(matches!(
            error,
            TranslatorError::MissingChannel {
                mode: Mode::ActiveSequenced,
                channel: ChannelKind::InlineSource
            }
        ));

        let (observer, _observed) = mpsc::unbounded_channel::<u32>();
        let error = build_error(
            Translator::builder(TranslatorConfig::passive(), Identity::<u32>::new())
                .downstream(sink)
                .outbound_observer(observer),
        );
        assert!(matches!(
            error,
            TranslatorError::TapDisabled {
                channel: ChannelKind::OutboundTap
            }
        ));
    }

    #[tokio::test]
    async fn test_passive_identity_preserves_order() {
        let (sink, mut received) = mpsc::unbounded_channel();
        let translator = Translator::builder(TranslatorConfig::passive(), Identity::<u32>::new())
            .downstream(sink)
            .build()
            .unwrap();
        let inbound = translator.inbound_handle().unwrap();

        let shutdown = CancellationToken::new();
        let task = spawn_passive(translator, shutdown.clone());

        for value in 0..100 {
            inbound.deliver(value);
        }
        for expected in 0..100 {
            assert_eq!(received.recv().await, Some(expected));
        }

        shutdown.cancel();
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_run_returns_immediately_in_active_modes() {
        let mut translator =
            Translator::builder(TranslatorConfig::active_direct(), Identity::<u32>::new())
                .upstream(VecSource::new(vec![]))
                .build_active()
                .unwrap();

        let outcome = tokio::time::timeout(Duration::from_millis(100), translator.run()).await;
        assert!(matches!(outcome, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_try_inbound_in_passive_mode_terminates_run() {
        let (sink, _received) = mpsc::unbounded_channel();
        let mut translator = Translator::builder(TranslatorConfig::passive(), Poller)
            .downstream(sink)
            .build()
            .unwrap();

        let error = translator.run().await.unwrap_err();
        assert!(matches!(
            error,
            TranslatorError::ConfigurationMisuse {
                operation: "try_inbound",
                mode: Mode::Passive
            }
        ));
        assert_eq!(
            error.to_string(),
            "'try_inbound' is not available in Passive mode"
        );
    }

    #[tokio::test]
    async fn test_try_inbound_in_active_mode_polls_upstream() {
        let (feed, upstream) = channel_source();
        let mut translator = Translator::builder(TranslatorConfig::active_direct(), Poller)
            .upstream(upstream)
            .build_active()
            .unwrap();

        feed.send(5).unwrap();
        // One pass through the inline path: the upstream item is ready, so it comes straight out.
        assert_eq!(translator.get_next().await, 5);
        assert!(!translator.has_available());
    }

    #[tokio::test]
    async fn test_passive_translator_has_no_pull_adapter() {
        let (sink, _received) = mpsc::unbounded_channel();
        let error = Translator::builder(TranslatorConfig::passive(), Identity::<u32>::new())
            .downstream(sink.clone())
            .build_active()
            .err()
            .unwrap();
        assert!(matches!(
            error,
            TranslatorError::ConfigurationMisuse {
                operation: "pull",
                mode: Mode::Passive
            }
        ));
        assert_eq!(error.to_string(), "'pull' is not available in Passive mode");

        let translator = Translator::builder(TranslatorConfig::passive(), Identity::<u32>::new())
            .downstream(sink)
            .build()
            .unwrap();
        assert!(matches!(
            translator.into_active().err(),
            Some(TranslatorError::ConfigurationMisuse {
                operation: "pull",
                mode: Mode::Passive
            })
        ));
    }

    #[tokio::test]
    async fn test_get_next_runs_transform_until_output_exists() {
        let mut translator = Translator::builder(TranslatorConfig::active_direct(), Regroup::new(32, 8))
            .upstream(VecSource::new(vec![BitWord::new(0xDEAD_BEEF, 32)]))
            .build_active()
            .unwrap();

        assert_eq!(translator.get_next().await, BitWord::new(0xDE, 8));
        assert!(translator.has_available());
        assert_eq!(translator.get().await, BitWord::new(0xAD, 8));
        assert_eq!(translator.peek().await, Some(BitWord::new(0xBE, 8)));
        assert_eq!(translator.try_next().await, Some(BitWord::new(0xEF, 8)));
        assert!(!translator.has_available());
        translator.close().await;
    }

    #[tokio::test]
    async fn test_try_next_returns_within_a_round_when_upstream_is_empty() {
        let mut translator =
            Translator::builder(TranslatorConfig::active_direct(), Identity::<u32>::new())
                .upstream(VecSource::new(vec![]))
                .build_active()
                .unwrap();

        for _ in 0..3 {
            let polled =
                tokio::time::timeout(Duration::from_millis(100), translator.try_next()).await;
            assert_eq!(polled, Ok(None));
        }

        let stats = translator.coordinator_stats().unwrap();
        assert_eq!(stats.requested, 3);
        assert_eq!(stats.passes, 0);
        translator.close().await;
    }

    #[tokio::test]
    async fn test_polls_during_a_pass_collapse_into_one_more_pass() {
        let (feed, upstream) = channel_source();
        let mut translator =
            Translator::builder(TranslatorConfig::active_direct(), Identity::<u32>::new())
                .upstream(upstream)
                .build_active()
                .unwrap();

        // First poll starts the worker; its pass waits on the empty upstream.
        assert_eq!(translator.try_next().await, None);
        for _ in 0..5 {
            assert_eq!(translator.try_next().await, None);
        }
        assert_eq!(
            translator.coordinator_stats(),
            Some(CoordinatorStats {
                requested: 6,
                done: 0,
                passes: 0
            })
        );

        // The pass in flight completes, then one follow-up pass covers all later polls.
        feed.send(10).unwrap();
        assert_eq!(translator.try_next().await, Some(10));
        assert_eq!(
            translator.coordinator_stats(),
            Some(CoordinatorStats {
                requested: 7,
                done: 1,
                passes: 1
            })
        );

        feed.send(11).unwrap();
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert_eq!(
            translator.coordinator_stats(),
            Some(CoordinatorStats {
                requested: 7,
                done: 7,
                passes: 2
            })
        );

        // No polls, no passes.
        feed.send(12).unwrap();
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert_eq!(translator.coordinator_stats().unwrap().passes, 2);

        assert!(translator.has_available());
        assert_eq!(translator.try_next().await, Some(11));
        assert_eq!(translator.try_next().await, Some(12));
        translator.close().await;
    }

    /// Takes two inbound items per pass, delivering after each.
    struct TwiceThrough;

    #[async_trait]
    impl Transform<u32, u32> for TwiceThrough {
        async fn transform(&mut self, ports: &mut Ports<u32, u32>) -> Result<(), TranslatorError> {
            for _ in 0..2 {
                let item = ports.get_inbound().await;
                ports.put_outbound_no_clone(item);
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "twice-through"
        }
    }

    #[tokio::test]
    async fn test_get_next_takes_item_delivered_by_a_background_pass() {
        let (feed, upstream) = channel_source();
        let mut translator = Translator::builder(TranslatorConfig::active_direct(), TwiceThrough)
            .upstream(upstream)
            .build_active()
            .unwrap();

        // The background pass starts and waits on the empty upstream.
        assert_eq!(translator.try_next().await, None);

        // It delivers 1, then holds the stage waiting for its second item.
        feed.send(1).unwrap();
        let pulled = tokio::time::timeout(Duration::from_millis(200), translator.get_next()).await;
        assert_eq!(pulled, Ok(1));

        feed.send(2).unwrap();
        let pulled = tokio::time::timeout(Duration::from_millis(200), translator.get_next()).await;
        assert_eq!(pulled, Ok(2));
        translator.close().await;
    }

    #[tokio::test]
    async fn test_outbound_clones_are_independent() {
        let (sink, mut received) = mpsc::unbounded_channel();
        let (observer, mut observed) = mpsc::unbounded_channel();
        let translator = Translator::builder(TranslatorConfig::passive().with_outbound_tap(), Echo)
            .downstream(sink)
            .outbound_observer(observer)
            .build()
            .unwrap();
        let inbound = translator.inbound_handle().unwrap();

        let shutdown = CancellationToken::new();
        let task = spawn_passive(translator, shutdown.clone());

        inbound.deliver("ping".to_string());
        assert_eq!(received.recv().await.as_deref(), Some("ping"));
        assert_eq!(received.recv().await.as_deref(), Some("ping!"));
        assert_eq!(observed.recv().await.as_deref(), Some("ping"));
        assert_eq!(observed.recv().await.as_deref(), Some("ping!"));

        shutdown.cancel();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_taps_fan_out_to_every_observer() {
        let (sink, mut received) = mpsc::unbounded_channel();
        let (first, mut first_seen) = mpsc::unbounded_channel();
        let (second, mut second_seen) = mpsc::unbounded_channel();
        let (outbound, mut outbound_seen) = mpsc::unbounded_channel();
        let translator = Translator::builder(
            TranslatorConfig::passive()
                .with_inbound_tap()
                .with_outbound_tap(),
            Identity::<u32>::new(),
        )
        .downstream(sink)
        .inbound_observer(first)
        .inbound_observer(second)
        .outbound_observer(outbound)
        .build()
        .unwrap();
        assert!(translator.has_channel(ChannelKind::InboundTap));
        assert!(translator.has_channel(ChannelKind::OutboundTap));
        let inbound = translator.inbound_handle().unwrap();

        let shutdown = CancellationToken::new();
        let task = spawn_passive(translator, shutdown.clone());

        inbound.deliver(1);
        inbound.deliver(2);
        for expected in [1, 2] {
            assert_eq!(received.recv().await, Some(expected));
            assert_eq!(first_seen.recv().await, Some(expected));
            assert_eq!(second_seen.recv().await, Some(expected));
            assert_eq!(outbound_seen.recv().await, Some(expected));
        }

        shutdown.cancel();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_item_logs_record_string_forms() {
        let dir = tempfile::tempdir().unwrap();
        let inbound_log = dir.path().join("inbound.log");
        let outbound_log = dir.path().join("outbound.log");
        std::fs::write(&outbound_log, "earlier\n").unwrap();

        let (sink, mut received) = mpsc::unbounded_channel();
        let translator = Translator::builder(
            TranslatorConfig::passive()
                .with_inbound_log(&inbound_log)
                .with_outbound_log(&outbound_log),
            Regroup::new(8, 4),
        )
        .downstream(sink)
        .build()
        .unwrap();
        let inbound = translator.inbound_handle().unwrap();

        let shutdown = CancellationToken::new();
        let task = spawn_passive(translator, shutdown.clone());

        inbound.deliver(BitWord::new(0b1011_0011, 8));
        inbound.deliver(BitWord::new(0b0101_0101, 8));
        for _ in 0..4 {
            received.recv().await.unwrap();
        }

        shutdown.cancel();
        task.await.unwrap().unwrap();

        assert_eq!(
            std::fs::read_to_string(&inbound_log).unwrap(),
            "10110011\n01010101\n"
        );
        assert_eq!(
            std::fs::read_to_string(&outbound_log).unwrap(),
            "earlier\n1011\n0011\n0101\n0101\n"
        );
    }

    #[tokio::test]
    async fn test_active_item_log_closed_on_teardown() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("pulled.log");

        let mut translator = Translator::builder(
            TranslatorConfig::active_direct().with_outbound_log(&log),
            Identity::<String>::new(),
        )
        .upstream(VecSource::new(vec!["a".to_string(), "b".to_string()]))
        .build_active()
        .unwrap();

        assert_eq!(translator.get_next().await, "a");
        assert_eq!(translator.get_next().await, "b");
        translator.close().await;

        assert_eq!(std::fs::read_to_string(&log).unwrap(), "a\nb\n");
    }

    #[tokio::test]
    async fn test_unopenable_item_log_fails_the_build() {
        let dir = tempfile::tempdir().unwrap();
        let (sink, _received) = mpsc::unbounded_channel::<u32>();

        let error = build_error(
            Translator::builder(
                TranslatorConfig::passive().with_inbound_log(dir.path().join("missing/in.log")),
                Identity::<u32>::new(),
            )
            .downstream(sink),
        );
        assert!(matches!(error, TranslatorError::LogSink { .. }));
    }

    #[tokio::test]
    async fn test_sequenced_mode_delegates_to_inline_source() {
        let calls = Arc::new(StdMutex::new(Vec::new()));
        let inline = RecordingSource {
            items: VecSource::new(vec![7, 8]),
            calls: Arc::clone(&calls),
        };
        let mut translator =
            Translator::builder(TranslatorConfig::active_sequenced(), Identity::<u32>::new())
                .inline_source(inline)
                .build_active()
                .unwrap();

        assert_eq!(translator.get().await, 7);
        assert_eq!(translator.try_next().await, Some(8));
        assert!(!translator.has_available());
        translator.wait_for_sequences().await;
        translator.put(1);
        translator.put_response(2);
        assert_eq!(translator.coordinator_stats(), None);

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "get_next",
                "item_done(Some(7))",
                "try_next",
                "has_available",
                "wait_for_sequences",
                "put(1)",
                "put_response(2)",
            ]
        );
    }

    #[tokio::test]
    async fn test_direct_mode_ignores_sequencing_calls() {
        let mut translator =
            Translator::builder(TranslatorConfig::active_direct(), Identity::<u32>::new())
                .upstream(VecSource::new(vec![3]))
                .build_active()
                .unwrap();

        translator.put(1);
        translator.put_response(2);
        translator.item_done(None);
        translator.wait_for_sequences().await;
        assert_eq!(translator.get_next().await, 3);
    }

    #[test]
    fn test_shipped_loopback_configs_validate() {
        for path in ["configs/loopback.yaml", "configs/loopback-polled.yaml"] {
            let cfg = load_config(concat!(env!("CARGO_MANIFEST_DIR"), "/").to_string() + path)
                .unwrap();
            assert!(validate_loopback_config(&cfg).is_ok(), "{path}");
        }
    }

    #[tokio::test]
    async fn test_round_trip_through_blocking_pulls() {
        let cfg = round_trip_config(false);
        assert!(validate_loopback_config(&cfg).is_ok());

        let report = LoopbackHarness::new(cfg).run().await.unwrap();
        assert_eq!(report.words_sent, 2400);
        assert_eq!(report.link_items, 25_600);
        assert_eq!(report.words_received, 2400);
        assert_eq!(report.first_mismatch, None);
        assert!(report.matched());
    }

    #[tokio::test]
    async fn test_round_trip_through_polls() {
        let cfg = round_trip_config(true);

        let report = LoopbackHarness::new(cfg).run().await.unwrap();
        assert!(report.matched(), "{:?}", report);
        assert_eq!(report.link_items, 25_600);

        let stats = report.coordinator.unwrap();
        assert!(stats.passes > 0);
        assert!(stats.done <= stats.requested);
    }
}

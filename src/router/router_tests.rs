// ─────────────────────────────── Tests ───────────────────────────────────

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use anyhow::{Result, bail};
    use async_trait::async_trait;
    use tempfile::TempDir;
    use tokio::time::advance;

    use crate::config::{ChannelId, RouterConfig};
    use crate::delivery::Transport;
    use crate::router::*;

    const SOURCE: ChannelId = 100;
    const LEAD: &str = "Need taxi from Delhi to Mohali 9876543210";

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<(ChannelId, String)>>,
        fail_all: bool,
    }

    impl Outbox {
        fn channels(&self) -> Vec<ChannelId> {
            self.sent.lock().unwrap().iter().map(|(c, _)| *c).collect()
        }
    }

    #[async_trait]
    impl Transport for Outbox {
        async fn send(&self, channel_id: ChannelId, text: &str) -> Result<()> {
            if self.fail_all {
                bail!("Bad Request: chat not found");
            }
            self.sent.lock().unwrap().push((channel_id, text.to_string()));
            Ok(())
        }
    }

    fn test_config(fingerprints: &Path) -> RouterConfig {
        let mut cfg = RouterConfig::from_json(
            r#"{
                "botName": "test",
                "sourceChannelIds": [100],
                "pipelines": [
                    { "name": "delhi", "cityScope": ["Delhi"], "targetChannelIds": [-1, -2] },
                    { "name": "tricity", "cityScope": ["Mohali", "Chandigarh"], "targetChannelIds": [-2, -3] }
                ],
                "humanBehavior": {
                    "minTypingTime": 0, "maxTypingTime": 0,
                    "minBetweenGroups": 0, "maxBetweenGroups": 0,
                    "randomPauseChance": 0, "randomPauseDuration": 0
                }
            }"#,
        )
        .unwrap();
        cfg.fingerprint_file = Some(fingerprints.to_path_buf());
        cfg
    }

    fn engine_with(cfg: RouterConfig, outbox: Outbox) -> (RouterEngine, Arc<Outbox>) {
        let outbox = Arc::new(outbox);
        let engine = RouterEngine::new(cfg, Box::new(Arc::clone(&outbox)));
        (engine, outbox)
    }

    fn engine(dir: &TempDir) -> (RouterEngine, Arc<Outbox>) {
        engine_with(test_config(&dir.path().join("fps.json")), Outbox::default())
    }

    fn msg(text: &str) -> InboundMessage {
        InboundMessage {
            text: text.to_string(),
            source_channel_id: SOURCE,
            external_id: "1".into(),
            timestamp_ms: 1_700_000_000_000,
            is_from_self: false,
        }
    }

    fn rejected(outcome: &Outcome) -> Option<Rejection> {
        match outcome {
            Outcome::Rejected(r) => Some(*r),
            Outcome::Routed { .. } => None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn lead_is_routed_to_union_of_targets() {
        let dir = TempDir::new().unwrap();
        let (mut engine, outbox) = engine(&dir);

        let outcome = engine.process(&msg(LEAD)).await;
        let Outcome::Routed {
            cities,
            pipelines,
            report,
        } = outcome
        else {
            panic!("expected a delivery");
        };
        assert_eq!(cities, vec!["Delhi", "Mohali"]);
        assert_eq!(pipelines, vec!["delhi", "tricity"]);
        assert_eq!(report.success_count, 3);
        assert_eq!(outbox.channels(), vec![-1, -2, -3]);

        let stats = engine.stats();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.send_successes, 3);
        assert_eq!(stats.pipelines_matched["delhi"], 1);
        assert_eq!(stats.pipelines_matched["tricity"], 1);
        assert_eq!(engine.snapshot().rate.hourly, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn text_is_forwarded_verbatim() {
        let dir = TempDir::new().unwrap();
        let (mut engine, outbox) = engine(&dir);
        let text = "🚕 Need TAXI from Delhi to Mohali!! 9876543210";
        engine.process(&msg(text)).await;
        assert_eq!(outbox.sent.lock().unwrap()[0].1, text);
    }

    #[tokio::test(start_paused = true)]
    async fn gates_reject_in_order() {
        let dir = TempDir::new().unwrap();
        let (mut engine, outbox) = engine(&dir);

        let mut foreign = msg(LEAD);
        foreign.source_channel_id = 999;
        assert_eq!(
            rejected(&engine.process(&foreign).await),
            Some(Rejection::NotMonitored)
        );

        let mut own = msg(LEAD);
        own.is_from_self = true;
        assert_eq!(rejected(&engine.process(&own).await), Some(Rejection::FromSelf));

        assert_eq!(
            rejected(&engine.process(&msg("Need taxi Delhi to Mohali 9855880586")).await),
            Some(Rejection::BlockedNumber)
        );
        assert_eq!(
            rejected(&engine.process(&msg("hello friends, how are you all")).await),
            Some(Rejection::NotALead)
        );
        assert_eq!(
            rejected(&engine.process(&msg("need taxi from delhi to mohali")).await),
            Some(Rejection::NoPhone)
        );

        let stats = engine.stats();
        assert_eq!(stats.total_messages, 5);
        assert_eq!(stats.rejected_not_monitored, 1);
        assert_eq!(stats.rejected_from_me, 1);
        assert_eq!(stats.rejected_blocked_number, 1);
        assert_eq!(stats.rejected_not_taxi, 1);
        assert_eq!(stats.rejected_no_phone, 1);
        assert!(outbox.channels().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn short_messages_are_rejected() {
        let dir = TempDir::new().unwrap();
        let mut cfg = test_config(&dir.path().join("fps.json"));
        cfg.validation.min_message_length = 60;
        let (mut engine, _) = engine_with(cfg, Outbox::default());
        assert_eq!(
            rejected(&engine.process(&msg(LEAD)).await),
            Some(Rejection::TooShort)
        );
        assert_eq!(engine.stats().rejected_too_short, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn phone_requirement_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let mut cfg = test_config(&dir.path().join("fps.json"));
        cfg.validation.require_phone_number = false;
        let (mut engine, outbox) = engine_with(cfg, Outbox::default());
        let outcome = engine.process(&msg("need taxi from delhi to mohali")).await;
        assert_eq!(rejected(&outcome), None);
        assert_eq!(outbox.channels().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_lead_is_a_duplicate() {
        let dir = TempDir::new().unwrap();
        let (mut engine, outbox) = engine(&dir);

        engine.process(&msg(LEAD)).await;
        advance(Duration::from_secs(5)).await;
        // Same words, other number, different decoration.
        let outcome = engine
            .process(&msg("need TAXI from delhi to mohali!!! 9123456789"))
            .await;
        assert_eq!(rejected(&outcome), Some(Rejection::Duplicate));
        assert_eq!(engine.stats().duplicates_skipped, 1);
        assert_eq!(outbox.channels().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unmatched_cities_are_not_forwarded() {
        let dir = TempDir::new().unwrap();
        let (mut engine, outbox) = engine(&dir);
        let outcome = engine.process(&msg("need cab Agra to Jaipur 9876543210")).await;
        assert_eq!(rejected(&outcome), Some(Rejection::NoPipeline));
        assert_eq!(engine.stats().rejected_no_pipeline, 1);
        assert!(outbox.channels().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_stops_further_leads() {
        let dir = TempDir::new().unwrap();
        let mut cfg = test_config(&dir.path().join("fps.json"));
        cfg.rate_limits.hourly = 1;
        let (mut engine, outbox) = engine_with(cfg, Outbox::default());

        engine.process(&msg(LEAD)).await;
        advance(Duration::from_secs(5)).await;
        let outcome = engine
            .process(&msg("need cab from Mohali to Chandigarh 9123456789"))
            .await;
        assert_eq!(rejected(&outcome), Some(Rejection::RateLimited));
        assert_eq!(engine.stats().rejected_rate_limit, 1);
        assert_eq!(outbox.channels().len(), 3);

        advance(Duration::from_secs(3601)).await;
        let outcome = engine
            .process(&msg("need cab from Chandigarh to Delhi 9123456780"))
            .await;
        assert_eq!(rejected(&outcome), None);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_delivery_does_not_count() {
        let dir = TempDir::new().unwrap();
        let outbox = Outbox {
            fail_all: true,
            ..Default::default()
        };
        let (mut engine, _) = engine_with(test_config(&dir.path().join("fps.json")), outbox);

        let outcome = engine.process(&msg(LEAD)).await;
        let Outcome::Routed { report, .. } = outcome else {
            panic!("expected a delivery attempt");
        };
        assert_eq!(report.success_count, 0);
        assert_eq!(report.failures, 3);

        let snap = engine.snapshot();
        assert_eq!(snap.stats.processed, 0);
        assert_eq!(snap.stats.send_failures, 3);
        assert_eq!(snap.rate.hourly, 0);
        assert_eq!(snap.circuit_breaker.failure_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn fingerprints_survive_restart() {
        let dir = TempDir::new().unwrap();
        {
            let (mut engine, _) = engine(&dir);
            engine.process(&msg(LEAD)).await;
            engine.shutdown();
        }

        let (mut engine, outbox) = engine(&dir);
        assert_eq!(engine.snapshot().fingerprint_cache_size, 1);
        let outcome = engine.process(&msg(LEAD)).await;
        assert_eq!(rejected(&outcome), Some(Rejection::Duplicate));
        assert!(outbox.channels().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_serializes() {
        let dir = TempDir::new().unwrap();
        let (mut engine, _) = engine(&dir);
        engine.process(&msg(LEAD)).await;
        let json = serde_json::to_value(engine.snapshot()).unwrap();
        assert_eq!(json["stats"]["processed"], 1);
        assert_eq!(json["rate"]["hourlyLimit"], 80);
        assert_eq!(json["circuitBreaker"]["isOpen"], false);
    }
}

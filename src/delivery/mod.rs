//! Human-paced delivery of one lead to many channels.
//!
//! A "typing" delay goes before the first send and a short wait (or, now
//! and then, a longer coffee pause) before each of the rest.  Every send is
//! bounded by a timeout with a single retry, feeds the circuit breaker, and
//! puts its channel on a short cooldown.
pub mod breaker;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::{ChannelId, CircuitBreakerCfg, Deduplication, HumanBehavior};
use crate::delivery::breaker::{BreakerState, CircuitBreaker};

/// Upper bound on one send attempt.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(15);
/// Wait before the single retry of a timed-out send.
const RETRY_BACKOFF: Duration = Duration::from_secs(1);
/// Cooldown entries older than this (or the cooldown itself, if longer)
/// are forgotten.
const COOLDOWN_RETENTION: Duration = Duration::from_secs(30);
/// Per-character typing speed, milliseconds.
const TYPING_MS_PER_CHAR: std::ops::RangeInclusive<u64> = 30..=50;
/// A coffee pause lasts between `random_pause_duration` and this much more.
const PAUSE_SPREAD_MS: u64 = 3000;

/// Outbound side of the router: posts a text into a channel.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, channel_id: ChannelId, text: &str) -> Result<()>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, channel_id: ChannelId, text: &str) -> Result<()> {
        (**self).send(channel_id, text).await
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub success_count: usize,
    /// Destinations that were attempted (or, when the breaker was already
    /// open, that would have been).
    pub total_targets: usize,
    pub failures: usize,
    pub human_pauses: usize,
}

pub struct DeliveryScheduler {
    human: HumanBehavior,
    cooldown: Duration,
    last_send: HashMap<ChannelId, Instant>,
    breaker: CircuitBreaker,
    rng: StdRng,
}

impl DeliveryScheduler {
    pub fn new(
        human: HumanBehavior,
        dedup: &Deduplication,
        breaker: &CircuitBreakerCfg,
    ) -> Self {
        Self::with_rng(human, dedup, breaker, StdRng::from_entropy())
    }

    pub fn with_rng(
        human: HumanBehavior,
        dedup: &Deduplication,
        breaker: &CircuitBreakerCfg,
        rng: StdRng,
    ) -> Self {
        Self {
            human,
            cooldown: dedup.send_cooldown(),
            last_send: HashMap::new(),
            breaker: CircuitBreaker::new(breaker),
            rng,
        }
    }

    pub fn breaker_state(&mut self) -> BreakerState {
        self.breaker.state_at(Instant::now())
    }

    pub fn cooldown_entries(&self) -> usize {
        self.last_send.len()
    }

    fn in_cooldown(&self, channel: ChannelId, now: Instant) -> bool {
        self.last_send
            .get(&channel)
            .is_some_and(|&at| now.saturating_duration_since(at) < self.cooldown)
    }

    fn prune_cooldowns(&mut self, now: Instant) {
        let keep = COOLDOWN_RETENTION.max(self.cooldown);
        self.last_send
            .retain(|_, &mut at| now.saturating_duration_since(at) <= keep);
    }

    /// Send `text` to every target in order, pacing like a person would.
    pub async fn deliver<T>(
        &mut self,
        transport: &T,
        targets: &[ChannelId],
        text: &str,
    ) -> DeliveryReport
    where
        T: Transport + ?Sized,
    {
        let mut report = DeliveryReport::default();
        let now = Instant::now();

        if self.breaker.is_open_at(now) {
            warn!("Circuit breaker open, skipping delivery to {} channel(s)", targets.len());
            report.total_targets = targets.len();
            return report;
        }

        self.prune_cooldowns(now);
        let mut queue: Vec<ChannelId> = Vec::with_capacity(targets.len());
        for &target in targets {
            if queue.contains(&target) {
                continue;
            }
            if self.in_cooldown(target, now) {
                debug!("Channel {target} still in cooldown");
                continue;
            }
            queue.push(target);
        }
        if queue.is_empty() {
            warn!("All targets in cooldown");
            return report;
        }
        report.total_targets = queue.len();

        info!("Sending to {} channel(s)...", queue.len());
        let started = Instant::now();

        for (i, &target) in queue.iter().enumerate() {
            if self.breaker.is_open_at(Instant::now()) {
                warn!("Circuit breaker opened, stopping delivery");
                break;
            }

            if i == 0 {
                let typing = self.typing_delay(text);
                debug!("Typing for {:.1}s", typing.as_secs_f64());
                sleep(typing).await;
            } else if let Some(pause) = self.coffee_pause() {
                report.human_pauses += 1;
                info!("Random pause: {:.1}s", pause.as_secs_f64());
                sleep(pause).await;
            } else {
                let wait = self.between_delay();
                debug!("Waiting {:.1}s before next channel", wait.as_secs_f64());
                sleep(wait).await;
            }

            self.last_send.insert(target, Instant::now());
            let sent_at = Instant::now();
            match send_with_retry(transport, target, text).await {
                Ok(()) => {
                    self.breaker.record_success();
                    report.success_count += 1;
                    info!(
                        "Delivered to {target} ({:.2}s)",
                        sent_at.elapsed().as_secs_f64()
                    );
                }
                Err(e) => {
                    warn!("Delivery to {target} failed: {e:#}");
                    self.breaker.record_failure_at(Instant::now());
                    self.last_send.remove(&target);
                    report.failures += 1;
                }
            }
        }

        info!(
            "Delivery finished: {}/{} in {:.1}s",
            report.success_count,
            report.total_targets,
            started.elapsed().as_secs_f64()
        );
        report
    }

    fn typing_delay(&mut self, text: &str) -> Duration {
        let per_char = self.rng.gen_range(TYPING_MS_PER_CHAR);
        let ms = (text.chars().count() as u64)
            .saturating_mul(per_char)
            .max(self.human.min_typing_time)
            .min(self.human.max_typing_time);
        Duration::from_millis(ms)
    }

    fn between_delay(&mut self) -> Duration {
        let (lo, hi) = (self.human.min_between_groups, self.human.max_between_groups);
        Duration::from_millis(random_in(&mut self.rng, lo, hi))
    }

    fn coffee_pause(&mut self) -> Option<Duration> {
        let chance = self.human.random_pause_chance.clamp(0.0, 1.0);
        if !self.rng.gen_bool(chance) {
            return None;
        }
        let base = self.human.random_pause_duration;
        Some(Duration::from_millis(random_in(
            &mut self.rng,
            base,
            base.saturating_add(PAUSE_SPREAD_MS),
        )))
    }
}

fn random_in(rng: &mut StdRng, lo: u64, hi: u64) -> u64 {
    if hi <= lo { lo } else { rng.gen_range(lo..=hi) }
}

/// One attempt bounded by [`SEND_TIMEOUT`]; a timeout earns exactly one
/// retry after a short backoff.  Transport errors are not retried.
async fn send_with_retry<T>(transport: &T, target: ChannelId, text: &str) -> Result<()>
where
    T: Transport + ?Sized,
{
    match timeout(SEND_TIMEOUT, transport.send(target, text)).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Send to {target} timed out, retrying once");
            sleep(RETRY_BACKOFF).await;
            timeout(SEND_TIMEOUT, transport.send(target, text))
                .await
                .map_err(|_| anyhow!("timed out twice"))?
                .context("retry failed")
        }
    }
}

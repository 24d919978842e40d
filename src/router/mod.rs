//! The routing engine: one inbound message in, zero or more deliveries out.
//!
//! Gates run cheapest first (source, sender, blocklist, classifier, phone,
//! length) before the fingerprint and rate checks.  Only then are cities
//! extracted and pipelines matched.  The engine owns every piece of mutable
//! state and is driven by a single task.
pub mod router_tests;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ChannelId, RouterConfig};
use crate::dedup::{FingerprintCache, message_fingerprint};
use crate::delivery::breaker::BreakerState;
use crate::delivery::{DeliveryReport, DeliveryScheduler, Transport};
use crate::filter::{contains_blocked_number, has_phone_number, is_taxi_request};
use crate::rate_limit::{RateCounters, RateLimiter};
use crate::route::{extract_cities_for_pipelines, match_pipelines};

/// Fingerprints are written out after every this many forwarded leads.
const SAVE_EVERY: u64 = 10;

/// A message as it arrives from a monitored chat.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub text: String,
    pub source_channel_id: ChannelId,
    pub external_id: String,
    /// Epoch milliseconds.
    pub timestamp_ms: i64,
    pub is_from_self: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotMonitored,
    FromSelf,
    BlockedNumber,
    NotALead,
    NoPhone,
    TooShort,
    Duplicate,
    RateLimited,
    NoPipeline,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotMonitored => "not a monitored source",
            Self::FromSelf => "sent by this account",
            Self::BlockedNumber => "blocked number",
            Self::NotALead => "not a ride request",
            Self::NoPhone => "no phone number",
            Self::TooShort => "too short",
            Self::Duplicate => "duplicate",
            Self::RateLimited => "rate limited",
            Self::NoPipeline => "no matching pipeline",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Rejected(Rejection),
    /// Handed to the scheduler; `report.success_count` may still be zero.
    Routed {
        cities: Vec<String>,
        pipelines: Vec<String>,
        report: DeliveryReport,
    },
}

#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterStats {
    pub total_messages: u64,
    pub processed: u64,
    pub duplicates_skipped: u64,
    pub rejected_not_monitored: u64,
    pub rejected_from_me: u64,
    pub rejected_blocked_number: u64,
    pub rejected_not_taxi: u64,
    pub rejected_no_phone: u64,
    pub rejected_too_short: u64,
    pub rejected_rate_limit: u64,
    pub rejected_no_pipeline: u64,
    pub send_successes: u64,
    pub send_failures: u64,
    pub human_pauses: u64,
    pub pipelines_matched: BTreeMap<String, u64>,
}

impl RouterStats {
    fn count(&mut self, reason: Rejection) {
        let counter = match reason {
            Rejection::NotMonitored => &mut self.rejected_not_monitored,
            Rejection::FromSelf => &mut self.rejected_from_me,
            Rejection::BlockedNumber => &mut self.rejected_blocked_number,
            Rejection::NotALead => &mut self.rejected_not_taxi,
            Rejection::NoPhone => &mut self.rejected_no_phone,
            Rejection::TooShort => &mut self.rejected_too_short,
            Rejection::Duplicate => &mut self.duplicates_skipped,
            Rejection::RateLimited => &mut self.rejected_rate_limit,
            Rejection::NoPipeline => &mut self.rejected_no_pipeline,
        };
        *counter += 1;
    }
}

/// Point-in-time view of the engine for logs and diagnostics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub stats: RouterStats,
    pub rate: RateCounters,
    pub circuit_breaker: BreakerState,
    pub fingerprint_cache_size: usize,
    pub cooldown_entries: usize,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.stats;
        write!(
            f,
            "messages={} forwarded={} dup={} sends={}/{} pauses={} | {}/{}h {}/{}d | breaker={} ({} failures) | cache={}",
            s.total_messages,
            s.processed,
            s.duplicates_skipped,
            s.send_successes,
            s.send_successes + s.send_failures,
            s.human_pauses,
            self.rate.hourly,
            self.rate.hourly_limit,
            self.rate.daily,
            self.rate.daily_limit,
            if self.circuit_breaker.is_open { "open" } else { "closed" },
            self.circuit_breaker.failure_count,
            self.fingerprint_cache_size,
        )
    }
}

pub struct RouterEngine {
    cfg: RouterConfig,
    transport: Box<dyn Transport>,
    fingerprints: FingerprintCache,
    fingerprint_path: PathBuf,
    limiter: RateLimiter,
    scheduler: DeliveryScheduler,
    stats: RouterStats,
}

impl RouterEngine {
    /// Build the engine and load the persisted fingerprint cache.
    pub fn new(cfg: RouterConfig, transport: Box<dyn Transport>) -> Self {
        let fingerprint_path = cfg.fingerprint_path();
        let fingerprints =
            FingerprintCache::load(&fingerprint_path, cfg.deduplication.max_fingerprint_cache);
        let limiter = RateLimiter::new(&cfg.rate_limits);
        let scheduler = DeliveryScheduler::new(
            cfg.human_behavior.clone(),
            &cfg.deduplication,
            &cfg.circuit_breaker,
        );

        let mut stats = RouterStats::default();
        for p in &cfg.pipelines {
            stats.pipelines_matched.insert(p.name.clone(), 0);
        }

        info!("Router ready\n{}", cfg.summary());
        Self {
            cfg,
            transport,
            fingerprints,
            fingerprint_path,
            limiter,
            scheduler,
            stats,
        }
    }

    pub fn stats(&self) -> &RouterStats {
        &self.stats
    }

    fn reject(&mut self, reason: Rejection) -> Outcome {
        self.stats.count(reason);
        Outcome::Rejected(reason)
    }

    /// Run one message through every gate and, if it survives, deliver it.
    pub async fn process(&mut self, msg: &InboundMessage) -> Outcome {
        self.stats.total_messages += 1;
        let text = msg.text.as_str();
        info!(
            "Message #{} from {} ({}): {:?}",
            self.stats.total_messages,
            msg.source_channel_id,
            msg.external_id,
            preview(text, 60)
        );

        if let Some(reason) = self.gate(msg) {
            info!("Rejected: {reason}");
            return self.reject(reason);
        }

        let fingerprint = message_fingerprint(text, msg.timestamp_ms);
        debug!("Fingerprint {fingerprint}");
        if !self.fingerprints.check_and_insert(&fingerprint) {
            info!("Duplicate, skipped");
            return self.reject(Rejection::Duplicate);
        }

        if !self.limiter.check() {
            let c = self.limiter.counters();
            warn!(
                "Rate limit reached: {}/{}h, {}/{}d",
                c.hourly, c.hourly_limit, c.daily, c.daily_limit
            );
            return self.reject(Rejection::RateLimited);
        }

        let cities = extract_cities_for_pipelines(text, &self.cfg.pipelines);
        info!(
            "Cities found: {}",
            if cities.is_empty() { "none".to_string() } else { cities.join(", ") }
        );

        let route = match_pipelines(&cities, &self.cfg.pipelines);
        for name in &route.pipelines {
            *self
                .stats
                .pipelines_matched
                .entry(name.to_string())
                .or_insert(0) += 1;
        }
        if route.targets.is_empty() {
            warn!("No pipeline matched, message not forwarded (check cityScope settings)");
            self.stats.count(Rejection::NoPipeline);
            return Outcome::Rejected(Rejection::NoPipeline);
        }
        let pipelines: Vec<String> = route.pipelines.iter().map(|p| p.to_string()).collect();
        info!(
            "Matched {} pipeline(s): {} → {} channel(s)",
            pipelines.len(),
            pipelines.join(", "),
            route.targets.len()
        );

        let report = self
            .scheduler
            .deliver(&*self.transport, &route.targets, text)
            .await;

        self.stats.send_successes += report.success_count as u64;
        self.stats.send_failures += report.failures as u64;
        self.stats.human_pauses += report.human_pauses as u64;

        if report.success_count > 0 {
            self.limiter.record_delivery();
            self.stats.processed += 1;
            if self.stats.processed % SAVE_EVERY == 0 {
                self.flush();
            }
        }

        let c = self.limiter.counters();
        info!(
            "Complete: {}/{} delivered | {}/{}h",
            report.success_count, report.total_targets, c.hourly, c.hourly_limit
        );

        Outcome::Routed {
            cities,
            pipelines,
            report,
        }
    }

    /// Content-independent and content gates, in order.
    fn gate(&self, msg: &InboundMessage) -> Option<Rejection> {
        let text = msg.text.as_str();
        if !self.cfg.source_channel_ids.contains(&msg.source_channel_id) {
            return Some(Rejection::NotMonitored);
        }
        if msg.is_from_self {
            return Some(Rejection::FromSelf);
        }
        if contains_blocked_number(text, &self.cfg.blocked_phone_numbers) {
            return Some(Rejection::BlockedNumber);
        }
        if !is_taxi_request(
            text,
            &self.cfg.request_keywords,
            &self.cfg.ignore_if_contains,
            &[],
        ) {
            return Some(Rejection::NotALead);
        }
        if self.cfg.validation.require_phone_number && !has_phone_number(text) {
            return Some(Rejection::NoPhone);
        }
        let len = text.chars().count();
        if len < self.cfg.validation.min_message_length {
            debug!("{len} chars, need {}", self.cfg.validation.min_message_length);
            return Some(Rejection::TooShort);
        }
        None
    }

    /// Persist the fingerprint cache; failures are logged, never fatal.
    pub fn flush(&self) {
        match self.fingerprints.save(&self.fingerprint_path) {
            Ok(()) => debug!("Fingerprints saved ({})", self.fingerprints.len()),
            Err(e) => warn!("Fingerprint cache save failed: {e:#}"),
        }
    }

    pub fn snapshot(&mut self) -> StatsSnapshot {
        StatsSnapshot {
            stats: self.stats.clone(),
            rate: self.limiter.counters(),
            circuit_breaker: self.scheduler.breaker_state(),
            fingerprint_cache_size: self.fingerprints.len(),
            cooldown_entries: self.scheduler.cooldown_entries(),
        }
    }

    /// Final flush before the process exits.
    pub fn shutdown(&mut self) {
        self.flush();
        info!("Router stopped. {}", self.snapshot());
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

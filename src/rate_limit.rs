//! Global hourly / daily caps on forwarded leads.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::info;

use crate::config::RateLimits;

const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateCounters {
    pub hourly: u32,
    pub daily: u32,
    pub hourly_limit: u32,
    pub daily_limit: u32,
}

/// Counters only move forward on a delivered lead and only fall back to
/// zero when their window rolls over.
#[derive(Debug)]
pub struct RateLimiter {
    hourly_limit: u32,
    daily_limit: u32,
    hourly: u32,
    daily: u32,
    hour_start: Instant,
    day_start: Instant,
}

impl RateLimiter {
    pub fn new(limits: &RateLimits) -> Self {
        Self::new_at(limits, Instant::now())
    }

    pub fn new_at(limits: &RateLimits, now: Instant) -> Self {
        Self {
            hourly_limit: limits.hourly,
            daily_limit: limits.daily,
            hourly: 0,
            daily: 0,
            hour_start: now,
            day_start: now,
        }
    }

    /// Roll over expired windows, then report whether another lead may go
    /// out.
    pub fn check(&mut self) -> bool {
        self.check_at(Instant::now())
    }

    pub fn check_at(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.hour_start) > HOUR {
            info!("Hourly window reset ({} sent)", self.hourly);
            self.hourly = 0;
            self.hour_start = now;
        }
        if now.saturating_duration_since(self.day_start) > DAY {
            info!("Daily window reset ({} sent)", self.daily);
            self.daily = 0;
            self.day_start = now;
        }
        self.hourly < self.hourly_limit && self.daily < self.daily_limit
    }

    /// Count one delivered lead, however many channels received it.
    pub fn record_delivery(&mut self) {
        self.hourly += 1;
        self.daily += 1;
    }

    pub fn counters(&self) -> RateCounters {
        RateCounters {
            hourly: self.hourly,
            daily: self.daily,
            hourly_limit: self.hourly_limit,
            daily_limit: self.daily_limit,
        }
    }
}

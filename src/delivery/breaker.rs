//! Consecutive-failure circuit breaker for outbound sends.
//!
//! The cool-down is checked lazily whenever the breaker is consulted, so
//! there is no timer to arm or cancel.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::CircuitBreakerCfg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerState {
    pub is_open: bool,
    pub failure_count: u32,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    max_failures: u32,
    cool_down: Duration,
    failures: u32,
    opened_at: Option<Instant>,
}

impl CircuitBreaker {
    pub fn new(cfg: &CircuitBreakerCfg) -> Self {
        Self {
            max_failures: cfg.max_failures.max(1),
            cool_down: cfg.break_duration(),
            failures: 0,
            opened_at: None,
        }
    }

    /// Closes the breaker (and zeroes the counter) once the cool-down has
    /// run out.
    pub fn is_open_at(&mut self, now: Instant) -> bool {
        let Some(opened_at) = self.opened_at else {
            return false;
        };
        if now.saturating_duration_since(opened_at) >= self.cool_down {
            self.opened_at = None;
            self.failures = 0;
            info!("Circuit breaker closed, sends resume");
            return false;
        }
        true
    }

    /// Failures while already open are counted but do not restart the
    /// cool-down.
    pub fn record_failure_at(&mut self, now: Instant) {
        let open = self.is_open_at(now);
        self.failures += 1;
        if !open && self.failures >= self.max_failures {
            self.opened_at = Some(now);
            warn!(
                "Circuit breaker OPEN after {} failures, pausing sends for {}s",
                self.failures,
                self.cool_down.as_secs()
            );
        }
    }

    pub fn record_success(&mut self) {
        self.failures = self.failures.saturating_sub(1);
    }

    pub fn state_at(&mut self, now: Instant) -> BreakerState {
        BreakerState {
            is_open: self.is_open_at(now),
            failure_count: self.failures,
        }
    }
}

//! Router configuration: the per-bot JSON file (sources, pipelines) merged
//! with global defaults for keywords, limits and pacing.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::filter::lead_keywords::{
    BLOCKED_PHONE_NUMBERS, IGNORE_IF_CONTAINS, REQUEST_KEYWORDS, owned,
};
use crate::route::WILDCARD;

/// Chat identifier as seen by the transport.
pub type ChannelId = i64;

/// File name of the fingerprint cache when the config does not name one.
const DEFAULT_FINGERPRINT_FILE: &str = ".forwarded-messages.json";

/// Upper bound for any single human-pacing delay, in milliseconds.
pub const MAX_HUMAN_DELAY_MS: u64 = 10 * 60 * 1000;

/// A named routing rule: which cities it accepts and where matches go.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub name: String,
    /// Canonical city names, or `"*"` for everything.
    pub city_scope: Vec<String>,
    #[serde(alias = "targetGroups")]
    pub target_channel_ids: Vec<ChannelId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateLimits {
    pub hourly: u32,
    pub daily: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            hourly: 80,
            daily: 700,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Validation {
    pub min_message_length: usize,
    pub require_phone_number: bool,
}

impl Default for Validation {
    fn default() -> Self {
        Self {
            min_message_length: 10,
            require_phone_number: true,
        }
    }
}

/// Pacing that makes outbound traffic look like a person typing.
/// All values in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HumanBehavior {
    pub min_typing_time: u64,
    pub max_typing_time: u64,
    pub min_between_groups: u64,
    pub max_between_groups: u64,
    pub random_pause_chance: f64,
    pub random_pause_duration: u64,
}

impl Default for HumanBehavior {
    fn default() -> Self {
        Self {
            min_typing_time: 2000,
            max_typing_time: 4000,
            min_between_groups: 2000,
            max_between_groups: 4000,
            random_pause_chance: 0.15,
            random_pause_duration: 3000,
        }
    }
}

impl HumanBehavior {
    /// No delays at all; handy for replays and tests.
    pub fn instant() -> Self {
        Self {
            min_typing_time: 0,
            max_typing_time: 0,
            min_between_groups: 0,
            max_between_groups: 0,
            random_pause_chance: 0.0,
            random_pause_duration: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CircuitBreakerCfg {
    pub max_failures: u32,
    /// Milliseconds.
    pub break_duration: u64,
}

impl Default for CircuitBreakerCfg {
    fn default() -> Self {
        Self {
            max_failures: 10,
            break_duration: 60_000,
        }
    }
}

impl CircuitBreakerCfg {
    pub fn break_duration(&self) -> Duration {
        Duration::from_millis(self.break_duration)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deduplication {
    pub max_fingerprint_cache: usize,
    /// Milliseconds a destination is skipped after a send.
    pub send_cooldown: u64,
}

impl Default for Deduplication {
    fn default() -> Self {
        Self {
            max_fingerprint_cache: 2000,
            send_cooldown: 1000,
        }
    }
}

impl Deduplication {
    pub fn send_cooldown(&self) -> Duration {
        Duration::from_millis(self.send_cooldown)
    }
}

/// Everything the routing engine needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    #[serde(default)]
    pub bot_name: Option<String>,
    #[serde(alias = "sourceGroupIds")]
    pub source_channel_ids: Vec<ChannelId>,
    pub pipelines: Vec<Pipeline>,
    #[serde(default = "default_request_keywords")]
    pub request_keywords: Vec<String>,
    #[serde(default = "default_ignore_if_contains")]
    pub ignore_if_contains: Vec<String>,
    #[serde(default = "default_blocked_phone_numbers")]
    pub blocked_phone_numbers: Vec<String>,
    #[serde(default)]
    pub rate_limits: RateLimits,
    #[serde(default)]
    pub validation: Validation,
    #[serde(default)]
    pub human_behavior: HumanBehavior,
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerCfg,
    #[serde(default)]
    pub deduplication: Deduplication,
    /// Relative paths resolve against the config file's directory.
    #[serde(default)]
    pub fingerprint_file: Option<PathBuf>,
}

fn default_request_keywords() -> Vec<String> {
    owned(REQUEST_KEYWORDS)
}

fn default_ignore_if_contains() -> Vec<String> {
    owned(IGNORE_IF_CONTAINS)
}

fn default_blocked_phone_numbers() -> Vec<String> {
    owned(BLOCKED_PHONE_NUMBERS)
}

impl RouterConfig {
    /// Load from `ROUTER_CONFIG_PATH` (default `./config.json`).
    pub fn from_env() -> Result<Self> {
        let path =
            std::env::var("ROUTER_CONFIG_PATH").unwrap_or_else(|_| "./config.json".into());
        Self::load(Path::new(&path))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut cfg = Self::from_json(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))?;

        let base = path.parent().unwrap_or(Path::new("."));
        let file = cfg
            .fingerprint_file
            .take()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FINGERPRINT_FILE));
        cfg.fingerprint_file = Some(if file.is_absolute() {
            file
        } else {
            base.join(file)
        });

        info!("Config loaded from {}: {cfg}", path.display());
        Ok(cfg)
    }

    /// Parse, normalize and validate a config document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut cfg: Self = serde_json::from_str(raw).context("config is not valid JSON")?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    fn normalize(&mut self) {
        for list in [
            &mut self.request_keywords,
            &mut self.ignore_if_contains,
        ] {
            for word in list.iter_mut() {
                *word = word.trim().to_lowercase();
            }
            list.retain(|w| !w.is_empty());
        }

        for pipeline in &mut self.pipelines {
            pipeline.name = pipeline.name.trim().to_string();
            for city in pipeline.city_scope.iter_mut() {
                *city = city.trim().to_string();
            }
            let mut seen = Vec::with_capacity(pipeline.target_channel_ids.len());
            pipeline.target_channel_ids.retain(|id| {
                if seen.contains(id) {
                    false
                } else {
                    seen.push(*id);
                    true
                }
            });
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_channel_ids.is_empty() {
            bail!("sourceChannelIds must list at least one channel");
        }
        if self.pipelines.is_empty() {
            bail!("at least one pipeline must be configured");
        }
        for (idx, p) in self.pipelines.iter().enumerate() {
            if p.name.is_empty() {
                bail!("pipeline {idx} is missing 'name'");
            }
            if p.city_scope.iter().all(|c| c.is_empty()) {
                bail!("pipeline '{}' has an empty cityScope", p.name);
            }
            if p.target_channel_ids.is_empty() {
                bail!("pipeline '{}' must have at least one target channel", p.name);
            }
        }

        if self.rate_limits.hourly == 0 || self.rate_limits.daily == 0 {
            bail!("rateLimits must be non-zero");
        }
        let hb = &self.human_behavior;
        if hb.min_typing_time > hb.max_typing_time {
            bail!("humanBehavior: minTypingTime > maxTypingTime");
        }
        if hb.min_between_groups > hb.max_between_groups {
            bail!("humanBehavior: minBetweenGroups > maxBetweenGroups");
        }
        for (key, ms) in [
            ("maxTypingTime", hb.max_typing_time),
            ("maxBetweenGroups", hb.max_between_groups),
            ("randomPauseDuration", hb.random_pause_duration),
        ] {
            if ms > MAX_HUMAN_DELAY_MS {
                bail!("humanBehavior: {key} must be at most {MAX_HUMAN_DELAY_MS} ms, got {ms}");
            }
        }
        if !(0.0..=1.0).contains(&hb.random_pause_chance) {
            return Err(anyhow!(
                "humanBehavior: randomPauseChance must be within 0..=1, got {}",
                hb.random_pause_chance
            ));
        }
        if self.circuit_breaker.max_failures == 0 {
            bail!("circuitBreaker.maxFailures must be at least 1");
        }
        if self.deduplication.max_fingerprint_cache == 0 {
            bail!("deduplication.maxFingerprintCache must be at least 1");
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        self.bot_name.as_deref().unwrap_or("lead-relay")
    }

    pub fn fingerprint_path(&self) -> PathBuf {
        self.fingerprint_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FINGERPRINT_FILE))
    }

    /// Multi-line operational summary for the startup log.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{}: {} source channel(s), {} pipeline(s)\n",
            self.name(),
            self.source_channel_ids.len(),
            self.pipelines.len()
        );
        for p in &self.pipelines {
            let scope = if p.city_scope.iter().any(|c| c == WILDCARD) {
                "<all cities>".to_string()
            } else {
                p.city_scope.join(", ")
            };
            out.push_str(&format!(
                "  → {}: {} → {} target(s)\n",
                p.name,
                scope,
                p.target_channel_ids.len()
            ));
        }
        out.push_str(&format!(
            "  limits {}/hour, {}/day · min length {} · typing {}-{}ms · between {}-{}ms · pause {:.0}%\n",
            self.rate_limits.hourly,
            self.rate_limits.daily,
            self.validation.min_message_length,
            self.human_behavior.min_typing_time,
            self.human_behavior.max_typing_time,
            self.human_behavior.min_between_groups,
            self.human_behavior.max_between_groups,
            self.human_behavior.random_pause_chance * 100.0,
        ));
        out.push_str(&format!(
            "  keywords {} · ignore {} · blocked numbers {}",
            self.request_keywords.len(),
            self.ignore_if_contains.len(),
            self.blocked_phone_numbers.len()
        ));
        out
    }
}

impl fmt::Display for RouterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RouterConfig(name={}, sources={}, pipelines={}, limits={}/{}, breaker={}x/{}s)",
            self.name(),
            self.source_channel_ids.len(),
            self.pipelines.len(),
            self.rate_limits.hourly,
            self.rate_limits.daily,
            self.circuit_breaker.max_failures,
            self.circuit_breaker.break_duration().as_secs(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "sourceGroupIds": [1001],
        "pipelines": [
            { "name": "tricity", "cityScope": ["Mohali", "Chandigarh"], "targetGroups": [-1, -2, -1] }
        ]
    }"#;

    #[test]
    fn defaults_fill_missing_sections() {
        let cfg = RouterConfig::from_json(MINIMAL).unwrap();
        assert_eq!(cfg.rate_limits.hourly, 80);
        assert_eq!(cfg.rate_limits.daily, 700);
        assert_eq!(cfg.validation.min_message_length, 10);
        assert_eq!(cfg.circuit_breaker.max_failures, 10);
        assert_eq!(cfg.deduplication.max_fingerprint_cache, 2000);
        assert!(cfg.request_keywords.contains(&"taxi".to_string()));
        assert!(!cfg.blocked_phone_numbers.is_empty());
    }

    #[test]
    fn legacy_keys_and_duplicate_targets() {
        let cfg = RouterConfig::from_json(MINIMAL).unwrap();
        assert_eq!(cfg.source_channel_ids, vec![1001]);
        assert_eq!(cfg.pipelines[0].target_channel_ids, vec![-1, -2]);
    }

    #[test]
    fn rejects_pipeline_without_targets() {
        let raw = r#"{
            "sourceChannelIds": [1],
            "pipelines": [{ "name": "x", "cityScope": ["*"], "targetChannelIds": [] }]
        }"#;
        let err = RouterConfig::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("at least one target"), "{err}");
    }

    #[test]
    fn rejects_empty_sources_and_pipelines() {
        assert!(RouterConfig::from_json(r#"{"sourceChannelIds": [], "pipelines": []}"#).is_err());
        assert!(RouterConfig::from_json(r#"{"sourceChannelIds": [1], "pipelines": []}"#).is_err());
    }

    #[test]
    fn rejects_inverted_ranges() {
        let raw = r#"{
            "sourceChannelIds": [1],
            "pipelines": [{ "name": "x", "cityScope": ["*"], "targetChannelIds": [2] }],
            "humanBehavior": { "minTypingTime": 5000, "maxTypingTime": 1000 }
        }"#;
        assert!(RouterConfig::from_json(raw).is_err());
    }

    #[test]
    fn rejects_unbounded_pause_duration() {
        let raw = r#"{
            "sourceChannelIds": [1],
            "pipelines": [{ "name": "x", "cityScope": ["*"], "targetChannelIds": [2] }],
            "humanBehavior": { "randomPauseChance": 1.0, "randomPauseDuration": 18446744073709551615 }
        }"#;
        let err = RouterConfig::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("randomPauseDuration"), "{err}");

        let at_limit = raw.replace("18446744073709551615", &MAX_HUMAN_DELAY_MS.to_string());
        assert!(RouterConfig::from_json(&at_limit).is_ok());
    }

    #[test]
    fn fingerprint_file_resolves_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, MINIMAL).unwrap();
        let cfg = RouterConfig::load(&path).unwrap();
        assert_eq!(
            cfg.fingerprint_path(),
            dir.path().join(".forwarded-messages.json")
        );
    }
}

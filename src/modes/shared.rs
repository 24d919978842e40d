use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::Duration;

use crate::router::InboundMessage;

#[derive(Clone)]
pub(super) struct ReplayCfg {
    pub input_path: String,
    pub speed: f64,
    pub fixed_step_ms: Option<u64>,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub broadcast: bool,
    pub fingerprint_path: String,
}

/// One recorded message, one JSON object per line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct DumpEvent {
    /// Epoch seconds.
    pub timestamp: i64,
    pub channel_id: i64,
    #[serde(default)]
    pub channel_title: String,
    pub text: String,
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub outgoing: bool,
}

impl DumpEvent {
    pub fn to_inbound(&self, line: usize) -> InboundMessage {
        InboundMessage {
            text: self.text.clone(),
            source_channel_id: self.channel_id,
            external_id: self
                .message_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| format!("replay-{line}")),
            timestamp_ms: self.timestamp.saturating_mul(1000),
            is_from_self: self.outgoing,
        }
    }
}

pub(super) fn parse_bool_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// How often live mode logs a stats snapshot (`STATS_LOG_SECS`, 0 = off).
pub(super) fn stats_interval() -> Option<Duration> {
    let secs = parse_env::<u64>("STATS_LOG_SECS").unwrap_or(300);
    (secs > 0).then(|| Duration::from_secs(secs))
}

pub(super) fn load_replay_cfg() -> Result<ReplayCfg> {
    let input_path = std::env::var("REPLAY_INPUT_PATH")
        .map_err(|_| anyhow!("Missing env var REPLAY_INPUT_PATH"))?;

    Ok(ReplayCfg {
        input_path,
        speed: parse_env::<f64>("REPLAY_SPEED")
            .filter(|v| *v > 0.0)
            .unwrap_or(1.0),
        fixed_step_ms: parse_env::<u64>("REPLAY_STEP_MS").filter(|v| *v > 0),
        min_delay_ms: parse_env("REPLAY_MIN_DELAY_MS").unwrap_or(0),
        max_delay_ms: parse_env("REPLAY_MAX_DELAY_MS").unwrap_or(10_000),
        broadcast: parse_bool_env("REPLAY_BROADCAST", false),
        fingerprint_path: std::env::var("REPLAY_FINGERPRINT_PATH")
            .unwrap_or_else(|_| "./.replay-fingerprints.json".into()),
    })
}

/// Pause between two consecutive events: the recorded gap scaled by the
/// replay speed and clamped, or the fixed step when one is set.
pub(super) fn replay_delay(prev: &DumpEvent, next: &DumpEvent, cfg: &ReplayCfg) -> Duration {
    let ms = match cfg.fixed_step_ms {
        Some(step) => step,
        None => {
            let delta_s = (next.timestamp - prev.timestamp).max(0) as f64;
            let scaled = (delta_s * 1000.0 / cfg.speed).round() as u64;
            scaled.clamp(cfg.min_delay_ms, cfg.max_delay_ms.max(cfg.min_delay_ms))
        }
    };
    Duration::from_millis(ms)
}

pub(super) fn load_dump_events(path: &str) -> Result<Vec<DumpEvent>> {
    let file = File::open(path).with_context(|| format!("failed to open replay file {path}"))?;
    let reader = BufReader::new(file);

    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let event: DumpEvent = serde_json::from_str(&line)
            .with_context(|| format!("invalid JSON at line {}", idx + 1))?;
        events.push(event);
    }

    events.sort_by_key(|e| (e.timestamp, e.channel_id));
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(timestamp: i64) -> DumpEvent {
        DumpEvent {
            timestamp,
            channel_id: 1,
            channel_title: String::new(),
            text: "x".into(),
            message_id: None,
            outgoing: false,
        }
    }

    fn replay_cfg(speed: f64, fixed_step_ms: Option<u64>) -> ReplayCfg {
        ReplayCfg {
            input_path: String::new(),
            speed,
            fixed_step_ms,
            min_delay_ms: 0,
            max_delay_ms: 10_000,
            broadcast: false,
            fingerprint_path: String::new(),
        }
    }

    #[test]
    fn delay_scales_and_clamps() {
        let cfg = replay_cfg(2.0, None);
        assert_eq!(replay_delay(&event(0), &event(4), &cfg), Duration::from_secs(2));
        assert_eq!(replay_delay(&event(0), &event(600), &cfg), Duration::from_secs(10));
        assert_eq!(replay_delay(&event(5), &event(0), &cfg), Duration::ZERO);
    }

    #[test]
    fn fixed_step_wins() {
        let cfg = replay_cfg(1.0, Some(250));
        assert_eq!(replay_delay(&event(0), &event(100), &cfg), Duration::from_millis(250));
    }

    #[test]
    fn dump_is_sorted_and_converted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.jsonl");
        std::fs::write(
            &path,
            "{\"timestamp\":20,\"channel_id\":5,\"text\":\"later\",\"message_id\":7}\n\n\
             {\"timestamp\":10,\"channel_id\":5,\"channel_title\":\"Drivers\",\"text\":\"first\"}\n",
        )
        .unwrap();

        let events = load_dump_events(path.to_str().unwrap()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].text, "first");

        let inbound = events[1].to_inbound(1);
        assert_eq!(inbound.external_id, "7");
        assert_eq!(inbound.timestamp_ms, 20_000);
        assert_eq!(events[0].to_inbound(0).external_id, "replay-0");
    }

    #[test]
    fn bad_line_is_reported_with_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.jsonl");
        std::fs::write(&path, "{\"timestamp\":1,\"channel_id\":1,\"text\":\"ok\"}\nnope\n").unwrap();
        let err = load_dump_events(path.to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"), "{err:#}");
    }
}

//! Content fingerprints and the bounded cache that remembers which leads
//! were already forwarded, mirrored to a JSON file across restarts.

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Width of a fingerprint time bucket.
const BUCKET_MS: i64 = 5 * 60 * 1000;
/// Fingerprint text is cut to this many characters before hashing.
const MAX_FINGERPRINT_TEXT: usize = 300;
/// Entries older than this are dropped when the file is loaded.
const RETENTION_MS: i64 = 2 * 60 * 60 * 1000;
/// At most this many of the newest entries are written out.
const MAX_SAVED_ENTRIES: usize = 1000;

static LONG_DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{10,}").expect("digit run regex"));

// ─────────────────────────── Fingerprint ─────────────────────────────────

/// `fp-<hash>-<bucket>` for a message posted at `timestamp_ms`.
///
/// The same text reposted within one five-minute bucket yields the same
/// fingerprint; phone numbers are masked so a lead reposted with another
/// contact number still collides.  Empty text has no fingerprint.
pub fn message_fingerprint(text: &str, timestamp_ms: i64) -> String {
    if text.is_empty() {
        return String::new();
    }

    let collapsed = text
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let word_chars: String = collapsed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    let masked = LONG_DIGIT_RUN.replace_all(&word_chars, "PHONE");
    // Only ASCII survives the filter above, so byte truncation is safe.
    let mut key = masked.trim().to_string();
    key.truncate(MAX_FINGERPRINT_TEXT);

    let hash = key
        .encode_utf16()
        .fold(0i32, |h, unit| {
            h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
        });

    format!(
        "fp-{}-{}",
        to_base36(hash.unsigned_abs()),
        timestamp_ms.div_euclid(BUCKET_MS)
    )
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

// ─────────────────────────── Cache ───────────────────────────────────────

/// One persisted cache entry.  `timestamp` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintEntry {
    pub fingerprint: String,
    pub timestamp: i64,
}

/// Insertion-ordered set with FIFO eviction.
#[derive(Debug)]
pub struct FingerprintCache {
    order: VecDeque<FingerprintEntry>,
    seen: HashSet<String>,
    capacity: usize,
}

impl FingerprintCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity.min(4096)),
            seen: HashSet::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.seen.contains(fingerprint)
    }

    /// `true` when the fingerprint was new (and is now remembered).
    pub fn check_and_insert(&mut self, fingerprint: &str) -> bool {
        self.check_and_insert_at(fingerprint, Utc::now().timestamp_millis())
    }

    pub fn check_and_insert_at(&mut self, fingerprint: &str, now_ms: i64) -> bool {
        if self.contains(fingerprint) {
            return false;
        }
        self.seen.insert(fingerprint.to_string());
        self.order.push_back(FingerprintEntry {
            fingerprint: fingerprint.to_string(),
            timestamp: now_ms,
        });
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.seen.remove(&evicted.fingerprint);
                debug!("Evicted fingerprint {}", evicted.fingerprint);
            }
        }
        true
    }

    /// Load a persisted cache.  Never fails: a missing file is created
    /// empty, an unreadable one is logged and ignored.
    pub fn load(path: &Path, capacity: usize) -> Self {
        Self::load_at(path, capacity, Utc::now().timestamp_millis())
    }

    pub fn load_at(path: &Path, capacity: usize, now_ms: i64) -> Self {
        let mut cache = Self::new(capacity);

        if !path.exists() {
            match std::fs::write(path, "[]") {
                Ok(()) => info!("Created fingerprint cache at {}", path.display()),
                Err(e) => warn!("Failed to create fingerprint cache {}: {e}", path.display()),
            }
            return cache;
        }

        let entries = match read_entries(path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Fingerprint cache load failed: {e:#}");
                return cache;
            }
        };

        let horizon = now_ms - RETENTION_MS;
        for entry in entries.into_iter().filter(|e| e.timestamp > horizon) {
            if !cache.seen.contains(&entry.fingerprint) {
                cache.seen.insert(entry.fingerprint.clone());
                cache.order.push_back(entry);
            }
        }
        while cache.order.len() > cache.capacity {
            if let Some(evicted) = cache.order.pop_front() {
                cache.seen.remove(&evicted.fingerprint);
            }
        }

        info!(
            "Loaded {} fingerprint(s) from {} (2h window)",
            cache.len(),
            path.display()
        );
        cache
    }

    /// Write the newest entries to `path` through a temp file + rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let skip = self.order.len().saturating_sub(MAX_SAVED_ENTRIES);
        let newest: Vec<&FingerprintEntry> = self.order.iter().skip(skip).collect();
        let body = serde_json::to_string(&newest).context("failed to serialize fingerprints")?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        std::fs::write(&tmp, body)
            .with_context(|| format!("failed to write {}", Path::new(&tmp).display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("failed to replace {}", path.display()))?;

        debug!("Saved {} fingerprint(s) to {}", newest.len(), path.display());
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<Vec<FingerprintEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

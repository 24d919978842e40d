//! Route extraction and pipeline matching.
//!
//! A base scan over the whole message is always the authority on which
//! cities are mentioned.  Route shapes ("from x to y", "x se y",
//! "pickup: x") only add cities the base scan might have missed; they never
//! gate or replace it, because real messages are far too irregular for a
//! pattern-first approach.
pub mod city_aliases;
pub mod route_tests;

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::{ChannelId, Pipeline};
use crate::filter::normalize_text;
use crate::route::city_aliases::canonical_city;

/// Scope entry that accepts every message.
pub const WILDCARD: &str = "*";

/// Longest alias phrase, in words.
const MAX_PHRASE_WORDS: usize = 6;

/// Words that can sit inside a route phrase without being part of a place
/// name ("delhi innova airport", "amritsar travels").  None of these occur
/// in any alias.
const NOISE_WORDS: &[&str] = &[
    // vehicles
    "taxi", "cab", "cabs", "car", "sedan", "suv", "innova", "crysta", "ertiga", "dzire", "dezire",
    "etios", "aura", "tempo", "traveller", "xylo", "swift", "amaze", "ciaz", "honda", "wagonr",
    "eeco", "tavera", "bolero", "scorpio", "vehicle", "gaadi", "gadi",
    // business
    "travels", "travel", "tours", "tour", "tourism", "service", "services", "booking", "contact",
    "call", "whatsapp", "phone", "mob", "mobile", "number", "driver", "owner", "required", "need",
    "needed", "urgent", "fare", "rate", "rs",
    // time of day
    "morning", "evening", "night", "noon", "afternoon", "today", "tomorrow", "tonight", "am", "pm",
    "now", "asap", "early", "time",
];

fn is_noise(word: &str) -> bool {
    NOISE_WORDS.contains(&word)
}

/// Split into words on whitespace and route punctuation; edge punctuation
/// is trimmed so "delhi." and "(delhi)" both read as "delhi".
fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | ',' | '|' | '/'))
        .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation()))
        .filter(|w| !w.is_empty())
        .collect()
}

fn push_unique(found: &mut Vec<String>, city: &str) {
    if !found.iter().any(|c| c == city) {
        found.push(city.to_string());
    }
}

// ─────────────────────────── City lookup ─────────────────────────────────

/// The cities referenced by the configured pipelines, and how to recognize
/// them in text.
struct CityMatcher<'a> {
    /// lowercase canonical → spelling used in the pipeline config
    cities: HashMap<String, &'a str>,
}

impl<'a> CityMatcher<'a> {
    fn from_pipelines(pipelines: &'a [Pipeline]) -> Self {
        let mut cities = HashMap::new();
        for city in pipelines.iter().flat_map(|p| p.city_scope.iter()) {
            let city = city.trim();
            if city.is_empty() || city == WILDCARD {
                continue;
            }
            cities.entry(city.to_lowercase()).or_insert(city);
        }
        Self { cities }
    }

    fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Resolve a phrase to a configured city: either the canonical name
    /// itself or an alias of one.
    fn lookup(&self, phrase: &str) -> Option<&'a str> {
        // Two-letter codes ("cp", "t3") only count as a standalone
        // alphanumeric token, never as a fragment of something else.
        if phrase.chars().count() <= 2 && !phrase.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }

        if let Some(&city) = self.cities.get(phrase) {
            return Some(city);
        }
        let canonical = canonical_city(phrase)?;
        self.cities.get(&canonical.to_lowercase()).copied()
    }

    /// Greedy left-to-right scan, longest phrase first.  Noise words are
    /// dropped beforehand so they cannot split a multi-word place name.
    fn scan_segment(&self, segment: &str, found: &mut Vec<String>) {
        let words: Vec<&str> = tokenize(segment)
            .into_iter()
            .filter(|w| !is_noise(w))
            .collect();

        let mut i = 0;
        while i < words.len() {
            let longest = MAX_PHRASE_WORDS.min(words.len() - i);
            let hit = (1..=longest).rev().find_map(|len| {
                self.lookup(&words[i..i + len].join(" "))
                    .map(|city| (city, len))
            });
            match hit {
                Some((city, len)) => {
                    push_unique(found, city);
                    i += len;
                }
                None => i += 1,
            }
        }
    }

    /// Last resort: every start index, every window length, noise words
    /// included.
    fn exhaustive_scan(&self, text: &str, found: &mut Vec<String>) {
        let words = tokenize(text);
        for i in 0..words.len() {
            let longest = MAX_PHRASE_WORDS.min(words.len() - i);
            if let Some(city) =
                (1..=longest).rev().find_map(|len| self.lookup(&words[i..i + len].join(" ")))
            {
                push_unique(found, city);
            }
        }
    }
}

// ─────────────────────────── Route shapes ────────────────────────────────

/// Tail that ends a free-text place phrase: a contact hint, a number or the
/// end of the message.
const PHRASE_END: &str = r"(?:\s+contact|\s+phone|\s+call|\s+[0-9]|\s*$)";

static FROM_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\bfrom\s+(.+?)\s+to\s+(.+?){PHRASE_END}")).expect("from-to regex")
});

static BARE_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(.+?)\s+to\s+(.+?){PHRASE_END}")).expect("bare-to regex")
});

static HINDI_SE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:\S+\s+){0,2}\S+)\s+(?:se|से)\s+((?:\S+\s+){0,2}\S+)").expect("se regex")
});

static HYPHEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([^\s-]+(?:\s+[^\s-]+){0,2})\s*-\s*([^\s-]+(?:\s+[^\s-]+){0,2})")
        .expect("hyphen regex")
});

static LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:pickup|pick up|drop|place)\b\s*:?\s*").expect("label regex")
});

/// Where a labeled phrase stops: the next label, a separator, a contact
/// hint or a number.
static LABEL_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(?:drop|pickup|pick up|place|to)\b|\s*[-,]|\s+(?:phone|contact|call)|(?:^|\s+)[0-9]")
        .expect("label end regex")
});

/// Enrichment strategies, applied in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteShape {
    /// "from kharar to delhi airport"
    FromTo,
    /// "kharar to delhi", only when there is no "from"
    BareTo,
    /// "kharar se delhi" / "खरड़ से दिल्ली", only when there is no "to"
    HindiSe,
    /// "kharar - delhi", numeric sides rejected
    Hyphen,
    /// "pickup: kharar drop: delhi", "place: zirakpur"
    Labeled,
}

impl RouteShape {
    const ORDERED: [RouteShape; 5] = [
        Self::FromTo,
        Self::BareTo,
        Self::HindiSe,
        Self::Hyphen,
        Self::Labeled,
    ];

    fn applies(self, tokens: &HashSet<&str>) -> bool {
        match self {
            Self::BareTo => !tokens.contains("from"),
            Self::HindiSe => !tokens.contains("to"),
            Self::FromTo | Self::Hyphen | Self::Labeled => true,
        }
    }

    /// Sub-phrases this shape picks out of the normalized text.
    fn captures(self, text: &str) -> Vec<String> {
        fn first_groups(re: &Regex, text: &str) -> Vec<String> {
            re.captures(text)
                .map(|caps| {
                    caps.iter()
                        .skip(1)
                        .flatten()
                        .map(|m| m.as_str().trim().to_string())
                        .collect()
                })
                .unwrap_or_default()
        }

        match self {
            Self::FromTo => first_groups(&FROM_TO, text),
            Self::BareTo => first_groups(&BARE_TO, text),
            Self::HindiSe => first_groups(&HINDI_SE, text),
            Self::Hyphen => HYPHEN
                .captures_iter(text)
                .filter_map(|caps| {
                    let left = caps.get(1)?.as_str().trim();
                    let right = caps.get(2)?.as_str().trim();
                    let numeric = |s: &str| s.chars().all(|c| c.is_ascii_digit() || c == ' ');
                    if numeric(left) || numeric(right) {
                        return None;
                    }
                    Some([left.to_string(), right.to_string()])
                })
                .flatten()
                .collect(),
            // Labels are located first so that one phrase's terminator
            // cannot swallow the next label.
            Self::Labeled => LABEL
                .find_iter(text)
                .filter_map(|label| {
                    let rest = &text[label.end()..];
                    let end = LABEL_END.find(rest).map_or(rest.len(), |m| m.start());
                    let phrase = rest[..end].trim();
                    (!phrase.is_empty()).then(|| phrase.to_string())
                })
                .collect(),
        }
    }
}

// ─────────────────────────── Extraction ──────────────────────────────────

/// Canonical cities mentioned in `text`, restricted to cities some pipeline
/// cares about.  Deduplicated, in first-seen order.
pub fn extract_cities_for_pipelines(text: &str, pipelines: &[Pipeline]) -> Vec<String> {
    let matcher = CityMatcher::from_pipelines(pipelines);
    if text.is_empty() || matcher.is_empty() {
        return Vec::new();
    }

    let normalized = normalize_text(text);
    let mut found = Vec::new();

    for segment in normalized.split([',', '|', '/']) {
        matcher.scan_segment(segment, &mut found);
    }
    matcher.scan_segment(&normalized, &mut found);

    let tokens: HashSet<&str> = tokenize(&normalized).into_iter().collect();
    for shape in RouteShape::ORDERED {
        if !shape.applies(&tokens) {
            continue;
        }
        let before = found.len();
        for phrase in shape.captures(&normalized) {
            matcher.scan_segment(&phrase, &mut found);
        }
        if found.len() > before {
            debug!("{shape:?} added {:?}", &found[before..]);
        }
    }

    if found.is_empty() {
        matcher.exhaustive_scan(&normalized, &mut found);
        if !found.is_empty() {
            debug!("Fallback scan found {found:?}");
        }
    }

    found
}

// ─────────────────────────── Matching ────────────────────────────────────

/// Whether a pipeline with `city_scope` should take a message mentioning
/// `extracted`.  One overlapping city is enough.
pub fn matches_pipeline(extracted: &[String], city_scope: &[String]) -> bool {
    if city_scope.is_empty() {
        return false;
    }
    if city_scope.iter().any(|c| c.trim() == WILDCARD) {
        return true;
    }
    if extracted.is_empty() {
        return false;
    }
    extracted.iter().any(|city| {
        let city = city.to_lowercase();
        city_scope
            .iter()
            .any(|scope| scope.trim().to_lowercase() == city)
    })
}

/// Matching pipelines and the union of their destinations.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub pipelines: Vec<&'a str>,
    /// Pipeline order, first occurrence wins.
    pub targets: Vec<ChannelId>,
}

pub fn match_pipelines<'a>(extracted: &[String], pipelines: &'a [Pipeline]) -> RouteMatch<'a> {
    let mut out = RouteMatch::default();
    for pipeline in pipelines {
        if !matches_pipeline(extracted, &pipeline.city_scope) {
            debug!("No match: {} ({})", pipeline.name, pipeline.city_scope.join(", "));
            continue;
        }
        debug!("Pipeline match: {} ({})", pipeline.name, pipeline.city_scope.join(", "));
        out.pipelines.push(&pipeline.name);
        for &target in &pipeline.target_channel_ids {
            if !out.targets.contains(&target) {
                out.targets.push(target);
            }
        }
    }
    out
}

//! Text normalization, phone detection and lead classification for ride
//! requests posted in driver / dispatcher groups.
//!
//! Messages mix English, Hinglish and Devanagari; normalization keeps both
//! scripts intact so the route extractor can see "दिल्ली से मोहाली" as well as
//! "delhi se mohali".
pub mod lead_keywords;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::filter::lead_keywords::{COUNTRY_CODE, ROUTE_SHAPES};

// ─────────────────────────── Normalization ───────────────────────────────

/// Punctuation that only decorates a message.  Structural separators
/// (`,` `|` `/` `-` `:`) are kept for the route extractor.
const DECORATIVE_PUNCT: &[char] = &[
    '*', '_', '~', '`', '"', '\'', '!', '?', '#', '=', '+', '(', ')', '[', ']', '{', '}', '<',
    '>', '•', '.', ';', '@', '&',
];

/// Emoji, pictographs, dingbats, arrows and the invisible glue characters
/// emoji sequences are built from.
fn is_decorative_glyph(c: char) -> bool {
    matches!(
        c as u32,
        0x1F600..=0x1F64F // emoticons
            | 0x1F300..=0x1F5FF // symbols & pictographs
            | 0x1F680..=0x1F6FF // transport & map
            | 0x1F1E0..=0x1F1FF // regional indicators
            | 0x1F900..=0x1F9FF // supplemental symbols
            | 0x1FA70..=0x1FAFF
            | 0x2190..=0x21FF // arrows
            | 0x2600..=0x26FF // misc symbols
            | 0x2700..=0x27BF // dingbats
            | 0x2B00..=0x2BFF
            | 0xFE00..=0xFE0F // variation selectors
            | 0x200D // zero-width joiner
            | 0x20E3 // keycap
    )
}

/// Canonical form used by every text component: decorations removed,
/// whitespace collapsed, lowercase, consecutive duplicate words dropped.
///
/// Devanagari, Gurmukhi and digits pass through untouched.  The function
/// is idempotent.
pub fn normalize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned: String = text
        .chars()
        .map(|c| {
            if is_decorative_glyph(c) || DECORATIVE_PUNCT.contains(&c) {
                ' '
            } else {
                c
            }
        })
        .collect();
    let lower = cleaned.to_lowercase();

    let mut words: Vec<&str> = Vec::new();
    for word in lower.split_whitespace() {
        if words.last() != Some(&word) {
            words.push(word);
        }
    }
    words.join(" ")
}

// ───────────────────────────── Phones ────────────────────────────────────

/// Digit groupings people actually use when posting a number.
static PHONE_SHAPES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"[0-9]{10}",
        r"[0-9]{5}\s*[0-9]{5}",
        r"[0-9]{5}-[0-9]{5}",
        r"\+?[0-9]{2}\s*[0-9]{10}",
        r"\+?[0-9]{2}[-\s][0-9]{5}[-\s][0-9]{5}",
        r"[0-9]{3}[-\s]?[0-9]{3}[-\s]?[0-9]{4}",
        r"\([0-9]{3}\)\s*[0-9]{3}[-\s]?[0-9]{4}",
        r"[0-9]{2,4}[-\s][0-9]{6,8}",
        r"[0-9]{4}[-\s][0-9]{6}",
        r"[0-9]{2}[-\s][0-9]{8}",
        r"[0-9]{3}-[0-9]{3}-[0-9]{4}",
        r"\b[0-9]{10,12}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("phone shape regex"))
    .collect()
});

fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// `true` when the text carries something shaped like a phone number.
/// Needs at least 8 digits overall (separators ignored) before any shape is
/// tried.
pub fn has_phone_number(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    if text.chars().filter(char::is_ascii_digit).count() < 8 {
        return false;
    }

    PHONE_SHAPES.iter().any(|re| re.is_match(text))
}

/// `true` when the text contains any blocked number, bare or with the
/// country prefix in front.
pub fn contains_blocked_number(text: &str, blocked_numbers: &[String]) -> bool {
    if text.is_empty() || blocked_numbers.is_empty() {
        return false;
    }

    let text_digits = digits_only(text);
    for blocked in blocked_numbers {
        let blocked_digits = digits_only(blocked);
        if blocked_digits.is_empty() {
            continue;
        }
        if text_digits.contains(&blocked_digits)
            || text_digits.contains(&format!("{COUNTRY_CODE}{blocked_digits}"))
        {
            debug!("Blocked number {blocked_digits} found");
            return true;
        }
    }
    false
}

// ─────────────────────────── Classification ──────────────────────────────

static ROUTE_SHAPE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ROUTE_SHAPES
        .iter()
        .map(|p| Regex::new(p).expect("route shape regex"))
        .collect()
});

/// Returns `true` when the message reads like a ride request.
///
/// Blocked numbers and ignore phrases veto the message outright.  After
/// that a single keyword or a route shape ("from x to y", "x to y",
/// pickup / drop) is enough; whether a known city is mentioned does not
/// matter here.
pub fn is_taxi_request(
    text: &str,
    keywords: &[String],
    ignore_list: &[String],
    blocked_numbers: &[String],
) -> bool {
    if text.is_empty() {
        return false;
    }

    if contains_blocked_number(text, blocked_numbers) {
        return false;
    }

    let original_lower = text.to_lowercase();
    if let Some(word) = ignore_list
        .iter()
        .find(|w| original_lower.contains(w.to_lowercase().as_str()))
    {
        debug!("Ignore phrase {word:?} present – not a lead");
        return false;
    }

    let normalized = normalize_text(text);
    let has_keyword = keywords
        .iter()
        .any(|kw| normalized.contains(kw.to_lowercase().as_str()));
    if has_keyword {
        return true;
    }

    ROUTE_SHAPE_PATTERNS.iter().any(|re| re.is_match(&normalized))
}

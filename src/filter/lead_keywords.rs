//! Default word lists for lead classification.
//!
//! These are the out-of-the-box values; every list can be overridden from
//! the router config file.  All entries are lowercase.

/// Words that mark a message as a ride request.  Matched as substrings of
/// the normalized text, so short stems ("pik", "tu") catch spelling variants.
pub const REQUEST_KEYWORDS: &[&str] = &[
    "need",
    "tu",
    "pickup",
    "pik",
    "pick",
    "urgent",
    "carrier",
    "time",
    "drop",
    "cab",
    "car",
    "taxi",
    "ride",
    // vehicle models drivers post by name
    "sedan",
    "sadan",
    "crysta",
    "dezire",
    "honda",
    "crunt",
    "small",
    "aura",
    "suv",
    "innova",
    "ertiga",
    "dzire",
    "etios",
    "current",
    "tempo",
    "parcel",
    "airport",
    "outstation",
];

/// Phrases that veto a message even when it looks like a request:
/// greetings, "empty car available" offers, spam and fraud warnings.
pub const IGNORE_IF_CONTAINS: &[&str] = &[
    "good morning",
    "good night",
    "gm",
    "gn",
    "free",
    "fre",
    "ferr",
    "frre",
    "link",
    "join",
    "exchange",
    "xchange",
    "ex",
    "exx",
    "khali",
    "khaali",
    "khadi", // parked / standing
    "khari",
    "sale",
    "available",
    "avialable",
    "loan",
    "fraud",
    "frod",
    "frode",
    "ford",
    "honi",
    "kali",
    "hone",
    "hoto",
    // Hindi
    "खाली",
    "खड़ी",
    // Punjabi
    "ਖਾਲੀ",
    "ਖੜੀ",
    "empty",
    "taxiwale",
];

/// Numbers of known spammers.  Matched digit-wise, with and without the
/// country prefix.
pub const BLOCKED_PHONE_NUMBERS: &[&str] = &[
    "9855880586",
    "6283647124",
    "9891562384",
    "9736688640",
    "7696885288",
    "9763388678",
    "9736688678",
    "7888749316",
    "9465661404",
    "9914577606",
    "7065843991",
    "9568471648",
    "9053581010",
    "7827147818",
    "8000183633",
    "8146915221",
    "9214847225",
    "6350027596",
    "8054609766",
    "8283841812",
    "7526823870",
    "9855325054",
    "7888387141",
];

/// Route shapes that count as a request even without a keyword.
pub const ROUTE_SHAPES: &[&str] = &[
    r"\bfrom\b.+\bto\b",
    r"\bto\b.+\bfrom\b",
    r"\b\w+\s+to\s+\w+",
    r"pickup",
    r"drop",
];

/// Country prefix tried in front of every blocked number.
pub const COUNTRY_CODE: &str = "91";

pub fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

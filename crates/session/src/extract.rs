//! Classification and field extraction for pasted ride descriptions.
//!
//! A pasted blob is first scored for trip-data markers and structural
//! confirmation; only then are key/value lines parsed and mapped through the
//! alias table onto the three canonical fields. Text that fails either stage
//! is a normal negative result, never an error.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use uuid::Uuid;

/// Markers counted towards the classification score.
const MARKERS: [&str; 4] = ["trip #", "passenger name", "from", "destination"];
/// Literal provider markers accepted as a secondary signal.
const PROVIDER_MARKERS: [&str; 2] = ["via\tuber", "via uber"];

/// Key aliases for the passenger, including localized spellings seen in the
/// field.
const NAME_KEYS: [&str; 5] = ["passenger name", "passeggero", "fruitore", "rider", "cliente"];
const ORIGIN_KEYS: [&str; 3] = ["from", "partenza", "pickup"];
const DESTINATION_KEYS: [&str; 5] =
    ["destination", "destinazione", "drop-off", "drop off", "dropoff"];

static TRIP_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)trip\s*#\s*:?\s*([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})",
    )
    .expect("trip id pattern")
});
static DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{2}/\d{2}/\d{2}\s+\d{2}:\d{2}:\d{2}(?:\s+[A-Z]{2,5})?\b")
        .expect("date-time pattern")
});
static KEY_VALUE_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}|:\s*").expect("key/value pattern"));
static LEADING_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*cin:\s*[a-z0-9]+,\s*").expect("reference pattern"));
static LEADING_POSTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}\b").expect("postcode pattern"));
static TRAILING_POSTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\b\d{5}\s*$").expect("postcode pattern"));

/// Structured fields recovered from pasted trip text.
///
/// Absent fields were simply not present in the input; they are never
/// defaulted. An entirely empty extraction means the text carried nothing
/// usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub service_user: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
}

impl Extraction {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.service_user.is_none() && self.origin.is_none() && self.destination.is_none()
    }
}

/// Scores text for trip-data markers plus at least one structural signal.
///
/// At least three of the four markers must appear, together with one of: a
/// UUID-shaped trip identifier, a `DD/MM/YY HH:MM:SS` timestamp, or a
/// literal provider marker. The conjunction keeps ordinary prose containing
/// common words like "from" out.
#[must_use]
pub fn looks_like_trip_text(text: &str) -> bool {
    let lower = text.to_lowercase();
    let score = MARKERS.iter().filter(|marker| lower.contains(*marker)).count();
    if score < 3 {
        return false;
    }
    has_trip_id(text)
        || DATE_TIME.is_match(text)
        || PROVIDER_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn has_trip_id(text: &str) -> bool {
    TRIP_ID
        .captures(text)
        .is_some_and(|caps| Uuid::parse_str(&caps[1]).is_ok())
}

/// Classifies and, when accepted, extracts. `None` means "no trip data".
#[must_use]
pub fn detect(text: &str) -> Option<Extraction> {
    if !looks_like_trip_text(text) {
        return None;
    }
    let extraction = extract_fields(text);
    if extraction.is_empty() { None } else { Some(extraction) }
}

/// Parses key/value lines and maps known aliases onto the canonical fields.
///
/// Each line splits on its first tab, else on the first run of two or more
/// spaces or a colon. Keys are lower-cased; origin and destination values
/// pass through [`clean_address`].
#[must_use]
pub fn extract_fields(text: &str) -> Extraction {
    let mut pairs: HashMap<String, String> = HashMap::new();
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let (key, value) = if let Some(split) = line.split_once('\t') {
            split
        } else {
            let mut parts = KEY_VALUE_SPLIT.splitn(line, 2);
            let Some(key) = parts.next() else { continue };
            let Some(value) = parts.next() else { continue };
            (key, value)
        };
        pairs.insert(key.trim().to_lowercase(), value.trim().to_string());
    }

    let extraction = Extraction {
        service_user: first_value(&pairs, &NAME_KEYS),
        origin: cleaned_value(&pairs, &ORIGIN_KEYS),
        destination: cleaned_value(&pairs, &DESTINATION_KEYS),
    };
    debug!(
        service_user = extraction.service_user.is_some(),
        origin = extraction.origin.is_some(),
        destination = extraction.destination.is_some(),
        "fields extracted from pasted text"
    );
    extraction
}

fn first_value(pairs: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| pairs.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

fn cleaned_value(pairs: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
    first_value(pairs, keys)
        .map(|value| clean_address(&value))
        .filter(|value| !value.is_empty())
}

/// Normalizes a pasted address.
///
/// Drops a leading `Cin: <ref>,` courier prefix, comma segments that begin
/// with a 5-digit postal code, a bare trailing postal code inside a kept
/// segment, and a trailing country name; comma and space runs collapse to
/// single separators.
#[must_use]
pub fn clean_address(raw: &str) -> String {
    let stripped = LEADING_REFERENCE.replace(raw, "");
    let mut segments: Vec<String> = Vec::new();
    for segment in stripped.split(',') {
        let segment = segment.trim();
        if segment.is_empty() || LEADING_POSTCODE.is_match(segment) {
            continue;
        }
        let trimmed = TRAILING_POSTCODE.replace(segment, "");
        let trimmed = trimmed.trim();
        if !trimmed.is_empty() {
            segments.push(trimmed.split_whitespace().collect::<Vec<_>>().join(" "));
        }
    }
    if let Some(last) = segments.last()
        && (last.eq_ignore_ascii_case("italia") || last.eq_ignore_ascii_case("italy"))
    {
        segments.pop();
    }
    segments.join(", ")
}

/// Deduplicates clipboard scan ticks so the same pasted text is offered to
/// the consumer at most once.
#[derive(Debug, Clone, Default)]
pub struct ClipboardMonitor {
    last_seen: String,
    last_handled: String,
}

impl ClipboardMonitor {
    /// Returns trip-looking text the first time it shows up on a tick.
    pub fn offer(&mut self, contents: &str) -> Option<String> {
        let trimmed = contents.trim();
        if trimmed.is_empty() || trimmed == self.last_seen || trimmed == self.last_handled {
            return None;
        }
        if !looks_like_trip_text(trimmed) {
            return None;
        }
        self.last_seen = trimmed.to_string();
        debug!(len = trimmed.len(), "trip data found on clipboard");
        Some(trimmed.to_string())
    }

    /// Remembers text the consumer imported or dismissed, so it is not
    /// offered again.
    pub fn mark_handled(&mut self, contents: &str) {
        self.last_handled = contents.trim().to_string();
    }
}

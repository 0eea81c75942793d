//! Variable generator specifications and the pure value computation behind them.
//!
//! Each `GeneratorSpec` describes one synthetic value producer (dates, ids,
//! random numbers/strings, timestamps). `generate_value` is the single source
//! of truth for what a generator produces; the two script dialects emitted by
//! [`crate::script`] compute the same value inside the generated JavaScript.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

/// Sentinel emitted when a generator declares a kind nobody implements.
/// Generation must still complete; the value is just visibly broken.
pub const UNKNOWN_KIND_SENTINEL: &str = "ERROR_UNKNOWN_TYPE";

/// Sentinel for `conditionalDate` conditions without a synthesis rule
/// (`weekday`, `monthEnd` are accepted by the UI but unimplemented).
pub const UNSUPPORTED_CONDITION_SENTINEL: &str = "ERROR_UNSUPPORTED_CONDITION";

pub const ALPHANUMERIC_CHARSET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const ALPHABETIC_CHARSET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const NUMERIC_CHARSET: &str = "0123456789";

pub const DEFAULT_OFFSET_DAYS: i64 = -30;
pub const DEFAULT_RANDOM_MIN: i64 = 1000;
pub const DEFAULT_RANDOM_MAX: i64 = 9999;
pub const DEFAULT_STRING_LENGTH: i64 = 8;

/// The supported generator kinds. Unknown kinds are kept, not rejected,
/// so a bad spec degrades to a sentinel value instead of failing the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GeneratorKind {
    CurrentDate,
    CurrentDateTime,
    FuturePastDate,
    ConditionalDate,
    CorrelationId,
    RandomNumber,
    RandomString,
    Timestamp,
    Other(String),
}

impl From<String> for GeneratorKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "currentDate" | "date" => GeneratorKind::CurrentDate,
            "currentDateTime" => GeneratorKind::CurrentDateTime,
            "futurePastDate" => GeneratorKind::FuturePastDate,
            "conditionalDate" => GeneratorKind::ConditionalDate,
            "correlationId" | "uuid" => GeneratorKind::CorrelationId,
            "randomNumber" => GeneratorKind::RandomNumber,
            "randomString" => GeneratorKind::RandomString,
            "timestamp" => GeneratorKind::Timestamp,
            _ => GeneratorKind::Other(s),
        }
    }
}

impl From<GeneratorKind> for String {
    fn from(kind: GeneratorKind) -> Self {
        kind.as_str().to_string()
    }
}

impl GeneratorKind {
    pub fn as_str(&self) -> &str {
        match self {
            GeneratorKind::CurrentDate => "currentDate",
            GeneratorKind::CurrentDateTime => "currentDateTime",
            GeneratorKind::FuturePastDate => "futurePastDate",
            GeneratorKind::ConditionalDate => "conditionalDate",
            GeneratorKind::CorrelationId => "correlationId",
            GeneratorKind::RandomNumber => "randomNumber",
            GeneratorKind::RandomString => "randomString",
            GeneratorKind::Timestamp => "timestamp",
            GeneratorKind::Other(s) => s,
        }
    }
}

/// Declarative description of one synthetic value producer.
///
/// The web UI posts numeric parameters as strings, so the integer fields
/// accept either representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: GeneratorKind,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub offset: Option<i64>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub min: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub max: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub length: Option<i64>,
    #[serde(default)]
    pub charset: Option<String>,
}

impl GeneratorSpec {
    pub fn new(name: impl Into<String>, kind: GeneratorKind) -> Self {
        Self {
            name: name.into(),
            kind,
            format: None,
            offset: None,
            condition: None,
            min: None,
            max: None,
            length: None,
            charset: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn offset_days(&self) -> i64 {
        self.offset.unwrap_or(DEFAULT_OFFSET_DAYS)
    }

    pub fn random_range(&self) -> (i64, i64) {
        (
            self.min.unwrap_or(DEFAULT_RANDOM_MIN),
            self.max.unwrap_or(DEFAULT_RANDOM_MAX),
        )
    }

    pub fn string_length(&self) -> i64 {
        self.length.unwrap_or(DEFAULT_STRING_LENGTH)
    }

    pub fn charset_chars(&self) -> &'static str {
        match self.charset.as_deref() {
            Some("alphabetic") => ALPHABETIC_CHARSET,
            Some("numeric") => NUMERIC_CHARSET,
            _ => ALPHANUMERIC_CHARSET,
        }
    }
}

/// Lenient deserializer for integers the UI may post as strings.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        Float(f64),
        Text(String),
    }

    let value: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        NumberOrString::Number(n) => Some(n),
        NumberOrString::Float(f) => Some(f as i64),
        NumberOrString::Text(s) => s.trim().parse().ok(),
    }))
}

/// Compute the value a generator produces at `now` with the given RNG.
///
/// This is the semantic contract both script dialects must reproduce.
/// Unknown kinds and unimplemented conditions yield sentinel values; this
/// function never fails.
pub fn generate_value<R: Rng>(spec: &GeneratorSpec, now: DateTime<Utc>, rng: &mut R) -> String {
    match &spec.kind {
        GeneratorKind::CurrentDate => render_date(now, spec.format.as_deref()),
        GeneratorKind::CurrentDateTime => render_datetime(now, spec.format.as_deref()),
        GeneratorKind::FuturePastDate => {
            let shifted = now + Duration::days(spec.offset_days());
            render_offset_date(shifted, spec.format.as_deref())
        }
        GeneratorKind::ConditionalDate => match spec.condition.as_deref() {
            Some("endOfMonth") => {
                let date = if now.day() >= 28 {
                    now - Duration::days(3)
                } else {
                    now
                };
                format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
            }
            _ => UNSUPPORTED_CONDITION_SENTINEL.to_string(),
        },
        GeneratorKind::CorrelationId => {
            let id = random_uuid(rng);
            match spec.format.as_deref() {
                Some("compact") => id.replace('-', ""),
                Some("short") => id.replace('-', "").chars().take(8).collect(),
                _ => id,
            }
        }
        GeneratorKind::RandomNumber => {
            let (min, max) = spec.random_range();
            rng.gen_range(min..=max).to_string()
        }
        GeneratorKind::RandomString => {
            let chars: Vec<char> = spec.charset_chars().chars().collect();
            (0..spec.string_length())
                .map(|_| chars[rng.gen_range(0..chars.len())])
                .collect()
        }
        GeneratorKind::Timestamp => match spec.format.as_deref() {
            Some("unix") => now.timestamp().to_string(),
            Some("unixMs") => now.timestamp_millis().to_string(),
            _ => now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        },
        GeneratorKind::Other(_) => UNKNOWN_KIND_SENTINEL.to_string(),
    }
}

/// Version-4-style UUID drawn from the caller's RNG so tests can seed it.
fn random_uuid<R: Rng>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes[..]);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    uuid::Uuid::from_bytes(bytes).to_string()
}

/// A missing format means `MMddyyyy`, matching the emitted scripts'
/// `format || 'MMddyyyy'` fallback; only unrecognized formats render the
/// ISO default.
fn render_date(now: DateTime<Utc>, format: Option<&str>) -> String {
    let (y, m, d) = (now.year(), now.month(), now.day());
    match format {
        Some("MMddyyyy") | None => format!("{:02}{:02}{:04}", m, d, y),
        Some("yyyy-MM-dd") => format!("{:04}-{:02}-{:02}", y, m, d),
        Some("dd/MM/yyyy") => format!("{:02}/{:02}/{:04}", d, m, y),
        Some("yyyyMMdd") => format!("{:04}{:02}{:02}", y, m, d),
        _ => format!("{:04}-{:02}-{:02}", y, m, d),
    }
}

/// futurePastDate supports a narrower format table than currentDate.
fn render_offset_date(date: DateTime<Utc>, format: Option<&str>) -> String {
    let (y, m, d) = (date.year(), date.month(), date.day());
    match format {
        Some("yyyy-MM-dd") => format!("{:04}-{:02}-{:02}", y, m, d),
        Some("MMddyyyy") => format!("{:02}{:02}{:04}", m, d, y),
        _ => format!("{:04}-{:02}-{:02}", y, m, d),
    }
}

fn render_datetime(now: DateTime<Utc>, format: Option<&str>) -> String {
    let (y, m, d) = (now.year(), now.month(), now.day());
    let (h, min, s) = (now.hour(), now.minute(), now.second());
    match format {
        Some("yyyy-MM-dd HH:mm:ss") => {
            format!("{:04}-{:02}-{:02} {:02}:{:02}:{:02}", y, m, d, h, min, s)
        }
        Some("yyyy-MM-dd'T'HH:mm:ss") => {
            format!("{:04}-{:02}-{:02}T{:02}:{:02}:{:02}", y, m, d, h, min, s)
        }
        _ => format!("{:04}-{:02}-{:02} {:02}:{:02}:{:02}", y, m, d, h, min, s),
    }
}

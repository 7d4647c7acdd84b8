//! Built-in handlers for types a plain structural encoding would lose.

use crate::{PayloadDecoder, PayloadEncoder, RegistryError, RegistryResult, TypeHandler};
use chrono::{DateTime, SecondsFormat, Utc};
use regex_lite::Regex;
use serde_json::json;
use std::fmt;
use tagwalk_types::{PlainForm, Value};

/// Type id written for [`DateTime<Utc>`] values.
pub const DATE_TYPE_ID: &str = "Date";

/// Type id written for [`Pattern`] values.
pub const PATTERN_TYPE_ID: &str = "RegExp";

/// Encodes `chrono::DateTime<Utc>` as `{"iso": "2023-01-01T00:00:00.000Z"}`.
///
/// Precision is milliseconds; finer components are truncated on encode.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateHandler;

impl TypeHandler for DateHandler {
    fn type_id(&self) -> &str {
        DATE_TYPE_ID
    }

    fn matches(&self, value: &Value) -> bool {
        value.as_custom::<DateTime<Utc>>().is_some()
    }

    fn encode(&self, value: &Value, _encoder: &mut dyn PayloadEncoder) -> RegistryResult<PlainForm> {
        let date = value
            .as_custom::<DateTime<Utc>>()
            .ok_or_else(|| RegistryError::payload(DATE_TYPE_ID, "value is not a date"))?;
        Ok(json!({ "iso": date.to_rfc3339_opts(SecondsFormat::Millis, true) }))
    }

    fn decode(&self, payload: &PlainForm, _decoder: &mut dyn PayloadDecoder) -> RegistryResult<Value> {
        let iso = payload
            .get("iso")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RegistryError::payload(DATE_TYPE_ID, "missing string field `iso`"))?;
        let date = DateTime::parse_from_rfc3339(iso)
            .map_err(|e| RegistryError::payload(DATE_TYPE_ID, format!("bad timestamp {iso:?}: {e}")))?;
        Ok(Value::custom(date.with_timezone(&Utc)))
    }
}

/// A compiled regular expression that compares by its source text.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compiles `source`.
    pub fn new(source: &str) -> Result<Self, regex_lite::Error> {
        Ok(Self(Regex::new(source)?))
    }

    /// The pattern as written.
    pub fn source(&self) -> &str {
        self.0.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.0
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source() == other.source()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source())
    }
}

/// Encodes [`Pattern`] as `{"source": "..."}`. Flags travel inline in the
/// source (`(?i)...`).
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternHandler;

impl TypeHandler for PatternHandler {
    fn type_id(&self) -> &str {
        PATTERN_TYPE_ID
    }

    fn matches(&self, value: &Value) -> bool {
        value.as_custom::<Pattern>().is_some()
    }

    fn encode(&self, value: &Value, _encoder: &mut dyn PayloadEncoder) -> RegistryResult<PlainForm> {
        let pattern = value
            .as_custom::<Pattern>()
            .ok_or_else(|| RegistryError::payload(PATTERN_TYPE_ID, "value is not a pattern"))?;
        Ok(json!({ "source": pattern.source() }))
    }

    fn decode(&self, payload: &PlainForm, _decoder: &mut dyn PayloadDecoder) -> RegistryResult<Value> {
        let source = payload
            .get("source")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RegistryError::payload(PATTERN_TYPE_ID, "missing string field `source`"))?;
        let pattern = Pattern::new(source)
            .map_err(|e| RegistryError::payload(PATTERN_TYPE_ID, e.to_string()))?;
        Ok(Value::custom(pattern))
    }
}

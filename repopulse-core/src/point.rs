//! Time-series points and their InfluxDB line protocol encoding.
//!
//! A [`Point`] is the unit the Influx sender batches and writes. Encoding
//! follows the v1 line protocol: `measurement,tags fields timestamp`, with
//! nanosecond timestamps. Tag and field maps are ordered so the encoded
//! output is deterministic.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::Write as _;

// ============================================================================
// Field values
// ============================================================================

/// A single field value on a time-series point.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Signed integer field (`42i` on the wire).
    Integer(i64),
    /// Float field.
    Float(f64),
    /// String field (double-quoted on the wire).
    Text(String),
    /// Boolean field.
    Boolean(bool),
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

// ============================================================================
// Point
// ============================================================================

/// A single time-series point.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Measurement name.
    pub measurement: String,
    /// Indexed tag set.
    pub tags: BTreeMap<String, String>,
    /// Field set. Must not be empty when encoded.
    pub fields: BTreeMap<String, FieldValue>,
    /// Point timestamp.
    pub timestamp: DateTime<Utc>,
}

impl Point {
    /// Creates a point stamped with the current time.
    pub fn new(measurement: impl Into<String>) -> Self {
        Self::at(measurement, Utc::now())
    }

    /// Creates a point with an explicit timestamp.
    pub fn at(measurement: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp,
        }
    }

    /// Adds a tag.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.tags.insert(key.into(), value.into());
        self
    }

    /// Adds a field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let _ = self.fields.insert(key.into(), value.into());
        self
    }

    /// Encodes the point as one line of InfluxDB line protocol.
    pub fn to_line_protocol(&self) -> String {
        let mut line = escape_measurement(&self.measurement);

        for (key, value) in &self.tags {
            let _ = write!(line, ",{}={}", escape_key(key), escape_key(value));
        }

        let mut first = true;
        for (key, value) in &self.fields {
            line.push(if first { ' ' } else { ',' });
            first = false;
            let _ = write!(line, "{}=", escape_key(key));
            match value {
                FieldValue::Integer(i) => {
                    let _ = write!(line, "{i}i");
                }
                FieldValue::Float(f) => {
                    let _ = write!(line, "{f}");
                }
                FieldValue::Text(s) => {
                    let _ = write!(line, "\"{}\"", escape_string_field(s));
                }
                FieldValue::Boolean(b) => {
                    let _ = write!(line, "{b}");
                }
            }
        }

        let nanos = self
            .timestamp
            .timestamp_nanos_opt()
            .unwrap_or_else(|| self.timestamp.timestamp_millis().saturating_mul(1_000_000));
        let _ = write!(line, " {nanos}");

        line
    }
}

// ============================================================================
// Escaping
// ============================================================================

// Measurements escape commas and spaces; tag/field keys and tag values
// additionally escape equals signs; string field values escape quotes and
// backslashes.

fn escape_measurement(value: &str) -> String {
    value.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_key(value: &str) -> String {
    value
        .replace(',', "\\,")
        .replace(' ', "\\ ")
        .replace('=', "\\=")
}

fn escape_string_field(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

// ============================================================================
// Tests
// ============================================================================

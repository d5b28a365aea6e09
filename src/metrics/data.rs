//! Data structures for the AirVisual device API.

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode a JSON `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// One set of sensor readings reported by the monitor.
///
/// Missing or `null` fields decode as zero, so a reading of `0` cannot be
/// told apart from a field the device did not send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reading {
    /// CO2 concentration in ppm
    #[serde(rename = "co", deserialize_with = "null_as_default")]
    pub co2: i64,
    /// PM2.5 particulate reading
    #[serde(rename = "p2", deserialize_with = "null_as_default")]
    pub p25: i64,
    /// PM10 particulate reading
    #[serde(rename = "p1", deserialize_with = "null_as_default")]
    pub p10: i64,
    /// Temperature in Celsius
    #[serde(rename = "tp", deserialize_with = "null_as_default")]
    pub temperature: f64,
    /// Relative humidity percentage
    #[serde(rename = "hm", deserialize_with = "null_as_default")]
    pub humidity: i64,
}

/// The JSON envelope returned by the device, `{"current": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub current: Reading,
}

impl ApiResponse {
    /// Decode an envelope from a raw response body.
    ///
    /// Keys match case-insensitively and a bare `null` body decodes as an
    /// empty envelope.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(fold_keys(value))?)
    }
}

/// Lowercase object keys at every depth. When two keys fold together the
/// lowercase spelling wins.
fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut folded = serde_json::Map::new();
            let mut exact = Vec::new();
            for (key, value) in map {
                let lower = key.to_lowercase();
                if lower == key {
                    exact.push(lower.clone());
                } else if exact.contains(&lower) {
                    continue;
                }
                folded.insert(lower, fold_keys(value));
            }
            Value::Object(folded)
        }
        other => other,
    }
}

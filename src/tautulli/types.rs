use crate::error::{Error, Result};
use crate::serde_helpers::null_as_default;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;

/// A numeric field the history API sends either quoted or unquoted.
///
/// Season and episode indices arrive as numbers, numeric strings, empty
/// strings or `null` depending on the item; [`FlexibleIndex::resolve`] is the
/// only place that turns them into integers.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FlexibleIndex {
    Integer(i64),
    Text(String),
    #[default]
    Absent,
}

impl FlexibleIndex {
    /// Resolve to an integer, defaulting to `0` when absent or empty.
    ///
    /// Text that is not a decimal integer is an error for `field`.
    pub fn resolve(&self, field: &'static str) -> Result<i64> {
        match self {
            FlexibleIndex::Integer(n) => Ok(*n),
            FlexibleIndex::Absent => Ok(0),
            FlexibleIndex::Text(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(0);
                }
                trimmed.parse::<i64>().map_err(|_| Error::InvalidIndex {
                    field,
                    value: raw.clone(),
                })
            }
        }
    }
}

impl From<i64> for FlexibleIndex {
    fn from(n: i64) -> Self {
        FlexibleIndex::Integer(n)
    }
}

struct FlexibleIndexVisitor;

impl<'de> Visitor<'de> for FlexibleIndexVisitor {
    type Value = FlexibleIndex;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer, a numeric string or null")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
        Ok(FlexibleIndex::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
        i64::try_from(v)
            .map(FlexibleIndex::Integer)
            .map_err(|_| E::custom(format!("index {v} out of range")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
        // Whole floats are accepted as integers; anything else fails on resolve.
        if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
            Ok(FlexibleIndex::Integer(v as i64))
        } else {
            Ok(FlexibleIndex::Text(v.to_string()))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        Ok(FlexibleIndex::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Self::Value, E> {
        Ok(FlexibleIndex::Text(v))
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(FlexibleIndex::Absent)
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(FlexibleIndex::Absent)
    }
}

impl<'de> Deserialize<'de> for FlexibleIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(FlexibleIndexVisitor)
    }
}

/// One playback session from `get_history`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_title: String,

    #[serde(default)]
    pub parent_media_index: FlexibleIndex,

    #[serde(default)]
    pub media_index: FlexibleIndex,

    /// `1` once the server considers the item watched.
    #[serde(default, deserialize_with = "null_as_default")]
    pub watched_status: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub percent_complete: i64,
}

/// Envelope returned by the history API: `{response: {data: {data: [...]}}}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub response: HistoryResponseBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryResponseBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: HistoryPage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<HistoryRecord>,
}

impl HistoryResponse {
    pub fn into_records(self) -> Vec<HistoryRecord> {
        self.response.data.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: serde_json::Value) -> HistoryRecord {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_index_variants() {
        let r = record(serde_json::json!({
            "full_title": "Show",
            "parent_media_index": "3",
            "media_index": 7,
        }));
        assert_eq!(r.parent_media_index, FlexibleIndex::Text("3".into()));
        assert_eq!(r.parent_media_index.resolve("parent_media_index").unwrap(), 3);
        assert_eq!(r.media_index, FlexibleIndex::Integer(7));
        assert_eq!(r.media_index.resolve("media_index").unwrap(), 7);
    }

    #[test]
    fn test_null_and_missing_indices_resolve_to_zero() {
        let r = record(serde_json::json!({
            "full_title": "Movie",
            "parent_media_index": null,
        }));
        assert_eq!(r.parent_media_index, FlexibleIndex::Absent);
        assert_eq!(r.media_index, FlexibleIndex::Absent);
        assert_eq!(r.parent_media_index.resolve("parent_media_index").unwrap(), 0);
        assert_eq!(r.media_index.resolve("media_index").unwrap(), 0);
    }

    #[test]
    fn test_empty_text_resolves_to_zero() {
        assert_eq!(FlexibleIndex::Text(String::new()).resolve("media_index").unwrap(), 0);
        assert_eq!(FlexibleIndex::Text(" 12 ".into()).resolve("media_index").unwrap(), 12);
    }

    #[test]
    fn test_non_numeric_text_is_an_error() {
        let err = FlexibleIndex::Text("pilot".into())
            .resolve("media_index")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidIndex { field: "media_index", .. }));

        let fractional = record(serde_json::json!({ "media_index": 1.5 }));
        assert!(fractional.media_index.resolve("media_index").is_err());
    }

    #[test]
    fn test_whole_float_index_is_integer() {
        let r = record(serde_json::json!({ "media_index": 4.0 }));
        assert_eq!(r.media_index, FlexibleIndex::Integer(4));
    }

    #[test]
    fn test_null_numeric_fields_default() {
        let r = record(serde_json::json!({
            "full_title": null,
            "watched_status": null,
            "percent_complete": null,
        }));
        assert_eq!(r.full_title, "");
        assert_eq!(r.watched_status, 0.0);
        assert_eq!(r.percent_complete, 0);
    }

    #[test]
    fn test_envelope_without_data() {
        let resp: HistoryResponse =
            serde_json::from_str(r#"{"response":{"result":"success","data":{}}}"#).unwrap();
        assert!(resp.into_records().is_empty());

        let resp: HistoryResponse =
            serde_json::from_str(r#"{"response":{"data":{"data":null}}}"#).unwrap();
        assert!(resp.into_records().is_empty());
    }
}

//! Dynamic payload type for measured values and thresholds.
//!
//! Checks report numbers, strings, lists of violators, or flat mappings of
//! several of those; thresholds may be absent entirely. `Measured` covers all
//! of these shapes with an untagged serde representation, so the JSON sidecar
//! reads naturally (`"measured_value": 42`, `"threshold": [512.0, 1024.0]`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A measured value, threshold, or fix before/after record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Measured {
    /// No value (e.g. a check with no meaningful threshold).
    #[default]
    Null,
    /// Boolean flag (e.g. lightmap presence).
    Bool(bool),
    /// Integer count or limit.
    Int(i64),
    /// Floating-point measurement.
    Float(f64),
    /// Free-form text (e.g. a pattern or file extension).
    Text(String),
    /// Ordered list, usually violator names or a `[min, max]` range.
    List(Vec<Measured>),
    /// Flat mapping of named sub-measurements.
    Map(BTreeMap<String, Measured>),
}

impl Measured {
    /// Builds a map from `(key, value)` pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Measured>,
        I: IntoIterator<Item = (K, V)>,
    {
        Measured::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a list from values.
    pub fn list<V, I>(values: I) -> Self
    where
        V: Into<Measured>,
        I: IntoIterator<Item = V>,
    {
        Measured::List(values.into_iter().map(Into::into).collect())
    }

    /// Returns the integer value, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Measured::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns true if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Measured::Null)
    }
}

impl From<bool> for Measured {
    fn from(v: bool) -> Self {
        Measured::Bool(v)
    }
}

impl From<i64> for Measured {
    fn from(v: i64) -> Self {
        Measured::Int(v)
    }
}

impl From<i32> for Measured {
    fn from(v: i32) -> Self {
        Measured::Int(v.into())
    }
}

impl From<u32> for Measured {
    fn from(v: u32) -> Self {
        Measured::Int(v.into())
    }
}

impl From<u64> for Measured {
    fn from(v: u64) -> Self {
        Measured::Int(v as i64)
    }
}

impl From<usize> for Measured {
    fn from(v: usize) -> Self {
        Measured::Int(v as i64)
    }
}

impl From<f64> for Measured {
    fn from(v: f64) -> Self {
        Measured::Float(v)
    }
}

impl From<&str> for Measured {
    fn from(v: &str) -> Self {
        Measured::Text(v.to_string())
    }
}

impl From<String> for Measured {
    fn from(v: String) -> Self {
        Measured::Text(v)
    }
}

impl From<(i64, i64)> for Measured {
    fn from((lo, hi): (i64, i64)) -> Self {
        Measured::List(vec![Measured::Int(lo), Measured::Int(hi)])
    }
}

impl From<(f64, f64)> for Measured {
    fn from((lo, hi): (f64, f64)) -> Self {
        Measured::List(vec![Measured::Float(lo), Measured::Float(hi)])
    }
}

impl From<Vec<String>> for Measured {
    fn from(v: Vec<String>) -> Self {
        Measured::List(v.into_iter().map(Measured::Text).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn untagged_round_trip() {
        let cases = vec![
            Measured::Null,
            Measured::Bool(true),
            Measured::Int(42),
            Measured::Float(0.25),
            Measured::Text("UVMap".to_string()),
            Measured::from((512.0, 1024.0)),
            Measured::map([("root_count", 2usize), ("orphan_count", 1usize)]),
        ];
        for value in cases {
            let json = serde_json::to_string(&value).unwrap();
            let back: Measured = serde_json::from_str(&json).unwrap();
            assert_eq!(value, back, "round trip failed for {json}");
        }
    }

    #[test]
    fn integers_stay_integers() {
        let back: Measured = serde_json::from_str("100").unwrap();
        assert_eq!(back, Measured::Int(100));
        let back: Measured = serde_json::from_str("100.5").unwrap();
        assert_eq!(back, Measured::Float(100.5));
    }

    #[test]
    fn null_serializes_bare() {
        assert_eq!(serde_json::to_string(&Measured::Null).unwrap(), "null");
    }
}

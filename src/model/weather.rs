use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized, case-folded identifier for a place.
///
/// Used as both the deduplication key and the cache key: "Istanbul" and
/// "istanbul" map to the same key, so concurrent lookups differing only in
/// case coalesce and hit the same cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceKey(String);

impl PlaceKey {
    pub fn new(place_name: &str) -> Self {
        Self(place_name.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single weather observation for a place.
///
/// Immutable value: replaced wholesale on every fetch, never patched field by
/// field. The serialized form is what the cache tier stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub location_name: String,
    pub temp_c: f64,
}

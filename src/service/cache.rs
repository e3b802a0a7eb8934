//! Cache tier for weather readings.
//!
//! Readings are cached by [`PlaceKey`] for a fixed window so repeated lookups
//! for the same place skip the provider round-trip entirely. Cache failures
//! are reported to the caller as errors, never panics; the lookup coordinator
//! downgrades them to cache misses.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use fred::prelude::*;
use fred::types::Expiration;

use crate::{
    error::cache::CacheError,
    model::weather::{PlaceKey, WeatherReading},
};

/// Cached readings expire after this long; an expired entry is treated as
/// absent.
pub const READING_TTL: Duration = Duration::from_secs(20 * 60);

/// Key/value access to serialized weather readings with per-entry expiry.
#[async_trait]
pub trait ReadingCache: Send + Sync {
    async fn get(&self, key: &PlaceKey) -> Result<Option<WeatherReading>, CacheError>;

    async fn set(
        &self,
        key: &PlaceKey,
        reading: &WeatherReading,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}

/// Valkey/Redis-backed reading cache. Values are the JSON serialization of a
/// [`WeatherReading`]; expiry is enforced server-side via `SET ... EX`.
pub struct RedisReadingCache {
    pool: Pool,
}

impl RedisReadingCache {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    fn cache_key(key: &PlaceKey) -> String {
        format!("weather:current:{key}")
    }
}

#[async_trait]
impl ReadingCache for RedisReadingCache {
    async fn get(&self, key: &PlaceKey) -> Result<Option<WeatherReading>, CacheError> {
        let value: Option<String> = self.pool.get(Self::cache_key(key)).await?;

        match value {
            Some(serialized) => Ok(Some(serde_json::from_str(&serialized)?)),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &PlaceKey,
        reading: &WeatherReading,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let serialized = serde_json::to_string(reading)?;

        let _: () = self
            .pool
            .set(
                Self::cache_key(key),
                serialized,
                Some(Expiration::EX(ttl.as_secs() as i64)),
                None,
                false,
            )
            .await?;

        Ok(())
    }
}

struct CachedEntry {
    reading: WeatherReading,
    expires_at: tokio::time::Instant,
}

/// In-process reading cache used by tests and deployments without a Valkey
/// instance. Expiry is checked against the tokio clock on read.
#[derive(Default)]
pub struct MemoryReadingCache {
    entries: DashMap<PlaceKey, CachedEntry>,
}

impl MemoryReadingCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadingCache for MemoryReadingCache {
    async fn get(&self, key: &PlaceKey) -> Result<Option<WeatherReading>, CacheError> {
        // The shared ref must drop before the remove below or the shard
        // deadlocks.
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > tokio::time::Instant::now() => {
                return Ok(Some(entry.reading.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }

        Ok(None)
    }

    async fn set(
        &self,
        key: &PlaceKey,
        reading: &WeatherReading,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.entries.insert(
            key.clone(),
            CachedEntry {
                reading: reading.clone(),
                expires_at: tokio::time::Instant::now() + ttl,
            },
        );

        Ok(())
    }
}

//! Weather lookup coordination.
//!
//! One [`WeatherLookupService`] instance is shared by every inbound request.
//! A lookup checks the cache tier first, then collapses concurrent duplicate
//! lookups for the same place into a single upstream fetch through a
//! pending-request registry, walks the provider chain, and falls back to the
//! last persisted reading when every provider fails. The public operations
//! are total: they return a reading or `None`, never an error.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use dashmap::DashMap;
use sea_orm::DatabaseConnection;
use tokio::sync::broadcast;

use crate::{
    data::weather::WeatherRepository,
    error::Error,
    model::weather::{PlaceKey, WeatherReading},
    service::{
        cache::{ReadingCache, READING_TTL},
        provider::ProviderChain,
    },
};

/// Delay between registering a pending lookup and issuing the upstream call.
/// Identical requests arriving within this window join the pending entry and
/// share its result instead of fetching again.
pub const COALESCING_WINDOW: Duration = Duration::from_secs(5);

enum Registration {
    /// This caller owns the fetch and must complete the channel.
    Owner(broadcast::Sender<Option<WeatherReading>>),
    /// Another caller owns an in-flight fetch for the same key.
    Joined(broadcast::Receiver<Option<WeatherReading>>),
}

#[derive(Clone)]
pub struct WeatherLookupService {
    db: DatabaseConnection,
    cache: Arc<dyn ReadingCache>,
    providers: Arc<ProviderChain>,
    /// In-flight lookups by place key. Owned by this instance, never
    /// process-global, so isolated instances do not share state.
    pending: Arc<DashMap<PlaceKey, broadcast::Sender<Option<WeatherReading>>>>,
    coalescing_window: Duration,
}

impl WeatherLookupService {
    pub fn new(
        db: DatabaseConnection,
        cache: Arc<dyn ReadingCache>,
        providers: ProviderChain,
    ) -> Self {
        Self {
            db,
            cache,
            providers: Arc::new(providers),
            pending: Arc::new(DashMap::new()),
            coalescing_window: COALESCING_WINDOW,
        }
    }

    /// Override the coalescing window (useful for testing)
    pub fn with_coalescing_window(mut self, window: Duration) -> Self {
        self.coalescing_window = window;
        self
    }

    /// Resolve the current weather for a place.
    ///
    /// Serves an unexpired cached reading immediately; otherwise coalesces
    /// with any in-flight lookup for the same key, fetches through the
    /// provider chain, persists and caches on success, and falls back to the
    /// last persisted reading when every provider fails.
    pub async fn resolve(&self, place_name: &str) -> Option<WeatherReading> {
        let key = PlaceKey::new(place_name);

        match self.cache.get(&key).await {
            Ok(Some(reading)) => {
                tracing::info!("Returning cached weather for {place_name}");
                return Some(reading);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!("Cache read failed for {place_name}, treating as miss: {err}");
            }
        }

        self.coalesced_fetch(key, place_name, true).await
    }

    /// Resolve the current weather for a place without touching durable
    /// state: no cache read or write and no database append. Provider
    /// exhaustion yields `None` directly. Shares the pending-request registry
    /// with [`Self::resolve`], so the two entry points coalesce with each
    /// other.
    pub async fn resolve_without_persisting(&self, place_name: &str) -> Option<WeatherReading> {
        let key = PlaceKey::new(place_name);

        self.coalesced_fetch(key, place_name, false).await
    }

    async fn coalesced_fetch(
        &self,
        key: PlaceKey,
        place_name: &str,
        persist: bool,
    ) -> Option<WeatherReading> {
        let mut rx = match self.register(&key) {
            Registration::Joined(rx) => rx,
            Registration::Owner(tx) => {
                let rx = tx.subscribe();

                // The fetch runs detached so a dropped caller connection
                // cannot cancel a fetch that other callers joined; the
                // owning task always runs to completion.
                let service = self.clone();
                let place_name = place_name.to_string();
                tokio::spawn(async move {
                    tokio::time::sleep(service.coalescing_window).await;

                    // Removed before the fetch, not after: a duplicate
                    // arriving while the upstream call is in flight starts
                    // its own fetch rather than waiting on this one.
                    service.pending.remove(&key);

                    let result = match service.fetch_reading(&key, &place_name, persist).await {
                        Ok(reading) => reading,
                        Err(err) => {
                            tracing::error!("Weather lookup failed for {place_name}: {err}");
                            None
                        }
                    };

                    // Single completion site: the owning task completes the
                    // channel exactly once on every path, including the
                    // error path above.
                    let _ = tx.send(result);
                });

                rx
            }
        };

        // Every caller observes the owning task's exact completion value. A
        // dropped sender wakes waiters with a closed-channel error that maps
        // to None instead of leaving them parked.
        rx.recv().await.unwrap_or(None)
    }

    /// Atomically register a pending lookup for the key, or join the one
    /// already in flight.
    fn register(&self, key: &PlaceKey) -> Registration {
        use dashmap::mapref::entry::Entry;

        match self.pending.entry(key.clone()) {
            Entry::Occupied(entry) => Registration::Joined(entry.get().subscribe()),
            Entry::Vacant(entry) => {
                let (tx, _) = broadcast::channel(1);
                entry.insert(tx.clone());
                Registration::Owner(tx)
            }
        }
    }

    async fn fetch_reading(
        &self,
        key: &PlaceKey,
        place_name: &str,
        persist: bool,
    ) -> Result<Option<WeatherReading>, Error> {
        let Some(reading) = self.providers.fetch(place_name).await else {
            if !persist {
                return Ok(None);
            }

            tracing::info!("No provider data for {place_name}, checking last known reading");
            return self.last_known_reading(place_name).await;
        };

        if persist {
            self.store_reading(&reading).await;

            match self.cache.set(key, &reading, READING_TTL).await {
                Ok(()) => tracing::info!("Cached weather for {place_name}"),
                Err(err) => tracing::warn!("Failed to cache weather for {place_name}: {err}"),
            }
        }

        Ok(Some(reading))
    }

    async fn last_known_reading(
        &self,
        place_name: &str,
    ) -> Result<Option<WeatherReading>, Error> {
        let repo = WeatherRepository::new(&self.db);

        let model = repo.find_latest_by_name(place_name).await?;
        if model.is_none() {
            tracing::warn!("No last known reading for {place_name}");
        }

        Ok(model.map(|model| WeatherReading {
            location_name: model.location_name,
            temp_c: model.temp_c,
        }))
    }

    /// Best-effort append of a fetched reading; failures are logged and
    /// swallowed, the reading is still returned to callers.
    async fn store_reading(&self, reading: &WeatherReading) {
        let repo = WeatherRepository::new(&self.db);

        if let Err(err) = repo
            .append(&reading.location_name, reading.temp_c, Utc::now().naive_utc())
            .await
        {
            tracing::warn!(
                "Failed to persist weather for {}: {err}",
                reading.location_name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use stratus_test_utils::prelude::*;

    use super::*;
    use crate::service::cache::MemoryReadingCache;

    fn istanbul(temp_c: f64) -> WeatherReading {
        WeatherReading {
            location_name: "Istanbul".to_string(),
            temp_c,
        }
    }

    fn lookup_service(test: &TestSetup, cache: Arc<MemoryReadingCache>) -> WeatherLookupService {
        let providers =
            ProviderChain::with_credentials(&test.server.url(), &[TEST_API_KEY, TEST_API_KEY_2])
                .unwrap();

        WeatherLookupService::new(test.db.clone(), cache, providers)
    }

    mod resolve {
        use super::*;

        /// Expect an unexpired cached reading to be served without any
        /// provider request, for any casing of the place name
        #[tokio::test]
        async fn returns_cached_reading_without_calling_providers() -> Result<(), TestError> {
            let mut test = test_setup_with_tables!(entity::prelude::WeatherData)?;
            let endpoint = test
                .weather()
                .with_forecast_endpoint(TEST_API_KEY, "Istanbul", 20.0, 0);

            let cache = Arc::new(MemoryReadingCache::new());
            cache
                .set(&PlaceKey::new("Istanbul"), &istanbul(20.0), READING_TTL)
                .await
                .unwrap();

            let service = lookup_service(&test, cache);
            let result = service.resolve("ISTANBUL").await;

            assert_eq!(result, Some(istanbul(20.0)));
            endpoint.assert();

            Ok(())
        }

        /// Expect two concurrent lookups for the same key within the
        /// coalescing window to share one provider request and one result
        #[tokio::test]
        async fn coalesces_concurrent_lookups_into_one_fetch() -> Result<(), TestError> {
            let mut test = test_setup_with_tables!(entity::prelude::WeatherData)?;
            let endpoint = test
                .weather()
                .with_forecast_endpoint(TEST_API_KEY, "Istanbul", 20.0, 1);

            let service = lookup_service(&test, Arc::new(MemoryReadingCache::new()));

            let first = tokio::spawn({
                let service = service.clone();
                async move { service.resolve("Istanbul").await }
            });

            // Joins three seconds into the five second window, differing in
            // case from the owner's request.
            tokio::time::sleep(Duration::from_secs(3)).await;
            let second = service.resolve("istanbul").await;

            let first = first.await.expect("resolve task panicked");

            assert_eq!(first, Some(istanbul(20.0)));
            assert_eq!(first, second);
            endpoint.assert();

            Ok(())
        }

        /// Expect the second provider's reading when the first provider
        /// returns a non-success status
        #[tokio::test]
        async fn falls_back_to_second_provider() -> Result<(), TestError> {
            let mut test = test_setup_with_tables!(entity::prelude::WeatherData)?;
            let failing = test
                .weather()
                .with_forecast_endpoint_error(TEST_API_KEY, 500, 1);
            let succeeding = test
                .weather()
                .with_forecast_endpoint(TEST_API_KEY_2, "Istanbul", 18.5, 1);

            let service = lookup_service(&test, Arc::new(MemoryReadingCache::new()))
                .with_coalescing_window(Duration::ZERO);

            let result = service.resolve("Istanbul").await;

            assert_eq!(result, Some(istanbul(18.5)));
            failing.assert();
            succeeding.assert();

            Ok(())
        }

        /// Expect the last persisted reading when every provider fails
        #[tokio::test]
        async fn falls_back_to_persisted_reading_when_providers_fail() -> Result<(), TestError> {
            let mut test = test_setup_with_tables!(entity::prelude::WeatherData)?;
            let first = test
                .weather()
                .with_forecast_endpoint_error(TEST_API_KEY, 500, 1);
            let second = test
                .weather()
                .with_forecast_endpoint_error(TEST_API_KEY_2, 503, 1);

            WeatherRepository::new(&test.db)
                .append("Istanbul", 17.0, Utc::now().naive_utc())
                .await?;

            let service = lookup_service(&test, Arc::new(MemoryReadingCache::new()))
                .with_coalescing_window(Duration::ZERO);

            let result = service.resolve("istanbul").await;

            assert_eq!(result, Some(istanbul(17.0)));
            first.assert();
            second.assert();

            Ok(())
        }

        /// Expect None without a fault when every provider fails and nothing
        /// was ever persisted for the place
        #[tokio::test]
        async fn returns_none_when_no_provider_or_persisted_data() -> Result<(), TestError> {
            let mut test = test_setup_with_tables!(entity::prelude::WeatherData)?;
            let first = test
                .weather()
                .with_forecast_endpoint_error(TEST_API_KEY, 500, 1);
            let second = test
                .weather()
                .with_forecast_endpoint_error(TEST_API_KEY_2, 503, 1);

            let service = lookup_service(&test, Arc::new(MemoryReadingCache::new()))
                .with_coalescing_window(Duration::ZERO);

            let result = service.resolve("Istanbul").await;

            assert_eq!(result, None);
            first.assert();
            second.assert();

            Ok(())
        }

        /// Expect a successful fetch to be persisted and cached so a
        /// subsequent lookup is served from cache with no further provider
        /// request
        #[tokio::test]
        async fn caches_and_persists_successful_fetch() -> Result<(), TestError> {
            let mut test = test_setup_with_tables!(entity::prelude::WeatherData)?;
            let endpoint = test
                .weather()
                .with_forecast_endpoint(TEST_API_KEY, "Istanbul", 20.0, 1);

            let cache = Arc::new(MemoryReadingCache::new());
            let service = lookup_service(&test, cache.clone())
                .with_coalescing_window(Duration::ZERO);

            let first = service.resolve("Istanbul").await;
            let second = service.resolve("istanbul").await;

            assert_eq!(first, Some(istanbul(20.0)));
            assert_eq!(first, second);
            endpoint.assert();

            let persisted = WeatherRepository::new(&test.db)
                .find_latest_by_name("istanbul")
                .await?
                .expect("expected a persisted reading");
            assert_eq!(persisted.temp_c, 20.0);

            Ok(())
        }
    }

    mod resolve_without_persisting {
        use super::*;

        /// Expect a reading with no database append and no cache write
        #[tokio::test]
        async fn leaves_durable_state_untouched() -> Result<(), TestError> {
            let mut test = test_setup_with_tables!(entity::prelude::WeatherData)?;
            let endpoint = test
                .weather()
                .with_forecast_endpoint(TEST_API_KEY, "Istanbul", 20.0, 1);

            let cache = Arc::new(MemoryReadingCache::new());
            let service = lookup_service(&test, cache.clone())
                .with_coalescing_window(Duration::ZERO);

            let result = service.resolve_without_persisting("Istanbul").await;

            assert_eq!(result, Some(istanbul(20.0)));
            endpoint.assert();

            let persisted = WeatherRepository::new(&test.db)
                .find_latest_by_name("Istanbul")
                .await?;
            assert!(persisted.is_none());

            let cached = cache.get(&PlaceKey::new("Istanbul")).await.unwrap();
            assert!(cached.is_none());

            Ok(())
        }

        /// Expect None directly when every provider fails, without reading
        /// the database fallback
        #[tokio::test]
        async fn skips_database_fallback_on_provider_exhaustion() -> Result<(), TestError> {
            let mut test = test_setup_with_tables!(entity::prelude::WeatherData)?;
            let first = test
                .weather()
                .with_forecast_endpoint_error(TEST_API_KEY, 500, 1);
            let second = test
                .weather()
                .with_forecast_endpoint_error(TEST_API_KEY_2, 503, 1);

            WeatherRepository::new(&test.db)
                .append("Istanbul", 17.0, Utc::now().naive_utc())
                .await?;

            let service = lookup_service(&test, Arc::new(MemoryReadingCache::new()))
                .with_coalescing_window(Duration::ZERO);

            let result = service.resolve_without_persisting("Istanbul").await;

            assert_eq!(result, None);
            first.assert();
            second.assert();

            Ok(())
        }

        /// Expect both entry points to coalesce on the same pending entry
        #[tokio::test]
        async fn coalesces_with_resolve() -> Result<(), TestError> {
            let mut test = test_setup_with_tables!(entity::prelude::WeatherData)?;
            let endpoint = test
                .weather()
                .with_forecast_endpoint(TEST_API_KEY, "Istanbul", 20.0, 1);

            let service = lookup_service(&test, Arc::new(MemoryReadingCache::new()));

            let preview = tokio::spawn({
                let service = service.clone();
                async move { service.resolve_without_persisting("Istanbul").await }
            });

            tokio::time::sleep(Duration::from_secs(1)).await;
            let resolved = service.resolve("Istanbul").await;

            let preview = preview.await.expect("preview task panicked");

            assert_eq!(preview, Some(istanbul(20.0)));
            assert_eq!(preview, resolved);
            endpoint.assert();

            // The non-persisting caller owned the fetch, so nothing was
            // appended on behalf of the joined resolve either.
            let persisted = WeatherRepository::new(&test.db)
                .find_latest_by_name("Istanbul")
                .await?;
            assert!(persisted.is_none());

            Ok(())
        }
    }
}

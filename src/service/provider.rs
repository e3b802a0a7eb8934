//! Upstream weather providers and the ordered fallback chain.

use reqwest::Client;
use serde::Deserialize;

use crate::{error::provider::ProviderError, model::weather::WeatherReading};

/// Response envelope returned by the upstream forecast endpoint. Only the
/// fields the lookup flow consumes are deserialized; the rest of the payload
/// is ignored.
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    location: ForecastLocation,
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct ForecastLocation {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temp_c: f64,
}

/// One upstream weather data source: an endpoint plus the credential used
/// against it.
pub struct ProviderClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl ProviderClient {
    pub fn new(http: Client, endpoint: &str, api_key: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetch the current reading for a place from this provider.
    ///
    /// A success is a 2xx response that parses into a reading; any other
    /// status, a transport failure, or an unparseable payload is an error.
    pub async fn fetch_current(&self, place_name: &str) -> Result<WeatherReading, ProviderError> {
        let url = format!("{}/v1/forecast.json", self.endpoint);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", place_name),
                ("days", "1"),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::UnexpectedStatus(status));
        }

        let body = response.text().await?;
        let forecast: ForecastResponse = serde_json::from_str(&body)?;

        Ok(WeatherReading {
            location_name: forecast.location.name,
            temp_c: forecast.current.temp_c,
        })
    }
}

/// Ordered list of providers tried in sequence until one succeeds.
pub struct ProviderChain {
    providers: Vec<ProviderClient>,
}

impl ProviderChain {
    pub fn new(providers: Vec<ProviderClient>) -> Self {
        Self { providers }
    }

    /// Build a chain with one provider per credential, all against the same
    /// endpoint and sharing a single HTTP client, in fallback order.
    pub fn with_credentials(endpoint: &str, api_keys: &[&str]) -> Result<Self, ProviderError> {
        let http = Client::builder().build()?;

        Ok(Self::new(
            api_keys
                .iter()
                .map(|api_key| ProviderClient::new(http.clone(), endpoint, api_key))
                .collect(),
        ))
    }

    /// Try each provider in order; the first successful response wins and no
    /// further providers are contacted. Returns `None` when every provider
    /// fails. Exactly one provider's data is used, never a merge.
    pub async fn fetch(&self, place_name: &str) -> Option<WeatherReading> {
        for provider in &self.providers {
            match provider.fetch_current(place_name).await {
                Ok(reading) => {
                    tracing::info!("Weather provider request succeeded for {place_name}");
                    return Some(reading);
                }
                Err(err) => {
                    tracing::warn!("Weather provider request failed for {place_name}: {err}");
                }
            }
        }

        None
    }
}

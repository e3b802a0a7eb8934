//! Weather provider mock endpoint creation utilities.
//!
//! These methods register mock forecast endpoints with the mockito server,
//! matched per provider credential so a chain of providers against the same
//! server can be scripted independently. Each mock verifies it was called
//! the expected number of times.

use mockito::{Matcher, Mock};

use crate::fixtures::weather::WeatherFixtures;

use super::factory::forecast_payload;

impl<'a> WeatherFixtures<'a> {
    /// Mock a successful forecast response for one provider credential.
    ///
    /// # Arguments
    /// - `api_key` - Credential the mock responds to
    /// - `city_name` - Location name returned in the payload
    /// - `temp_c` - Temperature returned in the payload
    /// - `expected_requests` - Number of times this endpoint should be called
    pub fn with_forecast_endpoint(
        &mut self,
        api_key: &str,
        city_name: &str,
        temp_c: f64,
        expected_requests: usize,
    ) -> Mock {
        self.setup
            .server
            .mock("GET", "/v1/forecast.json")
            .match_query(Matcher::UrlEncoded("key".into(), api_key.into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(forecast_payload(city_name, temp_c).to_string())
            .expect(expected_requests)
            .create()
    }

    /// Mock a forecast endpoint that returns an error status code for one
    /// provider credential.
    pub fn with_forecast_endpoint_error(
        &mut self,
        api_key: &str,
        status_code: usize,
        expected_requests: usize,
    ) -> Mock {
        self.setup
            .server
            .mock("GET", "/v1/forecast.json")
            .match_query(Matcher::UrlEncoded("key".into(), api_key.into()))
            .with_status(status_code)
            .expect(expected_requests)
            .create()
    }

    /// Mock a forecast endpoint that returns a successful status with a body
    /// that does not parse as a forecast payload.
    pub fn with_forecast_endpoint_invalid(
        &mut self,
        api_key: &str,
        expected_requests: usize,
    ) -> Mock {
        self.setup
            .server
            .mock("GET", "/v1/forecast.json")
            .match_query(Matcher::UrlEncoded("key".into(), api_key.into()))
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html>service degraded</html>")
            .expect(expected_requests)
            .create()
    }
}

//! Google Maps Geocoding API client
//!
//! This module provides a blocking client for the Google Geocoding web service
//! and maps its responses and failures onto [`GeocodeMatch`] and [`ProviderError`].

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use super::{GeocodeMatch, GeocodingProvider, ProviderError};

/// Base URL for the Google Maps web services
const GOOGLE_MAPS_BASE_URL: &str = "https://maps.googleapis.com";

/// Path of the geocoding endpoint, relative to the base URL
const GEOCODE_PATH: &str = "/maps/api/geocode/json";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Client for the Google Maps Geocoding API
#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
    language: Option<String>,
    region: Option<String>,
}

impl GoogleMapsClient {
    /// Creates a new client with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: GOOGLE_MAPS_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            language: None,
            region: None,
        }
    }

    /// Overrides the API base URL (for proxies and testing)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the language in which results are returned
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the region bias (ccTLD code, e.g. `uk`)
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Returns the configured request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the endpoint URL and query parameters for an address
    fn request_parts<'a>(&'a self, address: &'a str) -> (String, Vec<(&'static str, &'a str)>) {
        let url = format!("{}{}", self.base_url, GEOCODE_PATH);
        let mut query = vec![("address", address), ("key", self.api_key.as_str())];
        if let Some(ref language) = self.language {
            query.push(("language", language.as_str()));
        }
        if let Some(ref region) = self.region {
            query.push(("region", region.as_str()));
        }
        (url, query)
    }

    /// Sends the request and returns the raw response body
    fn fetch(&self, address: &str) -> Result<String, ProviderError> {
        let (url, query) = self.request_parts(address);

        let response = self
            .client
            .get(&url)
            .query(&query)
            .timeout(self.timeout)
            .send()
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
            });
        }

        response.text().map_err(classify_reqwest_error)
    }
}

impl GeocodingProvider for GoogleMapsClient {
    fn geocode(&self, address: &str) -> Result<Vec<GeocodeMatch>, ProviderError> {
        // The API rejects empty queries with INVALID_REQUEST; nothing to look up.
        if address.trim().is_empty() {
            return Ok(Vec::new());
        }

        let body = self.fetch(address)?;
        parse_response(&body)
    }
}

/// Maps a reqwest failure onto the provider error classification
///
/// The request URL carries the API key, so it is stripped before the error
/// is turned into text.
fn classify_reqwest_error(err: reqwest::Error) -> ProviderError {
    let err = err.without_url();
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else if let Some(status) = err.status() {
        ProviderError::Http {
            status: status.as_u16(),
        }
    } else {
        // Body and decode failures only come from reading the response stream;
        // JSON parsing happens afterwards in `parse_response`.
        ProviderError::Transport(err.to_string())
    }
}

/// Parses a Geocoding API response body
///
/// `OK` yields the matches, `ZERO_RESULTS` yields an empty list and every
/// other status is reported as [`ProviderError::Api`].
fn parse_response(body: &str) -> Result<Vec<GeocodeMatch>, ProviderError> {
    let response: GeocodeResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Unknown(format!("Failed to parse response: {}", e)))?;

    match response.status.as_str() {
        "OK" => Ok(response.results),
        "ZERO_RESULTS" => Ok(Vec::new()),
        _ => Err(ProviderError::Api {
            message: response
                .error_message
                .unwrap_or_else(|| "no error message".to_string()),
            status: response.status,
        }),
    }
}

/// Geocoding API response structure
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeMatch>,
    #[serde(default)]
    error_message: Option<String>,
}

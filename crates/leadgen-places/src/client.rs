//! HTTP client for the Google Maps geocoding and Places web services.
//!
//! Wraps `reqwest` with API key management, transient-error retry, and
//! typed decoding. Every endpoint checks the `"status"` field of the JSON
//! envelope and surfaces anything other than `"OK"` as
//! [`PlacesError::ApiStatus`].

use std::time::Duration;

use leadgen_core::config::DEFAULT_PLACES_BASE_URL;
use leadgen_core::AppConfig;
use reqwest::{Client, Url};

use crate::bounds::{LatLng, LocationBounds};
use crate::error::PlacesError;
use crate::provider::{DirectoryProvider, SearchRequest};
use crate::retry::retry_with_backoff;
use crate::types::{
    Candidate, DetailsResponse, GeocodeResponse, PlaceDetails, SearchPage, TextSearchResponse,
    TextSearchResult, STATUS_OK,
};

const GEOCODE_PATH: &str = "geocode/json";
const TEXT_SEARCH_PATH: &str = "place/textsearch/json";
const DETAILS_PATH: &str = "place/details/json";

/// Fields requested from the details endpoint. Billing is per field group,
/// so ask only for what a lead carries.
pub const DETAIL_FIELDS: &str =
    "name,formatted_address,formatted_phone_number,website,business_status";

/// Client for the Places web services.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl PlacesClient {
    /// Creates a client pointed at the production Google Maps API, with
    /// retries disabled.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_PLACES_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends endpoint paths
        // instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Builds a client from application configuration, including its
    /// retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Config`] when no API key is configured, plus
    /// anything [`PlacesClient::with_base_url`] can return.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, PlacesError> {
        let api_key = config.require_places_api_key()?;
        Ok(Self::with_base_url(
            api_key,
            config.request_timeout_secs,
            &config.user_agent,
            &config.places_base_url,
        )?
        .with_retry_policy(config.max_retries, config.retry_backoff_base_ms))
    }

    /// Retry transient transport failures up to `max_retries` extra times.
    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Builds the request URL for an endpoint with percent-encoded
    /// parameters. The API key always goes first.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| PlacesError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request (with retry), asserts a 2xx HTTP status, parses
    /// the body as JSON and checks the envelope status.
    ///
    /// `endpoint` names the call in errors; the URL itself carries the API
    /// key and is never logged.
    async fn request_json(
        &self,
        endpoint: &'static str,
        url: &Url,
    ) -> Result<serde_json::Value, PlacesError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let client = &self.client;
            let url = url.clone();
            async move {
                let response = client.get(url).send().await?;
                let response = response.error_for_status()?;
                Ok(response.text().await?)
            }
        })
        .await?;

        let json: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
                context: endpoint.to_owned(),
                source: e,
            })?;
        Self::check_status(endpoint, &json)?;
        Ok(json)
    }

    /// Returns [`PlacesError::ApiStatus`] unless `"status"` is `"OK"`.
    fn check_status(endpoint: &'static str, body: &serde_json::Value) -> Result<(), PlacesError> {
        let status = body
            .get("status")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("MISSING_STATUS");
        if status == STATUS_OK {
            return Ok(());
        }
        let message = body
            .get("error_message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);
        Err(PlacesError::ApiStatus {
            endpoint,
            status: status.to_owned(),
            message,
        })
    }

    fn decode<T: serde::de::DeserializeOwned>(
        context: impl Into<String>,
        body: serde_json::Value,
    ) -> Result<T, PlacesError> {
        serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
            context: context.into(),
            source: e,
        })
    }
}

impl DirectoryProvider for PlacesClient {
    async fn geocode(&self, location: &str) -> Result<LocationBounds, PlacesError> {
        let url = self.build_url(GEOCODE_PATH, &[("address", location)])?;
        let body = match self.request_json("geocode", &url).await {
            Ok(body) => body,
            Err(PlacesError::ApiStatus {
                status, message, ..
            }) => {
                let detail = message.map_or_else(String::new, |m| format!(": {m}"));
                return Err(PlacesError::LocationNotFound(format!(
                    "{location} (geocode status {status}{detail})"
                )));
            }
            Err(e) => return Err(e),
        };

        let response: GeocodeResponse = Self::decode(format!("geocode({location})"), body)?;
        let first = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| PlacesError::LocationNotFound(format!("{location} (no results)")))?;

        let center = first.geometry.location;
        let viewport = first.geometry.viewport.ok_or_else(|| {
            PlacesError::LocationNotFound(format!("{location} (result has no viewport)"))
        })?;
        LocationBounds::new(center, viewport.southwest, viewport.northeast)
    }

    async fn search_page(&self, request: SearchRequest<'_>) -> Result<SearchPage, PlacesError> {
        let anchor = request.anchor.map(|p: LatLng| p.to_string());
        let mut params = vec![("query", request.query)];
        if let Some(anchor) = anchor.as_deref() {
            params.push(("location", anchor));
        }
        if let Some(token) = request.page_token {
            params.push(("pagetoken", token));
        }

        let url = self.build_url(TEXT_SEARCH_PATH, &params)?;
        let body = self.request_json("place/textsearch", &url).await?;
        let response: TextSearchResponse =
            Self::decode(format!("textsearch(query={})", request.query), body)?;

        let candidates = response
            .results
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<TextSearchResult>(raw) {
                Ok(result) => Some(Candidate::from(result)),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed search result");
                    None
                }
            })
            .collect();

        Ok(SearchPage {
            candidates,
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = self.build_url(
            DETAILS_PATH,
            &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
        )?;
        let body = self.request_json("place/details", &url).await?;
        let response: DetailsResponse = Self::decode(format!("details(place_id={place_id})"), body)?;
        response.result.ok_or_else(|| PlacesError::ApiStatus {
            endpoint: "place/details",
            status: STATUS_OK.to_owned(),
            message: Some("response carried no result".to_owned()),
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

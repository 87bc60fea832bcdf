//! Places web-service response types.
//!
//! ## Envelope
//! Every endpoint answers HTTP 200 with a JSON body carrying a `status`
//! string. Only `"OK"` is success; `"ZERO_RESULTS"`, `"INVALID_REQUEST"`,
//! `"OVER_QUERY_LIMIT"`, `"REQUEST_DENIED"` and friends all end the
//! operation. A human-readable `error_message` may accompany them.
//!
//! ## Text search
//! Results are an ordered list of places, each with a `place_id` and a
//! `geometry.location`. A `next_page_token` is present when more pages
//! exist; it only becomes valid a couple of seconds after it is issued.
//! Search results are decoded one by one so a single malformed entry
//! does not discard the page.
//!
//! ## Details
//! Only the fields we request come back. `business_status` is
//! `"OPERATIONAL"`, `"CLOSED_TEMPORARILY"` or `"CLOSED_PERMANENTLY"`, and
//! may be missing for some places.

use serde::Deserialize;

use crate::bounds::LatLng;

pub(crate) const STATUS_OK: &str = "OK";

/// Business status value for a place that is open for business.
pub const OPERATIONAL: &str = "OPERATIONAL";

/// A search hit before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Provider-assigned identity, unique per place.
    pub place_id: String,
    pub location: LatLng,
    pub name: Option<String>,
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub candidates: Vec<Candidate>,
    pub next_page_token: Option<String>,
}

/// Fields returned by a details lookup.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub business_status: Option<String>,
}

impl PlaceDetails {
    #[must_use]
    pub fn is_operational(&self) -> bool {
        self.business_status.as_deref() == Some(OPERATIONAL)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Viewport {
    pub southwest: LatLng,
    pub northeast: LatLng,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    pub location: LatLng,
    #[serde(default)]
    pub viewport: Option<Viewport>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResult {
    pub geometry: Geometry,
}

/// `GET geocode/json`
#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextSearchResult {
    pub place_id: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<TextSearchResult> for Candidate {
    fn from(result: TextSearchResult) -> Self {
        Self {
            place_id: result.place_id,
            location: result.geometry.location,
            name: result.name,
        }
    }
}

/// `GET place/textsearch/json`. Results stay raw until decoded per entry.
#[derive(Debug, Deserialize)]
pub(crate) struct TextSearchResponse {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// `GET place/details/json`
#[derive(Debug, Deserialize)]
pub(crate) struct DetailsResponse {
    #[serde(default)]
    pub result: Option<PlaceDetails>,
}

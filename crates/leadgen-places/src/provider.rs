use std::future::Future;

use crate::bounds::{LatLng, LocationBounds};
use crate::error::PlacesError;
use crate::types::{PlaceDetails, SearchPage};

/// A text search request against the directory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    /// Biases results toward this point.
    pub anchor: Option<LatLng>,
    /// Continuation token from the previous page.
    pub page_token: Option<&'a str>,
}

/// The three directory operations discovery needs.
///
/// [`crate::PlacesClient`] is the production implementation. Any non-success
/// provider status must surface as an `Err`; implementations never return a
/// partially filled value in its place.
pub trait DirectoryProvider {
    /// Resolve a free-form location into a center point and viewport.
    ///
    /// Fails with [`PlacesError::LocationNotFound`] when the provider has no
    /// usable result.
    fn geocode(
        &self,
        location: &str,
    ) -> impl Future<Output = Result<LocationBounds, PlacesError>> + Send;

    /// Fetch one page of search results.
    fn search_page(
        &self,
        request: SearchRequest<'_>,
    ) -> impl Future<Output = Result<SearchPage, PlacesError>> + Send;

    /// Look up name, address, phone, website and business status for a place.
    fn place_details(
        &self,
        place_id: &str,
    ) -> impl Future<Output = Result<PlaceDetails, PlacesError>> + Send;
}

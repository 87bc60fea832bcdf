//! Geographically bounded business discovery against a places directory.

pub mod bounds;
pub mod client;
pub mod discovery;
pub mod error;
pub mod provider;
pub(crate) mod retry;
pub mod types;

pub use bounds::{LatLng, LocationBounds};
pub use client::PlacesClient;
pub use discovery::{DiscoveryConfig, DiscoveryRun, DiscoveryStats, Discoverer, StopReason};
pub use error::PlacesError;
pub use provider::{DirectoryProvider, SearchRequest};
pub use types::{Candidate, PlaceDetails, SearchPage};

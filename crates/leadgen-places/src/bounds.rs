//! Geographic viewport handling.
//!
//! A discovery run resolves its location once and keeps the resulting
//! rectangle for the whole run. Candidates are admitted only when their
//! coordinates fall inside it, edges included.

use serde::{Deserialize, Serialize};

use crate::error::PlacesError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Center point and viewport of a resolved location.
///
/// `southwest` is never north or east of `northeast`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationBounds {
    center: LatLng,
    southwest: LatLng,
    northeast: LatLng,
}

impl LocationBounds {
    /// # Errors
    ///
    /// Returns [`PlacesError::LocationNotFound`] when the corners are inverted
    /// on either axis or any coordinate is not finite.
    pub fn new(center: LatLng, southwest: LatLng, northeast: LatLng) -> Result<Self, PlacesError> {
        let finite = [center, southwest, northeast]
            .iter()
            .all(|p| p.lat.is_finite() && p.lng.is_finite());
        if !finite {
            return Err(PlacesError::LocationNotFound(
                "viewport has non-finite coordinates".to_owned(),
            ));
        }
        if southwest.lat > northeast.lat || southwest.lng > northeast.lng {
            return Err(PlacesError::LocationNotFound(format!(
                "viewport corners are inverted (southwest {southwest}, northeast {northeast})"
            )));
        }
        Ok(Self {
            center,
            southwest,
            northeast,
        })
    }

    #[must_use]
    pub fn center(&self) -> LatLng {
        self.center
    }

    #[must_use]
    pub fn southwest(&self) -> LatLng {
        self.southwest
    }

    #[must_use]
    pub fn northeast(&self) -> LatLng {
        self.northeast
    }

    /// Inclusive rectangle test on both axes.
    #[must_use]
    pub fn contains(&self, point: LatLng) -> bool {
        is_within_bounds(point.lat, point.lng, self)
    }
}

/// `true` iff `southwest.lat <= lat <= northeast.lat` and
/// `southwest.lng <= lng <= northeast.lng`.
#[must_use]
pub fn is_within_bounds(lat: f64, lng: f64, bounds: &LocationBounds) -> bool {
    (bounds.southwest.lat..=bounds.northeast.lat).contains(&lat)
        && (bounds.southwest.lng..=bounds.northeast.lng).contains(&lng)
}

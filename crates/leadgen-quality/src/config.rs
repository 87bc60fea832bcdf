use leadgen_core::Confidence;
use serde::{Deserialize, Serialize};

/// Admission policy for [`crate::QualityFilter`].
///
/// `min_confidence_level` is carried for callers that record it, but owner
/// admission is gated on the fixed set {high, medium}; the field is not
/// compared against a lead's confidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct QualityConfig {
    pub min_key_facts: usize,
    pub require_website: bool,
    pub require_email: bool,
    pub require_owner_info: bool,
    pub min_confidence_level: Confidence,
    pub strict_location_match: bool,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_key_facts: 3,
            require_website: true,
            require_email: true,
            require_owner_info: true,
            min_confidence_level: Confidence::Medium,
            strict_location_match: true,
        }
    }
}

impl QualityConfig {
    /// A policy that admits every lead.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            min_key_facts: 0,
            require_website: false,
            require_email: false,
            require_owner_info: false,
            min_confidence_level: Confidence::Low,
            strict_location_match: false,
        }
    }
}

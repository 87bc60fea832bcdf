use thiserror::Error;

/// Errors returned by a directory provider.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered but its `status` field was not `OK`.
    #[error("{endpoint} returned status {status}{}", .message.as_deref().map_or_else(String::new, |m| format!(": {m}")))]
    ApiStatus {
        endpoint: &'static str,
        status: String,
        message: Option<String>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Geocoding produced no usable location.
    #[error("location not found: {0}")]
    LocationNotFound(String),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error(transparent)]
    Config(#[from] leadgen_core::ConfigError),
}


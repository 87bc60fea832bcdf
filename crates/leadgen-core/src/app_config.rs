#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub places_api_key: Option<String>,
    pub places_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Pause after every place-details lookup.
    pub politeness_delay_ms: u64,
    /// Settle time before a continuation token may be used.
    pub page_token_delay_ms: u64,
    pub max_results: usize,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl AppConfig {
    /// The Places API key, required by every discovery operation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::MissingEnvVar`] when `LEADGEN_PLACES_API_KEY`
    /// was not set or was blank.
    pub fn require_places_api_key(&self) -> Result<&str, crate::ConfigError> {
        self.places_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| crate::ConfigError::MissingEnvVar("LEADGEN_PLACES_API_KEY".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "places_api_key",
                &self.places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("places_base_url", &self.places_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("politeness_delay_ms", &self.politeness_delay_ms)
            .field("page_token_delay_ms", &self.page_token_delay_ms)
            .field("max_results", &self.max_results)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .finish()
    }
}

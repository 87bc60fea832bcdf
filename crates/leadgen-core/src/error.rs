use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum LeadsFileError {
    #[error("failed to read leads file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported leads file format for {path}; expected .json, .yaml or .yml")]
    UnsupportedFormat { path: String },

    #[error("leads file {path} is not a lead table: {reason}")]
    Parse { path: String, reason: String },

    #[error("leads file {path} is missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        path: String,
        columns: Vec<&'static str>,
    },

    #[error("failed to write {path}: {reason}")]
    Write { path: String, reason: String },
}

pub mod app_config;
pub mod config;
pub mod error;
pub mod lead;
pub mod leads_file;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, LeadsFileError};
pub use lead::{dedupe_by_name_and_website, or_absent, Confidence, Lead, ABSENT_MARKER};
pub use leads_file::{load_leads, parse_leads, write_leads_json, LeadsFormat};

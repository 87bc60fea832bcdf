mod discover;
mod presets;
mod quality;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use leadgen_core::{AppConfig, Confidence};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "leadgen-cli")]
#[command(about = "Discover local businesses and triage lead tables by completeness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find operational businesses of one category inside a city's viewport
    Discover {
        /// Free-text search category (e.g. "dentist")
        #[arg(long, required_unless_present = "preset", conflicts_with = "preset")]
        category: Option<String>,
        /// Built-in category preset (see `categories`)
        #[arg(long)]
        preset: Option<String>,
        /// Target location as "City, State"
        #[arg(long)]
        location: String,
        /// Result cap (defaults to `LEADGEN_MAX_RESULTS`)
        #[arg(long)]
        max_results: Option<usize>,
        /// Write the discovered leads to this JSON file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Attach quality scores and rank the leads
        #[arg(long)]
        score: bool,
    },
    /// Filter and rank an existing lead table (JSON or YAML)
    Score {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Reject leads whose address is outside this "City, State"
        #[arg(long)]
        target_location: Option<String>,
        #[arg(long, default_value = "3")]
        min_key_facts: usize,
        #[arg(long)]
        no_require_website: bool,
        #[arg(long)]
        no_require_email: bool,
        #[arg(long)]
        no_require_owner: bool,
        #[arg(long)]
        no_strict_location: bool,
        /// Recorded with the policy; owner checks always accept high or medium
        #[arg(long, default_value = "medium", value_parser = parse_confidence)]
        min_confidence: Confidence,
        /// Score every lead without filtering
        #[arg(long)]
        no_filter: bool,
    },
    /// Score a lead table and keep rows at or above a minimum score
    Clean {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "70")]
        min_score: f64,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List built-in category presets
    Categories,
}

fn parse_confidence(raw: &str) -> Result<Confidence, String> {
    Confidence::parse(raw).ok_or_else(|| format!("expected high, medium or low, got '{raw}'"))
}

/// Log directive used when `RUST_LOG` is unset. Offline commands skip the
/// full config load and read `LEADGEN_LOG_LEVEL` directly.
fn fallback_log_level(config: Option<&AppConfig>, env_level: Option<String>) -> String {
    config
        .map(|c| c.log_level.clone())
        .or(env_level)
        .unwrap_or_else(|| "info".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = match cli.command {
        Commands::Discover { .. } => Some(leadgen_core::load_app_config_from_env()?),
        _ => None,
    };
    let log_level = fallback_log_level(config.as_ref(), std::env::var("LEADGEN_LOG_LEVEL").ok());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Discover {
            category,
            preset,
            location,
            max_results,
            output,
            score,
        } => {
            let Some(config) = config else {
                anyhow::bail!("configuration was not loaded for discover");
            };
            let query = presets::resolve_category(category.as_deref(), preset.as_deref())?;
            discover::run_discover(
                &config,
                &discover::DiscoverOptions {
                    category: &query,
                    location: &location,
                    max_results: max_results.unwrap_or(config.max_results),
                    output: output.as_deref(),
                    score,
                },
            )
            .await?;
        }
        Commands::Score {
            input,
            output,
            target_location,
            min_key_facts,
            no_require_website,
            no_require_email,
            no_require_owner,
            no_strict_location,
            min_confidence,
            no_filter,
        } => {
            let policy = leadgen_quality::QualityConfig {
                min_key_facts,
                require_website: !no_require_website,
                require_email: !no_require_email,
                require_owner_info: !no_require_owner,
                min_confidence_level: min_confidence,
                strict_location_match: !no_strict_location,
            };
            quality::run_score(
                &input,
                output.as_deref(),
                (!no_filter).then_some(policy),
                target_location.as_deref(),
            )?;
        }
        Commands::Clean {
            input,
            min_score,
            output,
        } => quality::run_clean(&input, min_score, output.as_deref())?,
        Commands::Categories => presets::print_categories(),
    }

    Ok(())
}

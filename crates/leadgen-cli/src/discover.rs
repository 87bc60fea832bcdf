//! `discover` command handler.
//!
//! Runs one bounded discovery against the Places API, drops repeated
//! (name, website) rows, optionally scores, then prints and saves the table.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use leadgen_core::{dedupe_by_name_and_website, or_absent, AppConfig, Lead};
use leadgen_places::{DiscoveryConfig, Discoverer, PlacesClient};

pub(crate) struct DiscoverOptions<'a> {
    pub(crate) category: &'a str,
    pub(crate) location: &'a str,
    pub(crate) max_results: usize,
    pub(crate) output: Option<&'a Path>,
    pub(crate) score: bool,
}

/// Reject locations that are not "City, State" before spending any quota.
pub(crate) fn validate_location(location: &str) -> anyhow::Result<()> {
    let has_both_parts = location
        .split_once(',')
        .is_some_and(|(city, state)| !city.trim().is_empty() && !state.trim().is_empty());
    if has_both_parts {
        Ok(())
    } else {
        anyhow::bail!("location must be \"City, State\" (e.g. \"Newbern, NC\"), got '{location}'")
    }
}

/// Run discovery and report the results.
///
/// Ctrl-C stops the run at the next step and keeps what was found.
///
/// # Errors
///
/// Returns an error if the location is malformed, the API key is missing,
/// the client cannot be built, or the output file cannot be written. A run
/// that stops early is reported with a warning, even when it found nothing.
pub(crate) async fn run_discover(
    config: &AppConfig,
    options: &DiscoverOptions<'_>,
) -> anyhow::Result<()> {
    validate_location(options.location)?;

    let client =
        PlacesClient::from_app_config(config).context("failed to build Places client")?;
    let discoverer = Discoverer::new(client, DiscoveryConfig::from_app_config(config));

    let cancel = Arc::new(AtomicBool::new(false));
    let ctrl_c = {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; finishing current step");
                cancel.store(true, Ordering::Relaxed);
            }
        })
    };

    let run = discoverer
        .discover_with_cancel(
            options.category,
            options.location,
            options.max_results,
            &cancel,
        )
        .await;
    ctrl_c.abort();

    let complete = run.is_complete();
    let before = run.leads.len();
    let mut leads = dedupe_by_name_and_website(run.leads);
    if leads.len() < before {
        tracing::info!(
            removed = before - leads.len(),
            "dropped rows repeating a name and website"
        );
    }
    if options.score {
        leads = leadgen_quality::enrich_with_scores(&leads);
    }

    print_leads(&leads);
    println!();
    println!(
        "{} leads for '{}' in {} ({}; {} pages, {} duplicates, {} out of bounds, {} not operational, {} lookups failed)",
        leads.len(),
        run.category,
        run.location,
        run.stop_reason,
        run.stats.pages_fetched,
        run.stats.duplicates_skipped,
        run.stats.out_of_bounds,
        run.stats.not_operational,
        run.stats.detail_failures,
    );
    if !complete {
        eprintln!("warning: run ended early: {}", run.stop_reason);
    }

    if let Some(path) = options.output {
        leadgen_core::write_leads_json(path, &leads).context("failed to save discovered leads")?;
        println!("wrote {} leads to {}", leads.len(), path.display());
    }

    Ok(())
}

/// Prints a lead table; the score column shows `-` for unscored rows.
pub(crate) fn print_leads(leads: &[Lead]) {
    let header = format!(
        "{:<6}{:<36}{:<18}{:<34}ADDRESS",
        "SCORE", "NAME", "PHONE", "WEBSITE"
    );
    println!("{header}");
    for lead in leads {
        let score = lead
            .quality_score
            .map_or_else(|| "-".to_string(), |s| format!("{s:.0}"));
        println!(
            "{:<6}{:<36}{:<18}{:<34}{}",
            score,
            truncate(&lead.company_name, 34),
            or_absent(lead.phone.as_deref()),
            truncate(or_absent(lead.website.as_deref()), 32),
            lead.full_address
        );
    }
}

pub(crate) fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() > max_chars {
        format!(
            "{}...",
            value.chars().take(max_chars.saturating_sub(3)).collect::<String>()
        )
    } else {
        value.to_string()
    }
}

//! `score` and `clean` command handlers over uploaded lead tables.

use std::path::Path;

use anyhow::Context;
use leadgen_core::{load_leads, write_leads_json, Lead};
use leadgen_quality::{histogram, threshold, QualityConfig, QualityFilter, ScoreBucket};

use crate::discover::print_leads;

/// Filter (when a policy is given), score and rank a lead table.
///
/// # Errors
///
/// Returns an error if the input cannot be loaded or the output cannot be
/// written.
pub(crate) fn run_score(
    input: &Path,
    output: Option<&Path>,
    policy: Option<QualityConfig>,
    target_location: Option<&str>,
) -> anyhow::Result<()> {
    let leads = load_leads(input).context("failed to load lead table")?;
    let loaded = leads.len();

    let admitted = match policy {
        Some(policy) => {
            tracing::info!(?policy, target_location, "filtering leads");
            QualityFilter::new(policy).filter(&leads, target_location)
        }
        None => leads,
    };
    let ranked = leadgen_quality::enrich_with_scores(&admitted);

    print_leads(&ranked);
    println!();
    println!(
        "{} of {loaded} leads admitted from {}",
        ranked.len(),
        input.display()
    );

    if let Some(path) = output {
        write_leads_json(path, &ranked)?;
        println!("wrote {} leads to {}", ranked.len(), path.display());
    }
    Ok(())
}

/// Score every lead, keep those at or above `min_score`, and bucket the
/// kept scores.
pub(crate) fn clean_table(leads: &[Lead], min_score: f64) -> (Vec<Lead>, Vec<ScoreBucket>) {
    let kept = threshold(leadgen_quality::enrich_with_scores(leads), min_score);
    let buckets = histogram(&kept);
    (kept, buckets)
}

/// Score a lead table, keep rows scoring at least `min_score`, and print a
/// score histogram of the kept rows.
///
/// # Errors
///
/// Returns an error if `min_score` is outside `[0, 100]`, the input cannot
/// be loaded, or the output cannot be written.
pub(crate) fn run_clean(input: &Path, min_score: f64, output: Option<&Path>) -> anyhow::Result<()> {
    if !(0.0..=100.0).contains(&min_score) {
        anyhow::bail!("--min-score must be between 0 and 100, got {min_score}");
    }

    let leads = load_leads(input).context("failed to load lead table")?;
    let total = leads.len();
    let (kept, buckets) = clean_table(&leads, min_score);

    print_leads(&kept);
    println!();
    println!(
        "kept {} of {total} leads scoring {min_score:.0} or more",
        kept.len()
    );
    println!();
    println!("score distribution of kept leads");
    println!("{:<10}COUNT", "SCORE");
    for bucket in &buckets {
        println!(
            "{:<10}{} {}",
            format!("{:.0}-{:.0}", bucket.lower, bucket.upper),
            bucket.count,
            "#".repeat(bucket.count.min(60))
        );
    }

    if let Some(path) = output {
        write_leads_json(path, &kept)?;
        println!("wrote {} leads to {}", kept.len(), path.display());
    }
    Ok(())
}

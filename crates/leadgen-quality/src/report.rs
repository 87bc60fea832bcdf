//! Post-scoring helpers for cleaning and summarising a scored lead table.

use leadgen_core::Lead;
use serde::Serialize;

const BUCKET_WIDTH: f64 = 10.0;
const BUCKET_COUNT: usize = 10;

/// One histogram bin covering `[lower, upper)`; the last bin includes 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Keeps leads whose `quality_score` is at least `min_score`, in order.
///
/// Leads without a score are dropped; run [`crate::enrich_with_scores`]
/// first.
#[must_use]
pub fn threshold(scored: Vec<Lead>, min_score: f64) -> Vec<Lead> {
    scored
        .into_iter()
        .filter(|lead| lead.quality_score.is_some_and(|s| s >= min_score))
        .collect()
}

/// Counts scored leads into ten equal-width bins over `[0, 100]`.
#[must_use]
pub fn histogram(scored: &[Lead]) -> Vec<ScoreBucket> {
    let mut buckets: Vec<ScoreBucket> = (0..BUCKET_COUNT)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let lower = i as f64 * BUCKET_WIDTH;
            ScoreBucket {
                lower,
                upper: lower + BUCKET_WIDTH,
                count: 0,
            }
        })
        .collect();

    for score in scored.iter().filter_map(|lead| lead.quality_score) {
        if let Some(bucket) = buckets.get_mut(bucket_index(score)) {
            bucket.count += 1;
        }
    }
    buckets
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bucket_index(score: f64) -> usize {
    let clamped = score.clamp(0.0, 100.0);
    ((clamped / BUCKET_WIDTH).floor() as usize).min(BUCKET_COUNT - 1)
}

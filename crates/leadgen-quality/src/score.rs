//! Additive completeness score for a lead.
//!
//! Scores range from 0 to 100. The score never looks at filter toggles and
//! never trusts a `quality_score` already present on the input.

use leadgen_core::{Confidence, Lead};
use serde::Serialize;

use crate::predicates::{has_owner_info, has_valid_email, has_valid_website};

// ---------------------------------------------------------------------------
// Weight constants (maxima must sum to exactly 100)
// ---------------------------------------------------------------------------

/// Website present and http(s).
pub const W_WEBSITE: u32 = 20;
/// Either email column populated.
pub const W_EMAIL: u32 = 20;
/// Per non-empty key fact.
pub const W_KEY_FACT: u32 = 10;
/// Key-fact term ceiling; three facts max it out.
pub const W_KEY_FACTS_MAX: u32 = 30;
/// Owner present with high confidence.
pub const W_OWNER_HIGH: u32 = 30;
/// Owner present with medium confidence.
pub const W_OWNER_MEDIUM: u32 = 20;

const MAX_SCORE: u32 = 100;

// Compile-time assertion that the best case is exactly 100.
const _: () = assert!(
    W_WEBSITE + W_EMAIL + W_KEY_FACTS_MAX + W_OWNER_HIGH == MAX_SCORE,
    "score weights must sum to exactly 100"
);

/// A lead paired with its computed score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredLead {
    pub lead: Lead,
    pub score: f64,
}

/// Score a lead in `[0, 100]`.
#[must_use]
pub fn score(lead: &Lead) -> f64 {
    let mut total = 0_u32;

    if has_valid_website(lead) {
        total += W_WEBSITE;
    }
    if has_valid_email(lead) {
        total += W_EMAIL;
    }

    let facts = u32::try_from(lead.key_fact_count()).unwrap_or(u32::MAX);
    total += facts.saturating_mul(W_KEY_FACT).min(W_KEY_FACTS_MAX);

    if has_owner_info(lead) {
        total += match lead.confidence {
            Some(Confidence::High) => W_OWNER_HIGH,
            Some(Confidence::Medium) => W_OWNER_MEDIUM,
            Some(Confidence::Low) | None => 0,
        };
    }

    f64::from(total.min(MAX_SCORE))
}

/// Scores every lead and orders them by descending score.
///
/// Equal scores keep their input order.
#[must_use]
pub fn score_and_rank(leads: &[Lead]) -> Vec<ScoredLead> {
    let mut ranked: Vec<ScoredLead> = leads
        .iter()
        .map(|lead| ScoredLead {
            score: score(lead),
            lead: lead.clone(),
        })
        .collect();
    // `sort_by` is stable.
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Returns copies of `leads` with `quality_score` set, ranked like
/// [`score_and_rank`].
#[must_use]
pub fn enrich_with_scores(leads: &[Lead]) -> Vec<Lead> {
    score_and_rank(leads)
        .into_iter()
        .map(|ScoredLead { mut lead, score }| {
            lead.quality_score = Some(score);
            lead
        })
        .collect()
}

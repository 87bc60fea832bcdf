use leadgen_core::Lead;

use crate::config::QualityConfig;
use crate::predicates::{
    has_owner_info, has_sufficient_key_facts, has_valid_email, has_valid_website,
    matches_location,
};
use crate::score::{self, ScoredLead};

/// Applies a [`QualityConfig`] to collections of leads.
#[derive(Debug, Clone, Default)]
pub struct QualityFilter {
    config: QualityConfig,
}

impl QualityFilter {
    #[must_use]
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Keeps leads that pass every enabled check, in input order.
    ///
    /// The location check runs only when `strict_location_match` is set and
    /// a `target_location` is given.
    #[must_use]
    pub fn filter(&self, leads: &[Lead], target_location: Option<&str>) -> Vec<Lead> {
        let admitted: Vec<Lead> = leads
            .iter()
            .filter(|lead| match self.rejection(lead, target_location) {
                None => true,
                Some(check) => {
                    tracing::debug!(company = %lead.company_name, check, "lead rejected");
                    false
                }
            })
            .cloned()
            .collect();

        tracing::info!(
            input = leads.len(),
            admitted = admitted.len(),
            "quality filter applied"
        );
        admitted
    }

    /// Name of the first failing check, if any.
    fn rejection(&self, lead: &Lead, target_location: Option<&str>) -> Option<&'static str> {
        let config = &self.config;
        if config.require_website && !has_valid_website(lead) {
            return Some("website");
        }
        if config.require_email && !has_valid_email(lead) {
            return Some("email");
        }
        if !has_sufficient_key_facts(lead, config.min_key_facts) {
            return Some("key_facts");
        }
        if config.require_owner_info && !has_owner_info(lead) {
            return Some("owner_info");
        }
        if config.strict_location_match {
            if let Some(target) = target_location {
                if !matches_location(lead, target) {
                    return Some("location");
                }
            }
        }
        None
    }

    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn score(&self, lead: &Lead) -> f64 {
        score::score(lead)
    }

    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn score_and_rank(&self, leads: &[Lead]) -> Vec<ScoredLead> {
        score::score_and_rank(leads)
    }

    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn enrich_with_scores(&self, leads: &[Lead]) -> Vec<Lead> {
        score::enrich_with_scores(leads)
    }
}

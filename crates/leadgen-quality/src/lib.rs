//! Deterministic completeness scoring and policy filtering for leads.

pub mod config;
pub mod filter;
pub mod predicates;
pub mod report;
pub mod score;

pub use config::QualityConfig;
pub use filter::QualityFilter;
pub use report::{histogram, threshold, ScoreBucket};
pub use score::{enrich_with_scores, score, score_and_rank, ScoredLead};

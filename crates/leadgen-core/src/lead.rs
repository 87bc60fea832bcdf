//! Typed lead record shared by discovery and quality scoring.
//!
//! ## Absence
//! Optional fields are `None` when the source had nothing to say. Blank
//! strings never survive deserialization: `""` and whitespace-only values
//! become `None`, so downstream predicates only ever see real content or
//! absence. [`ABSENT_MARKER`] is the human-facing rendering of `None`.
//!
//! ## Uploaded tables
//! Lead tables come from several tools, so individual fields are read
//! leniently. A value of the wrong JSON/YAML type (a number where a string
//! was expected, an object where a list was expected) degrades to absence
//! instead of failing the whole file.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Rendering of an absent optional field in human-facing output.
pub const ABSENT_MARKER: &str = "N/A";

/// Confidence an enrichment collaborator attached to the owner name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Case-insensitive parse. Unknown values are `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// A candidate business record.
///
/// Discovery fills `company_name`, `full_address`, `phone`, `website` and
/// `business_type`. The remaining fields are written by enrichment tools
/// before scoring. `quality_score` is never read from input; only
/// score enrichment writes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default, alias = "Company Name", deserialize_with = "lenient_required")]
    pub company_name: String,

    #[serde(default, alias = "Full Address", deserialize_with = "lenient_required")]
    pub full_address: String,

    #[serde(default, alias = "Phone", deserialize_with = "lenient_text")]
    pub phone: Option<String>,

    #[serde(default, alias = "Website", deserialize_with = "lenient_text")]
    pub website: Option<String>,

    #[serde(default, alias = "Business Type", deserialize_with = "lenient_required")]
    pub business_type: String,

    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "lenient_key_facts"
    )]
    pub key_facts: Vec<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub owner_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_confidence")]
    pub confidence: Option<Confidence>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub discovered_emails: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub potential_emails: Option<String>,

    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
}

impl Lead {
    /// Builds a lead from a directory listing. Blank phone/website values
    /// are normalized to absence.
    #[must_use]
    pub fn discovered(
        company_name: impl Into<String>,
        full_address: impl Into<String>,
        phone: Option<String>,
        website: Option<String>,
        business_type: impl Into<String>,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            full_address: full_address.into(),
            phone: phone.and_then(non_blank),
            website: website.and_then(non_blank),
            business_type: business_type.into(),
            ..Self::default()
        }
    }

    /// Number of non-empty key facts after splitting every entry on `;`.
    #[must_use]
    pub fn key_fact_count(&self) -> usize {
        self.key_facts
            .iter()
            .flat_map(|fact| fact.split(';'))
            .filter(|piece| !piece.trim().is_empty())
            .count()
    }
}

/// Renders an optional field for display, substituting [`ABSENT_MARKER`].
#[must_use]
pub fn or_absent(value: Option<&str>) -> &str {
    value.unwrap_or(ABSENT_MARKER)
}

/// Drops rows whose (`company_name`, `website`) pair repeats an earlier row.
///
/// Keeps the first occurrence and preserves order. Names compare exactly;
/// two absent websites count as equal.
#[must_use]
pub fn dedupe_by_name_and_website(leads: Vec<Lead>) -> Vec<Lead> {
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    leads
        .into_iter()
        .filter(|lead| seen.insert((lead.company_name.clone(), lead.website.clone())))
        .collect()
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}

fn value_as_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_text(Value::deserialize(deserializer)?))
}

fn lenient_required<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

fn lenient_confidence<'de, D>(deserializer: D) -> Result<Option<Confidence>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.and_then(|raw| Confidence::parse(&raw)))
}

/// Accepts `"a; b; c"`, `["a", "b"]`, or null.
fn lenient_key_facts<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Vec<String> = match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(value_as_text).collect(),
        other => value_as_text(other).into_iter().collect(),
    };
    Ok(entries
        .iter()
        .flat_map(|entry| entry.split(';'))
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_owned)
        .collect())
}

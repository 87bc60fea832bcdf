//! Completeness checks over a single lead.
//!
//! Every predicate is total: a lead with missing or junk fields simply
//! fails the check.

use leadgen_core::{Confidence, Lead};

/// Website values that mean "nothing here". Compared case-insensitively.
const WEBSITE_PLACEHOLDERS: &[&str] = &["", "n/a", "none", "nan"];

/// Owner names that mean "unknown". Compared case-insensitively.
const OWNER_PLACEHOLDERS: &[&str] = &["none", "n/a", "unknown"];

/// Website present, not a placeholder, and starting with an http(s) scheme.
/// The value is not trimmed; the lead loader already trims text fields.
#[must_use]
pub fn has_valid_website(lead: &Lead) -> bool {
    let Some(website) = lead.website.as_deref() else {
        return false;
    };
    let website = website.to_lowercase();
    !WEBSITE_PLACEHOLDERS.contains(&website.as_str())
        && (website.starts_with("http://") || website.starts_with("https://"))
}

/// At least one email column has content. Format is not checked.
#[must_use]
pub fn has_valid_email(lead: &Lead) -> bool {
    [&lead.discovered_emails, &lead.potential_emails]
        .into_iter()
        .any(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
}

#[must_use]
pub fn has_sufficient_key_facts(lead: &Lead, min_key_facts: usize) -> bool {
    lead.key_fact_count() >= min_key_facts
}

/// A real owner name backed by high or medium confidence.
#[must_use]
pub fn has_owner_info(lead: &Lead) -> bool {
    let Some(owner) = lead.owner_name.as_deref().map(str::trim) else {
        return false;
    };
    if owner.is_empty() || OWNER_PLACEHOLDERS.contains(&owner.to_lowercase().as_str()) {
        return false;
    }
    matches!(lead.confidence, Some(Confidence::High | Confidence::Medium))
}

/// Checks a lead's address against a "City, State" target.
///
/// A target that does not split into exactly two comma-separated parts
/// cannot be checked and passes. Otherwise the trimmed city and state must
/// both occur, case-insensitively, somewhere in the address.
#[must_use]
pub fn matches_location(lead: &Lead, target_location: &str) -> bool {
    let target = target_location.to_lowercase();
    let parts: Vec<&str> = target.split(',').collect();
    let [city, state] = parts.as_slice() else {
        tracing::debug!(
            target_location,
            "target location is not \"City, State\"; skipping location check"
        );
        return true;
    };
    let address = lead.full_address.to_lowercase();
    address.contains(city.trim()) && address.contains(state.trim())
}

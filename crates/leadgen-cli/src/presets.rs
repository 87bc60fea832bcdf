//! Named business categories and the search queries they expand to.

/// `(display name, search query)` pairs.
pub(crate) const CATEGORY_PRESETS: &[(&str, &str)] = &[
    ("Real Estate", "real estate agent OR realtor"),
    ("Insurance Agent", "insurance agent OR insurance broker"),
    ("Financial Advisor", "financial advisor OR financial planner"),
    ("Lawyer", "lawyer OR attorney OR law firm"),
    ("Doctor", "doctor OR physician OR medical practice"),
    ("Dentist", "dentist OR dental practice"),
    ("Accountant", "accountant OR CPA OR accounting firm"),
    ("Marketing Agency", "marketing agency OR digital marketing"),
    ("Home Services", "home services"),
    ("Health & Wellness", "health and wellness"),
    ("Automotive Services", "automotive services"),
    ("Professional Services", "professional services"),
    ("Health & Beauty", "health and beauty"),
    ("Restaurants & Food Services", "restaurants and food services"),
    ("Fitness & Sports", "fitness and sports"),
    ("Event & Entertainment Services", "event and entertainment services"),
    ("Education & Tutoring", "education and tutoring"),
    ("Pet Services", "pet services"),
    ("Retail & Local Shops", "retail and local shops"),
    ("Unique & Miscellaneous Local Businesses", "unique local businesses"),
    ("Celebrations & Parties", "celebrations and parties"),
    ("Weddings", "weddings"),
    ("Baby & Parenting Events", "baby and parenting events"),
    (
        "Graduations & Educational Milestones",
        "graduations and educational milestones",
    ),
];

/// Look up a preset by display name, ignoring case.
pub(crate) fn preset_query(name: &str) -> Option<&'static str> {
    let name = name.trim();
    CATEGORY_PRESETS
        .iter()
        .find(|(display, _)| display.eq_ignore_ascii_case(name))
        .map(|(_, query)| *query)
}

/// Turn `--category` / `--preset` into the search category string.
///
/// # Errors
///
/// Returns an error for an unknown preset or a blank category.
pub(crate) fn resolve_category(
    category: Option<&str>,
    preset: Option<&str>,
) -> anyhow::Result<String> {
    if let Some(name) = preset {
        return preset_query(name)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("unknown preset '{name}'; run `categories` to list them"));
    }
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => Ok(c.to_string()),
        _ => anyhow::bail!("a non-empty --category or a --preset is required"),
    }
}

pub(crate) fn print_categories() {
    let header = format!("{:<42}QUERY", "PRESET");
    println!("{header}");
    for (name, query) in CATEGORY_PRESETS {
        println!("{name:<42}{query}");
    }
}

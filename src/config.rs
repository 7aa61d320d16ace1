//! Jurisdiction-specific validation patterns.
//!
//! Patterns live in an explicit config injected into the validator
//! components at construction, never in module-level globals, so a
//! locale swap is a config swap.

use regex::Regex;

/// Patterns and limits for one deployment jurisdiction.
///
/// Regexes are compiled once at construction and shared by reference.
/// The NHS-number checksum itself is not configurable here; swapping
/// jurisdictions means pairing a new config with a new identifier scheme.
#[derive(Debug, Clone)]
pub struct JurisdictionConfig {
    /// Conservative `local@domain.tld` shape.
    pub email: Regex,
    /// National phone format: `+44` or `0` prefix, then digits/spacing/punctuation.
    pub phone: Regex,
    /// National postal-code shape, case-insensitive.
    pub postcode: Regex,
    /// Accepted date-of-birth patterns, tried in order (chrono format strings).
    pub date_formats: Vec<String>,
    /// Shapes that look like a date even when no pattern accepts the value.
    /// Distinguishes "Invalid date" (e.g. 31/02/2001) from "Invalid date format".
    pub date_shapes: Vec<Regex>,
    /// Maximum plausible age in years.
    pub max_age_years: u32,
}

impl JurisdictionConfig {
    /// UK deployment defaults: NHS-era phone/postcode conventions,
    /// day-first date entry.
    pub fn uk() -> Self {
        Self {
            email: compile(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$"),
            phone: compile(r"^(\+44|0)[0-9\s().-]{10,}$"),
            postcode: compile(r"(?i)^[A-Z]{1,2}[0-9][A-Z0-9]? [0-9][A-Z]{2}$"),
            date_formats: vec![
                "%Y-%m-%d".into(),
                "%d/%m/%Y".into(),
                "%d-%m-%Y".into(),
                "%d %B %Y".into(),
                "%d %b %Y".into(),
            ],
            date_shapes: vec![
                compile(r"^\d{1,4}[/-]\d{1,2}[/-]\d{1,4}$"),
                compile(r"^\d{1,2}\s+[A-Za-z]+\s+\d{4}$"),
            ],
            max_age_years: 150,
        }
    }
}

impl Default for JurisdictionConfig {
    fn default() -> Self {
        Self::uk()
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid built-in pattern")
}

use chrono::NaiveDate;

use crate::config::JurisdictionConfig;

/// Outcome of checking a date of birth against a comparison date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DobCheck {
    Valid(NaiveDate),
    /// Does not resemble any accepted date layout.
    UnrecognisedFormat,
    /// Date-shaped, but no pattern accepts it (e.g. 31/02/2001).
    ImpossibleDate,
    InFuture,
    /// Implied age exceeds the configured maximum.
    ImplausiblyOld,
}

/// Try each configured pattern in order; first hit wins.
pub fn parse_dob(config: &JurisdictionConfig, value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    config
        .date_formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Full plausibility check. `today` is injected by the orchestrator so
/// results are reproducible in tests.
pub fn check_dob(config: &JurisdictionConfig, value: &str, today: NaiveDate) -> DobCheck {
    let trimmed = value.trim();
    let Some(date) = parse_dob(config, trimmed) else {
        return if config.date_shapes.iter().any(|re| re.is_match(trimmed)) {
            DobCheck::ImpossibleDate
        } else {
            DobCheck::UnrecognisedFormat
        };
    };

    if date > today {
        return DobCheck::InFuture;
    }
    match today.years_since(date) {
        Some(age) if age > config.max_age_years => DobCheck::ImplausiblyOld,
        _ => DobCheck::Valid(date),
    }
}

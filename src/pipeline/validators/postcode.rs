use crate::config::JurisdictionConfig;

pub fn is_valid_postcode(config: &JurisdictionConfig, value: &str) -> bool {
    config.postcode.is_match(value.trim())
}

/// Canonical rendering of a UK postcode: uppercase, one space before the
/// final three characters. Returns `None` when the compacted value is
/// not a plausible postcode length or contains non-alphanumerics.
pub fn canonicalize_postcode(value: &str) -> Option<String> {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if !(5..=7).contains(&compact.len()) || !compact.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }

    let (outward, inward) = compact.split_at(compact.len() - 3);
    Some(format!("{outward} {inward}"))
}

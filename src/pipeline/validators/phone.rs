use crate::config::JurisdictionConfig;

pub fn is_valid_phone(config: &JurisdictionConfig, value: &str) -> bool {
    config.phone.is_match(value.trim())
}

/// Best-effort canonical rendering of a UK phone number.
///
/// Proposes a format without asserting correctness; the caller must
/// re-check the result before suggesting it. Returns `None` when the
/// digits cannot be grouped into a national form.
pub fn normalize_phone(value: &str) -> Option<String> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();

    // International prefix: +44 then a ten-digit subscriber number.
    if let Some(rest) = digits.strip_prefix("44") {
        if rest.len() == 10 {
            return Some(format!("+44 {} {}", &rest[..4], &rest[4..]));
        }
    }
    // National prefix already present.
    if digits.len() == 11 && digits.starts_with('0') {
        return Some(format!("{} {}", &digits[..5], &digits[5..]));
    }
    // Ten bare digits: a leading zero dropped by a spreadsheet import.
    if digits.len() == 10 && !digits.starts_with('0') {
        return Some(format!("0{} {}", &digits[..4], &digits[4..]));
    }
    None
}

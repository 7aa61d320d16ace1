use crate::config::JurisdictionConfig;

/// Conservative `local@domain.tld` check, deliberately stricter than
/// RFC 5322. Import feeds that fail this are worth a second look.
pub fn is_valid_email(config: &JurisdictionConfig, value: &str) -> bool {
    config.email.is_match(value.trim())
}

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// One patient row as supplied by a bulk-import flow.
///
/// Every field is optional: absence means the source did not provide a
/// value, and is distinct from an empty string (empty and
/// whitespace-only inputs normalise to `None` at the serde boundary).
/// Records carry no identifier; within a batch they are addressed by
/// ordinal position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub nhs_number: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub postcode: Option<String>,
}

impl PatientRecord {
    /// Build a record from the loose key-value rows CSV uploads produce.
    /// Recognises the common header aliases per field; anything else is
    /// ignored.
    pub fn from_map(row: &HashMap<String, String>) -> Self {
        let get = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| row.get(*k))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            first_name: get(&["first_name", "firstname", "given_name", "forename"]),
            last_name: get(&["last_name", "lastname", "family_name", "surname"]),
            date_of_birth: get(&["date_of_birth", "dob", "birth_date"]),
            nhs_number: get(&["nhs_number", "nhs", "health_identifier"]),
            email: get(&["email", "email_address"]),
            phone: get(&["phone", "phone_number", "telephone", "mobile"]),
            postcode: get(&["postcode", "postal_code", "post_code"]),
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// Tracked record fields, as referenced by report objects.
///
/// `Name` is the synthetic field combining first and last name, used by
/// the presence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientField {
    Name,
    FirstName,
    LastName,
    DateOfBirth,
    NhsNumber,
    Email,
    Phone,
    Postcode,
}

impl PatientField {
    /// Lenient parse for field names coming back from the model.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "name" | "full_name" => Some(Self::Name),
            "first_name" | "firstname" | "given_name" | "forename" => Some(Self::FirstName),
            "last_name" | "lastname" | "family_name" | "surname" => Some(Self::LastName),
            "date_of_birth" | "dob" | "birth_date" => Some(Self::DateOfBirth),
            "nhs_number" | "nhs" | "health_identifier" => Some(Self::NhsNumber),
            "email" | "email_address" => Some(Self::Email),
            "phone" | "phone_number" | "telephone" | "mobile" => Some(Self::Phone),
            "postcode" | "postal_code" | "post_code" => Some(Self::Postcode),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::DateOfBirth => "date_of_birth",
            Self::NhsNumber => "nhs_number",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Postcode => "postcode",
        }
    }
}

impl fmt::Display for PatientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Prompt assembly for the two outbound calls. Both prompts pin the
//! reply to a single JSON object so the parser can anchor on the first
//! balanced block regardless of surrounding prose.

/// Longest field value forwarded to the service. A pathological value
/// is no less a duplicate for being truncated.
pub const MAX_FIELD_CHARS: usize = 120;

/// Clip a field value to [`MAX_FIELD_CHARS`] on a character boundary.
pub fn clip_field(value: &str) -> String {
    value.chars().take(MAX_FIELD_CHARS).collect()
}

pub fn build_dedup_prompt(projection_json: &str) -> String {
    format!(
        r#"You are a data-quality assistant for a healthcare practice management system.
Identify clusters of patient records that likely describe the same person,
tolerating typos, abbreviations, and formatting differences (for example
"Jon"/"Jonathan", swapped date separators, or spacing in phone numbers).

Records:
{projection_json}

Respond with exactly one JSON object of this form and nothing else:
{{"groups": [{{"rows": [1, 4], "matched_fields": ["name", "date_of_birth"], "confidence": 0.85}}]}}

"rows" lists the "row" values of the matching records. Only include groups
of two or more records, and give each group a confidence between 0 and 1.
If there are no likely duplicates, respond with {{"groups": []}}."#
    )
}

pub fn build_correction_prompt(projection_json: &str) -> String {
    format!(
        r#"You are a data-quality assistant for a healthcare practice management system.
The records below failed format checks. Propose corrected field values:
dates of birth normalised to YYYY-MM-DD, phone numbers in UK national
format, obvious email typos fixed, and names capitalised properly. Never
invent information that the original value does not imply.

Records:
{projection_json}

Respond with exactly one JSON object of this form and nothing else:
{{"corrections": [{{"row": 0, "field": "date_of_birth", "original": "15/05/1975", "suggested": "1975-05-15", "confidence": 0.9, "reason": "Normalised to ISO format"}}]}}

Use only these field names: first_name, last_name, date_of_birth, email,
phone, postcode. Give each correction a confidence between 0 and 1. If
nothing needs correcting, respond with {{"corrections": []}}."#
    )
}

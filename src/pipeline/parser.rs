//! Extraction and lenient parsing of structured model output.
//!
//! The service returns free-form text expected to contain one JSON
//! object. Extraction is a narrow parser over the first balanced
//! `{...}` span (string- and escape-aware); everything after it is
//! ignored. Individual array items that fail to deserialise are
//! skipped rather than failing the whole response.

use serde::Deserialize;

use super::PipelineError;
use crate::models::record::PatientField;
use crate::models::report::{DuplicateGroup, ValidationSuggestion};

/// Confidence assumed when the model omits one.
const DEFAULT_CONFIDENCE: f32 = 0.5;

/// Extract the first balanced `{...}` span from free-form text.
///
/// Braces inside JSON string literals do not count toward balance.
/// This is the only place a malformed reply is detected; the result is
/// still subject to JSON parsing by the caller.
pub fn extract_first_json_object(text: &str) -> Result<&str, PipelineError> {
    let start = text
        .find('{')
        .ok_or_else(|| PipelineError::MalformedResponse("no JSON object found".into()))?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in text.as_bytes().iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    Err(PipelineError::MalformedResponse(
        "unbalanced JSON object".into(),
    ))
}

#[derive(Deserialize)]
struct RawDuplicateResponse {
    groups: Option<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
struct RawGroup {
    rows: Vec<usize>,
    #[serde(default)]
    matched_fields: Vec<String>,
    confidence: Option<f32>,
}

/// Parse the duplicate-grouping reply. Groups are cleaned, not trusted:
/// out-of-range and repeated rows are dropped, and a group that shrinks
/// below two rows is discarded.
pub fn parse_duplicate_response(
    response: &str,
    batch_len: usize,
) -> Result<Vec<DuplicateGroup>, PipelineError> {
    let json = extract_first_json_object(response)?;
    let raw: RawDuplicateResponse =
        serde_json::from_str(json).map_err(|e| PipelineError::JsonParsing(e.to_string()))?;

    let mut groups = Vec::new();
    for item in raw.groups.unwrap_or_default() {
        let Ok(group) = serde_json::from_value::<RawGroup>(item) else {
            continue;
        };
        let mut rows: Vec<usize> = Vec::new();
        for row in group.rows {
            if row < batch_len && !rows.contains(&row) {
                rows.push(row);
            }
        }
        if rows.len() < 2 {
            continue;
        }
        groups.push(DuplicateGroup {
            rows,
            matched_fields: group.matched_fields,
            confidence: group
                .confidence
                .unwrap_or(DEFAULT_CONFIDENCE)
                .clamp(0.0, 1.0),
        });
    }
    Ok(groups)
}

#[derive(Deserialize)]
struct RawCorrectionResponse {
    corrections: Option<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
struct RawCorrection {
    row: usize,
    field: String,
    #[serde(default)]
    original: Option<String>,
    suggested: String,
    confidence: Option<f32>,
    #[serde(default)]
    reason: Option<String>,
}

/// Parse the correction reply into suggestions. Items with unknown
/// fields, out-of-range rows, or an empty replacement are skipped.
pub fn parse_correction_response(
    response: &str,
    batch_len: usize,
) -> Result<Vec<ValidationSuggestion>, PipelineError> {
    let json = extract_first_json_object(response)?;
    let raw: RawCorrectionResponse =
        serde_json::from_str(json).map_err(|e| PipelineError::JsonParsing(e.to_string()))?;

    let mut suggestions = Vec::new();
    for item in raw.corrections.unwrap_or_default() {
        let Ok(correction) = serde_json::from_value::<RawCorrection>(item) else {
            continue;
        };
        let Some(field) = PatientField::parse(&correction.field) else {
            continue;
        };
        if correction.row >= batch_len || correction.suggested.trim().is_empty() {
            continue;
        }
        suggestions.push(ValidationSuggestion {
            field,
            row: correction.row,
            original: correction.original.unwrap_or_default(),
            suggested: correction.suggested,
            confidence: correction
                .confidence
                .unwrap_or(DEFAULT_CONFIDENCE)
                .clamp(0.0, 1.0),
            reason: correction
                .reason
                .unwrap_or_else(|| "Model-proposed correction".to_string()),
        });
    }
    Ok(suggestions)
}

//! Duplicate-record detection.
//!
//! The primary path asks the text-generation service to cluster a
//! capped sample of records, tolerating typos and formatting variance.
//! When the service is unreachable, times out, or replies with
//! something unusable, detection degrades to pure exact-key grouping;
//! the caller always receives a result, never a network error.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::llm::LlmClient;
use super::parser::parse_duplicate_response;
use super::prompt::{build_dedup_prompt, clip_field};
use super::PipelineError;
use crate::models::record::PatientRecord;
use crate::models::report::{DuplicateDetection, DuplicateGroup};
use crate::reporting::{ErrorReport, ErrorReporter, ReportSeverity};

/// Records examined per batch. Bounds the prompt payload; both paths
/// work over the same sample so the contract does not shift when the
/// service is down.
const SAMPLE_CAP: usize = 50;

/// Confidence attached to exact-key fallback groups.
const FALLBACK_CONFIDENCE: f32 = 0.9;

/// Additional attempts after a failed call or unusable reply.
const MAX_RETRIES: usize = 1;

/// Minimal per-record projection forwarded to the service.
#[derive(Serialize)]
struct RecordProjection {
    row: usize,
    first_name: Option<String>,
    last_name: Option<String>,
    date_of_birth: Option<String>,
    nhs_number: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

impl RecordProjection {
    fn new(row: usize, record: &PatientRecord) -> Self {
        let clip = |v: &Option<String>| v.as_deref().map(clip_field);
        Self {
            row,
            first_name: clip(&record.first_name),
            last_name: clip(&record.last_name),
            date_of_birth: clip(&record.date_of_birth),
            nhs_number: clip(&record.nhs_number),
            email: clip(&record.email),
            phone: clip(&record.phone),
        }
    }
}

pub struct DuplicateDetector {
    llm: Arc<dyn LlmClient>,
    reporter: Arc<dyn ErrorReporter>,
}

impl DuplicateDetector {
    pub fn new(llm: Arc<dyn LlmClient>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { llm, reporter }
    }

    /// Group records suspected to denote the same person. Infallible:
    /// service failure degrades to exact-key grouping.
    pub fn detect(&self, records: &[PatientRecord]) -> DuplicateDetection {
        if records.len() < 2 {
            return DuplicateDetection::empty();
        }
        let sample = &records[..records.len().min(SAMPLE_CAP)];

        match self.detect_via_model(sample) {
            Ok(groups) => DuplicateDetection::from_groups(groups),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    records = sample.len(),
                    "duplicate detection degraded to exact-key grouping"
                );
                self.reporter.report(ErrorReport {
                    component: "duplicate_detector",
                    message: "Falling back to exact-key duplicate grouping".into(),
                    detail: Some(e.to_string()),
                    severity: ReportSeverity::Warning,
                });
                DuplicateDetection::from_groups(exact_key_groups(sample))
            }
        }
    }

    fn detect_via_model(
        &self,
        sample: &[PatientRecord],
    ) -> Result<Vec<DuplicateGroup>, PipelineError> {
        let projections: Vec<RecordProjection> = sample
            .iter()
            .enumerate()
            .map(|(row, record)| RecordProjection::new(row, record))
            .collect();
        let payload = serde_json::to_string_pretty(&projections)
            .map_err(|e| PipelineError::JsonParsing(e.to_string()))?;
        let prompt = build_dedup_prompt(&payload);

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            let outcome = self
                .llm
                .generate(&prompt)
                .and_then(|response| parse_duplicate_response(&response, sample.len()));
            match outcome {
                Ok(groups) => return Ok(groups),
                Err(e) => {
                    if attempt < MAX_RETRIES {
                        tracing::warn!(
                            attempt = attempt + 1,
                            error = %e,
                            "duplicate grouping attempt failed, retrying"
                        );
                    }
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            PipelineError::MalformedResponse("all grouping attempts exhausted".into())
        }))
    }
}

/// Deterministic fallback: records sharing lower-cased first name,
/// lower-cased last name, and the raw date-of-birth string form a
/// group. Records missing any of the three take no part: grouping
/// unrelated incomplete records would be worse than missing a
/// duplicate.
fn exact_key_groups(records: &[PatientRecord]) -> Vec<DuplicateGroup> {
    let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
    for (row, record) in records.iter().enumerate() {
        let (Some(first), Some(last), Some(dob)) = (
            record.first_name.as_deref(),
            record.last_name.as_deref(),
            record.date_of_birth.as_deref(),
        ) else {
            continue;
        };
        let key = format!("{}|{}|{}", first.to_lowercase(), last.to_lowercase(), dob);
        by_key.entry(key).or_default().push(row);
    }

    let mut groups: Vec<DuplicateGroup> = by_key
        .into_values()
        .filter(|rows| rows.len() >= 2)
        .map(|rows| DuplicateGroup {
            rows,
            matched_fields: vec![
                "first_name".into(),
                "last_name".into(),
                "date_of_birth".into(),
            ],
            confidence: FALLBACK_CONFIDENCE,
        })
        .collect();
    groups.sort_by_key(|g| g.rows[0]);
    groups
}

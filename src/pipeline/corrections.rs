//! LLM-backed correction proposals for records that fail local format
//! checks.
//!
//! Unlike duplicate detection, this component has no deterministic
//! fallback: free-text correction without a model is guesswork, so any
//! failure yields an empty suggestion set. Records with no local
//! format issue are never forwarded, and a clean batch never touches
//! the network.

use std::sync::Arc;

use serde::Serialize;

use super::llm::LlmClient;
use super::parser::parse_correction_response;
use super::prompt::{build_correction_prompt, clip_field};
use super::validators::dob::parse_dob;
use super::validators::email::is_valid_email;
use super::validators::phone::is_valid_phone;
use super::PipelineError;
use crate::config::JurisdictionConfig;
use crate::models::record::PatientRecord;
use crate::models::report::ValidationSuggestion;
use crate::reporting::{ErrorReport, ErrorReporter, ReportSeverity};

/// Flagged records forwarded per batch.
const SAMPLE_CAP: usize = 20;

/// Additional attempts after a failed call or unusable reply.
const MAX_RETRIES: usize = 1;

/// Per-record projection forwarded for correction. Carries the name
/// fields too, since capitalisation fixes are in scope.
#[derive(Serialize)]
struct CorrectionProjection {
    row: usize,
    first_name: Option<String>,
    last_name: Option<String>,
    date_of_birth: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    postcode: Option<String>,
}

impl CorrectionProjection {
    fn new(row: usize, record: &PatientRecord) -> Self {
        let clip = |v: &Option<String>| v.as_deref().map(clip_field);
        Self {
            row,
            first_name: clip(&record.first_name),
            last_name: clip(&record.last_name),
            date_of_birth: clip(&record.date_of_birth),
            email: clip(&record.email),
            phone: clip(&record.phone),
            postcode: clip(&record.postcode),
        }
    }
}

pub struct CorrectionSuggester {
    config: JurisdictionConfig,
    llm: Arc<dyn LlmClient>,
    reporter: Arc<dyn ErrorReporter>,
}

impl CorrectionSuggester {
    pub fn new(
        config: JurisdictionConfig,
        llm: Arc<dyn LlmClient>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            config,
            llm,
            reporter,
        }
    }

    /// Propose corrections for records with local format violations.
    /// Infallible: any service failure yields an empty set.
    pub fn suggest(&self, records: &[PatientRecord]) -> Vec<ValidationSuggestion> {
        let flagged = self.flag_records(records);
        if flagged.is_empty() {
            return Vec::new();
        }

        match self.suggest_via_model(&flagged, records.len()) {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    flagged = flagged.len(),
                    "correction suggestion unavailable, returning none"
                );
                self.reporter.report(ErrorReport {
                    component: "correction_suggester",
                    message: "Correction suggestion failed; no corrections offered".into(),
                    detail: Some(e.to_string()),
                    severity: ReportSeverity::Warning,
                });
                Vec::new()
            }
        }
    }

    /// Select records with at least one local format violation,
    /// independent of the batch validator's own pass. Pattern checks
    /// only: plausibility (future dates, implausible ages) is not a
    /// formatting problem a correction could fix.
    fn flag_records(&self, records: &[PatientRecord]) -> Vec<CorrectionProjection> {
        records
            .iter()
            .enumerate()
            .filter(|(_, record)| self.has_format_issue(record))
            .take(SAMPLE_CAP)
            .map(|(row, record)| CorrectionProjection::new(row, record))
            .collect()
    }

    fn has_format_issue(&self, record: &PatientRecord) -> bool {
        record
            .email
            .as_deref()
            .is_some_and(|v| !is_valid_email(&self.config, v))
            || record
                .phone
                .as_deref()
                .is_some_and(|v| !is_valid_phone(&self.config, v))
            || record
                .date_of_birth
                .as_deref()
                .is_some_and(|v| parse_dob(&self.config, v).is_none())
    }

    fn suggest_via_model(
        &self,
        flagged: &[CorrectionProjection],
        batch_len: usize,
    ) -> Result<Vec<ValidationSuggestion>, PipelineError> {
        let payload = serde_json::to_string_pretty(flagged)
            .map_err(|e| PipelineError::JsonParsing(e.to_string()))?;
        let prompt = build_correction_prompt(&payload);

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            let outcome = self
                .llm
                .generate(&prompt)
                .and_then(|response| parse_correction_response(&response, batch_len));
            match outcome {
                Ok(suggestions) => return Ok(suggestions),
                Err(e) => {
                    if attempt < MAX_RETRIES {
                        tracing::warn!(
                            attempt = attempt + 1,
                            error = %e,
                            "correction attempt failed, retrying"
                        );
                    }
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            PipelineError::MalformedResponse("all correction attempts exhausted".into())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::PatientField;
    use crate::pipeline::llm::MockLlmClient;
    use crate::reporting::CollectingReporter;

    fn clean_record() -> PatientRecord {
        PatientRecord {
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            date_of_birth: Some("1980-01-01".into()),
            email: Some("jane@example.com".into()),
            phone: Some("07911 123456".into()),
            ..PatientRecord::default()
        }
    }

    fn suggester_with(
        llm: Arc<MockLlmClient>,
    ) -> (CorrectionSuggester, Arc<CollectingReporter>) {
        let reporter = Arc::new(CollectingReporter::new());
        let suggester =
            CorrectionSuggester::new(JurisdictionConfig::uk(), llm, reporter.clone());
        (suggester, reporter)
    }

    // ── Selection ───────────────────────────────────────────────────

    #[test]
    fn clean_batch_never_calls_the_service() {
        let llm = Arc::new(MockLlmClient::unreachable());
        let (suggester, reporter) = suggester_with(llm.clone());

        let suggestions = suggester.suggest(&vec![clean_record(); 5]);

        assert!(suggestions.is_empty());
        assert_eq!(llm.calls(), 0);
        assert!(reporter.reports().is_empty());
    }

    #[test]
    fn plausibility_problems_alone_do_not_flag() {
        // A future date in a valid layout is not a formatting issue.
        let mut record = clean_record();
        record.date_of_birth = Some("2150-01-01".into());
        let llm = Arc::new(MockLlmClient::unreachable());
        let (suggester, _) = suggester_with(llm.clone());

        assert!(suggester.suggest(&[record]).is_empty());
        assert_eq!(llm.calls(), 0);
    }

    #[test]
    fn each_format_violation_flags_the_record() {
        let llm = Arc::new(MockLlmClient::unreachable());
        let (suggester, _) = suggester_with(llm);

        let mut bad_email = clean_record();
        bad_email.email = Some("jane@@example.com".into());
        let mut bad_phone = clean_record();
        bad_phone.phone = Some("12345".into());
        let mut bad_dob = clean_record();
        bad_dob.date_of_birth = Some("May 1980".into());

        for record in [bad_email, bad_phone, bad_dob] {
            assert_eq!(suggester.flag_records(&[clean_record(), record]).len(), 1);
        }
    }

    #[test]
    fn flagged_sample_is_capped() {
        let llm = Arc::new(MockLlmClient::unreachable());
        let (suggester, _) = suggester_with(llm);

        let mut bad = clean_record();
        bad.email = Some("broken@@".into());
        let batch = vec![bad; 30];

        let flagged = suggester.flag_records(&batch);
        assert_eq!(flagged.len(), SAMPLE_CAP);
        assert_eq!(flagged[0].row, 0);
        assert_eq!(flagged[SAMPLE_CAP - 1].row, SAMPLE_CAP - 1);
    }

    // ── Primary path ────────────────────────────────────────────────

    #[test]
    fn model_corrections_become_suggestions() {
        let mut record = clean_record();
        record.date_of_birth = Some("15.05.1975".into());
        let batch = vec![clean_record(), record];

        let reply = r#"Here you go:
{"corrections": [{"row": 1, "field": "date_of_birth", "original": "15.05.1975",
  "suggested": "1975-05-15", "confidence": 0.92, "reason": "Normalised to ISO format"}]}"#;
        let llm = Arc::new(MockLlmClient::new(reply));
        let (suggester, reporter) = suggester_with(llm.clone());

        let suggestions = suggester.suggest(&batch);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].field, PatientField::DateOfBirth);
        assert_eq!(suggestions[0].row, 1);
        assert_eq!(suggestions[0].suggested, "1975-05-15");
        assert_eq!(llm.calls(), 1);
        assert!(reporter.reports().is_empty());
    }

    // ── Fallback path ───────────────────────────────────────────────

    #[test]
    fn service_failure_yields_empty_set() {
        let mut record = clean_record();
        record.email = Some("broken@@".into());
        let llm = Arc::new(MockLlmClient::unreachable());
        let (suggester, reporter) = suggester_with(llm.clone());

        let suggestions = suggester.suggest(&[record]);

        assert!(suggestions.is_empty());
        assert_eq!(llm.calls(), 1 + MAX_RETRIES);
        assert_eq!(reporter.reports().len(), 1);
        assert_eq!(reporter.reports()[0].component, "correction_suggester");
    }

    #[test]
    fn unusable_reply_yields_empty_set() {
        let mut record = clean_record();
        record.phone = Some("12".into());
        let llm = Arc::new(MockLlmClient::new("I cannot help with that."));
        let (suggester, reporter) = suggester_with(llm.clone());

        assert!(suggester.suggest(&[record]).is_empty());
        assert_eq!(llm.calls(), 2);
        assert_eq!(reporter.reports().len(), 1);
    }
}

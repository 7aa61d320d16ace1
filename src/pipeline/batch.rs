//! Whole-batch record validation: runs every field validator per
//! record, aggregates findings in encounter order, and summarises
//! defect density as a 0–100 quality score.

use chrono::{Local, NaiveDate};

use super::validators::dob::{check_dob, DobCheck};
use super::validators::email::is_valid_email;
use super::validators::identifier::{check_nhs_number, NhsCheck};
use super::validators::phone::{is_valid_phone, normalize_phone};
use super::validators::postcode::{canonicalize_postcode, is_valid_postcode};
use crate::config::JurisdictionConfig;
use crate::models::record::{PatientField, PatientRecord};
use crate::models::report::{
    Severity, ValidationError, ValidationResult, ValidationSuggestion, ValidationWarning,
    WarningKind,
};

/// Scored field slots per record: the six tracked fields plus one
/// reserved slot for future fields.
const FIELD_SLOTS_PER_RECORD: usize = 7;

const PHONE_SUGGESTION_CONFIDENCE: f32 = 0.8;
const POSTCODE_SUGGESTION_CONFIDENCE: f32 = 0.9;

/// Batch validator. Stateless between calls; holds only the injected
/// jurisdiction patterns.
pub struct PatientValidator {
    config: JurisdictionConfig,
}

impl PatientValidator {
    pub fn new(config: JurisdictionConfig) -> Self {
        Self { config }
    }

    /// Validate a batch against the current date.
    pub fn validate_batch(&self, records: &[PatientRecord]) -> ValidationResult {
        self.validate_batch_at(records, Local::now().date_naive())
    }

    /// Validate a batch against an explicit comparison date. Date-of-birth
    /// plausibility depends on "today"; injecting it keeps results
    /// reproducible.
    pub fn validate_batch_at(
        &self,
        records: &[PatientRecord],
        today: NaiveDate,
    ) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut suggestions = Vec::new();

        for (row, record) in records.iter().enumerate() {
            self.check_name(row, record, &mut errors);
            self.check_email(row, record, &mut errors);
            self.check_phone(row, record, &mut suggestions);
            self.check_nhs_number(row, record, &mut warnings);
            self.check_dob(row, record, today, &mut errors);
            self.check_postcode(row, record, &mut suggestions);
        }

        let high_impact = errors
            .iter()
            .filter(|e| e.severity.is_high_impact())
            .count();
        let score = compute_score(records.len(), high_impact);
        let is_valid = !errors.iter().any(|e| e.severity == Severity::Critical);

        tracing::debug!(
            records = records.len(),
            errors = errors.len(),
            warnings = warnings.len(),
            suggestions = suggestions.len(),
            score,
            "batch validation complete"
        );

        ValidationResult {
            is_valid,
            errors,
            warnings,
            suggestions,
            score,
        }
    }

    fn check_name(&self, row: usize, record: &PatientRecord, errors: &mut Vec<ValidationError>) {
        if record.first_name.is_some() && record.last_name.is_some() {
            return;
        }
        let raw = format!(
            "{} {}",
            record.first_name.as_deref().unwrap_or(""),
            record.last_name.as_deref().unwrap_or("")
        );
        errors.push(ValidationError {
            field: PatientField::Name,
            row,
            value: raw.trim().to_string(),
            message: "Patient name requires both a first and a last name".into(),
            severity: Severity::Critical,
        });
    }

    fn check_email(&self, row: usize, record: &PatientRecord, errors: &mut Vec<ValidationError>) {
        let Some(email) = record.email.as_deref() else {
            return;
        };
        if !is_valid_email(&self.config, email) {
            errors.push(ValidationError {
                field: PatientField::Email,
                row,
                value: email.to_string(),
                message: "Invalid email format".into(),
                severity: Severity::Medium,
            });
        }
    }

    fn check_phone(
        &self,
        row: usize,
        record: &PatientRecord,
        suggestions: &mut Vec<ValidationSuggestion>,
    ) {
        let Some(phone) = record.phone.as_deref() else {
            return;
        };
        if is_valid_phone(&self.config, phone) {
            return;
        }
        // The formatter proposes, it never asserts: only suggest a
        // canonical form that differs and itself passes the check.
        if let Some(canonical) = normalize_phone(phone) {
            if canonical != phone && is_valid_phone(&self.config, &canonical) {
                suggestions.push(ValidationSuggestion {
                    field: PatientField::Phone,
                    row,
                    original: phone.to_string(),
                    suggested: canonical,
                    confidence: PHONE_SUGGESTION_CONFIDENCE,
                    reason: "Reformatted to UK phone number format".into(),
                });
            }
        }
    }

    fn check_nhs_number(
        &self,
        row: usize,
        record: &PatientRecord,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        let Some(nhs) = record.nhs_number.as_deref() else {
            return;
        };
        // Shape and checksum failures are both soft warnings; upstream
        // feeds vary in reliability. See DESIGN.md before hardening this.
        let message = match check_nhs_number(nhs) {
            NhsCheck::Valid => return,
            NhsCheck::MalformedShape => "NHS number must be exactly 10 digits",
            NhsCheck::ChecksumFailed => "NHS number failed checksum validation",
        };
        warnings.push(ValidationWarning {
            field: PatientField::NhsNumber,
            row,
            value: nhs.to_string(),
            message: message.into(),
            kind: WarningKind::Format,
        });
    }

    fn check_dob(
        &self,
        row: usize,
        record: &PatientRecord,
        today: NaiveDate,
        errors: &mut Vec<ValidationError>,
    ) {
        let Some(dob) = record.date_of_birth.as_deref() else {
            return;
        };
        let message = match check_dob(&self.config, dob, today) {
            DobCheck::Valid(_) => return,
            DobCheck::UnrecognisedFormat => "Invalid date format",
            DobCheck::ImpossibleDate => "Invalid date",
            DobCheck::InFuture => "Date of birth cannot be in the future",
            DobCheck::ImplausiblyOld => "Age exceeds plausible maximum",
        };
        errors.push(ValidationError {
            field: PatientField::DateOfBirth,
            row,
            value: dob.to_string(),
            message: message.into(),
            severity: Severity::High,
        });
    }

    fn check_postcode(
        &self,
        row: usize,
        record: &PatientRecord,
        suggestions: &mut Vec<ValidationSuggestion>,
    ) {
        let Some(postcode) = record.postcode.as_deref() else {
            return;
        };
        if is_valid_postcode(&self.config, postcode) {
            return;
        }
        if let Some(canonical) = canonicalize_postcode(postcode) {
            if canonical != postcode && is_valid_postcode(&self.config, &canonical) {
                suggestions.push(ValidationSuggestion {
                    field: PatientField::Postcode,
                    row,
                    original: postcode.to_string(),
                    suggested: canonical,
                    confidence: POSTCODE_SUGGESTION_CONFIDENCE,
                    reason: "Reformatted to UK postcode format".into(),
                });
            }
        }
    }
}

/// `max(0, round(100 × (slots − high) / slots))` over
/// `slots = records × 7`. An empty batch scores 100: no data, no
/// defects.
fn compute_score(record_count: usize, high_impact: usize) -> u8 {
    let slots = record_count * FIELD_SLOTS_PER_RECORD;
    if slots == 0 {
        return 100;
    }
    let defect_free = slots.saturating_sub(high_impact);
    (100.0 * defect_free as f64 / slots as f64).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PatientValidator {
        PatientValidator::new(JurisdictionConfig::uk())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    fn valid_record() -> PatientRecord {
        PatientRecord {
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            date_of_birth: Some("1980-01-01".into()),
            nhs_number: Some("9434765919".into()),
            email: Some("jane.doe@example.com".into()),
            phone: Some("07911 123456".into()),
            postcode: Some("SW1A 1AA".into()),
        }
    }

    // ── Scoring ─────────────────────────────────────────────────────

    #[test]
    fn ten_valid_records_score_one_hundred() {
        let batch = vec![valid_record(); 10];
        let result = validator().validate_batch_at(&batch, today());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.suggestions.is_empty());
        assert_eq!(result.score, 100);
    }

    #[test]
    fn empty_batch_scores_one_hundred() {
        let result = validator().validate_batch_at(&[], today());
        assert!(result.is_valid);
        assert_eq!(result.score, 100);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn score_decreases_with_high_impact_errors() {
        let mut batch = vec![valid_record(); 10];
        let clean = validator().validate_batch_at(&batch, today());

        batch[2].last_name = None; // critical
        batch[5].date_of_birth = Some("31/02/2001".into()); // high
        let dirty = validator().validate_batch_at(&batch, today());

        assert_eq!(clean.score, 100);
        assert!(dirty.score < clean.score);
        assert!(dirty.score > 0);
        // 70 slots, 2 high-impact defects → round(100 × 68/70) = 97
        assert_eq!(dirty.score, 97);
    }

    #[test]
    fn warnings_and_suggestions_do_not_affect_score() {
        let mut batch = vec![valid_record(); 2];
        batch[0].nhs_number = Some("9434765918".into()); // checksum warning
        batch[1].postcode = Some("sw1a1aa".into()); // reformat suggestion
        let result = validator().validate_batch_at(&batch, today());
        assert_eq!(result.score, 100);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.suggestions.len(), 1);
    }

    // ── Validity ────────────────────────────────────────────────────

    #[test]
    fn missing_name_is_critical_and_invalidates_batch() {
        let mut record = valid_record();
        record.first_name = None;
        let result = validator().validate_batch_at(&[record], today());

        assert!(!result.is_valid);
        let error = &result.errors[0];
        assert_eq!(error.field, PatientField::Name);
        assert_eq!(error.severity, Severity::Critical);
        assert_eq!(error.value, "Doe");
    }

    #[test]
    fn medium_errors_leave_batch_valid() {
        // End-to-end scenario: a bad email alone is not a blocker.
        let batch = vec![PatientRecord {
            first_name: Some("John".into()),
            last_name: Some("Smith".into()),
            email: Some("john@@bad".into()),
            date_of_birth: Some("1975-05-15".into()),
            ..PatientRecord::default()
        }];
        let result = validator().validate_batch_at(&batch, today());

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, PatientField::Email);
        assert_eq!(result.errors[0].severity, Severity::Medium);
        assert!(result.is_valid);
        assert_eq!(result.score, 100);
    }

    // ── Per-field behaviour ─────────────────────────────────────────

    #[test]
    fn dob_messages_are_specific() {
        let cases = [
            ("banana", "Invalid date format"),
            ("31/02/2001", "Invalid date"),
            ("2150-01-01", "Date of birth cannot be in the future"),
            ("1800-01-01", "Age exceeds plausible maximum"),
        ];
        for (raw, expected) in cases {
            let mut record = valid_record();
            record.date_of_birth = Some(raw.into());
            let result = validator().validate_batch_at(&[record], today());
            assert_eq!(result.errors.len(), 1, "{raw}");
            assert_eq!(result.errors[0].message, expected);
            assert_eq!(result.errors[0].severity, Severity::High);
        }
    }

    #[test]
    fn nhs_warning_carries_format_kind() {
        let mut record = valid_record();
        record.nhs_number = Some("943 476 5918".into());
        let result = validator().validate_batch_at(&[record], today());

        assert_eq!(result.warnings.len(), 1);
        let warning = &result.warnings[0];
        assert_eq!(warning.field, PatientField::NhsNumber);
        assert_eq!(warning.kind, WarningKind::Format);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn phone_reformat_is_suggested_with_fixed_confidence() {
        let mut record = valid_record();
        record.phone = Some("7911123456".into());
        let result = validator().validate_batch_at(&[record], today());

        assert_eq!(result.suggestions.len(), 1);
        let suggestion = &result.suggestions[0];
        assert_eq!(suggestion.field, PatientField::Phone);
        assert_eq!(suggestion.suggested, "07911 123456");
        assert!((suggestion.confidence - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn hopeless_phone_yields_no_suggestion() {
        let mut record = valid_record();
        record.phone = Some("12345".into());
        let result = validator().validate_batch_at(&[record], today());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn postcode_round_trip() {
        // Canonical input: no error, no suggestion.
        let result = validator().validate_batch_at(&[valid_record()], today());
        assert!(result.suggestions.is_empty());

        // Compact lowercase input: one suggestion at 0.9.
        let mut record = valid_record();
        record.postcode = Some("sw1a1aa".into());
        let result = validator().validate_batch_at(&[record], today());
        assert_eq!(result.suggestions.len(), 1);
        let suggestion = &result.suggestions[0];
        assert_eq!(suggestion.suggested, "SW1A 1AA");
        assert!((suggestion.confidence - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn absent_optional_fields_are_not_findings() {
        let record = PatientRecord {
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            ..PatientRecord::default()
        };
        let result = validator().validate_batch_at(&[record], today());
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.suggestions.is_empty());
        assert!(result.is_valid);
    }

    // ── Ordering and bounds ─────────────────────────────────────────

    #[test]
    fn findings_preserve_row_order() {
        let mut first = valid_record();
        first.email = Some("bad@@one".into());
        let mut second = valid_record();
        second.email = Some("bad@@two".into());
        second.date_of_birth = Some("banana".into());

        let result = validator().validate_batch_at(&[first, second], today());
        let rows: Vec<usize> = result.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![0, 1, 1]);
        // Within a record, fields are visited in declaration order:
        // email before date of birth.
        assert_eq!(result.errors[1].field, PatientField::Email);
        assert_eq!(result.errors[2].field, PatientField::DateOfBirth);
    }

    #[test]
    fn every_finding_row_is_in_bounds() {
        let mut batch = vec![valid_record(); 4];
        batch[0].first_name = None;
        batch[1].email = Some("broken@@".into());
        batch[2].nhs_number = Some("123".into());
        batch[3].postcode = Some("b11aa".into());

        let result = validator().validate_batch_at(&batch, today());
        for row in result
            .errors
            .iter()
            .map(|e| e.row)
            .chain(result.warnings.iter().map(|w| w.row))
            .chain(result.suggestions.iter().map(|s| s.row))
        {
            assert!(row < batch.len());
        }
    }

    // ── Score arithmetic ────────────────────────────────────────────

    #[test]
    fn score_formula_examples() {
        assert_eq!(compute_score(0, 0), 100);
        assert_eq!(compute_score(1, 0), 100);
        assert_eq!(compute_score(1, 7), 0);
        assert_eq!(compute_score(10, 2), 97);
        // Saturates rather than underflowing.
        assert_eq!(compute_score(1, 50), 0);
    }
}

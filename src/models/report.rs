//! Report value objects produced by the pipeline.
//!
//! Immutable, created fresh per invocation, serialisable so import
//! flows can merge them straight into a response payload. Every row
//! index refers to ordinal position within the input batch.

use serde::Serialize;

use super::record::PatientField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Critical and high findings are the only ones that lower the
    /// quality score.
    pub fn is_high_impact(self) -> bool {
        matches!(self, Self::Critical | Self::High)
    }
}

/// Classification of a warning. Only format warnings are produced today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    Format,
}

/// A field that is present but invalid, or a required field that is
/// missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub field: PatientField,
    pub row: usize,
    pub value: String,
    pub message: String,
    pub severity: Severity,
}

/// A value that is suspicious but not provably wrong.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationWarning {
    pub field: PatientField,
    pub row: usize,
    pub value: String,
    pub message: String,
    pub kind: WarningKind,
}

/// A proposed replacement value. Never applied automatically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSuggestion {
    pub field: PatientField,
    pub row: usize,
    pub original: String,
    pub suggested: String,
    pub confidence: f32,
    pub reason: String,
}

/// Whole-batch validation outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// True iff no critical-severity error exists anywhere in the batch.
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub suggestions: Vec<ValidationSuggestion>,
    /// 0–100 defect-density summary.
    pub score: u8,
}

/// Rows believed to denote the same person. Always at least two rows,
/// never the same row twice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub rows: Vec<usize>,
    pub matched_fields: Vec<String>,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateDetection {
    pub groups: Vec<DuplicateGroup>,
    /// Σ (group size − 1): how many rows are redundant.
    pub total_duplicates: usize,
}

impl DuplicateDetection {
    pub fn from_groups(groups: Vec<DuplicateGroup>) -> Self {
        let total_duplicates = groups.iter().map(|g| g.rows.len().saturating_sub(1)).sum();
        Self {
            groups,
            total_duplicates,
        }
    }

    pub fn empty() -> Self {
        Self::from_groups(Vec::new())
    }
}

//! Data-quality pipeline for patient records.
//!
//! Three independent, read-only analyses over a batch of records:
//! batch validation ([`PatientValidator`]), duplicate detection
//! ([`DuplicateDetector`]) and correction suggestion
//! ([`CorrectionSuggester`]). Each takes a fresh batch and returns a
//! fresh report; none mutates shared state, so callers may run all
//! three concurrently over the same batch. The two LLM-assisted
//! analyses degrade deterministically when the service is unavailable
//! and never surface a network error to the caller.

pub mod config;
pub mod models;
pub mod pipeline;
pub mod reporting;

pub use config::JurisdictionConfig;
pub use models::record::{PatientField, PatientRecord};
pub use models::report::{
    DuplicateDetection, DuplicateGroup, Severity, ValidationError, ValidationResult,
    ValidationSuggestion, ValidationWarning, WarningKind,
};
pub use pipeline::batch::PatientValidator;
pub use pipeline::corrections::CorrectionSuggester;
pub use pipeline::dedup::DuplicateDetector;
pub use pipeline::llm::{LlmClient, MockLlmClient, OllamaClient};
pub use pipeline::PipelineError;
pub use reporting::{CollectingReporter, ErrorReport, ErrorReporter, LogReporter, ReportSeverity};

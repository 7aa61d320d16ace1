//! Out-of-band error reporting collaborator.
//!
//! Detector/suggester failures are reported here before the component
//! degrades to its fallback; the report is persisted (or logged) out of
//! band and MUST never propagate a failure back into the pipeline.

use std::sync::Mutex;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSeverity {
    Error,
    Warning,
}

/// One reportable incident.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    /// Originating component identifier.
    pub component: &'static str,
    pub message: String,
    /// Underlying cause chain, when available.
    pub detail: Option<String>,
    pub severity: ReportSeverity,
}

/// Collaborator that persists incident reports out of band.
///
/// Implementations must swallow their own failures: a broken reporter
/// must not break the pipeline.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, report: ErrorReport);
}

/// Default reporter: a structured tracing event, nothing else.
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, report: ErrorReport) {
        match report.severity {
            ReportSeverity::Error => tracing::error!(
                component = report.component,
                detail = report.detail.as_deref(),
                "{}",
                report.message
            ),
            ReportSeverity::Warning => tracing::warn!(
                component = report.component,
                detail = report.detail.as_deref(),
                "{}",
                report.message
            ),
        }
    }
}

/// Test double that records every report for later assertions.
pub struct CollectingReporter {
    reports: Mutex<Vec<ErrorReport>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
        }
    }

    pub fn reports(&self) -> Vec<ErrorReport> {
        self.reports.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Default for CollectingReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, report: ErrorReport) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report);
        }
    }
}

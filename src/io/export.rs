//! JSON export of an analysis run.
//!
//! The report is meant to be easy to consume in downstream scripts: every
//! number that could not be computed is `null` rather than missing.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use u_numflow::stats;

use crate::analysis::CapabilityOutcome;
use crate::app::pipeline::AnalysisRun;
use crate::domain::NormalityVerdict;
use crate::error::AppError;

/// Serialized form of [`AnalysisRun`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub tool: String,
    pub generated_at: DateTime<Local>,
    pub source: String,
    pub signal: String,
    pub records: usize,
    /// `"loaded"` or the load failure kind.
    pub load_status: String,
    pub load_error: Option<String>,
    pub verdict: NormalityVerdict,
    pub normality_flag: u8,
    pub shapiro_w: Option<f64>,
    pub p_value: Option<f64>,
    pub lsl: f64,
    pub usl: f64,
    pub mean: Option<f64>,
    pub sigma: Option<f64>,
    /// `"computed"`, `"not_normal"` or `"degenerate_signal"`.
    pub capability_status: String,
    pub cp: Option<f64>,
    pub cpk: Option<f64>,
}

impl AnalysisReport {
    pub fn from_run(run: &AnalysisRun, generated_at: DateTime<Local>) -> Self {
        let signal = run.source.signal();
        let values = run.dataset.column(signal).unwrap_or_default();
        let test = run.normality.test();
        let (cp, cpk) = run.capability.pair();
        let capability_status = match run.capability {
            CapabilityOutcome::Computed(_) => "computed",
            CapabilityOutcome::NotNormal => "not_normal",
            CapabilityOutcome::DegenerateSignal { .. } => "degenerate_signal",
        };

        Self {
            tool: "spc".to_string(),
            generated_at,
            source: run.source.path().display().to_string(),
            signal: signal.to_string(),
            records: run.dataset.len(),
            load_status: run.load_status().to_string(),
            load_error: run.load_failure.as_ref().map(ToString::to_string),
            verdict: run.verdict(),
            normality_flag: run.verdict().as_flag(),
            shapiro_w: test.map(|t| t.w),
            p_value: test.map(|t| t.p_value),
            lsl: run.limits.lower,
            usl: run.limits.upper,
            mean: stats::mean(&values),
            sigma: stats::population_std_dev(&values),
            capability_status: capability_status.to_string(),
            cp,
            cpk,
        }
    }
}

/// Write the run as a pretty-printed JSON report.
pub fn write_report_json(path: &Path, run: &AnalysisRun) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| {
            AppError::usage(format!("Failed to create report JSON '{}': {e}", path.display()))
        })?;

    let report = AnalysisReport::from_run(run, Local::now());
    serde_json::to_writer_pretty(file, &report)
        .map_err(|e| AppError::usage(format!("Failed to write report JSON: {e}")))?;

    Ok(())
}

//! Formatted terminal output for analysis runs and column listings.
//!
//! We keep formatting code in one place so:
//! - the analysis code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::analysis::{CapabilityOutcome, NormalityOutcome};
use crate::app::pipeline::AnalysisRun;
use crate::domain::NORMALITY_ALPHA;

/// Format the full run summary (source, load status, verdict, capability).
///
/// A failed load and a non-normal verdict produce different lines, so an
/// empty dataset is never mistaken for data that was tested and rejected.
pub fn format_run_summary(run: &AnalysisRun) -> String {
    let mut out = String::new();

    out.push_str("=== spc - Statistical Process Control ===\n");
    out.push_str(&format!("Source: {}\n", run.source.path().display()));
    out.push_str(&format!("Signal: {}\n", run.source.signal()));

    match &run.load_failure {
        Some(failure) => {
            out.push_str(&format!("Load: FAILED ({})\n", failure.kind()));
            out.push_str(&format!("  {failure}\n"));
        }
        None => out.push_str(&format!("Load: ok | records={}\n", run.dataset.len())),
    }

    out.push_str(&format_normality(&run.normality));
    out.push_str(&format!(
        "Limits: LSL={:.4} | USL={:.4}\n",
        run.limits.lower, run.limits.upper
    ));
    out.push_str(&format_capability(run));

    out
}

fn format_normality(normality: &NormalityOutcome) -> String {
    let verdict = normality.verdict().display_name();
    match normality {
        NormalityOutcome::Tested(sw) => format!(
            "Normality: Shapiro-Wilk W={:.4} | p={:.4} | alpha={NORMALITY_ALPHA} -> {verdict}\n",
            sw.w, sw.p_value
        ),
        NormalityOutcome::Untested(reason) => {
            format!("Normality: not tested ({}) -> {verdict}\n", reason.describe())
        }
    }
}

fn format_capability(run: &AnalysisRun) -> String {
    if !run.loaded() {
        return "Capability: not computed (data could not be loaded)\n".to_string();
    }
    match run.capability {
        CapabilityOutcome::Computed(idx) => format!(
            "Capability: Cp={:.3} | Cpk={:.3} | Cpu={:.3} | Cpl={:.3} | mean={:.4} | sigma={:.4}\n",
            idx.cp, idx.cpk, idx.cpu, idx.cpl, idx.mean, idx.sigma
        ),
        CapabilityOutcome::NotNormal => {
            "Capability: not computed (distribution is not normal)\n".to_string()
        }
        CapabilityOutcome::DegenerateSignal { sigma } => {
            format!("Capability: not computed (degenerate signal, sigma={sigma})\n")
        }
    }
}

/// Numbered list of header names, in file order.
pub fn format_columns(columns: &[String]) -> String {
    let mut out = String::new();
    for (idx, name) in columns.iter().enumerate() {
        out.push_str(&format!("{:>3}  {}\n", idx + 1, truncate(name, 48)));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_analysis;
    use crate::domain::{DEFAULT_SIGNAL, SourceReference, SpecLimits};
    use crate::test_support::{normal_quantiles, series_csv, uniform_digits, write_fixture};

    #[test]
    fn summary_for_normal_data_shows_indices() {
        let path = write_fixture(
            "report_normal.csv",
            &series_csv(DEFAULT_SIGNAL, &normal_quantiles(50, 0.0, 0.1)),
        );
        let run = run_analysis(&SourceReference::new(&path), SpecLimits::default());
        let txt = format_run_summary(&run);

        assert!(txt.contains("Load: ok | records=50"));
        assert!(txt.contains("-> normal\n"));
        assert!(txt.contains("Capability: Cp="));
    }

    #[test]
    fn summary_distinguishes_load_failure_from_not_normal() {
        let missing = run_analysis(
            &SourceReference::with_signal("nonexistent_file.csv", DEFAULT_SIGNAL),
            SpecLimits::default(),
        );
        let missing_txt = format_run_summary(&missing);
        assert!(missing_txt.contains("Load: FAILED (source_unavailable)"));
        assert!(missing_txt.contains("data could not be loaded"));
        assert!(missing_txt.contains("not tested (dataset is empty)"));

        let path = write_fixture(
            "report_digits.csv",
            &series_csv(DEFAULT_SIGNAL, &uniform_digits(100)),
        );
        let digits = run_analysis(&SourceReference::new(&path), SpecLimits::default());
        let digits_txt = format_run_summary(&digits);
        assert!(digits_txt.contains("Load: ok"));
        assert!(digits_txt.contains("-> not normal\n"));
        assert!(digits_txt.contains("distribution is not normal"));
    }

    #[test]
    fn columns_are_numbered_in_order() {
        let columns = vec!["layer".to_string(), "mean_ir_pwr".to_string()];
        assert_eq!(format_columns(&columns), "  1  layer\n  2  mean_ir_pwr\n");
    }

    #[test]
    fn long_column_names_are_truncated() {
        let long = "x".repeat(60);
        let txt = format_columns(&[long]);
        assert!(txt.trim_end().ends_with('.'));
        assert_eq!(txt.trim_end().chars().count(), 5 + 48);
    }
}

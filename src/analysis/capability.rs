//! Process capability indices (Cp, Cpk).
//!
//! ```text
//! Cp  = (USL − LSL) / 6σ
//! Cpk = min((USL − μ) / 3σ, (μ − LSL) / 3σ)
//! ```
//!
//! σ is the population standard deviation (divisor `n`). Indices are only
//! meaningful for normal data: the normality gate runs first and a
//! `NotNormal` verdict means no indices at all.
//!
//! Reference: Montgomery (2019), *Introduction to Statistical Quality Control*,
//! 8th ed., Chapter 8.

use log::{info, warn};
use u_numflow::stats;

use crate::analysis::normality::{NormalityOutcome, assess_normality};
use crate::domain::{CapabilityIndices, Dataset, NormalityVerdict, SpecLimits};

/// Result of a capability computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapabilityOutcome {
    Computed(CapabilityIndices),
    /// The normality gate rejected the data (or could not run).
    NotNormal,
    /// σ is zero or not finite; Cp/Cpk would be infinite or undefined.
    DegenerateSignal { sigma: f64 },
}

impl CapabilityOutcome {
    pub fn indices(&self) -> Option<CapabilityIndices> {
        match self {
            CapabilityOutcome::Computed(indices) => Some(*indices),
            _ => None,
        }
    }

    /// `(Cp, Cpk)`, or `(None, None)` when no indices were computed.
    pub fn pair(&self) -> (Option<f64>, Option<f64>) {
        match self.indices() {
            Some(indices) => (Some(indices.cp), Some(indices.cpk)),
            None => (None, None),
        }
    }
}

/// Cp and Cpk of `signal` against `limits`, gated on normality.
pub fn compute_capability(
    dataset: &Dataset,
    signal: &str,
    limits: SpecLimits,
) -> CapabilityOutcome {
    let normality = assess_normality(dataset, signal);
    capability_after_gate(dataset, signal, limits, &normality)
}

/// Same as [`compute_capability`], reusing an already computed normality outcome.
pub fn capability_after_gate(
    dataset: &Dataset,
    signal: &str,
    limits: SpecLimits,
    normality: &NormalityOutcome,
) -> CapabilityOutcome {
    if normality.verdict() == NormalityVerdict::NotNormal {
        warn!("Non normal `{signal}` distribution. Cpk computation not done");
        return CapabilityOutcome::NotNormal;
    }

    // The gate only passes when the column exists and has enough values.
    let Some(values) = dataset.column(signal) else {
        return CapabilityOutcome::NotNormal;
    };
    let (Some(mu), Some(sigma)) = (stats::mean(&values), stats::population_std_dev(&values)) else {
        return CapabilityOutcome::NotNormal;
    };

    if !(sigma.is_finite() && sigma > 0.0) {
        warn!("`{signal}` has degenerate spread (σ={sigma}); Cp/Cpk not computed");
        return CapabilityOutcome::DegenerateSignal { sigma };
    }

    let indices = capability_indices(mu, sigma, limits);
    info!("Cp={:.3}, Cpk={:.3}", indices.cp, indices.cpk);
    CapabilityOutcome::Computed(indices)
}

/// `(Cp, Cpk)` pair form of [`compute_capability`].
pub fn capability_pair(
    dataset: &Dataset,
    signal: &str,
    lower: f64,
    upper: f64,
) -> (Option<f64>, Option<f64>) {
    compute_capability(dataset, signal, SpecLimits::new(lower, upper)).pair()
}

/// Closed-form indices for a process with mean `mu` and spread `sigma`.
///
/// No guards: inverted limits give a negative Cp and `sigma == 0` gives
/// non-finite values.
pub fn capability_indices(mu: f64, sigma: f64, limits: SpecLimits) -> CapabilityIndices {
    let cp = limits.width() / (6.0 * sigma);
    let cpu = (limits.upper - mu) / (3.0 * sigma);
    let cpl = (mu - limits.lower) / (3.0 * sigma);
    CapabilityIndices {
        cp,
        cpk: cpu.min(cpl),
        cpu,
        cpl,
        mean: mu,
        sigma,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normality::test_normality;
    use crate::domain::Record;
    use crate::test_support::{normal_quantiles, uniform_digits};
    use proptest::prelude::*;

    fn dataset(values: &[f64]) -> Dataset {
        Dataset::new(
            "signal",
            values
                .iter()
                .enumerate()
                .map(|(i, &value)| Record {
                    layer: (i + 1) as f64,
                    value,
                })
                .collect(),
        )
    }

    #[test]
    fn normal_sample_matches_closed_form() {
        let values = normal_quantiles(100, 0.0, 1.0);
        let ds = dataset(&values);

        let indices = compute_capability(&ds, "signal", SpecLimits::default())
            .indices()
            .expect("normal data should yield indices");

        let mu = values.iter().sum::<f64>() / values.len() as f64;
        let ss = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>();
        let sigma = (ss / values.len() as f64).sqrt();
        let cp = 2.0 / (6.0 * sigma);
        let cpk = ((1.0 - mu) / (3.0 * sigma)).min((mu + 1.0) / (3.0 * sigma));

        assert!((indices.cp - cp).abs() < 1e-9);
        assert!((indices.cpk - cpk).abs() < 1e-9);
        // Quantiles of N(0, 1) have σ slightly below 1.
        assert!((indices.sigma - 1.0).abs() < 0.05, "σ = {}", indices.sigma);
        assert!((indices.cp - 1.0 / 3.0).abs() < 0.02, "Cp = {}", indices.cp);
    }

    #[test]
    fn uses_population_sigma() {
        let idx = capability_indices(5.0, 2.0, SpecLimits::new(-1.0, 11.0));
        assert!((idx.cp - 1.0).abs() < 1e-12);
        assert!((idx.cpu - 1.0).abs() < 1e-12);
        assert!((idx.cpl - 1.0).abs() < 1e-12);
    }

    #[test]
    fn gated_data_uses_divisor_n() {
        use crate::analysis::normality::ShapiroWilk;

        // Population σ is exactly 2 here; the sample σ would be about 2.138.
        let ds = dataset(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let passed = NormalityOutcome::Tested(ShapiroWilk { w: 0.95, p_value: 0.5 });
        let idx = capability_after_gate(&ds, "signal", SpecLimits::new(-1.0, 11.0), &passed)
            .indices()
            .expect("indices");
        assert!((idx.sigma - 2.0).abs() < 1e-12, "sigma = {}", idx.sigma);
        assert!((idx.mean - 5.0).abs() < 1e-12);
        assert!((idx.cp - 1.0).abs() < 1e-12);
    }

    #[test]
    fn off_center_mean_lowers_cpk() {
        let idx = capability_indices(0.5, 0.1, SpecLimits::default());
        assert!((idx.cp - 2.0 / 0.6).abs() < 1e-12);
        assert!((idx.cpk - 0.5 / 0.3).abs() < 1e-12);
        assert!(idx.cpk < idx.cp);
    }

    #[test]
    fn inverted_limits_give_negative_cp() {
        let idx = capability_indices(0.0, 1.0, SpecLimits::new(1.0, -1.0));
        assert!(idx.cp < 0.0);
    }

    #[test]
    fn non_normal_sample_has_no_indices() {
        let ds = dataset(&uniform_digits(100));
        assert_eq!(
            compute_capability(&ds, "signal", SpecLimits::default()),
            CapabilityOutcome::NotNormal
        );
        assert_eq!(capability_pair(&ds, "signal", -1.0, 1.0), (None, None));
    }

    #[test]
    fn empty_dataset_has_no_indices() {
        assert_eq!(capability_pair(&Dataset::empty(), "signal", -1.0, 1.0), (None, None));
    }

    #[test]
    fn shifted_normal_sample() {
        let ds = dataset(&normal_quantiles(200, 10.0, 0.5));
        let (cp, cpk) = capability_pair(&ds, "signal", 8.0, 12.0);
        let cp = cp.expect("cp");
        let cpk = cpk.expect("cpk");
        assert!(cp > 1.3 && cp < 1.4, "Cp = {cp}");
        assert!((cp - cpk).abs() < 1e-9, "centered process: Cp = {cp}, Cpk = {cpk}");
    }

    proptest! {
        #[test]
        fn not_normal_implies_no_indices(
            values in proptest::collection::vec(-1e3_f64..1e3, 0..=40),
            lower in -10.0_f64..0.0,
            upper in 0.0_f64..10.0,
        ) {
            let ds = dataset(&values);
            let verdict = test_normality(&ds, "signal");
            let pair = capability_pair(&ds, "signal", lower, upper);
            if verdict == NormalityVerdict::NotNormal {
                prop_assert_eq!(pair, (None, None));
            } else {
                prop_assert!(pair.0.is_some() && pair.1.is_some());
            }
        }
    }
}

//! Shapiro–Wilk normality gate.
//!
//! The W statistic and its p-value follow Royston's approximation
//! (Royston 1992; Algorithm AS R94, 1995):
//!
//! 1. approximate the normal-order-statistic weights `aᵢ` from Blom scores
//! 2. `W = (Σ aᵢ (x₍ₙ₊₁₋ᵢ₎ − x₍ᵢ₎))² / Σ (xᵢ − x̄)²`
//! 3. normalize `ln(1 − W)` and read the p-value off the standard normal tail
//!
//! The test is defined for `3 <= n <= 5000` finite, non-constant samples.

use log::{debug, info, warn};
use serde::Serialize;

use u_numflow::{special, stats};

use crate::domain::{Dataset, NORMALITY_ALPHA, NormalityVerdict};

/// Smallest sample the test accepts.
pub const SHAPIRO_WILK_MIN_N: usize = 3;
/// Largest sample the approximation is valid for.
pub const SHAPIRO_WILK_MAX_N: usize = 5000;

/// W statistic and p-value of one Shapiro–Wilk test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapiroWilk {
    pub w: f64,
    pub p_value: f64,
}

/// Why no test was run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UntestedReason {
    /// The dataset has no rows.
    EmptyDataset,
    /// The dataset does not carry the requested signal column.
    SignalAbsent,
    /// Too few/many points, a non-finite value, or zero spread.
    TestUndefined,
}

impl UntestedReason {
    pub fn describe(self) -> &'static str {
        match self {
            UntestedReason::EmptyDataset => "dataset is empty",
            UntestedReason::SignalAbsent => "signal column not in dataset",
            UntestedReason::TestUndefined => {
                "Shapiro-Wilk undefined (needs 3..=5000 finite, non-constant values)"
            }
        }
    }
}

/// Full result of the normality gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalityOutcome {
    Tested(ShapiroWilk),
    Untested(UntestedReason),
}

impl NormalityOutcome {
    /// `NotNormal` unless a test ran and its p-value exceeds α.
    pub fn verdict(&self) -> NormalityVerdict {
        match self {
            NormalityOutcome::Tested(result) if result.p_value > NORMALITY_ALPHA => {
                NormalityVerdict::Normal
            }
            _ => NormalityVerdict::NotNormal,
        }
    }

    pub fn test(&self) -> Option<ShapiroWilk> {
        match self {
            NormalityOutcome::Tested(result) => Some(*result),
            NormalityOutcome::Untested(_) => None,
        }
    }
}

/// Normal / NotNormal verdict for `signal` in `dataset`.
pub fn test_normality(dataset: &Dataset, signal: &str) -> NormalityVerdict {
    assess_normality(dataset, signal).verdict()
}

/// Run the gate and keep the test statistics (or the reason none were computed).
pub fn assess_normality(dataset: &Dataset, signal: &str) -> NormalityOutcome {
    if dataset.is_empty() {
        debug!("normality: dataset is empty, no test run");
        return NormalityOutcome::Untested(UntestedReason::EmptyDataset);
    }

    let Some(values) = dataset.column(signal) else {
        warn!("`{signal}` not in dataset, please choose a correct signal (see `spc columns`)");
        return NormalityOutcome::Untested(UntestedReason::SignalAbsent);
    };

    let Some(result) = shapiro_wilk(&values) else {
        warn!(
            "`{signal}`: {} (n={})",
            UntestedReason::TestUndefined.describe(),
            values.len()
        );
        return NormalityOutcome::Untested(UntestedReason::TestUndefined);
    };

    let outcome = NormalityOutcome::Tested(result);
    match outcome.verdict() {
        NormalityVerdict::Normal => info!(
            "`{signal}` distribution is normal at {:.0}% confidence (W={:.4}, p={:.4})",
            (1.0 - NORMALITY_ALPHA) * 100.0,
            result.w,
            result.p_value
        ),
        NormalityVerdict::NotNormal => info!(
            "`{signal}` distribution is not normal (W={:.4}, p={:.4})",
            result.w, result.p_value
        ),
    }
    outcome
}

/// Shapiro–Wilk test; `None` when the test is undefined for `data`.
pub fn shapiro_wilk(data: &[f64]) -> Option<ShapiroWilk> {
    let n = data.len();
    if !(SHAPIRO_WILK_MIN_N..=SHAPIRO_WILK_MAX_N).contains(&n) {
        return None;
    }
    if data.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let mut x = data.to_vec();
    x.sort_by(f64::total_cmp);

    if x[n - 1] - x[0] < 1e-300 {
        return None;
    }

    if n == 3 {
        return shapiro_wilk_n3(&x);
    }

    let half = n / 2;
    let a = weights(n, half)?;
    let w = w_statistic(&x, &a)?;
    if !(0.0..=1.0 + 1e-10).contains(&w) {
        return None;
    }
    let w = w.min(1.0);

    Some(ShapiroWilk {
        w,
        p_value: p_value(w, n).clamp(0.0, 1.0),
    })
}

// n = 3 has exact weights [1/√2, 0, -1/√2] and an exact null distribution.
fn shapiro_wilk_n3(x: &[f64]) -> Option<ShapiroWilk> {
    let mean = (x[0] + x[1] + x[2]) / 3.0;
    let ss: f64 = x.iter().map(|&v| (v - mean).powi(2)).sum();
    if ss < 1e-300 {
        return None;
    }

    let num = std::f64::consts::FRAC_1_SQRT_2 * (x[2] - x[0]);
    let w = (num * num / ss).clamp(0.75, 1.0);
    let p = 1.0 - (6.0 / std::f64::consts::PI) * w.sqrt().acos();

    Some(ShapiroWilk {
        w,
        p_value: p.clamp(0.0, 1.0),
    })
}

// Royston (AS R94) polynomial coefficients.
const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

/// `c[0] + c[1] x + c[2] x² + …`
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

/// Antisymmetric weights `a[0..half]` for the lower half of the order statistics.
fn weights(n: usize, half: usize) -> Option<Vec<f64>> {
    let nf = n as f64;

    // Blom scores for the lower half (negative values).
    let m: Vec<f64> = (0..half)
        .map(|i| special::inverse_normal_cdf((i as f64 + 1.0 - 0.375) / (nf + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / nf.sqrt();

    let a1 = poly(&C1, rsn) - m[0] / ssumm2;

    // n <= 5 corrects only the outermost weight, larger n the outer two.
    let corrected = if n <= 5 { 1 } else { 2 };
    let mut a = vec![0.0; half];
    a[0] = a1;

    let (fac_sq, one_minus) = if corrected == 1 {
        (summ2 - 2.0 * m[0] * m[0], 1.0 - 2.0 * a1 * a1)
    } else {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        (
            summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1],
            1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2,
        )
    };
    if fac_sq <= 0.0 || one_minus <= 0.0 {
        return None;
    }

    let fac = (fac_sq / one_minus).sqrt();
    for i in corrected..half {
        a[i] = -m[i] / fac;
    }
    Some(a)
}

fn w_statistic(sorted: &[f64], a: &[f64]) -> Option<f64> {
    let n = sorted.len();
    let num: f64 = a
        .iter()
        .enumerate()
        .map(|(i, &ai)| ai * (sorted[n - 1 - i] - sorted[i]))
        .sum();

    let mean = stats::mean(sorted)?;
    let ss: f64 = sorted.iter().map(|&v| (v - mean).powi(2)).sum();
    if ss < 1e-300 {
        return None;
    }
    Some(num * num / ss)
}

fn p_value(w: f64, n: usize) -> f64 {
    let nf = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let y = w1.ln();

    if n <= 11 {
        let gamma = poly(&G, nf);
        if y >= gamma {
            return 0.0;
        }
        let y = -(gamma - y).ln();
        let m = poly(&C3, nf);
        let s = poly(&C4, nf).exp();
        1.0 - special::standard_normal_cdf((y - m) / s)
    } else {
        let ln_n = nf.ln();
        let m = poly(&C5, ln_n);
        let s = poly(&C6, ln_n).exp();
        1.0 - special::standard_normal_cdf((y - m) / s)
    }
}

//! Synthetic measurement series for trying the analysis without real data.
//!
//! The output is a regular source CSV: a `layer` column numbered `1..=n` and
//! one signal column drawn from the chosen distribution.

use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_SIGNAL, Dataset, LAYER_COLUMN, Record};
use crate::error::AppError;

/// Distribution the signal column is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SampleDistribution {
    /// `N(mu, sigma)`
    Normal,
    /// Discrete uniform over `0..=9` (never passes the normality gate).
    UniformInt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub count: usize,
    pub mu: f64,
    pub sigma: f64,
    pub seed: u64,
    pub signal: String,
    pub distribution: SampleDistribution,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            mu: 0.0,
            sigma: 0.1,
            seed: 42,
            signal: DEFAULT_SIGNAL.to_string(),
            distribution: SampleDistribution::Normal,
        }
    }
}

/// Draw a seeded series; the same config always yields the same dataset.
pub fn generate_sample(config: &SampleConfig) -> Result<Dataset, AppError> {
    if config.count == 0 {
        return Err(AppError::usage("Sample count must be > 0."));
    }
    if config.signal.is_empty() || config.signal == LAYER_COLUMN {
        return Err(AppError::usage(format!(
            "Signal column name must be non-empty and differ from `{LAYER_COLUMN}`."
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let values: Vec<f64> = match config.distribution {
        SampleDistribution::Normal => {
            if !(config.mu.is_finite() && config.sigma.is_finite() && config.sigma > 0.0) {
                return Err(AppError::usage("Normal sample needs a finite mu and sigma > 0."));
            }
            let normal = Normal::new(config.mu, config.sigma)
                .map_err(|e| AppError::runtime(format!("Noise distribution error: {e}")))?;
            (0..config.count).map(|_| normal.sample(&mut rng)).collect()
        }
        SampleDistribution::UniformInt => (0..config.count)
            .map(|_| f64::from(rng.gen_range(0..=9_u8)))
            .collect(),
    };

    let records = values
        .into_iter()
        .enumerate()
        .map(|(i, value)| Record {
            layer: (i + 1) as f64,
            value,
        })
        .collect();
    Ok(Dataset::new(config.signal.clone(), records))
}

/// Write `dataset` as a source CSV with a `layer,<signal>` header row.
pub fn write_sample_csv(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let signal = dataset
        .signal()
        .ok_or_else(|| AppError::runtime("Cannot write a dataset without columns."))?;

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::usage(format!("Failed to create CSV '{}': {e}", path.display())))?;

    writer
        .write_record([LAYER_COLUMN, signal])
        .map_err(|e| AppError::runtime(format!("Failed to write CSV header: {e}")))?;
    for record in dataset.records() {
        writer
            .write_record([format!("{}", record.layer), format!("{}", record.value)])
            .map_err(|e| AppError::runtime(format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::runtime(format!("Failed to flush CSV '{}': {e}", path.display())))?;
    Ok(())
}

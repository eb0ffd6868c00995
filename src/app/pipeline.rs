//! Shared analysis pipeline used by both CLI and TUI front-ends.
//!
//! One run loads the source once and feeds the same in-memory dataset to
//! every step:
//! load -> normality gate -> capability -> figure
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use log::warn;

use crate::analysis::{
    CapabilityOutcome, NormalityOutcome, assess_normality, capability_after_gate,
};
use crate::domain::{Dataset, NormalityVerdict, SourceReference, SpecLimits};
use crate::io::ingest::{LoadFailure, try_load};
use crate::plot::{Figure, build_graph};

/// All computed outputs of a single analysis.
#[derive(Debug)]
pub struct AnalysisRun {
    pub source: SourceReference,
    pub limits: SpecLimits,
    /// Why the dataset is empty, when it is empty because loading failed.
    pub load_failure: Option<LoadFailure>,
    pub dataset: Dataset,
    pub normality: NormalityOutcome,
    pub capability: CapabilityOutcome,
    pub figure: Figure,
}

impl AnalysisRun {
    pub fn loaded(&self) -> bool {
        self.load_failure.is_none()
    }

    /// `"loaded"` or the failure kind.
    pub fn load_status(&self) -> &'static str {
        self.load_failure.as_ref().map_or("loaded", LoadFailure::kind)
    }

    pub fn verdict(&self) -> NormalityVerdict {
        self.normality.verdict()
    }

    /// Recompute the capability step for new limits, keeping everything else.
    pub fn set_limits(&mut self, limits: SpecLimits) {
        self.limits = limits;
        self.capability =
            capability_after_gate(&self.dataset, self.source.signal(), limits, &self.normality);
    }
}

/// Load `source` and run every analysis step on it.
pub fn run_analysis(source: &SourceReference, limits: SpecLimits) -> AnalysisRun {
    let (dataset, load_failure) = match try_load(source) {
        Ok(dataset) => (dataset, None),
        Err(failure) => {
            warn!("{failure}");
            (Dataset::empty(), Some(failure))
        }
    };
    analyze_dataset(source.clone(), limits, dataset, load_failure)
}

/// Run the analysis steps on an already loaded dataset.
///
/// `load_failure` is kept as-is; pass `None` for datasets that did not come
/// from a file (e.g. generated samples).
pub fn analyze_dataset(
    source: SourceReference,
    limits: SpecLimits,
    dataset: Dataset,
    load_failure: Option<LoadFailure>,
) -> AnalysisRun {
    let signal = source.signal();
    let normality = assess_normality(&dataset, signal);
    let capability = capability_after_gate(&dataset, signal, limits, &normality);
    let figure = build_graph(&dataset, signal);

    AnalysisRun {
        source,
        limits,
        load_failure,
        dataset,
        normality,
        capability,
        figure,
    }
}

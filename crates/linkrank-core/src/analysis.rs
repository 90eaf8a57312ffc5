//! Ratio scoring and distribution statistics.
//!
//! One pass over the accumulator derives, per target, counts and percentages
//! for both populations plus the sample/control ratio, then the mean and
//! population standard deviation of the full ratio distribution. Everything
//! here is recomputed from scratch on each run; nothing is updated
//! incrementally.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::errors::LinkerError;
use crate::intern::EntityId;
use crate::linker::Linker;

/// Derived per-target record: counts, population shares, and skew ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetAnalysis {
    /// Distinct sample sources linked to this target.
    pub sample_count: u64,
    /// Distinct control sources linked to this target.
    pub control_count: u64,
    /// Share of the globally observed sample population linked to this
    /// target (0 when no sample member was ever observed).
    pub sample_percent: f64,
    /// Share of the control population linked to this target, against the
    /// configured `control_size` when set, else the observed control count.
    pub control_percent: f64,
    /// `sample_percent / control_percent`, with the artificial-minimum
    /// fallback when the target has no control observations.
    pub ratio: f64,
}

/// Output of one `analyze()` pass.
#[derive(Debug, Clone)]
pub(crate) struct AnalysisState {
    pub(crate) per_target: HashMap<EntityId, TargetAnalysis>,
    pub(crate) mean: f64,
    pub(crate) stdev: f64,
}

pub(crate) fn run(linker: &Linker) -> Result<AnalysisState, LinkerError> {
    if linker.relationships.is_empty() {
        return Err(LinkerError::EmptyDataset);
    }

    let total_sample = linker.observed_sample_count();
    // An explicit control population size takes precedence over the
    // observed count (e.g. "we monitor 10_000 hosts, we saw 37").
    let total_control = if linker.config.control_size > 0 {
        linker.config.control_size
    } else {
        linker.observed_control_count()
    };

    let mut per_target = HashMap::with_capacity(linker.relationships.len());
    for (&target, record) in &linker.relationships {
        let sample_count = record.sample_sources.len();
        let control_count = record.control_sources.len();

        let sample_percent = percent_of(sample_count, total_sample);
        let control_percent = percent_of(control_count, total_control);
        let ratio = score_ratio(
            sample_percent,
            control_percent,
            total_control,
            linker.config.minimum_control_observations,
        );

        per_target.insert(
            target,
            TargetAnalysis {
                sample_count,
                control_count,
                sample_percent,
                control_percent,
                ratio,
            },
        );
    }

    let ratios: Vec<f64> = per_target.values().map(|a| a.ratio).collect();
    let mean = mean(&ratios);
    let stdev = pstdev(&ratios, mean);

    debug!(
        targets = per_target.len(),
        total_sample, total_control, mean, stdev, "analysis pass complete"
    );

    Ok(AnalysisState {
        per_target,
        mean,
        stdev,
    })
}

fn percent_of(count: u64, total: u64) -> f64 {
    if total > 0 {
        count as f64 / total as f64
    } else {
        0.0
    }
}

/// Sample/control skew of one target.
///
/// A target with zero observed control relationships but a nonzero control
/// population would make the naive ratio undefined or infinite. Instead the
/// engine assumes a hypothetical minimum of `minimum_control_observations`
/// control observations, producing a finite, conservative ratio that still
/// signals strong sample skew. With a minimum of 0 the artificial percentage
/// is 0 as well and the ratio collapses to 0 rather than dividing by zero.
fn score_ratio(
    sample_percent: f64,
    control_percent: f64,
    total_control: u64,
    minimum_control_observations: f64,
) -> f64 {
    if control_percent > 0.0 {
        sample_percent / control_percent
    } else if total_control > 0 {
        let artificial_control_percent = minimum_control_observations / total_control as f64;
        if artificial_control_percent > 0.0 {
            sample_percent / artificial_control_percent
        } else {
            0.0
        }
    } else {
        0.0
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divide by N, not N-1).
///
/// Zero spread must come out as exactly 0.0 so the z-score sentinel
/// triggers; naive f64 summation can report a nonzero deviation for a list
/// of identical values (the mean of three 0.1s is not 0.1).
fn pstdev(values: &[f64], mean: f64) -> f64 {
    if values.windows(2).all(|pair| pair[0] == pair[1]) {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

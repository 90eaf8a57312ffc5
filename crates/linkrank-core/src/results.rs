//! Ranked, serializable result records.
//!
//! `results()` turns the analysis state into a finite, restartable sequence:
//! a freshly sorted `Vec` on every call, ordered by descending ratio with
//! ties broken by target identifier ascending. The JSON schema composes the
//! population field names from the configured labels, so a linker built with
//! labels `("infected", "clean")` emits `infected_count`, `infected_percent`,
//! `clean_count`, `clean_percent`.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::LinkerError;
use crate::linker::Linker;

/// One ranked target.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetScore {
    /// Target identifier.
    pub target: String,
    /// Sample/control skew ratio.
    pub ratio: f64,
    /// Z-score of `ratio` against the whole ratio distribution; `None`
    /// (serialized as `null`) when the population standard deviation is
    /// exactly zero, never a division by zero.
    pub deviations_from_mean: Option<f64>,
    /// Distinct sample sources linked to this target.
    pub sample_count: u64,
    /// Share of the observed sample population linked to this target.
    pub sample_percent: f64,
    /// Distinct control sources linked to this target.
    pub control_count: u64,
    /// Share of the control population linked to this target.
    pub control_percent: f64,
    /// Configured sample label, composing the serialized field names.
    pub sample_label: String,
    /// Configured control label, composing the serialized field names.
    pub control_label: String,
}

impl Serialize for TargetScore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(7))?;
        map.serialize_entry("target", &self.target)?;
        map.serialize_entry("ratio", &self.ratio)?;
        map.serialize_entry("deviations_from_mean", &self.deviations_from_mean)?;
        map.serialize_entry(&format!("{}_count", self.sample_label), &self.sample_count)?;
        map.serialize_entry(
            &format!("{}_percent", self.sample_label),
            &self.sample_percent,
        )?;
        map.serialize_entry(
            &format!("{}_count", self.control_label),
            &self.control_count,
        )?;
        map.serialize_entry(
            &format!("{}_percent", self.control_label),
            &self.control_percent,
        )?;
        map.end()
    }
}

impl Linker {
    /// Ranked results of the last `analyze()` run.
    ///
    /// Sorted by descending ratio; equal ratios are ordered by target
    /// identifier ascending so the sequence is deterministic. Each call
    /// rebuilds the sequence, so callers may enumerate it any number of
    /// times. Fails with [`LinkerError::UninitializedState`] before the
    /// first `analyze()`.
    pub fn results(&self) -> Result<Vec<TargetScore>, LinkerError> {
        let analysis = self
            .analysis
            .as_ref()
            .ok_or(LinkerError::UninitializedState)?;

        let mut scores: Vec<TargetScore> = analysis
            .per_target
            .iter()
            .map(|(&target_id, record)| {
                let deviations_from_mean = if analysis.stdev != 0.0 {
                    Some((record.ratio - analysis.mean) / analysis.stdev)
                } else {
                    None
                };
                TargetScore {
                    target: self
                        .interner
                        .lookup(target_id)
                        .unwrap_or_default()
                        .to_string(),
                    ratio: record.ratio,
                    deviations_from_mean,
                    sample_count: record.sample_count,
                    sample_percent: record.sample_percent,
                    control_count: record.control_count,
                    control_percent: record.control_percent,
                    sample_label: self.config.sample_label.clone(),
                    control_label: self.config.control_label.clone(),
                }
            })
            .collect();

        scores.sort_by(|a, b| {
            b.ratio
                .total_cmp(&a.ratio)
                .then_with(|| a.target.cmp(&b.target))
        });

        Ok(scores)
    }
}

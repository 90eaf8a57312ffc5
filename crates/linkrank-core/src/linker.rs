//! Configuration, population labeling, and relationship accumulation.
//!
//! The `Linker` owns all engine state: the label set, the per-target source
//! sets, the globally observed sample/control sets, and (after `analyze()`)
//! the derived analysis state. There is no module-level or shared state; a
//! single `&mut self`-driven instance carries the whole label → link →
//! analyze lifecycle.

use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::analysis::{self, AnalysisState, TargetAnalysis};
use crate::errors::LinkerError;
use crate::intern::{EntityId, EntityInterner};

/// Which population a relationship source belongs to.
///
/// Resolved once, at link time: an unlabeled source is control (closed-world
/// default; there is no explicit control-labeling call). The classification
/// of a source is frozen at its first observation and never changes, even if
/// the source is labeled afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Population {
    Sample,
    Control,
}

/// Engine configuration, fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Name of the sample population; composes output field names
    /// (`<sample_label>_count`, `<sample_label>_percent`).
    pub sample_label: String,
    /// Name of the control population; composes output field names.
    pub control_label: String,
    /// Hypothetical minimum number of control observations assumed for a
    /// target that has none, keeping its ratio finite. Must be finite and
    /// non-negative.
    pub minimum_control_observations: f64,
    /// Explicit control population size; 0 means "use the observed count".
    pub control_size: u64,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            sample_label: "sample".to_string(),
            control_label: "control".to_string(),
            minimum_control_observations: 1.0,
            control_size: 0,
        }
    }
}

/// Per-target record: the distinct sources that linked to it, split by
/// population. Append-only; a source never leaves a bucket.
#[derive(Debug, Default, Clone)]
pub(crate) struct TargetRecord {
    pub(crate) sample_sources: RoaringBitmap,
    pub(crate) control_sources: RoaringBitmap,
}

/// The ranking engine. See the crate docs for the three-phase lifecycle.
///
/// Single-threaded by design: label/link mutate the accumulator, analyze
/// rebuilds the analysis state from scratch, results read it. Callers in a
/// threaded environment must serialize all label/link calls before any
/// analyze/results call.
#[derive(Debug, Clone)]
pub struct Linker {
    pub(crate) config: LinkerConfig,
    pub(crate) interner: EntityInterner,
    /// Explicitly labeled sample members (labeling is independent of
    /// observation: a labeled entity may never appear in a link).
    sample_population: RoaringBitmap,
    /// Distinct sources ever observed, classified sample at link time.
    pub(crate) observed_samples: RoaringBitmap,
    /// Distinct sources ever observed, classified control at link time.
    pub(crate) observed_controls: RoaringBitmap,
    /// Target records, created lazily on first relationship.
    pub(crate) relationships: HashMap<EntityId, TargetRecord>,
    /// Rebuilt in full by every `analyze()`; `None` before the first run.
    pub(crate) analysis: Option<AnalysisState>,
}

impl Default for Linker {
    fn default() -> Self {
        // The default configuration is always valid.
        Self::with_config(LinkerConfig::default())
    }
}

impl Linker {
    /// Create an engine, validating the configuration.
    pub fn new(config: LinkerConfig) -> Result<Self, LinkerError> {
        if !config.minimum_control_observations.is_finite() {
            return Err(LinkerError::InvalidConfiguration(format!(
                "minimum_control_observations must be finite, got {}",
                config.minimum_control_observations
            )));
        }
        if config.minimum_control_observations < 0.0 {
            return Err(LinkerError::InvalidConfiguration(format!(
                "minimum_control_observations must be non-negative, got {}",
                config.minimum_control_observations
            )));
        }
        Ok(Self::with_config(config))
    }

    /// Create an engine with custom population labels and default numeric
    /// configuration.
    pub fn with_labels(sample_label: &str, control_label: &str) -> Self {
        Self::with_config(LinkerConfig {
            sample_label: sample_label.to_string(),
            control_label: control_label.to_string(),
            ..LinkerConfig::default()
        })
    }

    fn with_config(config: LinkerConfig) -> Self {
        Self {
            config,
            interner: EntityInterner::new(),
            sample_population: RoaringBitmap::new(),
            observed_samples: RoaringBitmap::new(),
            observed_controls: RoaringBitmap::new(),
            relationships: HashMap::new(),
            analysis: None,
        }
    }

    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    // ========================================================================
    // Label phase
    // ========================================================================

    /// Designate an entity as part of the sample population. Idempotent.
    ///
    /// Everything never labeled is implicitly control. Labeling an entity
    /// *after* it has already appeared as a relationship source does not
    /// reclassify anything: classification is frozen at the source's first
    /// observation (see [`Population`]).
    pub fn label(&mut self, entity: &str) {
        let id = self.interner.intern(entity);
        self.sample_population.insert(id.raw());
    }

    /// Whether an entity was explicitly labeled as sample.
    pub fn is_sample(&self, entity: &str) -> bool {
        self.interner
            .id_of(entity)
            .map(|id| self.sample_population.contains(id.raw()))
            .unwrap_or(false)
    }

    /// Resolve the population of a source ID at link time.
    ///
    /// Previously observed sources keep their original classification; fresh
    /// sources are classified by the current label set.
    fn classify(&self, source: EntityId) -> Population {
        if self.observed_samples.contains(source.raw()) {
            Population::Sample
        } else if self.observed_controls.contains(source.raw()) {
            Population::Control
        } else if self.sample_population.contains(source.raw()) {
            Population::Sample
        } else {
            Population::Control
        }
    }

    // ========================================================================
    // Accumulation phase
    // ========================================================================

    /// Record a directed relationship from `source` to `target`.
    ///
    /// Lazily creates the target record, classifies the source, and adds it
    /// to the target's population bucket and to the global observed set.
    /// Sets, not multisets: resubmitting an edge changes nothing. Self-links
    /// are legal and not special-cased. Never fails; identifiers are opaque
    /// and never validated.
    pub fn link(&mut self, source: &str, target: &str) {
        let source_id = self.interner.intern(source);
        let target_id = self.interner.intern(target);
        let population = self.classify(source_id);

        let record = self.relationships.entry(target_id).or_default();
        match population {
            Population::Sample => {
                record.sample_sources.insert(source_id.raw());
                self.observed_samples.insert(source_id.raw());
            }
            Population::Control => {
                record.control_sources.insert(source_id.raw());
                self.observed_controls.insert(source_id.raw());
            }
        }

        debug!(source, target, ?population, "recorded relationship");
    }

    // ========================================================================
    // Queries (pure, valid at any time)
    // ========================================================================

    /// Number of distinct targets seen so far.
    pub fn observed_target_count(&self) -> usize {
        self.relationships.len()
    }

    /// Number of distinct sources observed and classified sample.
    pub fn observed_sample_count(&self) -> u64 {
        self.observed_samples.len()
    }

    /// Number of distinct sources observed and classified control.
    pub fn observed_control_count(&self) -> u64 {
        self.observed_controls.len()
    }

    /// Observed sample-classified sources, in first-observation order.
    pub fn samples(&self) -> Vec<String> {
        self.resolve_all(&self.observed_samples)
    }

    /// Observed control-classified sources, in first-observation order.
    pub fn controls(&self) -> Vec<String> {
        self.resolve_all(&self.observed_controls)
    }

    fn resolve_all(&self, ids: &RoaringBitmap) -> Vec<String> {
        ids.iter()
            .filter_map(|raw| self.interner.lookup(EntityId::new(raw)))
            .map(str::to_string)
            .collect()
    }

    // ========================================================================
    // Analysis phase
    // ========================================================================

    /// Score every target and the global ratio distribution.
    ///
    /// Rebuilds the whole analysis state from the accumulator; there is no
    /// incremental re-analysis, so re-running with a quiescent accumulator
    /// produces identical results. Fails with
    /// [`LinkerError::EmptyDataset`] when no relationship was ever linked.
    pub fn analyze(&mut self) -> Result<(), LinkerError> {
        let state = analysis::run(self)?;
        self.analysis = Some(state);
        Ok(())
    }

    /// Analysis record of a single target, if `analyze()` has run and the
    /// target was ever linked.
    pub fn target_analysis(&self, target: &str) -> Option<&TargetAnalysis> {
        let analysis = self.analysis.as_ref()?;
        let id = self.interner.id_of(target)?;
        analysis.per_target.get(&id)
    }

    /// Arithmetic mean of the per-target ratios from the last `analyze()`.
    pub fn ratio_mean(&self) -> Option<f64> {
        self.analysis.as_ref().map(|a| a.mean)
    }

    /// Population standard deviation (÷N) of the per-target ratios from the
    /// last `analyze()`.
    pub fn ratio_stdev(&self) -> Option<f64> {
        self.analysis.as_ref().map(|a| a.stdev)
    }
}

//! Linkrank: guilt-by-association target ranking.
//!
//! Given a small set of known-interesting entities (the **sample** population,
//! e.g. infected hosts) and a background population (the **control**, everything
//! not labeled), rank the targets of observed source→target relationship events
//! by how much more often sample members touch them than control members.
//!
//! The engine runs three phases strictly in sequence:
//!
//! 1. **Label**: declare which entity identifiers belong to the sample.
//! 2. **Link**: submit relationship edges; each source is classified as
//!    sample or control at link time.
//! 3. **Analyze**: one pass computes per-target counts, percentages, a
//!    sample/control ratio (with a parameterized fallback when the control
//!    side is empty), and a mean/stdev normalization of the ratio
//!    distribution.
//!
//! Entity identifiers are opaque strings at the API boundary; internally they
//! are interned to dense `u32` IDs so population sets are Roaring bitmaps.
//!
//! ## Module Organization
//!
//! - `intern`: entity identifier interning
//! - `linker`: configuration, labeling, relationship accumulation
//! - `analysis`: ratio scoring + distribution statistics
//! - `results`: ranked, serializable result records
//! - `errors`: typed error conditions

pub mod analysis;
pub mod errors;
pub mod intern;
pub mod linker;
pub mod results;

pub use analysis::TargetAnalysis;
pub use errors::LinkerError;
pub use intern::{EntityId, EntityInterner};
pub use linker::{Linker, LinkerConfig, Population};
pub use results::TargetScore;

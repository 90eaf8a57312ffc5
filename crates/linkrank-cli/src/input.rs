//! Input document for `linkrank analyze`.
//!
//! A flat JSON document: the sample population plus the observed edges.
//! Identifiers are opaque strings; nothing is validated beyond JSON shape.
//!
//! ```json
//! {
//!   "sample": ["10.0.0.1", "10.0.0.2"],
//!   "links": [["10.0.0.1", "6.6.6.6"], ["10.0.0.3", "8.8.8.8"]]
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisInput {
    /// Entity identifiers labeled as the sample population.
    #[serde(default)]
    pub sample: Vec<String>,
    /// Directed relationship edges as `[source, target]` pairs.
    #[serde(default)]
    pub links: Vec<(String, String)>,
}

impl AnalysisInput {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing analysis input document")
    }
}

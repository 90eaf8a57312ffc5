//! Error conditions of the ranking engine.
//!
//! The engine has few failure modes: identifiers are caller-opaque and never
//! validated, so only the analysis lifecycle and the configuration can fail.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkerError {
    /// `analyze()` ran over an accumulator with no targets; the ratio
    /// distribution would be empty.
    #[error("no relationships accumulated: nothing to analyze")]
    EmptyDataset,

    /// Results were requested before `analyze()` produced analysis state.
    #[error("analysis has not run: call analyze() before reading results")]
    UninitializedState,

    /// Rejected at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

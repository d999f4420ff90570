//! Error type for the fallible surface of the crate.
//!
//! The simulation itself never returns errors: malformed queries yield empty results,
//! numerical degeneracies are no-ops and staging bugs panic. Only loading and saving
//! settings can fail.

use thiserror::Error;

/// Errors raised while loading, validating or saving [`crate::SimSettings`].
#[derive(Debug, Error)]
pub enum LostError {
    /// I/O error while reading/writing a settings file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Settings JSON could not be parsed or produced.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// A setting is out of its valid range.
    #[error("invalid setting `{field}`: {reason}")]
    InvalidSettings {
        /// Name of the offending field
        field: &'static str,
        /// Human readable constraint that was violated
        reason: String,
    },
    /// An index kind name that is neither `insertion` nor `median`.
    #[error("unknown index kind `{0}`")]
    UnknownIndexKind(String),
}

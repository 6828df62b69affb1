//! Crate-wide error type
//!
//! Precondition violations are rejected before any computation starts.
//! Numerical problems (NaN, overflow) are never reported here, they propagate
//! through the state and are only surfaced by the advisory diagnostics.

use thiserror::Error;

/// Crate-wide result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Two inputs that must describe the same number of bodies disagree
    #[error("shape mismatch for {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Invalid user or API parameter
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Scenario file could not be parsed
    #[error("invalid scenario file: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to write frame: {0}")]
    Image(#[from] image::ImageError),
}

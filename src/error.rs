//! Engine error kinds
//!
//! Three failure classes cross the library boundary. Timeouts are not an
//! error: the evolution loop reports `timeout` as a stopping reason and the
//! response still carries the best individuals found.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed request; surfaced synchronously as a 400-class failure.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Catalogue or compatibility data unavailable or inconsistent.
    /// Startup-fatal; request-fatal if first observed during a request.
    #[error("catalogue error: {0}")]
    Catalogue(String),

    /// A metric invariant was violated (score outside [0, 1], weight row not
    /// summing to 1). Indicates an internal bug, 500-class.
    #[error("evaluation error: {0}")]
    Evaluation(String),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn catalogue(msg: impl Into<String>) -> Self {
        Self::Catalogue(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }
}

//! Error types shared by the collaborator contracts

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors surfaced by collaborators through the core contracts
#[derive(Error, Debug)]
pub enum CoreError {
    /// The collective spike exchange failed
    #[error("spike exchange failed: {reason}")]
    Exchange {
        /// Reason reported by the communicator
        reason: String,
    },

    /// A cell group failed to advance
    #[error("cell group failure: {reason}")]
    CellGroup {
        /// Reason reported by the group integrator
        reason: String,
    },

    /// A schedule was constructed with invalid parameters
    #[error("invalid schedule: {reason}")]
    InvalidSchedule {
        /// Constraint that was violated
        reason: String,
    },
}

impl CoreError {
    /// Create an exchange failure
    pub fn exchange(reason: impl Into<String>) -> Self {
        Self::Exchange {
            reason: reason.into(),
        }
    }

    /// Create a cell group failure
    pub fn cell_group(reason: impl Into<String>) -> Self {
        Self::CellGroup {
            reason: reason.into(),
        }
    }

    /// Create an invalid schedule error
    pub fn invalid_schedule(reason: impl Into<String>) -> Self {
        Self::InvalidSchedule {
            reason: reason.into(),
        }
    }
}

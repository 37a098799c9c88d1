//! Error types for the simulation driver

use spindle_core::CoreError;
use thiserror::Error;

/// Result type for driver operations
pub type Result<T> = std::result::Result<T, SimulationError>;

/// Errors that can occur while driving a simulation
#[derive(Error, Debug)]
pub enum SimulationError {
    /// `run` was called with a non-positive timestep
    #[error("finite positive timestep required, got {dt_ns}ns")]
    InvalidTimestep {
        /// The offending timestep in nanoseconds
        dt_ns: u64,
    },

    /// An injected event predates the current simulation time
    #[error("event time {time_ns}ns is before the current epoch end {horizon_ns}ns")]
    BadEventTime {
        /// Requested delivery time in nanoseconds
        time_ns: u64,
        /// End of the last completed epoch in nanoseconds
        horizon_ns: u64,
    },

    /// The simulation was assembled from inconsistent parts
    #[error("invalid simulation configuration: {reason}")]
    InvalidConfiguration {
        /// Constraint that was violated
        reason: String,
    },

    /// The worker thread pool could not be constructed
    #[error("task pool construction failed: {reason}")]
    TaskPool {
        /// Reason reported by the pool builder
        reason: String,
    },

    /// A collaborator failed through one of the core contracts
    #[error("{source}")]
    Core {
        /// The underlying contract failure
        #[from]
        source: CoreError,
    },
}

impl SimulationError {
    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create a task pool error
    pub fn task_pool(reason: impl Into<String>) -> Self {
        Self::TaskPool {
            reason: reason.into(),
        }
    }
}

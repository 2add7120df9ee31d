use thiserror::Error;

/// Benchmark error types covering configuration, phase sequencing, and platform setup.
///
/// Validation mismatches are counted and reported, never raised.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BenchError {
    /// Configuration or initialization error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Register bus could not be opened or mapped.
    #[error("register bus error: {0}")]
    Bus(String),

    /// The register blocks were already handed out to another owner.
    #[error("peripherals already taken")]
    PeripheralsTaken,

    /// A benchmark phase was invoked out of order.
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Source state.
        from: String,
        /// Attempted target state.
        to: String,
    },
}

/// Convenience type alias for benchmark operations.
pub type BenchResult<T> = Result<T, BenchError>;

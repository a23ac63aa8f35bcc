//! Simulator errors.

use lorasim_types::InvalidArgument;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the simulator.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// A configuration value was rejected before the run started.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    /// An output file could not be created or written.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be serialized.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

//! Error module for the cluster SNN library.
use std::error::Error;
use std::fmt;

use crate::core::scheduler::Phase;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum SNNError {
    /// Error for incompatible topology, e.g., a weight matrix or an input row whose size does not fit the layer.
    IncompatibleTopology(String),
    /// Error for invalid parameters, e.g., a non-positive time constant or an empty layer.
    InvalidParameters(String),
    /// Error for phases executed out of order.
    InvalidPhaseTransition { from: Phase, to: Phase },
    /// Error for out of bounds access, e.g., layer or timestep not found.
    OutOfBounds(String),
    /// Error while acquiring the worker pool.
    WorkerPool(String),
    /// Error for I/O operations, including (de)serialization.
    IOError(String),
}

impl fmt::Display for SNNError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SNNError::IncompatibleTopology(e) => write!(f, "Incompatible topology: {}", e),
            SNNError::InvalidParameters(e) => write!(f, "Invalid parameters: {}", e),
            SNNError::InvalidPhaseTransition { from, to } => {
                write!(f, "Invalid phase transition: {:?} cannot be followed by {:?}", from, to)
            }
            SNNError::OutOfBounds(e) => write!(f, "Index out of bounds: {}", e),
            SNNError::WorkerPool(e) => write!(f, "Worker pool error: {}", e),
            SNNError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for SNNError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            SNNError::IncompatibleTopology("layer 1 expects 4 inputs".to_string()).to_string(),
            "Incompatible topology: layer 1 expects 4 inputs"
        );
        assert_eq!(
            SNNError::InvalidPhaseTransition {
                from: Phase::Idle,
                to: Phase::Integrate
            }
            .to_string(),
            "Invalid phase transition: Idle cannot be followed by Integrate"
        );
    }
}

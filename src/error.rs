use crate::mental::PerceivedObject;
use crate::parameters::ParameterType;
use thiserror::Error;

/// An error raised while computing the perception or mental state of a vehicle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A task demand passed to the attention matrix is outside `[0, 1)`.
    #[error("task demand {value} of channel {index} is outside [0, 1)")]
    InvalidDemand { index: usize, value: f64 },
    /// A parameter required by a task is not set.
    #[error("parameter {0} is not set")]
    MissingParameter(ParameterType),
    /// A parameter value violates its constraint.
    #[error("parameter {parameter} cannot take value {value}")]
    InvalidParameter { parameter: ParameterType, value: f64 },
    /// Perception data the update relies on is not available.
    #[error("perception of {0} is not available")]
    MissingPerception(&'static str),
    /// The object was not assigned a channel in the last update.
    #[error("no channel is mapped for {0:?}")]
    UnmappedObject(PerceivedObject),
    /// The eigen-decomposition of the attention matrix did not converge.
    #[error("eigen-decomposition of the attention matrix did not converge")]
    NonConvergence,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

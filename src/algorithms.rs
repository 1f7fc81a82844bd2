use std::fmt;

mod k_means;

pub use k_means::KMeans;
pub use k_means::Metadata as KMeansMetadata;

/// Common errors thrown by algorithms and plotting routines.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Asked for zero parts.
    NoParts,

    /// There are less points than requested parts.
    NotEnoughPoints { parts: usize, points: usize },

    /// Input sets don't have matching lengths.
    InputLenMismatch { expected: usize, actual: usize },

    /// A part ID is not lower than the number of parts.
    UnknownPart { part: usize, part_count: usize },

    /// Input contains NaN or infinite values.
    NonFinite,

    /// A mixture model without any component.
    EmptyModel,

    /// Mixture weights are negative, or their sum is not one.
    InvalidWeights,

    /// The covariance of the given component is not symmetric positive
    /// semi-definite.
    InvalidCovariance { component: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoParts => write!(f, "expected at least one part"),
            Error::NotEnoughPoints { parts, points } => write!(
                f,
                "not enough points to make {parts} parts (got {points} points)",
            ),
            Error::InputLenMismatch { expected, actual } => write!(
                f,
                "input sets don't have the same length (expected {expected} items, got {actual})",
            ),
            Error::UnknownPart { part, part_count } => write!(
                f,
                "part ID {part} is out of range (expected less than {part_count})",
            ),
            Error::NonFinite => write!(f, "input contains NaN or infinite values"),
            Error::EmptyModel => write!(f, "mixture model has no component"),
            Error::InvalidWeights => write!(
                f,
                "mixture weights must be non-negative and sum to one",
            ),
            Error::InvalidCovariance { component } => write!(
                f,
                "covariance of component {component} is not symmetric positive semi-definite",
            ),
        }
    }
}

impl std::error::Error for Error {}

//! Error types for the transect library.

use thiserror::Error;

/// Errors that can occur while reading or resampling a survey.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// IO error when reading input files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A data line could not be parsed into a survey record.
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// The survey lacks the anchor records needed to derive step vectors.
    #[error("cannot derive survey geometry: {0}")]
    MissingAnchors(&'static str),

    /// A query region held fewer points than the interpolator requires.
    ///
    /// The partition or index is responsible for guaranteeing at least
    /// `required` reachable points per query, so this indicates a defect in
    /// the setup phase, not bad input.
    #[error("query reached only {available} of {required} required candidate points")]
    InsufficientCandidates { available: usize, required: usize },

    /// Every interpolation weight underflowed to zero and the decay scale
    /// could not be relaxed any further.
    #[error("interpolation weights underflowed to zero (final scale {scale:e})")]
    InterpolationUnderflow { scale: f64 },

    /// An extraction parameter is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias using [`ExtractError`].
pub type Result<T> = std::result::Result<T, ExtractError>;

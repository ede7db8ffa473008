use primitive_types::H160;
use rand::distributions::WeightedError;

/// Errors raised while configuring or building a [`Template`](crate::Template).
///
/// All variants describe misconfiguration; none of them is raised while filling an already built
/// template.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A weighted selector was built without candidates.
    #[error("weighted selection requires at least one candidate")]
    NoCandidates,
    /// A weighted selector was built with weights that are all zero.
    #[error("at least one selection weight must be positive")]
    AllWeightsZero,
    /// Weights were rejected for another reason, e.g. there were too many of them.
    #[error("invalid selection weights: {0}")]
    InvalidWeights(WeightedError),
    /// A code generator was requested by a name that is not registered.
    #[error("unknown code generator `{0}`")]
    UnknownGenerator(String),
    /// Two code generators were registered under the same name.
    #[error("code generator `{0}` is registered more than once")]
    DuplicateGenerator(String),
    /// A configured range has its minimum above its maximum.
    #[error("`{key}`: minimum {min} exceeds maximum {max}")]
    InvalidRange {
        /// Configuration key of the range.
        key: &'static str,
        /// Configured minimum.
        min: u64,
        /// Configured maximum.
        max: u64,
    },
    /// A string could not be parsed as a 20-byte address.
    #[error("invalid address `{0}`")]
    InvalidAddress(String),
    /// A string could not be parsed as a 32-byte hash.
    #[error("invalid 32-byte hash `{0}`")]
    InvalidHash(String),
    /// An address was listed under more than one taxonomy category.
    #[error("address {0:#x} is listed under more than one category")]
    OverlappingTaxonomy(H160),
    /// Configuration sources could not be merged or extracted.
    #[error("cannot load configuration: {0}")]
    Config(Box<figment::Error>),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl From<WeightedError> for Error {
    fn from(err: WeightedError) -> Self {
        match err {
            WeightedError::NoItem => Self::NoCandidates,
            WeightedError::AllWeightsZero => Self::AllWeightsZero,
            other => Self::InvalidWeights(other),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

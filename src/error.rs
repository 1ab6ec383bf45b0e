use std::io;

/// Crate-wide error taxonomy. Anything raised during configuration or setup
/// is fatal to the run; probe failures inside a scanner worker never surface
/// here and instead degrade to missing evidence.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid domain name (expected {expected}, found {found})")]
    InvalidDomain { expected: String, found: String },

    #[error("invalid argument: {0}")]
    Argument(String),

    #[error("initialisation failure: {0}")]
    Init(String),

    #[error("selected fuzzing algorithms do not generate any permutations for provided input domain")]
    PermutationEmpty,

    #[error("network error: {0}")]
    Network(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

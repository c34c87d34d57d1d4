use thiserror::Error;

use crate::param::ParamDomainError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unparsable token")]
    UnparsableToken,
    #[error("Unknown function: {id:?}")]
    UnknownFunction { id: String },
    #[error("Malformed encoding of the {field}: {source}")]
    MalformedEncoding {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },
    #[error(transparent)]
    InvalidParameterValue(#[from] InvalidParameterError),
    #[error("Required parameter `{label}` is missing")]
    MissingParameter { label: &'static str },
    #[error("Salt already set")]
    SaltAlreadySet,
    #[error("Salt is required")]
    SaltRequired,
    #[error("Token has no salt or no hash to verify against")]
    IncompleteToken,
    #[error("Hash must not be empty")]
    EmptyHash,
    #[error("Invalid length of `{label}`: expected {expected} bytes, got {actual}")]
    InvalidLength {
        label: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Argon2: {0}")]
    Argon2(#[from] argon2::Error),
    #[error("Scrypt: {0}")]
    ScryptParams(#[from] scrypt::errors::InvalidParams),
    #[error("Scrypt: {0}")]
    ScryptOutputLength(#[from] scrypt::errors::InvalidOutputLen),
}

#[derive(Error, Debug)]
#[error("Invalid parameter `{label}`: {source}")]
pub struct InvalidParameterError {
    pub label: &'static str,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl InvalidParameterError {
    pub fn new(label: &'static str, source: ParamDomainError) -> Self {
        Self {
            label,
            source: Box::new(source),
        }
    }
}

pub trait OptionExt<T> {
    /// Turns an absent required parameter into [`Error::MissingParameter`].
    fn require_parameter(self, label: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn require_parameter(self, label: &'static str) -> Result<T> {
        self.ok_or(Error::MissingParameter { label })
    }
}

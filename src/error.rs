use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RsaPssError {
    #[error("The path {0} not exist")]
    PathNotExist(String),

    #[error("{0}")]
    JsonParseFailed(String),

    #[error("Invalid hex integer `{0}`")]
    InvalidHexInteger(String),

    #[error("The key file doesn't contain the private exponent `d`")]
    NotPrivateKey,

    #[error("Invalid hex signature, {0}")]
    InvalidSignature(String),
}

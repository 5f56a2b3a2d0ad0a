use std::path::PathBuf;

use thiserror::Error;

pub type NetResult<T> = Result<T, NetError>;

#[derive(Debug, Error)]
pub enum NetError {
    /// A setting is missing a usable value
    #[error("Configuration error, key `{key}`: {reason}")]
    Configuration { key: String, reason: String },

    #[error("Malformed configuration: {0}")]
    ConfigFormat(#[from] serde_yaml::Error),

    /// Vector length or layer chain inconsistency
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Unknown activation function: {0}")]
    UnknownActivation(String),

    #[error("Parameter file {}: {reason}", .path.display())]
    ParameterIo { path: PathBuf, reason: String },

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Network output has no defined maximum")]
    UndefinedOutput,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl NetError {
    pub fn config(key: &str, reason: impl Into<String>) -> Self {
        NetError::Configuration {
            key: key.to_owned(),
            reason: reason.into(),
        }
    }

    pub fn param_io(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        NetError::ParameterIo {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

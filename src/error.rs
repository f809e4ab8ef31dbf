use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocError>;

/// Crate-wide error type for the document/graph layer.
#[derive(Debug, Error)]
pub enum DocError {
    /// Document data failed structural validation; nothing was imported.
    #[error("validation failed at {path}: {message}")]
    Validation { path: String, message: String },

    /// A caller violated a precondition. Fatal for the triggering action.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// An asset failed to load. Recoverable; logged at the update boundary.
    #[error("failed to load '{uri}': {message}")]
    Load { uri: String, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocError {
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        DocError::Validation {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        DocError::Precondition(message.into())
    }

    pub fn load(uri: impl Into<String>, message: impl Into<String>) -> Self {
        DocError::Load {
            uri: uri.into(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for DocError {
    fn from(err: reqwest::Error) -> Self {
        DocError::Network(err.to_string())
    }
}

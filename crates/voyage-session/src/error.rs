use http::StatusCode;
use thiserror::Error;

/// Failure of a single storage or cookie operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage operation failed: {0}")]
    Operation(String),
}

/// The request never produced an HTTP response.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Everything a caller of the API client can see go wrong.
///
/// Only `Unauthorized` goes through the cleanup path; every other variant is
/// meant to be surfaced to the user with [`ApiError::user_message`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("backend url is not configured")]
    NotConfigured,

    #[error("{0}")]
    Network(String),

    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("forbidden: {message}")]
    Forbidden { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("server error ({status}): {message}")]
    Server { status: StatusCode, message: String },

    #[error("request failed ({status}): {message}")]
    Status { status: StatusCode, message: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Classifies a non-success status. `message` is the best-effort text
    /// pulled from the response body, `None` falls back to the status reason.
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
        });

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized { message },
            StatusCode::FORBIDDEN => ApiError::Forbidden { message },
            StatusCode::NOT_FOUND => ApiError::NotFound { message },
            s if s.is_server_error() => ApiError::Server { status, message },
            _ => ApiError::Status { status, message },
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ApiError::Forbidden { .. } => Some(StatusCode::FORBIDDEN),
            ApiError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            ApiError::Server { status, .. } | ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Text suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::Forbidden { message }
            | ApiError::NotFound { message }
            | ApiError::Server { message, .. }
            | ApiError::Status { message, .. } => message.clone(),
            ApiError::Network(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::InvalidRequest(message) => ApiError::InvalidRequest(message),
            other => ApiError::Network(other.to_string()),
        }
    }
}

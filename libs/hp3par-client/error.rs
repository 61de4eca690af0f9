//! Error types and HTTP status classification

use crate::body::ResponseBody;
use crate::config::ConfigError;
use crate::transport::TransportError;
use thiserror::Error;

/// Diagnostic payload attached to every protocol-level failure
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFailure {
    /// HTTP status code returned by the array
    pub status: u16,
    /// Request path relative to the API base URL
    pub path: String,
    /// Parsed response body, if any
    pub body: ResponseBody,
}

impl ApiFailure {
    pub fn new(status: u16, path: impl Into<String>, body: ResponseBody) -> Self {
        Self {
            status,
            path: path.into(),
            body,
        }
    }

    /// Array-specific error code (`code` field of a JSON error body)
    pub fn code(&self) -> Option<i64> {
        self.body.get("code").and_then(|code| code.as_i64())
    }

    /// Human readable description supplied by the array, if any
    pub fn description(&self) -> Option<&str> {
        self.body
            .get("desc")
            .or_else(|| self.body.get("description"))
            .and_then(|desc| desc.as_str())
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} on {}", self.status, self.path)?;
        if let Some(desc) = self.description() {
            write!(f, ": {}", desc)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum RestError {
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("Bad request ({0})")]
    BadRequest(ApiFailure),

    #[error("Unauthorized ({0})")]
    Unauthorized(ApiFailure),

    #[error("Forbidden ({0})")]
    Forbidden(ApiFailure),

    #[error("Not found ({0})")]
    NotFound(ApiFailure),

    #[error("Conflict ({0})")]
    Conflict(ApiFailure),

    #[error("Server error ({0})")]
    ServerError(ApiFailure),

    #[error("HTTP error ({0})")]
    Http(ApiFailure),

    #[error("Failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Login response on {0} did not contain a session key")]
    MissingSessionKey(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, RestError>;

impl RestError {
    /// Map a failure to its typed variant
    pub fn from_failure(failure: ApiFailure) -> Self {
        match failure.status {
            400 => RestError::BadRequest(failure),
            401 => RestError::Unauthorized(failure),
            403 => RestError::Forbidden(failure),
            404 => RestError::NotFound(failure),
            409 => RestError::Conflict(failure),
            500..=599 => RestError::ServerError(failure),
            _ => RestError::Http(failure),
        }
    }

    /// Diagnostic payload for protocol-level failures
    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            RestError::BadRequest(f)
            | RestError::Unauthorized(f)
            | RestError::Forbidden(f)
            | RestError::NotFound(f)
            | RestError::Conflict(f)
            | RestError::ServerError(f)
            | RestError::Http(f) => Some(f),
            _ => None,
        }
    }

    /// HTTP status code, for protocol-level failures
    pub fn status(&self) -> Option<u16> {
        self.failure().map(|f| f.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RestError::Unauthorized(_))
    }
}

/// Pass the body through for successful statuses, classify everything >= 400
pub fn check_status(status: u16, path: &str, body: ResponseBody) -> Result<ResponseBody> {
    if status < 400 {
        return Ok(body);
    }
    Err(RestError::from_failure(ApiFailure::new(status, path, body)))
}

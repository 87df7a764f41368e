use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("{tool} exited with {status}: {detail}")]
    ToolFailure {
        tool: String,
        status: String,
        detail: String,
    },

    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Template rendering error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<figment::Error> for SentinelError {
    fn from(err: figment::Error) -> Self {
        SentinelError::Config(Box::new(err))
    }
}

impl SentinelError {
    /// HTTP status used when this error is surfaced to a webhook caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            SentinelError::Authentication(_) => StatusCode::UNAUTHORIZED,
            SentinelError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the failure came from an unreachable or misbehaving remote service.
    pub fn is_collaborator_failure(&self) -> bool {
        match self {
            SentinelError::Http(_)
            | SentinelError::CollaboratorUnavailable(_)
            | SentinelError::RateLimited { .. } => true,
            _ => false,
        }
    }
}

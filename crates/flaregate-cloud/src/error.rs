//! Gateway error types

use thiserror::Error;

/// Every failure the gateway can surface to a caller.
///
/// Messages are the best available text: the provider's own message when it
/// sent one, an explicit fallback otherwise.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Timeout(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Unauthenticated(_) => 401,
            GatewayError::NotFound(_) => 404,
            GatewayError::Timeout(_) => 408,
            GatewayError::CommandFailed(_) => 400,
            GatewayError::InvalidInput(_) => 422,
            GatewayError::Unsupported(_) => 501,
            GatewayError::Upstream { status, .. } if (100..=599).contains(status) => *status,
            GatewayError::Upstream { .. } => 502,
            GatewayError::Transport(_) | GatewayError::Io(_) | GatewayError::Json(_) => 500,
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        GatewayError::Unauthenticated(message.into())
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        GatewayError::Upstream {
            status,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(GatewayError::unauthenticated("x").status_code(), 401);
        assert_eq!(GatewayError::NotFound("x".into()).status_code(), 404);
        assert_eq!(GatewayError::Timeout("x".into()).status_code(), 408);
        assert_eq!(GatewayError::CommandFailed("x".into()).status_code(), 400);
        assert_eq!(GatewayError::Transport("x".into()).status_code(), 500);
        assert_eq!(GatewayError::upstream(403, "denied").status_code(), 403);
        assert_eq!(GatewayError::upstream(0, "weird").status_code(), 502);
    }

    #[test]
    fn test_messages_are_verbatim() {
        assert_eq!(
            GatewayError::upstream(400, "Invalid zone identifier").to_string(),
            "Invalid zone identifier"
        );
        assert_eq!(
            GatewayError::CommandFailed("boom".into()).to_string(),
            "Command failed: boom"
        );
    }
}

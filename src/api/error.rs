use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("URL is required")]
    MissingParameter,

    /// Anything the extractor reported, passed through as-is.
    #[error("{message}")]
    Collaborator { message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter => StatusCode::BAD_REQUEST,
            Self::Collaborator { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        Self::Collaborator {
            message: format!("{error:#}"),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), "Request failed: {}", self);
        }

        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::MissingParameter.status(), StatusCode::BAD_REQUEST);
        let error = ApiError::from(anyhow::anyhow!("Video unavailable"));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_collaborator_message_keeps_context() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file");
        let error = ApiError::from(anyhow::Error::new(source).context("Failed to run yt-dlp"));
        assert_eq!(error.to_string(), "Failed to run yt-dlp: No such file");
    }
}

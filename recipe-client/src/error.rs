use reqwest::{Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecipeClientError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not found")]
    NotFound,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

impl ErrorBody {
    fn message(self) -> String {
        let reason = self
            .details
            .as_ref()
            .and_then(|d| d.get("message"))
            .and_then(|m| m.as_str());
        match reason {
            Some(reason) => format!("{}: {}", self.error, reason),
            None => self.error,
        }
    }
}

impl RecipeClientError {
    pub async fn from_http_response(resp: Response) -> Self {
        let status = resp.status();
        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.message(),
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        Self::from_status(status, message)
    }

    fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::CONFLICT => Self::Conflict(message),
            StatusCode::BAD_REQUEST => Self::InvalidRequest(message),
            other => Self::Server {
                status: other.as_u16(),
                message,
            },
        }
    }
}

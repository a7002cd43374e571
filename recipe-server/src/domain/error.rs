use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("user not found: {0}")]
    UserNotFound(Uuid),
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),
    #[error("recipe not found: {0}")]
    RecipeNotFound(Uuid),
    #[error("tag not found: {0}")]
    TagNotFound(Uuid),
    #[error("ingredient not found: {0}")]
    IngredientNotFound(Uuid),
    #[error("unauthorized")]
    Unauthorized,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Internal(format!("database error: {}", err))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::UserNotFound(_)
            | DomainError::RecipeNotFound(_)
            | DomainError::TagNotFound(_)
            | DomainError::IngredientNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
            DomainError::UserAlreadyExists(_) => StatusCode::CONFLICT,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // internal details stay in the logs
        let message = match self {
            DomainError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        let details = match self {
            DomainError::UserNotFound(resource)
            | DomainError::RecipeNotFound(resource)
            | DomainError::TagNotFound(resource)
            | DomainError::IngredientNotFound(resource) => Some(json!({ "resource": resource })),
            DomainError::Validation(reason) => Some(json!({ "message": reason })),
            _ => None,
        };
        let body = ErrorBody {
            error: message.as_str(),
            details,
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        let id = Uuid::new_v4();
        assert_eq!(
            DomainError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(DomainError::TagNotFound(id).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            DomainError::IngredientNotFound(id).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(DomainError::RecipeNotFound(id).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(DomainError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            DomainError::UserAlreadyExists("a@b.c".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            DomainError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_body_hides_cause() {
        let response = DomainError::Internal("connection refused".into()).error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

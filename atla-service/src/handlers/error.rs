//! API error types for handler operations
//!
//! ```rust
//! use atla_service::handlers::{ApiError, ApiErrorKind};
//!
//! let error = ApiError::not_found("character", 9);
//! assert!(matches!(error.kind, ApiErrorKind::NotFound));
//! assert_eq!(error.entity_id, Some("9".to_string()));
//! ```

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::listing::FieldErrors;
use crate::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};

/// Operation being performed when the API error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// Listing entities
    List,
    /// Getting a single entity by ID
    Get,
    /// Creating a new entity
    Create,
    /// Updating an existing entity
    Update,
    /// Deleting an entity
    Delete,
    /// Listing entities related to a parent
    Related,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Get => write!(f, "get"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Related => write!(f, "related"),
        }
    }
}

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Entity was not found
    NotFound,
    /// Request validation failed
    ValidationFailed,
    /// Invalid request format
    BadRequest,
    /// Operation conflicts with current state
    Conflict,
    /// Internal server error
    InternalError,
    /// Service temporarily unavailable
    ServiceUnavailable,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::BadRequest => write!(f, "bad_request"),
            Self::Conflict => write!(f, "conflict"),
            Self::InternalError => write!(f, "internal_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
        }
    }
}

impl ApiErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error code string for this error kind
    #[must_use]
    pub fn error_code(&self) -> String {
        self.to_string().to_uppercase()
    }
}

/// Structured API error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The operation being performed when the error occurred
    pub operation: ApiOperation,
    /// The category of error
    pub kind: ApiErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved (e.g., "character")
    pub entity_type: Option<String>,
    /// The ID of the entity involved
    pub entity_id: Option<String>,
    /// Per-field messages for validation failures
    pub errors: Option<FieldErrors>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(operation: ApiOperation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
            errors: None,
        }
    }

    /// The requested resource could not be found
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl fmt::Display) -> Self {
        Self::new(
            ApiOperation::Get,
            ApiErrorKind::NotFound,
            "the requested resource could not be found",
        )
        .with_entity(entity_type, entity_id)
    }

    /// Input failed validation; `errors` maps each field to its message
    pub fn failed_validation(operation: ApiOperation, errors: FieldErrors) -> Self {
        Self {
            errors: Some(errors),
            ..Self::new(operation, ApiErrorKind::ValidationFailed, "Validation failed")
        }
    }

    /// The request body could not be read
    pub fn bad_request(operation: ApiOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ApiErrorKind::BadRequest, message)
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(mut self, entity_type: impl Into<String>, entity_id: impl fmt::Display) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.to_string());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: ApiOperation) -> Self {
        self.operation = operation;
        self
    }

    pub fn is_retriable(&self) -> bool {
        matches!(self.kind, ApiErrorKind::ServiceUnavailable)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        if let Some(errors) = &self.errors {
            write!(f, " ({})", errors)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Response body for API errors
#[derive(Debug, Serialize)]
struct ApiErrorResponse {
    error: String,
    code: String,
    status: u16,
    operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FieldErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        if status.is_server_error() {
            tracing::error!(
                operation = %self.operation,
                kind = %self.kind,
                entity_type = ?self.entity_type,
                entity_id = ?self.entity_id,
                retriable = self.is_retriable(),
                "API error: {}", self.message
            );
        } else {
            tracing::debug!(
                operation = %self.operation,
                kind = %self.kind,
                entity_id = ?self.entity_id,
                "API error: {}", self
            );
        }

        let response = ApiErrorResponse {
            error: self.message,
            code: self.kind.error_code(),
            status: status.as_u16(),
            operation: self.operation.to_string(),
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            errors: self.errors,
        };

        (status, Json(response)).into_response()
    }
}

fn repository_operation_to_api_operation(op: RepositoryOperation) -> ApiOperation {
    match op {
        RepositoryOperation::List => ApiOperation::List,
        RepositoryOperation::FindById => ApiOperation::Get,
        RepositoryOperation::Create => ApiOperation::Create,
        RepositoryOperation::Update => ApiOperation::Update,
        RepositoryOperation::Delete => ApiOperation::Delete,
        RepositoryOperation::FindRelated => ApiOperation::Related,
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        let operation = repository_operation_to_api_operation(err.operation);

        let (kind, message) = match err.kind {
            RepositoryErrorKind::NotFound => (
                ApiErrorKind::NotFound,
                "the requested resource could not be found".to_string(),
            ),
            RepositoryErrorKind::Conflict => (
                ApiErrorKind::Conflict,
                "unable to update the record due to an edit conflict, please try again".to_string(),
            ),
            RepositoryErrorKind::ConstraintViolation => (
                ApiErrorKind::Conflict,
                "Operation conflicts with existing data".to_string(),
            ),
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout => {
                tracing::warn!(operation = %err.operation, kind = %err.kind, "{}", err.message);
                (
                    ApiErrorKind::ServiceUnavailable,
                    "Service temporarily unavailable".to_string(),
                )
            }
            RepositoryErrorKind::DatabaseError => {
                tracing::error!(operation = %err.operation, "{}", err.message);
                (
                    ApiErrorKind::InternalError,
                    "An internal error occurred".to_string(),
                )
            }
        };

        Self {
            operation,
            kind,
            message,
            entity_type: err.entity_type,
            entity_id: err.entity_id,
            errors: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Validator;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_api_error_kind_status_codes() {
        assert_eq!(ApiErrorKind::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiErrorKind::ValidationFailed.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiErrorKind::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiErrorKind::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiErrorKind::ValidationFailed.error_code(), "VALIDATION_FAILED");
        assert_eq!(ApiErrorKind::NotFound.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_timeout_hides_internal_message() {
        let err: ApiError =
            RepositoryError::timeout(RepositoryOperation::List, "query exceeded 3000ms").into();
        assert_eq!(err.kind, ApiErrorKind::ServiceUnavailable);
        assert_eq!(err.operation, ApiOperation::List);
        assert_eq!(err.message, "Service temporarily unavailable");
    }

    #[test]
    fn test_database_error_hides_internal_message() {
        let err: ApiError = RepositoryError::database_error(
            RepositoryOperation::Create,
            "relation \"characters\" does not exist",
        )
        .into();
        assert_eq!(err.kind, ApiErrorKind::InternalError);
        assert!(!err.message.contains("relation"));
    }

    #[test]
    fn test_conflict_mapping() {
        let err: ApiError = RepositoryError::conflict("episode", 4).into();
        assert_eq!(err.kind, ApiErrorKind::Conflict);
        assert_eq!(err.entity_id.as_deref(), Some("4"));
    }

    #[tokio::test]
    async fn test_validation_response_body() {
        let mut v = Validator::new();
        v.add_error("sort", "invalid sort value");
        let err = ApiError::failed_validation(ApiOperation::List, v.into_errors());

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({
                "error": "Validation failed",
                "code": "VALIDATION_FAILED",
                "status": 422,
                "operation": "list",
                "errors": {"sort": "invalid sort value"}
            })
        );
    }

    #[tokio::test]
    async fn test_not_found_response_body() {
        let response = ApiError::not_found("quote", 12).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["entity_type"], "quote");
        assert_eq!(body["entity_id"], "12");
        assert!(body.get("errors").is_none());
    }
}

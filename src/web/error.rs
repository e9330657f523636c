//! API error handling for the Grove HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::GroveError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed request (400).
    BadRequest,
    /// Generic resource not found (404).
    NotFound,
    /// Folder not found (404).
    FolderNotFound,
    /// Parent folder not found (404).
    ParentFolderNotFound,
    /// Sibling folder with the same name (409).
    FolderAlreadyExists,
    /// Folder moved below itself (409).
    CyclicMove,
    /// Page or limit out of range (400).
    InvalidPagination,
    /// Unknown sort field or order (400).
    InvalidSort,
    /// Field-level validation error (400).
    ValidationError,
    /// Upload over the size limit (413).
    PayloadTooLarge,
    /// File type outside the accepted set (400).
    UnsupportedFileType,
    /// Internal server error (500).
    InternalServerError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest
            | ErrorCode::InvalidPagination
            | ErrorCode::InvalidSort
            | ErrorCode::ValidationError
            | ErrorCode::UnsupportedFileType => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound | ErrorCode::FolderNotFound | ErrorCode::ParentFolderNotFound => {
                StatusCode::NOT_FOUND
            }
            ErrorCode::FolderAlreadyExists | ErrorCode::CyclicMove => StatusCode::CONFLICT,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always false.
    pub success: bool,
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Field-level validation error details (only present for validation errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with field-level details.
    pub fn with_details(
        code: ErrorCode,
        message: impl Into<String>,
        details: HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalServerError, message)
    }

    /// Create a validation error with field-level details.
    pub fn validation(details: HashMap<String, Vec<String>>) -> Self {
        Self::with_details(ErrorCode::ValidationError, "Validation failed", details)
    }

    /// Create a validation error from validator::ValidationErrors.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let mut details: HashMap<String, Vec<String>> = HashMap::new();

        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
                .collect();
            details.insert(field.to_string(), messages);
        }

        Self::validation(details)
    }

    /// Error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            success: false,
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<GroveError> for ApiError {
    fn from(err: GroveError) -> Self {
        match &err {
            GroveError::FolderNotFound(_) => {
                ApiError::new(ErrorCode::FolderNotFound, "Folder not found")
            }
            GroveError::ParentNotFound(_) => {
                ApiError::new(ErrorCode::ParentFolderNotFound, "Parent folder not found")
            }
            GroveError::FileNotFound(_) => ApiError::not_found("File not found"),
            GroveError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            GroveError::DuplicateName(_) => ApiError::new(
                ErrorCode::FolderAlreadyExists,
                "A folder with this name already exists in this location",
            ),
            GroveError::CyclicMove { .. } => ApiError::new(
                ErrorCode::CyclicMove,
                "A folder cannot be moved into itself or one of its subfolders",
            ),
            GroveError::InvalidPagination(msg) => {
                ApiError::new(ErrorCode::InvalidPagination, msg.clone())
            }
            GroveError::InvalidSort(msg) => ApiError::new(ErrorCode::InvalidSort, msg.clone()),
            GroveError::Validation(msg) => ApiError::new(ErrorCode::ValidationError, msg.clone()),
            GroveError::UploadTooLarge { max_mb } => ApiError::new(
                ErrorCode::PayloadTooLarge,
                format!("File size exceeds the {}MB limit", max_mb),
            ),
            GroveError::UnsupportedFileType(ext) => ApiError::new(
                ErrorCode::UnsupportedFileType,
                format!("Unsupported file type: {}", ext),
            ),
            GroveError::Database(_) | GroveError::Io(_) | GroveError::Config(_) => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status() {
        assert_eq!(ErrorCode::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::ParentFolderNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::FolderAlreadyExists.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ErrorCode::CyclicMove.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::ValidationError.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ErrorCode::InternalServerError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::ParentFolderNotFound).unwrap();
        assert_eq!(json, "\"PARENT_FOLDER_NOT_FOUND\"");
        let json = serde_json::to_string(&ErrorCode::InternalServerError).unwrap();
        assert_eq!(json, "\"INTERNAL_SERVER_ERROR\"");
    }

    #[test]
    fn test_from_grove_error() {
        let cases = [
            (GroveError::FolderNotFound(1), ErrorCode::FolderNotFound),
            (GroveError::ParentNotFound(1), ErrorCode::ParentFolderNotFound),
            (GroveError::FileNotFound(1), ErrorCode::NotFound),
            (
                GroveError::DuplicateName("Docs".into()),
                ErrorCode::FolderAlreadyExists,
            ),
            (
                GroveError::CyclicMove {
                    folder_id: 1,
                    target_id: 2,
                },
                ErrorCode::CyclicMove,
            ),
            (
                GroveError::InvalidPagination("page".into()),
                ErrorCode::InvalidPagination,
            ),
            (GroveError::InvalidSort("x".into()), ErrorCode::InvalidSort),
            (
                GroveError::UploadTooLarge { max_mb: 10 },
                ErrorCode::PayloadTooLarge,
            ),
            (
                GroveError::UnsupportedFileType("exe".into()),
                ErrorCode::UnsupportedFileType,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(ApiError::from(err).code(), code);
        }
    }

    #[test]
    fn test_database_error_hides_detail() {
        let err = ApiError::from(GroveError::Database("no such table: folders".into()));
        assert_eq!(err.code(), ErrorCode::InternalServerError);
        assert!(!err.message().contains("folders"));
    }

    #[test]
    fn test_validation_error_with_details() {
        let mut details = HashMap::new();
        details.insert("name".to_string(), vec!["Must not be empty".to_string()]);
        let err = ApiError::validation(details);
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.message(), "Validation failed");
        assert!(err.details.is_some());
    }

    #[tokio::test]
    async fn test_into_response_body() {
        use http_body_util::BodyExt;

        let response = ApiError::from(GroveError::FolderNotFound(9)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "FOLDER_NOT_FOUND");
        assert!(json["error"].get("details").is_none());
    }
}

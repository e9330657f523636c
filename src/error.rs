//! Error types for Grove.

use thiserror::Error;

/// Common error type for Grove.
#[derive(Error, Debug)]
pub enum GroveError {
    /// Database error.
    ///
    /// Wraps errors from the storage layer. The message is kept for logs and
    /// never returned to API clients.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Page or limit outside the accepted range.
    #[error("invalid pagination: {0}")]
    InvalidPagination(String),

    /// Unknown sort field or sort order.
    #[error("invalid sort: {0}")]
    InvalidSort(String),

    /// Generic resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Folder does not exist.
    #[error("folder {0} not found")]
    FolderNotFound(i64),

    /// File does not exist.
    #[error("file {0} not found")]
    FileNotFound(i64),

    /// Referenced parent folder does not exist.
    #[error("parent folder {0} not found")]
    ParentNotFound(i64),

    /// A sibling folder already uses this name.
    #[error("a folder named '{0}' already exists in this location")]
    DuplicateName(String),

    /// Moving a folder below itself or one of its descendants.
    #[error("folder {folder_id} cannot be moved under {target_id}")]
    CyclicMove {
        /// Folder being moved.
        folder_id: i64,
        /// Requested new parent.
        target_id: i64,
    },

    /// Uploaded payload exceeds the configured size limit.
    #[error("file exceeds the {max_mb}MB upload limit")]
    UploadTooLarge {
        /// Configured limit in megabytes.
        max_mb: u64,
    },

    /// File extension outside the accepted set.
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
}

/// Coarse error classification used by the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Folder, file or parent absent.
    NotFound,
    /// Duplicate sibling name or an impossible move.
    Conflict,
    /// Malformed input rejected before touching storage.
    Validation,
    /// Storage failure or unexpected condition.
    Internal,
}

impl GroveError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GroveError::NotFound(_)
            | GroveError::FolderNotFound(_)
            | GroveError::FileNotFound(_)
            | GroveError::ParentNotFound(_) => ErrorKind::NotFound,
            GroveError::DuplicateName(_) | GroveError::CyclicMove { .. } => ErrorKind::Conflict,
            GroveError::Validation(_)
            | GroveError::InvalidPagination(_)
            | GroveError::InvalidSort(_)
            | GroveError::UploadTooLarge { .. }
            | GroveError::UnsupportedFileType(_) => ErrorKind::Validation,
            GroveError::Database(_) | GroveError::Io(_) | GroveError::Config(_) => {
                ErrorKind::Internal
            }
        }
    }
}

// Conversion from sqlx errors
impl From<sqlx::Error> for GroveError {
    fn from(e: sqlx::Error) -> Self {
        GroveError::Database(e.to_string())
    }
}

/// Check whether a sqlx error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Result type alias for Grove operations.
pub type Result<T> = std::result::Result<T, GroveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = GroveError::Validation("name too long".to_string());
        assert_eq!(err.to_string(), "validation error: name too long");
    }

    #[test]
    fn test_not_found_error_display() {
        assert_eq!(
            GroveError::NotFound("upload".to_string()).to_string(),
            "upload not found"
        );
        assert_eq!(
            GroveError::FolderNotFound(7).to_string(),
            "folder 7 not found"
        );
        assert_eq!(
            GroveError::ParentNotFound(3).to_string(),
            "parent folder 3 not found"
        );
    }

    #[test]
    fn test_duplicate_name_display() {
        let err = GroveError::DuplicateName("Docs".to_string());
        assert_eq!(
            err.to_string(),
            "a folder named 'Docs' already exists in this location"
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(GroveError::FolderNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(GroveError::ParentNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(GroveError::FileNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(
            GroveError::DuplicateName("x".into()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            GroveError::CyclicMove {
                folder_id: 1,
                target_id: 2
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            GroveError::InvalidPagination("page".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            GroveError::InvalidSort("sort_by".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            GroveError::Database("locked".into()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GroveError = io_err.into();
        assert!(matches!(err, GroveError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: GroveError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, GroveError::Database(_)));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(GroveError::FolderNotFound(1))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}

//! Services backing the HTTP handlers. Each one owns a slice of the schema
//! and, for the gallery, the object store.

pub mod article_service;
pub mod folder_service;
pub mod gallery_service;
pub mod session_service;

use crate::{gallery::upload::UploadValidationError, storage::StorageError};
use std::fmt;
use thiserror::Error;

/// Which step of a single file's upload went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Upload,
    PublicUrl,
    Insert,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UploadStage::Upload => "upload",
            UploadStage::PublicUrl => "public-url",
            UploadStage::Insert => "insert",
        })
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(
        "{stage} failed for `{file}`: {message} ({succeeded} of {total} files were stored)"
    )]
    UploadFailed {
        file: String,
        stage: UploadStage,
        message: String,
        succeeded: usize,
        total: usize,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<UploadValidationError> for ServiceError {
    fn from(err: UploadValidationError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Return true if SQLx error indicates a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}

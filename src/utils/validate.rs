//! Validation of output paths taken from the request table.

use std::path::{Component, Path};
use thiserror::Error;

/// Validation error types
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid filename: empty")]
    EmptyFilename,

    #[error("Invalid filename: contains a null byte")]
    NullByte,

    #[error("Path traversal detected: {0}")]
    PathTraversal(String),
}

/// Check that `path` is a relative path that stays below the directory it is joined to
pub fn validate_relative_path(path: &str) -> Result<(), ValidationError> {
    let path = path.trim();

    if path.is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if path.contains('\0') {
        return Err(ValidationError::NullByte);
    }

    // Windows drive prefixes are not caught by `Path` on unix
    if path.starts_with('\\') || path.contains(":/") || path.contains(":\\") {
        return Err(ValidationError::PathTraversal(path.to_string()));
    }

    let escapes = Path::new(path).components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(ValidationError::PathTraversal(path.to_string()));
    }

    Ok(())
}

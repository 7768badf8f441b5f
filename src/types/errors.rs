/*!
 * Sandbox Error Types
 * Structured, type-safe error handling for sandboxed filesystem operations
 */

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Sandboxed filesystem operation result
///
/// # Must Use
/// Filesystem operations can fail and must be handled to prevent data loss
#[must_use = "filesystem operations can fail and must be handled"]
pub type FsResult<T> = Result<T, FsError>;

/// Sandboxed filesystem errors
///
/// All variants carry a context string that should be non-empty.
/// Serialization uses the tagged enum pattern for type safety.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum FsError {
    #[error("Invalid path: {0}")]
    InvalidPath(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Path escapes sandbox root: {0}")]
    PathEscape(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Not a directory: {0}")]
    NotADirectory(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("I/O error: {0}")]
    Io(#[serde(deserialize_with = "deserialize_nonempty_string")] String),
}

/// Deserialize and validate non-empty string for error context
fn deserialize_nonempty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        return Err(serde::de::Error::custom("error context must not be empty"));
    }
    Ok(s)
}

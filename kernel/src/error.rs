//! Definitions of errors that the schema kernel can encounter

use crate::schema::{ColumnName, FieldId};

/// A [`std::result::Result`] that has the kernel [`Error`] as the error variant
pub type KernelResult<T, E = Error> = std::result::Result<T, E>;

/// All the types of errors that the kernel can run into
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An error that is not covered by any more specific variant.
    #[error("Generic schema kernel error: {0}")]
    Generic(String),

    /// An invariant of the kernel was violated. This indicates a bug in the caller (for example
    /// a candidate schema that was paired with an unrelated source schema), never a condition
    /// that callers should recover from.
    #[error("Internal error {0}. This is a kernel bug, please report.")]
    InternalError(String),

    /// A schema could not be constructed or parsed.
    #[error("Invalid schema: {0}")]
    Schema(String),

    /// A field, list element, map key or map value that must be identified has no field id.
    #[error("Field at path '{path}' is missing a field id")]
    MissingFieldId { path: ColumnName },

    /// The same field id is assigned to two different places in one schema.
    #[error("Duplicate field id {id} found at paths '{path1}' and '{path2}'")]
    DuplicateFieldId {
        id: FieldId,
        path1: ColumnName,
        path2: ColumnName,
    },

    /// The id allocator ran past the largest representable field id.
    #[error("Field id overflowed after {last_assigned}, cannot assign more field ids")]
    FieldIdOverflow { last_assigned: FieldId },

    /// Schema JSON could not be read or written.
    #[error("Invalid schema JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

// Convenience constructors for Error types that take a String argument
impl Error {
    pub fn generic(msg: impl ToString) -> Self {
        Self::Generic(msg.to_string())
    }

    pub fn internal_error(msg: impl ToString) -> Self {
        Self::InternalError(msg.to_string())
    }

    pub fn schema(msg: impl ToString) -> Self {
        Self::Schema(msg.to_string())
    }

    pub(crate) fn missing_field_id(path: ColumnName) -> Self {
        Self::MissingFieldId { path }
    }

    pub(crate) fn duplicate_field_id(id: FieldId, path1: ColumnName, path2: ColumnName) -> Self {
        Self::DuplicateFieldId { id, path1, path2 }
    }
}

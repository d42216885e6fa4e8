//! # Error Types
//!
//! One error enum per stage of the table pipeline, unified under
//! [`TablowError`] for callers that do not care which stage failed.

use crate::model::FieldKind;
use thiserror::Error;

/// Invalid table view configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// The view declares no columns.
    #[error("table view '{0}' has no columns")]
    NoColumns(String),

    /// A column, filter or sortable entry names a field the model lacks.
    #[error("{role} '{field}' is not a field of model table '{table}'")]
    UnknownField {
        role: &'static str,
        field: String,
        table: &'static str,
    },

    /// Two columns read the same field.
    #[error("field '{0}' is used by more than one column")]
    DuplicateColumn(String),

    /// Unrecognised filter kind string.
    #[error("unknown filter kind '{0}' (expected 'dropdown' or 'checkbox')")]
    UnknownFilterKind(String),
}

/// Reflection failure.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The model could not be serialized.
    #[error("failed to reflect model: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The model serialized to something other than a map of fields.
    #[error("model for table '{0}' did not reflect into named fields")]
    NotAStruct(&'static str),
}

/// Malformed request data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// The query string could not be decoded.
    #[error("malformed query string: {0}")]
    MalformedQuery(String),

    /// An inline edit was posted without the record id.
    #[error("Missing record ID")]
    MissingId,

    /// The posted body was not a decodable form.
    #[error("malformed form: {0}")]
    MalformedForm(String),

    /// An edited value does not fit the field's storage kind.
    #[error("invalid value '{value}' for field '{field}': expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: FieldKind,
    },
}

/// Statement planning failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The query builder produced a parameter type the store cannot bind.
    #[error("unsupported parameter value: {0}")]
    UnsupportedValue(String),
}

/// Any failure from the core pipeline.
#[derive(Debug, Error)]
pub enum TablowError {
    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, TablowError>;

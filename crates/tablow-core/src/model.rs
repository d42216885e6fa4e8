//! # Model Reflection
//!
//! Maps a model struct onto table cells.
//!
//! Models describe their backing table through [`TableModel`] and expose
//! their field values through `serde::Serialize`. [`reflect`] serializes a
//! row and keeps the named fields, so a column can read any field by name
//! without per-model glue.

use crate::error::ModelError;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// TABLEMODEL TRAIT
// =============================================================================

/// A struct stored as one row of a relational table.
///
/// Field names double as column names: a model's serialized field names
/// must match `FIELDS`, and each entry in `FIELDS` must be a column of
/// `TABLE`.
pub trait TableModel: Serialize {
    /// Name of the backing table.
    const TABLE: &'static str;

    /// Declared field (and column) names, in display order.
    const FIELDS: &'static [&'static str];

    /// Primary key column, used to address rows for inline edits.
    const PRIMARY_KEY: &'static str = "id";

    /// Storage kind of a declared field. Edited values are parsed against
    /// it before they are bound.
    fn field_kind(field: &str) -> FieldKind;

    /// Check whether `name` is a declared field.
    fn has_field(name: &str) -> bool {
        Self::FIELDS.contains(&name)
    }
}

/// How a field is stored, as far as inline edits care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Bool,
}

impl FieldKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "an integer",
            Self::Bool => "a boolean",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CELL VALUE
// =============================================================================

/// A single reflected field value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellValue(Value);

impl CellValue {
    /// Wrap a raw JSON value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Check whether the field was null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::Null => Ok(()),
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            // Arrays and objects fall back to compact JSON
            other => write!(f, "{other}"),
        }
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// The reflected fields of one row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, CellValue>,
}

impl Record {
    /// Look up a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields.get(field)
    }

    /// Display text for a field. Missing fields display as empty.
    #[must_use]
    pub fn display(&self, field: &str) -> String {
        self.get(field).map(ToString::to_string).unwrap_or_default()
    }

    /// Display text of the model's primary key.
    #[must_use]
    pub fn primary_key<M: TableModel>(&self) -> String {
        self.display(M::PRIMARY_KEY)
    }

    /// Number of reflected fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if nothing was reflected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, CellValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Reflect a model instance into a [`Record`].
pub fn reflect<M: TableModel>(model: &M) -> Result<Record, ModelError> {
    match serde_json::to_value(model)? {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(name, value)| (name, CellValue::new(value)))
            .collect()),
        _ => Err(ModelError::NotAStruct(M::TABLE)),
    }
}

// =============================================================================
// TESTS
// =============================================================================

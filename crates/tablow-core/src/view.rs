//! # Table View Configuration
//!
//! Declarative description of one admin table: its columns, the filters
//! offered above it, which fields may be sorted, and whether rows can be
//! edited inline.

use crate::error::ViewError;
use crate::model::TableModel;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// FILTERS
// =============================================================================

/// How a filter is presented and applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// A select box with an "All" option followed by the configured options.
    Dropdown,
    /// A single checkbox that restricts the field to `true` when ticked.
    Checkbox,
}

impl FilterKind {
    /// Wire name used in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dropdown => "dropdown",
            Self::Checkbox => "checkbox",
        }
    }
}

impl FromStr for FilterKind {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dropdown" => Ok(Self::Dropdown),
            "checkbox" => Ok(Self::Checkbox),
            other => Err(ViewError::UnknownFilterKind(other.to_string())),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A filter offered above the table.
///
/// `name` is both the model field it restricts and the query parameter
/// carrying the chosen value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterField {
    pub name: String,
    pub kind: FilterKind,
    pub options: Vec<String>,
    pub label: String,
}

impl FilterField {
    /// A dropdown filter over a fixed set of values.
    #[must_use]
    pub fn dropdown<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            kind: FilterKind::Dropdown,
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// A checkbox filter on a boolean field.
    #[must_use]
    pub fn checkbox(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            kind: FilterKind::Checkbox,
            options: Vec::new(),
        }
    }

    /// Override the label shown next to the widget.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

// =============================================================================
// COLUMNS
// =============================================================================

/// A table column: header text and the model field it displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub field: String,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
        }
    }
}

// =============================================================================
// TABLE VIEW
// =============================================================================

/// Declarative configuration of one table view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    /// Display title, also the source of [`TableView::dom_id`].
    pub name: String,
    pub filters: Vec<FilterField>,
    /// Whitelist of fields accepted in the `sort` parameter.
    pub sortable: Vec<String>,
    pub columns: Vec<Column>,
    pub editable: bool,
}

impl TableView {
    /// Create an empty, read-only view.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filters: Vec::new(),
            sortable: Vec::new(),
            columns: Vec::new(),
            editable: false,
        }
    }

    /// Append a column.
    #[must_use]
    pub fn column(mut self, header: impl Into<String>, field: impl Into<String>) -> Self {
        self.columns.push(Column::new(header, field));
        self
    }

    /// Append a filter.
    #[must_use]
    pub fn filter(mut self, filter: FilterField) -> Self {
        self.filters.push(filter);
        self
    }

    /// Replace the sortable whitelist.
    #[must_use]
    pub fn sortable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sortable = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable inline editing.
    #[must_use]
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Header texts in column order.
    #[must_use]
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Field names in column order.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.field.as_str()).collect()
    }

    /// Check whether `field` may be sorted on.
    #[must_use]
    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable.iter().any(|s| s == field)
    }

    /// Look up a configured filter by name.
    #[must_use]
    pub fn filter_named(&self, name: &str) -> Option<&FilterField> {
        self.filters.iter().find(|f| f.name == name)
    }

    /// Slug of the view name, used to suffix element ids so several tables
    /// can share a page.
    #[must_use]
    pub fn dom_id(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        let mut pending_dash = false;
        for ch in self.name.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(ch.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }
        if slug.is_empty() {
            slug.push_str("table");
        }
        slug
    }

    /// Check the view against the model it will display.
    pub fn validate<M: TableModel>(&self) -> Result<(), ViewError> {
        if self.columns.is_empty() {
            return Err(ViewError::NoColumns(self.name.clone()));
        }

        let unknown = |role: &'static str, field: &str| ViewError::UnknownField {
            role,
            field: field.to_string(),
            table: M::TABLE,
        };

        let mut seen = BTreeSet::new();
        for column in &self.columns {
            if !M::has_field(&column.field) {
                return Err(unknown("column", &column.field));
            }
            if !seen.insert(column.field.as_str()) {
                return Err(ViewError::DuplicateColumn(column.field.clone()));
            }
        }

        if let Some(filter) = self.filters.iter().find(|f| !M::has_field(&f.name)) {
            return Err(unknown("filter", &filter.name));
        }

        if let Some(field) = self.sortable.iter().find(|s| !M::has_field(s)) {
            return Err(unknown("sortable field", field));
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldKind;
    use serde::Serialize;

    #[derive(Serialize)]
    struct User {
        id: i64,
        name: String,
        age: i64,
    }

    impl TableModel for User {
        const TABLE: &'static str = "users";
        const FIELDS: &'static [&'static str] = &["id", "name", "age"];

        fn field_kind(field: &str) -> FieldKind {
            match field {
                "id" | "age" => FieldKind::Integer,
                _ => FieldKind::Text,
            }
        }
    }

    fn users_view() -> TableView {
        TableView::new("Dynamic Table")
            .column("ID", "id")
            .column("Name", "name")
            .column("Age", "age")
            .filter(FilterField::dropdown("name", ["Alice", "Bob"]))
            .sortable(["id", "name", "age"])
    }

    #[test]
    fn headers_and_fields_follow_column_order() {
        let view = users_view();
        assert_eq!(view.headers(), vec!["ID", "Name", "Age"]);
        assert_eq!(view.fields(), vec!["id", "name", "age"]);
    }

    #[test]
    fn sortable_is_a_whitelist() {
        let view = users_view().sortable(["age"]);
        assert!(view.is_sortable("age"));
        assert!(!view.is_sortable("name"));
    }

    #[test]
    fn dom_id_slugs_the_name() {
        assert_eq!(users_view().dom_id(), "dynamic-table");
        assert_eq!(TableView::new("  Users & Roles!! ").dom_id(), "users-roles");
        assert_eq!(TableView::new("***").dom_id(), "table");
    }

    #[test]
    fn filter_kind_parses_known_names() {
        assert_eq!("dropdown".parse::<FilterKind>(), Ok(FilterKind::Dropdown));
        assert_eq!("checkbox".parse::<FilterKind>(), Ok(FilterKind::Checkbox));
        assert_eq!(
            "radio".parse::<FilterKind>(),
            Err(ViewError::UnknownFilterKind("radio".to_string()))
        );
    }

    #[test]
    fn filter_label_defaults_to_name() {
        let filter = FilterField::checkbox("active");
        assert_eq!(filter.label, "active");
        assert_eq!(filter.with_label("Active only").label, "Active only");
    }

    #[test]
    fn validate_accepts_matching_view() {
        assert_eq!(users_view().validate::<User>(), Ok(()));
    }

    #[test]
    fn validate_rejects_empty_view() {
        let err = TableView::new("Empty").validate::<User>().unwrap_err();
        assert_eq!(err, ViewError::NoColumns("Empty".to_string()));
    }

    #[test]
    fn validate_rejects_unknown_fields() {
        let err = users_view().column("Email", "email").validate::<User>().unwrap_err();
        assert!(matches!(err, ViewError::UnknownField { role: "column", .. }));

        let err = users_view()
            .filter(FilterField::checkbox("admin"))
            .validate::<User>()
            .unwrap_err();
        assert!(matches!(err, ViewError::UnknownField { role: "filter", .. }));

        let err = users_view().sortable(["salary"]).validate::<User>().unwrap_err();
        assert!(matches!(err, ViewError::UnknownField { role: "sortable field", .. }));
    }

    #[test]
    fn validate_rejects_duplicate_columns() {
        let err = users_view().column("Years", "age").validate::<User>().unwrap_err();
        assert_eq!(err, ViewError::DuplicateColumn("age".to_string()));
    }
}

//! # Table View Model
//!
//! Flattens a view, the request parameters and the reflected rows into
//! plain strings and flags, so templates only iterate and print.
//!
//! Element ids are suffixed with the view's `dom_id` so several tables can
//! live on one page without their edit rows colliding.

use crate::model::{Record, TableModel};
use crate::params::{COLUMN_PREFIX, FilterValue, ListParams, SORT_PARAM, SortDirection};
use crate::view::{FilterKind, TableView};

// =============================================================================
// HEADER
// =============================================================================

/// One column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub label: String,
    pub field: String,
    /// Link that sorts by this column; empty when the column is not sortable.
    pub sort_href: String,
    /// `▲` / `▼` on the active sort column, empty elsewhere.
    pub indicator: &'static str,
}

impl HeaderCell {
    #[must_use]
    pub fn is_sortable(&self) -> bool {
        !self.sort_href.is_empty()
    }
}

// =============================================================================
// FILTER WIDGETS
// =============================================================================

/// One `<option>` of a dropdown filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub value: String,
    pub selected: bool,
}

/// A filter control above the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterWidget {
    pub name: String,
    pub label: String,
    pub kind: FilterKind,
    pub options: Vec<FilterOption>,
    /// Checkbox state; always false for dropdowns.
    pub checked: bool,
}

impl FilterWidget {
    #[must_use]
    pub fn is_dropdown(&self) -> bool {
        self.kind == FilterKind::Dropdown
    }

    #[must_use]
    pub fn is_checkbox(&self) -> bool {
        self.kind == FilterKind::Checkbox
    }

    /// True when no option is selected, i.e. "All".
    #[must_use]
    pub fn shows_all(&self) -> bool {
        !self.options.iter().any(|o| o.selected)
    }
}

// =============================================================================
// ROWS
// =============================================================================

/// One input of an edit row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCell {
    pub input_name: String,
    pub value: String,
    /// The primary key is shown but not editable.
    pub readonly: bool,
}

/// One table row with its edit-row counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub index: usize,
    /// Primary key, posted back as the hidden `id`.
    pub key: String,
    pub cells: Vec<String>,
    pub edit_cells: Vec<EditCell>,
    pub view_row_id: String,
    pub edit_row_id: String,
    pub edit_btn_id: String,
    pub edit_form_id: String,
}

// =============================================================================
// TABLE CONTEXT
// =============================================================================

/// Everything the table templates need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableContext {
    pub title: String,
    pub dom_id: String,
    pub editable: bool,
    pub filters: Vec<FilterWidget>,
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<TableRow>,
    /// Request query minus `sort`.
    pub query: String,
}

impl TableContext {
    /// Build the view model for `records`, which must already be filtered
    /// and sorted.
    #[must_use]
    pub fn build<M: TableModel>(view: &TableView, params: &ListParams, records: &[Record]) -> Self {
        let dom_id = view.dom_id();
        let query = params.preserved_query();

        Self {
            title: view.name.clone(),
            editable: view.editable,
            filters: filter_widgets(view, params),
            headers: header_cells(view, params, &query),
            rows: records
                .iter()
                .enumerate()
                .map(|(index, record)| table_row::<M>(view, &dom_id, index, record))
                .collect(),
            dom_id,
            query,
        }
    }

    /// Number of columns including the actions column.
    #[must_use]
    pub fn column_span(&self) -> usize {
        self.headers.len() + usize::from(self.editable)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn filter_form_id(&self) -> String {
        format!("filters-{}", self.dom_id)
    }
}

fn filter_widgets(view: &TableView, params: &ListParams) -> Vec<FilterWidget> {
    view.filters
        .iter()
        .map(|filter| {
            let current = params.filter_value(&filter.name);
            let options = filter
                .options
                .iter()
                .map(|option| FilterOption {
                    value: option.clone(),
                    selected: matches!(current, Some(FilterValue::Text(v)) if v == option),
                })
                .collect();
            FilterWidget {
                name: filter.name.clone(),
                label: filter.label.clone(),
                kind: filter.kind,
                options,
                checked: matches!(current, Some(FilterValue::Flag(true))),
            }
        })
        .collect()
}

fn header_cells(view: &TableView, params: &ListParams, query: &str) -> Vec<HeaderCell> {
    view.columns
        .iter()
        .map(|column| {
            let active = params.sort.as_ref().filter(|s| s.field == column.field);
            let indicator = match active.map(|s| s.direction) {
                Some(SortDirection::Asc) => "▲",
                Some(SortDirection::Desc) => "▼",
                None => "",
            };
            let sort_href = if view.is_sortable(&column.field) {
                let key = match active.map(|s| s.direction) {
                    Some(SortDirection::Asc) => format!("-{}", column.field),
                    _ => column.field.clone(),
                };
                sort_link(&key, query)
            } else {
                String::new()
            };
            HeaderCell {
                label: column.name.clone(),
                field: column.field.clone(),
                sort_href,
                indicator,
            }
        })
        .collect()
}

fn sort_link(key: &str, query: &str) -> String {
    let sort = serde_urlencoded::to_string(&[(SORT_PARAM, key)]).unwrap_or_default();
    if query.is_empty() {
        format!("?{sort}")
    } else {
        format!("?{sort}&{query}")
    }
}

fn table_row<M: TableModel>(view: &TableView, dom_id: &str, index: usize, record: &Record) -> TableRow {
    let cells = view.columns.iter().map(|c| record.display(&c.field)).collect();
    let edit_cells = view
        .columns
        .iter()
        .map(|c| EditCell {
            input_name: format!("{COLUMN_PREFIX}{}", c.field),
            value: record.display(&c.field),
            readonly: c.field == M::PRIMARY_KEY,
        })
        .collect();

    TableRow {
        index,
        key: record.primary_key::<M>(),
        cells,
        edit_cells,
        view_row_id: format!("view-row-{index}-{dom_id}"),
        edit_row_id: format!("edit-row-{index}-{dom_id}"),
        edit_btn_id: format!("edit-btn-{index}-{dom_id}"),
        edit_form_id: format!("edit-form-{index}-{dom_id}"),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldKind;
    use crate::model::reflect;
    use crate::params::QueryParams;
    use crate::view::FilterField;
    use serde::Serialize;

    #[derive(Serialize)]
    struct User {
        id: i64,
        name: String,
        age: i64,
        active: bool,
    }

    impl TableModel for User {
        const TABLE: &'static str = "users";
        const FIELDS: &'static [&'static str] = &["id", "name", "age", "active"];

        fn field_kind(field: &str) -> FieldKind {
            match field {
                "id" | "age" => FieldKind::Integer,
                "active" => FieldKind::Bool,
                _ => FieldKind::Text,
            }
        }
    }

    fn view() -> TableView {
        TableView::new("Team Members")
            .column("ID", "id")
            .column("Name", "name")
            .column("Age", "age")
            .filter(FilterField::dropdown("name", ["Alice", "Bob"]))
            .filter(FilterField::checkbox("active").with_label("Active"))
            .sortable(["name", "age"])
    }

    fn records() -> Vec<Record> {
        [(1, "Alice", 30, true), (2, "Bob", 25, false)]
            .into_iter()
            .map(|(id, name, age, active)| {
                reflect(&User {
                    id,
                    name: name.to_string(),
                    age,
                    active,
                })
                .unwrap()
            })
            .collect()
    }

    fn build(view: &TableView, raw: &str) -> TableContext {
        let params = ListParams::from_query(view, &QueryParams::parse(raw).unwrap());
        TableContext::build::<User>(view, &params, &records())
    }

    #[test]
    fn rows_follow_column_order() {
        let table = build(&view(), "");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells, vec!["1", "Alice", "30"]);
        assert_eq!(table.rows[1].key, "2");
        assert_eq!(table.title, "Team Members");
        assert_eq!(table.filter_form_id(), "filters-team-members");
    }

    #[test]
    fn only_sortable_headers_link() {
        let table = build(&view(), "name=Alice");
        assert!(!table.headers[0].is_sortable());
        assert_eq!(table.headers[1].sort_href, "?sort=name&name=Alice");
        assert_eq!(table.headers[2].sort_href, "?sort=age&name=Alice");
    }

    #[test]
    fn active_ascending_sort_links_to_descending() {
        let table = build(&view(), "sort=age");
        assert_eq!(table.headers[2].indicator, "▲");
        assert_eq!(table.headers[2].sort_href, "?sort=-age");

        let table = build(&view(), "sort=-age");
        assert_eq!(table.headers[2].indicator, "▼");
        assert_eq!(table.headers[2].sort_href, "?sort=age");
        assert_eq!(table.headers[1].indicator, "");
    }

    #[test]
    fn widgets_reflect_current_filters() {
        let table = build(&view(), "name=Bob&active=on");
        let dropdown = &table.filters[0];
        assert!(dropdown.is_dropdown());
        assert!(!dropdown.shows_all());
        assert_eq!(
            dropdown.options,
            vec![
                FilterOption {
                    value: "Alice".to_string(),
                    selected: false,
                },
                FilterOption {
                    value: "Bob".to_string(),
                    selected: true,
                },
            ]
        );

        let checkbox = &table.filters[1];
        assert!(checkbox.is_checkbox());
        assert!(checkbox.checked);
        assert_eq!(checkbox.label, "Active");
    }

    #[test]
    fn edit_rows_carry_ids_and_inputs() {
        let table = build(&view().editable(true), "");
        let row = &table.rows[1];
        assert_eq!(row.view_row_id, "view-row-1-team-members");
        assert_eq!(row.edit_row_id, "edit-row-1-team-members");
        assert_eq!(row.edit_btn_id, "edit-btn-1-team-members");
        assert_eq!(row.edit_form_id, "edit-form-1-team-members");
        assert_eq!(row.edit_cells[1].input_name, "col_name");
        assert_eq!(row.edit_cells[1].value, "Bob");
        assert!(row.edit_cells[0].readonly);
        assert_eq!(table.column_span(), 4);
    }
}

//! # Tablow Core
//!
//! Pure logic behind Tablow's admin tables.
//!
//! A table view is described declaratively ([`TableView`]): which model
//! fields become columns, which fields can be filtered and how, and which
//! fields may be sorted. Serving a request is then a straight pipeline:
//!
//! ```text
//! query string ──► ListParams ──► SqlStatement ──► rows (app layer)
//!                                                     │
//!        TableContext ◄── Record (reflection) ◄───────┘
//! ```
//!
//! Inline edits follow the same shape: form pairs ──► [`EditForm`] ──►
//! `UPDATE` statement.
//!
//! This crate never touches a database or a socket. Running the planned
//! statements and rendering the [`TableContext`] happen in `apps/tablow`.

pub mod error;
pub mod model;
pub mod params;
pub mod query;
pub mod table;
pub mod view;

pub use error::{ModelError, ParamsError, QueryError, TablowError, ViewError};
pub use model::{CellValue, FieldKind, Record, TableModel, reflect};
pub use params::{
    ActiveFilter, EditForm, EditValue, FilterValue, ListParams, QueryParams, SortDirection,
    SortSpec,
};
pub use query::{SqlParam, SqlStatement, select_rows, update_row};
pub use table::{EditCell, FilterOption, FilterWidget, HeaderCell, TableContext, TableRow};
pub use view::{Column, FilterField, FilterKind, TableView};

//! # Statement Planning
//!
//! Builds the parameterized statements behind a listing and an inline edit
//! with sea-query (SQLite dialect).
//!
//! Identifiers come only from the validated [`TableView`] and the model's
//! constants. Request data only ever reaches SQL as bound parameters.
//!
//! [`TableView`]: crate::view::TableView

use crate::error::QueryError;
use crate::model::TableModel;
use crate::params::{EditForm, EditValue, FilterValue, ListParams, SortDirection};
use sea_query::{Alias, Asterisk, Expr, ExprTrait, Order, Query, SqliteQueryBuilder, Value, Values};

// =============================================================================
// PLANNED STATEMENT
// =============================================================================

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    Integer(i64),
    Bool(bool),
    Null,
}

/// SQL text plus its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl SqlStatement {
    /// Wrap hand-written SQL.
    #[must_use]
    pub fn new(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    fn from_built((sql, values): (String, Values)) -> Result<Self, QueryError> {
        let params = values
            .0
            .into_iter()
            .map(to_param)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { sql, params })
    }
}

/// Convert a builder value into a bindable parameter.
fn to_param(value: Value) -> Result<SqlParam, QueryError> {
    match value {
        Value::String(Some(s)) => Ok(SqlParam::Text(s)),
        Value::BigInt(Some(i)) => Ok(SqlParam::Integer(i)),
        Value::Int(Some(i)) => Ok(SqlParam::Integer(i64::from(i))),
        Value::Bool(Some(b)) => Ok(SqlParam::Bool(b)),
        Value::String(None) | Value::BigInt(None) | Value::Int(None) | Value::Bool(None) => {
            Ok(SqlParam::Null)
        }
        other => Err(QueryError::UnsupportedValue(format!("{other:?}"))),
    }
}

/// Primary keys that look numeric are bound as integers.
fn key_value(raw: &str) -> Value {
    match raw.parse::<i64>() {
        Ok(id) => Value::BigInt(Some(id)),
        Err(_) => Value::String(Some(raw.to_string())),
    }
}

// =============================================================================
// PLANNERS
// =============================================================================

/// Plan the listing query: filters as equality conjuncts, then the
/// requested sort with the primary key as tie-breaker.
pub fn select_rows<M: TableModel>(params: &ListParams) -> Result<SqlStatement, QueryError> {
    let mut query = Query::select()
        .from(Alias::new(M::TABLE))
        .column(Asterisk)
        .to_owned();

    for filter in &params.filters {
        let value = match &filter.value {
            FilterValue::Text(text) => Value::String(Some(text.clone())),
            FilterValue::Flag(flag) => Value::Bool(Some(*flag)),
        };
        query.and_where(Expr::col(Alias::new(&filter.field)).eq(value));
    }

    if let Some(sort) = &params.sort {
        let order = match sort.direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        query.order_by(Alias::new(&sort.field), order);
    }
    if params.sort.as_ref().is_none_or(|s| s.field != M::PRIMARY_KEY) {
        query.order_by(Alias::new(M::PRIMARY_KEY), Order::Asc);
    }

    SqlStatement::from_built(query.build(SqliteQueryBuilder))
}

/// Plan an inline edit. Returns `None` when the edit assigns nothing.
pub fn update_row<M: TableModel>(edit: &EditForm) -> Result<Option<SqlStatement>, QueryError> {
    if edit.is_empty() {
        return Ok(None);
    }

    let mut query = Query::update().table(Alias::new(M::TABLE)).to_owned();
    for (field, value) in &edit.assignments {
        let value = match value {
            EditValue::Text(text) => Value::String(Some(text.clone())),
            EditValue::Integer(i) => Value::BigInt(Some(*i)),
            EditValue::Flag(flag) => Value::Bool(Some(*flag)),
        };
        query.value(Alias::new(field), value);
    }
    query.and_where(Expr::col(Alias::new(M::PRIMARY_KEY)).eq(key_value(&edit.id)));

    SqlStatement::from_built(query.build(SqliteQueryBuilder)).map(Some)
}

// =============================================================================
// TESTS
// =============================================================================

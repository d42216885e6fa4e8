//! # Request Parameters
//!
//! Translation of URL query strings and posted edit forms into typed
//! parameters. Only names declared by the [`TableView`] are honoured:
//! unknown filters and non-whitelisted sort fields are dropped here, before
//! any statement is planned.

use crate::error::ParamsError;
use crate::model::{FieldKind, TableModel};
use crate::view::{FilterKind, TableView};

/// Query parameter selecting the sort field (`-field` for descending).
pub const SORT_PARAM: &str = "sort";

/// Form field carrying the primary key of an edited row.
pub const ID_FIELD: &str = "id";

/// Prefix of form fields carrying edited column values.
pub const COLUMN_PREFIX: &str = "col_";

// =============================================================================
// RAW QUERY
// =============================================================================

/// A decoded query string, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Decode a raw query string (without the leading `?`).
    pub fn parse(raw: &str) -> Result<Self, ParamsError> {
        let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(raw)
            .map_err(|e| ParamsError::MalformedQuery(e.to_string()))?;
        Ok(Self { pairs })
    }

    /// First non-empty value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.as_str())
    }

    /// All pairs, in request order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// =============================================================================
// SORTING
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A validated sort request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Parse a `sort` value, keeping it only if the field is whitelisted.
    #[must_use]
    pub fn parse(view: &TableView, raw: &str) -> Option<Self> {
        let (field, direction) = match raw.strip_prefix('-') {
            Some(stripped) => (stripped, SortDirection::Desc),
            None => (raw, SortDirection::Asc),
        };
        view.is_sortable(field).then(|| Self {
            field: field.to_string(),
            direction,
        })
    }
}

// =============================================================================
// LIST PARAMETERS
// =============================================================================

/// Value an active filter restricts its field to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Dropdown choice, compared as given.
    Text(String),
    /// Ticked checkbox.
    Flag(bool),
}

/// A filter with a value chosen in this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFilter {
    pub field: String,
    pub value: FilterValue,
}

/// Everything a listing request asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub filters: Vec<ActiveFilter>,
    pub sort: Option<SortSpec>,
    preserved: Vec<(String, String)>,
}

impl ListParams {
    /// Extract filters and sort from a query, honouring only what the view
    /// declares.
    #[must_use]
    pub fn from_query(view: &TableView, query: &QueryParams) -> Self {
        let filters = view
            .filters
            .iter()
            .filter_map(|filter| {
                let raw = query.get(&filter.name)?;
                let value = match filter.kind {
                    FilterKind::Dropdown => FilterValue::Text(raw.to_string()),
                    FilterKind::Checkbox if is_truthy(raw) => FilterValue::Flag(true),
                    FilterKind::Checkbox => return None,
                };
                Some(ActiveFilter {
                    field: filter.name.clone(),
                    value,
                })
            })
            .collect();

        let sort = query
            .get(SORT_PARAM)
            .and_then(|raw| SortSpec::parse(view, raw));

        let mut preserved: Vec<(String, String)> = query
            .pairs()
            .iter()
            .filter(|(k, _)| k != SORT_PARAM)
            .cloned()
            .collect();
        // Stable: repeated keys keep their request order
        preserved.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            filters,
            sort,
            preserved,
        }
    }

    /// The active value for a filter, if any.
    #[must_use]
    pub fn filter_value(&self, name: &str) -> Option<&FilterValue> {
        self.filters
            .iter()
            .find(|f| f.field == name)
            .map(|f| &f.value)
    }

    /// The request query minus `sort`, keys sorted and re-encoded.
    #[must_use]
    pub fn preserved_query(&self) -> String {
        serde_urlencoded::to_string(&self.preserved).unwrap_or_default()
    }
}

/// Checkbox values that count as ticked.
fn is_truthy(raw: &str) -> bool {
    parse_flag(raw) == Some(true)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

// =============================================================================
// INLINE EDITS
// =============================================================================

/// A new field value, typed by the field's [`FieldKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditValue {
    Text(String),
    Integer(i64),
    Flag(bool),
}

impl EditValue {
    /// Parse `raw` as a value of `kind`.
    pub fn parse(field: &str, kind: FieldKind, raw: &str) -> Result<Self, ParamsError> {
        let parsed = match kind {
            FieldKind::Text => Some(Self::Text(raw.to_string())),
            FieldKind::Integer => raw.trim().parse().ok().map(Self::Integer),
            FieldKind::Bool => parse_flag(raw).map(Self::Flag),
        };
        parsed.ok_or_else(|| ParamsError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
            expected: kind,
        })
    }
}

/// A posted inline edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    /// Primary key of the edited row.
    pub id: String,
    /// `(field, new value)` pairs in column order.
    pub assignments: Vec<(String, EditValue)>,
}

impl EditForm {
    /// Build an edit from posted form pairs.
    ///
    /// Empty column values leave the field unchanged and the primary key is
    /// never assigned. A value that does not parse as its field's kind
    /// rejects the whole edit.
    pub fn from_pairs<M: TableModel>(
        view: &TableView,
        pairs: &[(String, String)],
    ) -> Result<Self, ParamsError> {
        let lookup = |key: &str| {
            pairs
                .iter()
                .find(|(k, v)| k == key && !v.is_empty())
                .map(|(_, v)| v.clone())
        };

        let id = lookup(ID_FIELD).ok_or(ParamsError::MissingId)?;

        let assignments = view
            .columns
            .iter()
            .filter(|c| c.field != M::PRIMARY_KEY)
            .filter_map(|c| {
                lookup(&format!("{COLUMN_PREFIX}{}", c.field)).map(|raw| {
                    EditValue::parse(&c.field, M::field_kind(&c.field), &raw)
                        .map(|value| (c.field.clone(), value))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { id, assignments })
    }

    /// Check whether the edit changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

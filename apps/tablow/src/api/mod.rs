//! # HTTP API
//!
//! axum routes serving table views.
//!
//! Each mounted table gets one path:
//!
//! ```text
//! GET  /users?name=Alice&sort=-age   filtered, sorted listing (full page)
//! POST /users?name=Alice             inline edit, then 303 back to the listing
//! ```
//!
//! `GET /` lists the mounted tables and `GET /health` answers with JSON.

mod error;
mod guard;

pub use error::{AUTH_REALM, ApiError, MountError};
pub use guard::{Credentials, EditGuard};

use crate::render::{IndexPage, TableLink, render_error, render_page, render_template};
use crate::store::Store;
use axum::{
    Form, Json, Router,
    extract::{OriginalUri, RawQuery, State, rejection::FormRejection},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde_json::json;
use sqlx::FromRow;
use sqlx::sqlite::SqliteRow;
use std::sync::Arc;
use tablow_core::{
    EditForm, ListParams, ParamsError, QueryParams, TableContext, TableModel, TableView, reflect,
    select_rows, update_row,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Paths served by the router itself.
const RESERVED_PATHS: &[&str] = &["/", "/health"];

/// Shared state of one mounted table.
struct TableState {
    store: Store,
    view: TableView,
    guard: Arc<EditGuard>,
}

/// Builder that mounts typed table views onto one router.
pub struct TableRouter {
    store: Store,
    guard: Arc<EditGuard>,
    router: Router,
    links: Vec<TableLink>,
}

impl TableRouter {
    /// Start a router over `store` with unguarded edits.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self::with_guard(store, EditGuard::open())
    }

    /// Start a router whose edits go through `guard`.
    #[must_use]
    pub fn with_guard(store: Store, guard: EditGuard) -> Self {
        Self {
            store,
            guard: Arc::new(guard),
            router: Router::new(),
            links: Vec::new(),
        }
    }

    /// Mount `view` over model `M` at `path`.
    ///
    /// The view is validated against the model first. Editable views also
    /// accept `POST` at the same path.
    pub fn table<M>(mut self, path: &str, view: TableView) -> Result<Self, MountError>
    where
        M: TableModel + for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static,
    {
        if !path.starts_with('/') || path.contains(['{', '}', '*']) {
            return Err(MountError::InvalidPath(path.to_string()));
        }
        if RESERVED_PATHS.contains(&path) {
            return Err(MountError::ReservedPath(path.to_string()));
        }
        if self.links.iter().any(|l| l.path == path) {
            return Err(MountError::DuplicatePath(path.to_string()));
        }
        view.validate::<M>()?;

        tracing::info!(
            path,
            table = M::TABLE,
            title = %view.name,
            editable = view.editable,
            "mounting table view"
        );

        self.links.push(TableLink {
            title: view.name.clone(),
            path: path.to_string(),
            editable: view.editable,
        });

        let editable = view.editable;
        let state = Arc::new(TableState {
            store: self.store.clone(),
            view,
            guard: Arc::clone(&self.guard),
        });

        let mut route = get(list_rows::<M>);
        if editable {
            route = route.post(edit_row::<M>);
        }
        self.router = self.router.route(path, route.with_state(state));
        Ok(self)
    }

    /// Finish the router: index page, health check and request tracing.
    pub fn into_router(self) -> Router {
        let links = Arc::new(self.links);
        self.router
            .route("/", get(index).with_state(links))
            .route("/health", get(health))
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn index(State(links): State<Arc<Vec<TableLink>>>) -> Response {
    render_template(IndexPage { tables: &links })
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Filtered, sorted listing.
async fn list_rows<M>(
    State(state): State<Arc<TableState>>,
    RawQuery(raw): RawQuery,
) -> Result<Response, ApiError>
where
    M: TableModel + for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static,
{
    let query = QueryParams::parse(raw.as_deref().unwrap_or_default())?;
    let params = ListParams::from_query(&state.view, &query);
    let statement = select_rows::<M>(&params)?;

    let rows: Vec<M> = state.store.fetch(&statement).await.map_err(ApiError::Fetch)?;
    let records = rows.iter().map(reflect).collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(table = M::TABLE, rows = records.len(), "rows fetched");

    let table = TableContext::build::<M>(&state.view, &params, &records);
    Ok(match render_page(&table) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(table = M::TABLE, "Template rendering failed: {}", e);
            render_error(StatusCode::INTERNAL_SERVER_ERROR, "Template rendering error")
        }
    })
}

/// Inline edit of one row, answered with a redirect back to the listing.
async fn edit_row<M>(
    State(state): State<Arc<TableState>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Result<Redirect, ApiError>
where
    M: TableModel + for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static,
{
    state.guard.check(&headers)?;
    let Form(pairs) = form.map_err(|e| ParamsError::MalformedForm(e.body_text()))?;

    let edit = EditForm::from_pairs::<M>(&state.view, &pairs)?;
    tracing::debug!(
        table = M::TABLE,
        id = %edit.id,
        assignments = ?edit.assignments,
        "update data"
    );

    if let Some(statement) = update_row::<M>(&edit)? {
        let affected = state
            .store
            .execute(&statement)
            .await
            .map_err(ApiError::Update)?;
        if affected == 0 {
            tracing::warn!(table = M::TABLE, id = %edit.id, "edit matched no row");
        }
    }

    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    Ok(Redirect::to(&target))
}

//! # Rendering
//!
//! askama templates for tables, pages and errors, plus helpers that turn a
//! render failure into a logged 500 instead of a panic.
//!
//! Every interpolated value is HTML-escaped by askama; the only `safe`
//! interpolation is a fragment this module rendered itself.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tablow_core::TableContext;

// =============================================================================
// TEMPLATES
// =============================================================================

/// The filter form and table of one view, embeddable in any page.
#[derive(Template)]
#[template(path = "table.html")]
pub struct TableFragment<'a> {
    pub table: &'a TableContext,
}

/// A full HTML document around a rendered fragment.
#[derive(Template)]
#[template(path = "page.html")]
pub struct TablePage<'a> {
    pub title: &'a str,
    pub fragment: &'a str,
}

/// Link entry on the index page.
#[derive(Debug, Clone)]
pub struct TableLink {
    pub title: String,
    pub path: String,
    pub editable: bool,
}

/// Lists every mounted table.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage<'a> {
    pub tables: &'a [TableLink],
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage<'a> {
    pub message: &'a str,
}

// =============================================================================
// HELPERS
// =============================================================================

/// Render one table as an HTML fragment.
pub fn render_fragment(table: &TableContext) -> askama::Result<String> {
    TableFragment { table }.render()
}

/// Render one table wrapped in a full page.
pub fn render_page(table: &TableContext) -> askama::Result<String> {
    let fragment = render_fragment(table)?;
    TablePage {
        title: &table.title,
        fragment: &fragment,
    }
    .render()
}

/// Render a template, logging and degrading to an error page on failure.
pub fn render_template<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template rendering failed: {}", e);
            render_error(StatusCode::INTERNAL_SERVER_ERROR, "Template rendering error")
        }
    }
}

/// Render an error page with `status`, falling back to plain text.
pub fn render_error(status: StatusCode, message: &str) -> Response {
    match (ErrorPage { message }).render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error view: {}", e);
            (status, message.to_string()).into_response()
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! HTTP error mapping.

use crate::render::render_error;
use crate::store::StoreError;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tablow_core::{ParamsError, TablowError, ViewError};
use thiserror::Error;

/// Realm announced when edit credentials are required.
pub const AUTH_REALM: &str = r#"Basic realm="tablow""#;

/// A table view that cannot be mounted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    #[error(transparent)]
    View(#[from] ViewError),

    #[error("mount path '{0}' must start with '/' and contain no route captures")]
    InvalidPath(String),

    #[error("mount path '{0}' is served by the router itself")]
    ReservedPath(String),

    #[error("a table is already mounted at '{0}'")]
    DuplicatePath(String),
}

/// Errors surfaced by the table handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Too many edits, try again shortly")]
    RateLimited,

    #[error("Failed to fetch data: {0}")]
    Fetch(#[source] StoreError),

    #[error("Failed to update record: {0}")]
    Update(#[source] StoreError),

    #[error(transparent)]
    Core(#[from] TablowError),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Params(_) | Self::Core(TablowError::Params(_)) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Fetch(_) | Self::Update(_) | Self::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<tablow_core::QueryError> for ApiError {
    fn from(err: tablow_core::QueryError) -> Self {
        Self::Core(err.into())
    }
}

impl From<tablow_core::ModelError> for ApiError {
    fn from(err: tablow_core::ModelError) -> Self {
        Self::Core(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        let mut response = render_error(status, &self.to_string());
        if matches!(self, Self::Unauthorized) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(AUTH_REALM));
        }
        response
    }
}

//! # Command Line Interface
//!
//! `tablow serve` runs the demo admin tables; `tablow plan` prints the SQL a
//! query string would produce against the demo view.

use crate::api::{Credentials, EditGuard, MountError, TableRouter};
use crate::demo::{self, User};
use crate::store::{MEMORY_URL, Store, StoreError};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use tablow_core::{ListParams, QueryParams, TablowError, select_rows};
use thiserror::Error;

/// CLI failures.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Mount(#[from] MountError),

    #[error(transparent)]
    Core(#[from] TablowError),

    #[error("invalid --edit-credentials, expected 'user:password'")]
    InvalidCredentials,

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Parser)]
#[command(name = "tablow", version, about = "HTML admin tables over SQLite")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the demo table views over HTTP.
    Serve(ServeArgs),
    /// Print the SQL planned for a query string against the demo view.
    Plan {
        /// Query string without the leading '?', e.g. "name=Alice&sort=-age".
        #[arg(default_value = "")]
        query: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "TABLOW_BIND", default_value = "127.0.0.1")]
    pub bind: std::net::IpAddr,

    /// Port to listen on.
    #[arg(long, env = "TABLOW_PORT", default_value_t = 8080)]
    pub port: u16,

    /// SQLite database URL.
    #[arg(long, env = "TABLOW_DATABASE_URL", default_value = MEMORY_URL)]
    pub database_url: String,

    /// Do not create or seed the demo table.
    #[arg(long, env = "TABLOW_NO_SEED")]
    pub no_seed: bool,

    /// Mount only the read-only view.
    #[arg(long, env = "TABLOW_READ_ONLY")]
    pub read_only: bool,

    /// Require HTTP Basic credentials ('user:password') for edits.
    #[arg(long, env = "TABLOW_EDIT_CREDENTIALS", hide_env_values = true)]
    pub edit_credentials: Option<String>,

    /// Maximum inline edits per second across all tables.
    #[arg(long, env = "TABLOW_EDIT_RATE_LIMIT")]
    pub edit_rate_limit: Option<NonZeroU32>,
}

impl ServeArgs {
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Build the edit guard described by the flags.
    pub fn edit_guard(&self) -> Result<EditGuard, CliError> {
        let mut guard = EditGuard::open();
        if let Some(raw) = &self.edit_credentials {
            let credentials = Credentials::parse(raw).ok_or(CliError::InvalidCredentials)?;
            guard = guard.with_credentials(credentials);
        }
        if let Some(limit) = self.edit_rate_limit {
            guard = guard.with_rate_limit(limit);
        }
        Ok(guard)
    }
}

/// Assemble the demo router over `store`.
pub fn demo_router(
    store: Store,
    guard: EditGuard,
    read_only: bool,
) -> Result<axum::Router, CliError> {
    let mut router =
        TableRouter::with_guard(store, guard).table::<User>("/users", demo::users_view())?;
    if !read_only {
        router = router.table::<User>("/users/edit", demo::editable_users_view())?;
    }
    Ok(router.into_router())
}

/// Run the HTTP server until Ctrl-C.
pub async fn cmd_serve(args: ServeArgs) -> Result<(), CliError> {
    let guard = args.edit_guard()?;
    let store = Store::connect(&args.database_url).await?;
    if !args.no_seed {
        demo::install(&store).await?;
    }

    if guard.requires_credentials() {
        tracing::info!("inline edits require credentials");
    }
    let app = demo_router(store, guard, args.read_only)?;

    let addr = args.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server is running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Plan the demo listing for `query` and describe it.
pub fn cmd_plan(query: &str) -> Result<String, CliError> {
    let view = demo::users_view();
    let query = QueryParams::parse(query).map_err(TablowError::from)?;
    let params = ListParams::from_query(&view, &query);
    let statement = select_rows::<User>(&params).map_err(TablowError::from)?;

    let mut output = format!("{}\n", statement.sql);
    for (i, param) in statement.params.iter().enumerate() {
        output.push_str(&format!("  ?{} = {:?}\n", i + 1, param));
    }
    Ok(output)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

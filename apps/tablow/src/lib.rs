//! # Tablow Library
//!
//! This library exposes the Tablow modules for testing and embedding.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod cli;
pub mod demo;
pub mod render;
pub mod store;

// Re-export tablow_core for convenience
pub use tablow_core;

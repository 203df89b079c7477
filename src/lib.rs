//! Bookwise
//!
//! A REST JSON API over a single table of books. Updates use optimistic
//! concurrency: every book carries a `version`, and a write only lands if the
//! stored version is still the one the writer read.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}

//! In-memory chat session service.
//!
//! Clients create sessions (conversation containers identified by a numeric
//! id and owning user) and append or retrieve ordered, role-tagged messages
//! within a session. Everything lives in process memory; state is discarded
//! on exit.
//!
//! # Architecture
//!
//! - **Server**: Axum-based HTTP server, thin validation glue over the stores
//! - **Stores**: [`store::SessionStore`] (registry) and [`store::ChatStore`]
//!   (per-session message log), independent of each other and injected into
//!   handlers via [`AppState`]
//!
//! # Modules
//!
//! - [`config`]: Layered configuration (defaults, file, env, CLI)
//! - [`error`]: API error taxonomy and HTTP mapping
//! - [`server`]: Router construction and request handlers
//! - [`store`]: The in-memory stores

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod config;
pub mod error;
pub mod server;
pub mod store;

use store::{ChatStore, SessionStore};

/// Application state shared across all handlers.
///
/// The stores are owned here, at the composition root, and handed to the
/// router. Tests build a fresh state per case for isolation.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Session registry.
    pub sessions: SessionStore,
    /// Per-session message logs.
    pub chats: ChatStore,
}

impl AppState {
    /// Create a state with empty stores.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: SessionStore::new(),
            chats: ChatStore::new(),
        }
    }
}

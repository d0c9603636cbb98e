//! REST API service for the todo task tracker.
//!
//! # Overview
//! JSON endpoints over a single SQLite `todos` table, plus the OpenAPI
//! document at `/openapi` and an interactive docs page at `/docs`. Rows are
//! soft-deleted and restorable; creation happens at the storage layer only.
//!
//! # Design
//! - `app(state)` builds the router; the binary and every test go through it.
//! - Handlers validate ids and bodies before touching storage, and every
//!   failure shares one JSON error envelope (see [`error`]).
//! - List responses share one envelope shape, mutations another (see
//!   [`model`]).
//! - Unknown routes and unsupported methods get a plain-text 404, not the
//!   JSON envelope.

pub mod classify;
pub mod error;
pub mod handlers;
pub mod model;
pub mod openapi;
pub mod store;

pub use error::ApiError;
pub use model::{Todo, TodoStatus};
pub use store::{StoreError, TodoStore};

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

/// Shared application state: the storage handle.
///
/// The handle is optional so a process whose database binding is missing
/// degrades to per-request 500s ("DB binding is not available") instead of
/// refusing to boot. `Default` is the unbound state; `main` always binds one.
#[derive(Clone, Default)]
pub struct AppState {
    store: Option<Arc<TodoStore>>,
}

impl AppState {
    pub fn new(store: Arc<TodoStore>) -> Self {
        Self { store: Some(store) }
    }

    /// The storage handle, or the connection-failed error for `endpoint`.
    pub(crate) fn store(&self, endpoint: &'static str) -> Result<&TodoStore, ApiError> {
        self.store
            .as_deref()
            .ok_or_else(|| ApiError::unavailable(endpoint))
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/todos", get(handlers::list_todos))
        .route("/doing", get(handlers::list_doing))
        .route("/done", get(handlers::list_done))
        .route("/todos/deleted", get(handlers::list_deleted))
        .route("/todos/recent-updates", get(handlers::recent_updates))
        .route(
            "/todos/{id}",
            post(handlers::update_todo).delete(handlers::delete_todo),
        )
        .route("/todos/{id}/restore", post(handlers::restore_todo))
        .route("/openapi", get(openapi_document))
        .route("/docs", get(docs_page))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .with_state(state)
}

/// Serve `app` on the given listener.
pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn openapi_document() -> impl IntoResponse {
    axum::Json(openapi::document())
}

async fn docs_page() -> impl IntoResponse {
    Html(include_str!("web/docs.html"))
}

// Unmatched paths and unsupported methods share this, so a POST to /todos
// (which has no create route) answers exactly like an unknown path.
async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Custom 404 Message")
}

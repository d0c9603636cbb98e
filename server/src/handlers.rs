//! HTTP handlers for the todo API.
//!
//! Each handler owns a route-template const so error envelopes can name the
//! endpoint. Update bodies arrive as raw strings and go through
//! `parse_update_request` before any storage call; extractor rejections
//! never shape the error responses.

use axum::extract::{Path, Query, State};
use axum::Json;

use crate::error::ApiError;
use crate::model::{
    self, ListEnvelope, MutationEnvelope, RecentQuery, TodoStatus, UpdateRejection,
};
use crate::AppState;

// --- lists ---

pub async fn list_todos(State(state): State<AppState>) -> Result<Json<ListEnvelope>, ApiError> {
    const ENDPOINT: &str = "/todos";
    let store = state.store(ENDPOINT)?;
    let data = store
        .list_active(None)
        .map_err(|e| ApiError::storage(ENDPOINT, e))?;
    Ok(Json(ListEnvelope::new("Todos retrieved successfully", data)))
}

pub async fn list_doing(State(state): State<AppState>) -> Result<Json<ListEnvelope>, ApiError> {
    const ENDPOINT: &str = "/doing";
    let store = state.store(ENDPOINT)?;
    let data = store
        .list_active(Some(TodoStatus::Doing))
        .map_err(|e| ApiError::storage(ENDPOINT, e))?;
    Ok(Json(ListEnvelope::new(
        "Doing todos retrieved successfully",
        data,
    )))
}

pub async fn list_done(State(state): State<AppState>) -> Result<Json<ListEnvelope>, ApiError> {
    const ENDPOINT: &str = "/done";
    let store = state.store(ENDPOINT)?;
    let data = store
        .list_active(Some(TodoStatus::Done))
        .map_err(|e| ApiError::storage(ENDPOINT, e))?;
    Ok(Json(ListEnvelope::new(
        "Done todos retrieved successfully",
        data,
    )))
}

pub async fn list_deleted(State(state): State<AppState>) -> Result<Json<ListEnvelope>, ApiError> {
    const ENDPOINT: &str = "/todos/deleted";
    let store = state.store(ENDPOINT)?;
    let data = store
        .list_deleted()
        .map_err(|e| ApiError::storage(ENDPOINT, e))?;
    Ok(Json(ListEnvelope::new(
        "Deleted todos retrieved successfully",
        data,
    )))
}

pub async fn recent_updates(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<ListEnvelope>, ApiError> {
    const ENDPOINT: &str = "/todos/recent-updates";
    let store = state.store(ENDPOINT)?;
    let data = store
        .recent_updates(query.limit(), query.days())
        .map_err(|e| ApiError::storage(ENDPOINT, e))?;
    Ok(Json(ListEnvelope::new(
        "Recent updated todos retrieved successfully",
        data,
    )))
}

// --- mutations ---

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> Result<Json<MutationEnvelope>, ApiError> {
    const ENDPOINT: &str = "/todos/:id";

    let (id, fields) = model::parse_update_request(&id, &body)
        .map_err(|rejection| update_rejection(ENDPOINT, rejection))?;
    let store = state.store(ENDPOINT)?;

    let updated = store
        .apply_update(id, &fields)
        .map_err(|e| ApiError::storage(ENDPOINT, e))?
        .ok_or_else(|| ApiError::not_found(ENDPOINT, id))?;

    tracing::info!(id, "todo updated");
    Ok(Json(MutationEnvelope::new(
        "Todo updated successfully",
        updated,
    )))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MutationEnvelope>, ApiError> {
    const ENDPOINT: &str = "/todos/:id";

    let id = parse_id(ENDPOINT, &id)?;
    let store = state.store(ENDPOINT)?;

    let existing = store
        .find(id)
        .map_err(|e| ApiError::storage(ENDPOINT, e))?
        .ok_or_else(|| ApiError::not_found(ENDPOINT, id))?;
    if existing.is_deleted {
        return Err(ApiError::bad_request(
            ENDPOINT,
            "Todo already deleted",
            format!("Todo with ID {id} has already been deleted"),
        ));
    }

    // Check-then-write without a transaction: a racing second delete lands
    // as an overwrite of deleted_at, not a detected conflict.
    let deleted = store
        .mark_deleted(id)
        .map_err(|e| ApiError::storage(ENDPOINT, e))?
        .ok_or_else(|| ApiError::not_found(ENDPOINT, id))?;

    tracing::info!(id, "todo soft-deleted");
    Ok(Json(MutationEnvelope::new(
        "Todo deleted successfully",
        deleted,
    )))
}

pub async fn restore_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MutationEnvelope>, ApiError> {
    const ENDPOINT: &str = "/todos/:id/restore";

    let id = parse_id(ENDPOINT, &id)?;
    let store = state.store(ENDPOINT)?;

    let existing = store
        .find(id)
        .map_err(|e| ApiError::storage(ENDPOINT, e))?
        .ok_or_else(|| ApiError::not_found(ENDPOINT, id))?;
    if !existing.is_deleted {
        return Err(ApiError::bad_request(
            ENDPOINT,
            "Todo already restored",
            format!("Todo with ID {id} has already been restored"),
        ));
    }

    let restored = store
        .restore(id)
        .map_err(|e| ApiError::storage(ENDPOINT, e))?
        .ok_or_else(|| ApiError::not_found(ENDPOINT, id))?;

    tracing::info!(id, "todo restored");
    Ok(Json(MutationEnvelope::new(
        "Todo restored successfully",
        restored,
    )))
}

// --- helpers ---

/// Parse a path id, or the 400 pair every id-taking route shares.
fn parse_id(endpoint: &'static str, raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::bad_request(
            endpoint,
            "Invalid ID format",
            "Todo ID must be a valid number",
        )
    })
}

fn update_rejection(endpoint: &'static str, rejection: UpdateRejection) -> ApiError {
    let (error, details): (&'static str, String) = match rejection {
        UpdateRejection::InvalidJson(message) => ("Invalid JSON format", message),
        UpdateRejection::InvalidId => (
            "Invalid ID format",
            "Todo ID must be a valid number".to_string(),
        ),
        UpdateRejection::InvalidTitle => {
            ("Invalid title format", "Title must be a string".to_string())
        }
        UpdateRejection::InvalidStatus => (
            "Invalid status value",
            "Status must be one of: 'todo', 'doing', 'done'".to_string(),
        ),
        UpdateRejection::InvalidCompleted => (
            "Invalid completed format",
            "Completed must be a boolean".to_string(),
        ),
        UpdateRejection::Empty => (
            "Missing update data",
            "Either title or status must be provided for update".to_string(),
        ),
    };
    ApiError::bad_request(endpoint, error, details)
}

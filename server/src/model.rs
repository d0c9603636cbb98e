//! Domain model for the todo service.
//!
//! # Design
//! `Todo` maps 1:1 to the `todos` table and serializes with the camelCase
//! names the HTTP surface exposes. Update bodies are parsed into an explicit
//! `UpdateFields` value or a tagged `UpdateRejection` before any storage
//! call, so handlers never reach into raw JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TodoStatus
// ---------------------------------------------------------------------------

/// Workflow state of a task.
///
/// Independent of `completed`: the service stores whatever combination the
/// client sends, including `done` with `completed: false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    Todo,
    Doing,
    Done,
}

impl TodoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(Self::Todo),
            "doing" => Some(Self::Doing),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Todo — the row type, maps 1:1 to SQL columns
// ---------------------------------------------------------------------------

/// A single task row.
///
/// Timestamps are RFC 3339 strings on the wire and unix milliseconds in SQL;
/// the store does the conversion. `deleted_at` serializes as `null` for
/// active rows rather than being omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub status: TodoStatus,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

/// Envelope for every list endpoint: `{ message, data, count, timestamp }`.
#[derive(Debug, Serialize)]
pub struct ListEnvelope {
    pub message: &'static str,
    pub data: Vec<Todo>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

impl ListEnvelope {
    pub fn new(message: &'static str, data: Vec<Todo>) -> Self {
        Self {
            message,
            count: data.len(),
            data,
            timestamp: Utc::now(),
        }
    }
}

/// Envelope for every mutation: `{ message, data, timestamp }`.
#[derive(Debug, Serialize)]
pub struct MutationEnvelope {
    pub message: &'static str,
    pub data: Todo,
    pub timestamp: DateTime<Utc>,
}

impl MutationEnvelope {
    pub fn new(message: &'static str, data: Todo) -> Self {
        Self {
            message,
            data,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Update body validation
// ---------------------------------------------------------------------------

/// A validated `POST /todos/:id` body: the fields to write.
///
/// At least one field is present — `parse_update_request` rejects the empty
/// case before one of these is ever constructed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateFields {
    pub title: Option<String>,
    pub status: Option<TodoStatus>,
    pub completed: Option<bool>,
}

/// Why an update request was rejected. Each variant maps to its own 400 pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateRejection {
    /// The body was not parseable JSON; carries the parser's message.
    InvalidJson(String),
    /// The path id is not a number.
    InvalidId,
    /// `title` present but not a string.
    InvalidTitle,
    /// `status` present but not one of todo/doing/done.
    InvalidStatus,
    /// `completed` present but not a boolean.
    InvalidCompleted,
    /// None of the three updatable fields present.
    Empty,
}

/// Parse and validate a raw update request.
///
/// Checks run in the documented order: JSON syntax, then the id, then each
/// field's type, then the at-least-one-field rule. Presence means the key
/// exists, not that its value is truthy — `{"title": ""}` is a valid update
/// that sets an empty title. A non-object body has no fields and lands on
/// `Empty`.
pub fn parse_update_request(
    raw_id: &str,
    raw_body: &str,
) -> Result<(i64, UpdateFields), UpdateRejection> {
    let body: serde_json::Value =
        serde_json::from_str(raw_body).map_err(|e| UpdateRejection::InvalidJson(e.to_string()))?;

    let id: i64 = raw_id.parse().map_err(|_| UpdateRejection::InvalidId)?;

    let title = match body.get("title") {
        None => None,
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(UpdateRejection::InvalidTitle),
    };

    let status = match body.get("status") {
        None => None,
        Some(v) => Some(
            v.as_str()
                .and_then(TodoStatus::from_str)
                .ok_or(UpdateRejection::InvalidStatus)?,
        ),
    };

    let completed = match body.get("completed") {
        None => None,
        Some(serde_json::Value::Bool(b)) => Some(*b),
        Some(_) => return Err(UpdateRejection::InvalidCompleted),
    };

    if title.is_none() && status.is_none() && completed.is_none() {
        return Err(UpdateRejection::Empty);
    }

    Ok((
        id,
        UpdateFields {
            title,
            status,
            completed,
        },
    ))
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

pub const DEFAULT_RECENT_LIMIT: i64 = 10;
pub const DEFAULT_RECENT_DAYS: i64 = 7;

/// Query parameters for `GET /todos/recent-updates`.
///
/// Both arrive as raw strings and fall back to their defaults when missing
/// or non-numeric — an unparseable value is never an error.
#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub days: Option<String>,
}

impl RecentQuery {
    pub fn limit(&self) -> i64 {
        parse_or(self.limit.as_deref(), DEFAULT_RECENT_LIMIT)
    }

    pub fn days(&self) -> i64 {
        parse_or(self.days.as_deref(), DEFAULT_RECENT_DAYS)
    }
}

fn parse_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(default)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

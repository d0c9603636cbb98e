//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the server's wire format but are defined independently,
//! so this crate stays decoupled from the server's internals. Integration
//! tests catch any schema drift between the two crates. Timestamps stay as
//! RFC 3339 strings; the UI only displays them.

use serde::{Deserialize, Serialize};

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub status: String,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

/// Request payload for creating a new todo.
///
/// The server exposes no matching route, so sending this lands on the
/// unknown-route 404. The UI still offers the action and surfaces the
/// failure inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Envelope for every list endpoint: `{ message, data, count, timestamp }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListEnvelope {
    pub message: String,
    pub data: Vec<Todo>,
    pub count: usize,
    pub timestamp: String,
}

/// Envelope for every mutation: `{ message, data, timestamp }`.
#[derive(Debug, Clone, Deserialize)]
pub struct MutationEnvelope {
    pub message: String,
    pub data: Todo,
    pub timestamp: String,
}

/// The server's error envelope: `{ error, details, timestamp, endpoint }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
    pub timestamp: String,
    pub endpoint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_deserializes_wire_names() {
        let todo: Todo = serde_json::from_str(
            r#"{
                "id": 3,
                "title": "Buy milk",
                "status": "doing",
                "completed": false,
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-02T00:00:00Z",
                "deletedAt": null,
                "isDeleted": false
            }"#,
        )
        .unwrap();
        assert_eq!(todo.id, 3);
        assert_eq!(todo.status, "doing");
        assert!(todo.deleted_at.is_none());
        assert!(!todo.is_deleted);
    }

    #[test]
    fn update_todo_omits_absent_fields() {
        let input = UpdateTodo {
            title: None,
            completed: Some(true),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("title").is_none());
        assert_eq!(json["completed"], true);
    }

    #[test]
    fn error_body_parses_envelope() {
        let body: ErrorBody = serde_json::from_str(
            r#"{
                "error": "Todo not found",
                "details": "Todo with ID 9 does not exist",
                "timestamp": "2024-01-01T00:00:00Z",
                "endpoint": "/todos/:id"
            }"#,
        )
        .unwrap();
        assert_eq!(body.error, "Todo not found");
        assert_eq!(body.endpoint, "/todos/:id");
    }
}

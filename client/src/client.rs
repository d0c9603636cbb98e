//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a parse method that consumes an `HttpResponse`. The
//! caller executes the actual HTTP round-trip, keeping the library
//! deterministic and free of I/O dependencies.
//!
//! The server wraps every list in one envelope shape and every mutation in
//! another, so one `parse_list` serves the five list endpoints and one
//! `parse_mutation` serves update, delete and restore.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, ErrorBody, ListEnvelope, MutationEnvelope, Todo, UpdateTodo};

/// Synchronous, stateless client for the todo API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        self.get(format!("{}/todos", self.base_url))
    }

    pub fn build_list_doing(&self) -> HttpRequest {
        self.get(format!("{}/doing", self.base_url))
    }

    pub fn build_list_done(&self) -> HttpRequest {
        self.get(format!("{}/done", self.base_url))
    }

    pub fn build_list_deleted(&self) -> HttpRequest {
        self.get(format!("{}/todos/deleted", self.base_url))
    }

    /// `limit` and `days` are appended only when given; the server falls
    /// back to its defaults (10 rows, 7 days) for absent parameters.
    pub fn build_recent_updates(&self, limit: Option<i64>, days: Option<i64>) -> HttpRequest {
        let mut params = Vec::new();
        if let Some(limit) = limit {
            params.push(format!("limit={limit}"));
        }
        if let Some(days) = days {
            params.push(format!("days={days}"));
        }
        let path = if params.is_empty() {
            format!("{}/todos/recent-updates", self.base_url)
        } else {
            format!("{}/todos/recent-updates?{}", self.base_url, params.join("&"))
        };
        self.get(path)
    }

    /// The server has no create route; executing this request produces the
    /// plain 404 that `parse_mutation` maps to [`ApiError::NotFound`].
    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/todos", self.base_url),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_update_todo(&self, id: i64, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/todos/{id}", self.base_url),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_delete_todo(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/todos/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_restore_todo(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/todos/{id}/restore", self.base_url),
            headers: json_headers(),
            body: None,
        }
    }

    /// Parse any list response into its rows.
    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        let envelope: ListEnvelope = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        Ok(envelope.data)
    }

    /// Parse any mutation response into the written row.
    pub fn parse_mutation(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        let envelope: MutationEnvelope = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        Ok(envelope.data)
    }

    fn get(&self, path: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: Vec::new(),
            body: None,
        }
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

/// Map non-success status codes to the appropriate `ApiError` variant.
///
/// The server's error envelope wins when it parses, even on 404 — an update
/// against a missing id still carries `error`/`details`. A bare 404 means
/// the route itself does not exist.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if let Ok(body) = serde_json::from_str::<ErrorBody>(&response.body) {
        return Err(ApiError::Api {
            status: response.status,
            error: body.error,
            details: body.details,
        });
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:8787")
    }

    fn list_body(rows: &str) -> String {
        format!(
            r#"{{"message":"ok","data":{rows},"count":1,"timestamp":"2024-01-01T00:00:00Z"}}"#
        )
    }

    const ROW: &str = r#"{"id":1,"title":"Test","status":"todo","completed":false,"createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z","deletedAt":null,"isDeleted":false}"#;

    #[test]
    fn build_list_todos_produces_correct_request() {
        let req = client().build_list_todos();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8787/todos");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_status_lists_hit_their_routes() {
        assert_eq!(client().build_list_doing().path, "http://localhost:8787/doing");
        assert_eq!(client().build_list_done().path, "http://localhost:8787/done");
        assert_eq!(
            client().build_list_deleted().path,
            "http://localhost:8787/todos/deleted"
        );
    }

    #[test]
    fn build_recent_updates_appends_present_params() {
        let req = client().build_recent_updates(None, None);
        assert_eq!(req.path, "http://localhost:8787/todos/recent-updates");

        let req = client().build_recent_updates(Some(5), Some(30));
        assert_eq!(
            req.path,
            "http://localhost:8787/todos/recent-updates?limit=5&days=30"
        );

        let req = client().build_recent_updates(None, Some(30));
        assert_eq!(req.path, "http://localhost:8787/todos/recent-updates?days=30");
    }

    #[test]
    fn build_create_todo_produces_correct_request() {
        let input = CreateTodo {
            title: "Buy milk".to_string(),
        };
        let req = client().build_create_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8787/todos");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Buy milk");
    }

    #[test]
    fn build_update_todo_omits_absent_fields() {
        let input = UpdateTodo {
            title: Some("Updated".to_string()),
            completed: None,
        };
        let req = client().build_update_todo(3, &input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8787/todos/3");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Updated");
        assert!(body.get("completed").is_none());
    }

    #[test]
    fn build_delete_and_restore_produce_correct_requests() {
        let req = client().build_delete_todo(7);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:8787/todos/7");
        assert!(req.body.is_none());

        let req = client().build_restore_todo(7);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8787/todos/7/restore");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_list_unwraps_envelope() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: list_body(&format!("[{ROW}]")),
        };
        let todos = client().parse_list(response).unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Test");
    }

    #[test]
    fn parse_mutation_unwraps_envelope() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: format!(
                r#"{{"message":"Todo updated successfully","data":{ROW},"timestamp":"2024-01-01T00:00:00Z"}}"#
            ),
        };
        let todo = client().parse_mutation(response).unwrap();
        assert_eq!(todo.id, 1);
    }

    #[test]
    fn error_envelope_parses_into_api_variant() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: r#"{"error":"Todo not found","details":"Todo with ID 9 does not exist","timestamp":"2024-01-01T00:00:00Z","endpoint":"/todos/:id"}"#.to_string(),
        };
        let err = client().parse_mutation(response).unwrap_err();
        match err {
            ApiError::Api {
                status,
                error,
                details,
            } => {
                assert_eq!(status, 404);
                assert_eq!(error, "Todo not found");
                assert_eq!(details, "Todo with ID 9 does not exist");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bare_404_is_not_found() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: "Custom 404 Message".to_string(),
        };
        let err = client().parse_mutation(response).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn unexpected_status_without_envelope_is_http_error() {
        let response = HttpResponse {
            status: 502,
            headers: Vec::new(),
            body: "bad gateway".to_string(),
        };
        let err = client().parse_list(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 502, .. }));
    }

    #[test]
    fn parse_list_bad_json() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: "not json".to_string(),
        };
        let err = client().parse_list(response).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:8787/");
        let req = client.build_list_todos();
        assert_eq!(req.path, "http://localhost:8787/todos");
    }
}

//! The OpenAPI 3.0 document served at `/openapi`.
//!
//! Hand-maintained alongside the handlers. Shared schema fragments keep the
//! per-path entries short; every list shares one envelope and every failure
//! shares one error shape, same as the responses themselves.

use serde_json::{json, Value};

fn todo_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "integer" },
            "title": { "type": "string" },
            "status": { "type": "string", "enum": ["todo", "doing", "done"] },
            "completed": { "type": "boolean" },
            "createdAt": { "type": "string", "format": "date-time" },
            "updatedAt": { "type": "string", "format": "date-time" },
            "deletedAt": { "type": "string", "format": "date-time", "nullable": true },
            "isDeleted": { "type": "boolean" }
        }
    })
}

fn list_envelope_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "message": { "type": "string" },
            "data": { "type": "array", "items": todo_schema() },
            "count": { "type": "integer" },
            "timestamp": { "type": "string", "format": "date-time" }
        }
    })
}

fn mutation_envelope_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "message": { "type": "string" },
            "data": todo_schema(),
            "timestamp": { "type": "string", "format": "date-time" }
        }
    })
}

fn error_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "error": { "type": "string" },
            "details": { "type": "string" },
            "timestamp": { "type": "string", "format": "date-time" },
            "endpoint": { "type": "string" }
        }
    })
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn list_operation(summary: &str, description: &str) -> Value {
    json!({
        "summary": summary,
        "description": description,
        "responses": {
            "200": json_response("Success", list_envelope_schema()),
            "500": json_response("Server error", error_schema())
        }
    })
}

fn id_parameter(description: &str) -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": description,
        "schema": { "type": "integer" }
    })
}

/// The complete document.
pub fn document() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Todo API",
            "version": "1.0.0",
            "description": "REST API for the todo task tracker"
        },
        "paths": {
            "/todos": {
                "get": list_operation("List all active todos", "Returns every todo that is not soft-deleted")
            },
            "/doing": {
                "get": list_operation("List todos in progress", "Returns active todos whose status is 'doing'")
            },
            "/done": {
                "get": list_operation("List finished todos", "Returns active todos whose status is 'done'")
            },
            "/todos/{id}": {
                "post": {
                    "summary": "Update a todo",
                    "description": "Applies the supplied fields to one todo; omitted fields stay unchanged",
                    "parameters": [id_parameter("ID of the todo to update")],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "properties": {
                                        "title": { "type": "string" },
                                        "status": { "type": "string", "enum": ["todo", "doing", "done"] },
                                        "completed": { "type": "boolean" }
                                    },
                                    "anyOf": [
                                        { "required": ["title"] },
                                        { "required": ["status"] },
                                        { "required": ["completed"] }
                                    ],
                                    "description": "At least one of title, status or completed is required"
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": json_response("Updated", mutation_envelope_schema()),
                        "400": json_response("Validation error", error_schema()),
                        "404": json_response("Todo not found", error_schema()),
                        "500": json_response("Server error", error_schema())
                    }
                },
                "delete": {
                    "summary": "Soft-delete a todo",
                    "description": "Marks one todo deleted; the row is kept and can be restored",
                    "parameters": [id_parameter("ID of the todo to delete")],
                    "responses": {
                        "200": json_response("Deleted", mutation_envelope_schema()),
                        "400": json_response("Validation error or already deleted", error_schema()),
                        "404": json_response("Todo not found", error_schema()),
                        "500": json_response("Server error", error_schema())
                    }
                }
            },
            "/todos/deleted": {
                "get": list_operation("List soft-deleted todos", "Returns every todo currently marked deleted")
            },
            "/todos/{id}/restore": {
                "post": {
                    "summary": "Restore a soft-deleted todo",
                    "description": "Clears the deleted mark and bumps the todo's update time",
                    "parameters": [id_parameter("ID of the todo to restore")],
                    "responses": {
                        "200": json_response("Restored", mutation_envelope_schema()),
                        "400": json_response("Validation error or not deleted", error_schema()),
                        "404": json_response("Todo not found", error_schema()),
                        "500": json_response("Server error", error_schema())
                    }
                }
            },
            "/todos/recent-updates": {
                "get": {
                    "summary": "List recently updated todos",
                    "description": "Returns active todos updated within the given window, newest first",
                    "parameters": [
                        {
                            "name": "limit",
                            "in": "query",
                            "required": false,
                            "description": "Maximum number of rows (default: 10)",
                            "schema": { "type": "integer", "default": 10 }
                        },
                        {
                            "name": "days",
                            "in": "query",
                            "required": false,
                            "description": "Window size in days (default: 7)",
                            "schema": { "type": "integer", "default": 7 }
                        }
                    ],
                    "responses": {
                        "200": json_response("Success", list_envelope_schema()),
                        "500": json_response("Server error", error_schema())
                    }
                }
            }
        }
    })
}

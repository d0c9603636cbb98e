//! End-to-end tests against a live todo server.
//!
//! # Design
//! Starts the real server on a random port with a seeded in-memory store,
//! then exercises the client's build/parse pairs over actual HTTP using
//! ureq. This is also what catches schema drift between the two crates'
//! independently defined DTOs.

use std::sync::Arc;

use todo_client::{
    ApiError, CreateTodo, HttpMethod, HttpResponse, Mutation, QueryCache, TodoClient, UpdateTodo,
    QUERY_DELETED_TODOS, QUERY_TODOS,
};
use todo_server::{AppState, TodoStatus, TodoStore};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the client
/// library handle status interpretation.
fn execute(req: todo_client::HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => agent
            .post(&req.path)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

/// Start the server on a random port and return its base URL.
fn start_server(store: Arc<TodoStore>) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            todo_server::run(listener, AppState::new(store)).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn soft_delete_lifecycle() {
    let store = Arc::new(TodoStore::open_in_memory().unwrap());
    let seeded = store.insert("Integration test", TodoStatus::Todo, false).unwrap();
    let client = TodoClient::new(&start_server(Arc::clone(&store)));
    let id = seeded.id;

    // The seeded row is visible and active.
    let todos = client.parse_list(execute(client.build_list_todos())).unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, id);
    assert!(!todos[0].is_deleted);
    assert!(todos[0].deleted_at.is_none());
    let updated_at_before = todos[0].updated_at.clone();

    // Delete: the row moves wholesale from one list to the other.
    let deleted = client.parse_mutation(execute(client.build_delete_todo(id))).unwrap();
    assert!(deleted.is_deleted);
    assert!(deleted.deleted_at.is_some());

    let active = client.parse_list(execute(client.build_list_todos())).unwrap();
    assert!(active.is_empty());
    let bin = client.parse_list(execute(client.build_list_deleted())).unwrap();
    assert_eq!(bin.len(), 1);
    assert_eq!(bin[0].id, id);

    // A second delete is rejected with the server's envelope.
    let err = client.parse_mutation(execute(client.build_delete_todo(id))).unwrap_err();
    match err {
        ApiError::Api { status, error, .. } => {
            assert_eq!(status, 400);
            assert_eq!(error, "Todo already deleted");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Restore clears the mark and stamps a fresh update time.
    std::thread::sleep(std::time::Duration::from_millis(5));
    let restored = client.parse_mutation(execute(client.build_restore_todo(id))).unwrap();
    assert!(!restored.is_deleted);
    assert!(restored.deleted_at.is_none());
    assert_ne!(restored.updated_at, updated_at_before);

    // Restoring an active row is rejected too.
    let err = client.parse_mutation(execute(client.build_restore_todo(id))).unwrap_err();
    match err {
        ApiError::Api { status, error, .. } => {
            assert_eq!(status, 400);
            assert_eq!(error, "Todo already restored");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn update_round_trip() {
    let store = Arc::new(TodoStore::open_in_memory().unwrap());
    let seeded = store.insert("Original", TodoStatus::Todo, false).unwrap();
    let client = TodoClient::new(&start_server(store));
    let id = seeded.id;

    // Toggle completed only.
    let input = UpdateTodo {
        title: None,
        completed: Some(true),
    };
    let updated = client
        .parse_mutation(execute(client.build_update_todo(id, &input).unwrap()))
        .unwrap();
    assert_eq!(updated.title, "Original");
    assert!(updated.completed);

    // Change the title only; completed survives.
    let input = UpdateTodo {
        title: Some("Renamed".to_string()),
        completed: None,
    };
    let updated = client
        .parse_mutation(execute(client.build_update_todo(id, &input).unwrap()))
        .unwrap();
    assert_eq!(updated.title, "Renamed");
    assert!(updated.completed);

    // A missing id carries the structured envelope through.
    let input = UpdateTodo {
        title: Some("Ghost".to_string()),
        completed: None,
    };
    let err = client
        .parse_mutation(execute(client.build_update_todo(999, &input).unwrap()))
        .unwrap_err();
    match err {
        ApiError::Api {
            status,
            error,
            details,
        } => {
            assert_eq!(status, 404);
            assert_eq!(error, "Todo not found");
            assert_eq!(details, "Todo with ID 999 does not exist");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn create_has_no_route() {
    let store = Arc::new(TodoStore::open_in_memory().unwrap());
    let client = TodoClient::new(&start_server(store));

    let input = CreateTodo {
        title: "Never lands".to_string(),
    };
    let response = execute(client.build_create_todo(&input).unwrap());
    assert_eq!(response.status, 404);
    assert_eq!(response.body, "Custom 404 Message");

    let err = client.parse_mutation(response).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[test]
fn recent_updates_follow_restores() {
    let store = Arc::new(TodoStore::open_in_memory().unwrap());
    let first = store.insert("first", TodoStatus::Todo, false).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = store.insert("second", TodoStatus::Todo, false).unwrap();
    let client = TodoClient::new(&start_server(store));

    // Newest update wins the capped window.
    let recent = client
        .parse_list(execute(client.build_recent_updates(Some(1), Some(30))))
        .unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, second.id);

    // A delete/restore round trip bumps the first row to the front.
    client.parse_mutation(execute(client.build_delete_todo(first.id))).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    client.parse_mutation(execute(client.build_restore_todo(first.id))).unwrap();

    let recent = client
        .parse_list(execute(client.build_recent_updates(Some(1), Some(30))))
        .unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, first.id);
}

#[test]
fn cache_refetches_after_mutation() {
    let store = Arc::new(TodoStore::open_in_memory().unwrap());
    let seeded = store.insert("cached row", TodoStatus::Todo, false).unwrap();
    let client = TodoClient::new(&start_server(store));
    let mut cache = QueryCache::new();

    let fetch_active = |client: &TodoClient| {
        client
            .parse_list(execute(client.build_list_todos()))
            .map_err(|e| e.to_string())
    };
    let fetch_deleted = |client: &TodoClient| {
        client
            .parse_list(execute(client.build_list_deleted()))
            .map_err(|e| e.to_string())
    };

    let rows = cache.fetch_with(QUERY_TODOS, || fetch_active(&client)).unwrap();
    assert_eq!(rows.len(), 1);

    // The delete invalidates both names; the next reads see the move.
    client
        .parse_mutation(execute(client.build_delete_todo(seeded.id)))
        .unwrap();
    cache.invalidate_after(Mutation::Delete);

    let rows = cache.fetch_with(QUERY_TODOS, || fetch_active(&client)).unwrap();
    assert!(rows.is_empty());
    let rows = cache
        .fetch_with(QUERY_DELETED_TODOS, || fetch_deleted(&client))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, seeded.id);
}

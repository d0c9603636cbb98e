//! Synchronous API client library for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the library fully deterministic and
//! testable. The terminal UI binary in this crate is one such caller.
//!
//! # Design
//! - `TodoClient` is stateless — it holds only `base_url`.
//! - Each operation is split into `build_*` (produces request) and a parse
//!   method (consumes response), so the I/O boundary is explicit.
//! - `QueryCache` keeps list results fresh the way the API expects its
//!   consumers to: mutations invalidate named queries, reads re-fetch.
//! - DTOs are defined independently from the server crate; integration
//!   tests catch schema drift.

pub mod cache;
pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use cache::{Mutation, QueryCache, QUERY_DELETED_TODOS, QUERY_TODOS};
pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, ErrorBody, ListEnvelope, MutationEnvelope, Todo, UpdateTodo};

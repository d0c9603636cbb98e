//! Named-query cache with mutation-driven invalidation.
//!
//! # Design
//! The UI reads lists through named queries ("todos", "deletedTodos"). A
//! fetched result stays cached until a mutation invalidates the name; the
//! next read then re-fetches. Views never patch cached rows with a
//! mutation's response — discard and re-read is the whole protocol.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::types::Todo;

/// Query name for the active list.
pub const QUERY_TODOS: &str = "todos";
/// Query name for the soft-deleted list.
pub const QUERY_DELETED_TODOS: &str = "deletedTodos";

/// A write against the API, used to decide which query names go stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Update,
    Delete,
    Restore,
}

impl Mutation {
    /// Query names invalidated after this mutation succeeds.
    ///
    /// Delete and restore move a row between the two lists, so both names go
    /// stale; create and update only reshape the active list.
    pub fn invalidates(&self) -> &'static [&'static str] {
        match self {
            Mutation::Create | Mutation::Update => &[QUERY_TODOS],
            Mutation::Delete | Mutation::Restore => &[QUERY_TODOS, QUERY_DELETED_TODOS],
        }
    }
}

/// Cached list results keyed by query name.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<&'static str, Vec<Todo>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached rows for `name`, if fresh.
    pub fn get(&self, name: &'static str) -> Option<&[Todo]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// The cached rows for `name`, or the result of `fetch`, which is cached
    /// on success. A failed fetch caches nothing, so the next read retries.
    pub fn fetch_with<F, E>(&mut self, name: &'static str, fetch: F) -> Result<&[Todo], E>
    where
        F: FnOnce() -> Result<Vec<Todo>, E>,
    {
        match self.entries.entry(name) {
            Entry::Occupied(entry) => Ok(entry.into_mut().as_slice()),
            Entry::Vacant(entry) => Ok(entry.insert(fetch()?).as_slice()),
        }
    }

    /// Discard one entry so the next read re-fetches.
    pub fn invalidate(&mut self, name: &'static str) {
        self.entries.remove(name);
    }

    /// Discard every entry `mutation` makes stale.
    pub fn invalidate_after(&mut self, mutation: Mutation) {
        for name in mutation.invalidates() {
            self.invalidate(name);
        }
    }
}

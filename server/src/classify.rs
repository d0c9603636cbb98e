//! Best-effort classification of storage error text.
//!
//! The pair this produces feeds the error envelope for operators reading
//! logs and dashboards; nothing retries or branches on it. Matching is a
//! single ordered table of lowercase needles against the lowercased message,
//! first hit wins.

/// Ordered `(needle, error, details)` rows.
///
/// The generic transport needles (`connection`, `timeout`) sit between the
/// SQLite ones on purpose: a constraint message never contains them, but a
/// driver-level failure usually does.
const RULES: &[(&str, &str, &str)] = &[
    (
        "no such table",
        "Database table not found",
        "The 'todos' table does not exist. Please run migrations first.",
    ),
    (
        "database is locked",
        "Database is locked",
        "Another operation is currently using the database.",
    ),
    (
        "disk full",
        "Database storage full",
        "No space left on device.",
    ),
    (
        "permission denied",
        "Database permission denied",
        "Insufficient permissions to access the database.",
    ),
    (
        "connection",
        "Database connection failed",
        "Unable to connect to the database.",
    ),
    (
        "timeout",
        "Database operation timeout",
        "The database operation took too long to complete.",
    ),
    (
        "unique constraint failed",
        "Duplicate entry",
        "A record with the same unique identifier already exists.",
    ),
    (
        "not null constraint failed",
        "Missing required field",
        "A required field is missing or null.",
    ),
    (
        "foreign key constraint failed",
        "Referential integrity error",
        "The referenced record does not exist.",
    ),
    (
        "check constraint failed",
        "Validation error",
        "The data does not meet the validation requirements.",
    ),
    (
        "syntax error",
        "SQL syntax error",
        "There is a syntax error in the SQL query.",
    ),
    (
        "no such column",
        "Column not found",
        "The specified column does not exist in the table.",
    ),
];

/// Map a storage error message to the user-facing `error`/`details` pair.
///
/// Unmatched text falls back to a generic headline naming the endpoint, with
/// the raw message as details.
pub fn storage_error(endpoint: &str, message: &str) -> (String, String) {
    let lowered = message.to_lowercase();
    for (needle, error, details) in RULES {
        if lowered.contains(needle) {
            return ((*error).to_string(), (*details).to_string());
        }
    }
    (
        format!("Failed to process request at {endpoint}"),
        message.to_string(),
    )
}

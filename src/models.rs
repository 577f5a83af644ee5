// Data models for the task list

use serde::{Deserialize, Serialize};

/// A single to-do record as persisted in the `todos` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Assigned by the store on insert; never reused
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    /// Milliseconds since epoch, stamped once at insert
    pub created_at: i64,
}

impl Task {
    /// Build a task from a `SELECT id, title, description, completed, created_at` row
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            completed: row.get::<_, i64>(3)? != 0,
            created_at: row.get(4)?,
        })
    }
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

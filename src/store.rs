// SQLite-backed task store
//
// Every operation is a single round-trip to the database; nothing is cached.
// The `try_*` methods report failures as `StoreError`. Their plain counterparts
// log the failure and return a value-level signal (false / None / empty / 0)
// so a caller can keep running against a degraded store.

use crate::error::{Result, StoreError};
use crate::filter::TaskQuery;
use crate::models::{Task, now_ms};
use crate::paths;
use rusqlite::{Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

const TASK_COLUMNS: &str = "id, title, description, completed, created_at";

/// Persistent task collection backed by a single SQLite file
pub struct Store {
    db_path: Option<PathBuf>,
    db: Option<Connection>,
}

impl Store {
    /// Open or create the store in `dir`
    ///
    /// The directory is created if missing and the database lives at `dir/todos.db`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let db_path = paths::db_path_in(dir);

        fs::create_dir_all(dir).map_err(|e| StoreError::unavailable(&db_path, e))?;

        let db = Connection::open(&db_path).map_err(|e| StoreError::unavailable(&db_path, e))?;
        Self::create_schema(&db).map_err(|e| StoreError::unavailable(&db_path, e))?;

        info!(path = %db_path.display(), "Opened task database");

        Ok(Self {
            db_path: Some(db_path),
            db: Some(db),
        })
    }

    /// Open a private in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().map_err(|e| StoreError::unavailable(":memory:", e))?;
        Self::create_schema(&db).map_err(|e| StoreError::unavailable(":memory:", e))?;

        Ok(Self { db_path: None, db: Some(db) })
    }

    /// Open the store at the fixed per-user location (`~/.todo_app/todos.db`)
    ///
    /// Never fails: if the database cannot be opened the error is logged and a
    /// degraded store is returned, on which every operation fails or comes back empty.
    pub fn initialize() -> Self {
        Self::initialize_at(paths::default_store_dir())
    }

    /// Same as [`Store::initialize`] but rooted at `dir`
    pub fn initialize_at<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        match Self::open(dir) {
            Ok(store) => store,
            Err(e) => {
                error!(error = %e, "Task store unavailable, continuing without storage");
                Self {
                    db_path: Some(paths::db_path_in(dir)),
                    db: None,
                }
            }
        }
    }

    /// Whether the database handle is open
    pub fn is_available(&self) -> bool {
        self.db.is_some()
    }

    /// Location of the database file; `None` for in-memory stores
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn conn(&self) -> Result<&Connection> {
        self.db.as_ref().ok_or(StoreError::Closed)
    }

    /// Create database schema
    fn create_schema(db: &Connection) -> Result<()> {
        debug!("Creating database schema");

        db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    /// Release the database handle; safe to call repeatedly or on a degraded store
    pub fn shutdown(&mut self) {
        if let Some(db) = self.db.take() {
            match db.close() {
                Ok(()) => info!("Task database closed"),
                Err((_, e)) => warn!(error = %e, "Error closing task database"),
            }
        }
    }

    // ========================================================================
    // Fallible API
    // ========================================================================

    /// Append a new, not yet completed task and return its id
    pub fn try_insert(&mut self, title: &str, description: &str) -> Result<i64> {
        let db = self.conn()?;

        db.execute(
            "INSERT INTO todos (title, description, completed, created_at) VALUES (?1, ?2, 0, ?3)",
            rusqlite::params![title, description, now_ms()],
        )?;

        let id = db.last_insert_rowid();
        debug!(id, "Inserted task");
        Ok(id)
    }

    /// Fetch a single task by id
    pub fn try_get(&self, id: i64) -> Result<Option<Task>> {
        let db = self.conn()?;

        let task = db
            .query_row(
                &format!("SELECT {} FROM todos WHERE id = ?1", TASK_COLUMNS),
                [id],
                Task::from_row,
            )
            .optional()?;

        Ok(task)
    }

    /// Run one page query: search AND filter, then sort, then LIMIT/OFFSET
    pub fn try_query(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        let db = self.conn()?;

        let (where_clause, search_params) = query.where_clause();
        let sql = format!(
            "SELECT {} FROM todos {} ORDER BY {} LIMIT ? OFFSET ?",
            TASK_COLUMNS,
            where_clause,
            query.sort.to_sql()
        );
        debug!(%sql, limit = query.limit, offset = query.offset, "try_query: executing");

        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        for param in search_params {
            params.push(Box::new(param));
        }
        params.push(Box::new(to_sql_int(query.limit)));
        params.push(Box::new(to_sql_int(query.offset)));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = db.prepare(&sql)?;
        let rows = stmt.query_map(params_refs.as_slice(), Task::from_row)?;

        let mut results = Vec::new();
        for row_result in rows {
            results.push(row_result?);
        }

        Ok(results)
    }

    /// Number of tasks matching the query's search and filter, ignoring paging
    pub fn try_count_matching(&self, query: &TaskQuery) -> Result<i64> {
        let db = self.conn()?;

        let (where_clause, search_params) = query.where_clause();
        let sql = format!("SELECT COUNT(*) FROM todos {}", where_clause);

        let count = db.query_row(&sql, rusqlite::params_from_iter(search_params), |row| row.get(0))?;
        Ok(count)
    }

    /// Overwrite title, description and completion flag; false if `id` does not exist
    pub fn try_update(&mut self, id: i64, title: &str, description: &str, completed: bool) -> Result<bool> {
        let db = self.conn()?;

        let changed = db.execute(
            "UPDATE todos SET title = ?1, description = ?2, completed = ?3 WHERE id = ?4",
            rusqlite::params![title, description, completed as i64, id],
        )?;

        Ok(changed > 0)
    }

    /// Overwrite only the completion flag; false if `id` does not exist
    pub fn try_toggle_completed(&mut self, id: i64, completed: bool) -> Result<bool> {
        let db = self.conn()?;

        let changed = db.execute(
            "UPDATE todos SET completed = ?1 WHERE id = ?2",
            rusqlite::params![completed as i64, id],
        )?;

        Ok(changed > 0)
    }

    /// Physically remove a task; false if `id` does not exist
    pub fn try_delete(&mut self, id: i64) -> Result<bool> {
        let db = self.conn()?;

        let changed = db.execute("DELETE FROM todos WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    /// Remove every completed task in one statement, returning how many were removed
    pub fn try_clear_completed(&mut self) -> Result<usize> {
        let db = self.conn()?;

        let removed = db.execute("DELETE FROM todos WHERE completed = 1", [])?;
        debug!(removed, "Cleared completed tasks");
        Ok(removed)
    }

    /// Total number of tasks, unfiltered
    pub fn try_count(&self) -> Result<i64> {
        let db = self.conn()?;

        let count = db.query_row("SELECT COUNT(*) FROM todos", [], |row| row.get(0))?;
        Ok(count)
    }

    // ========================================================================
    // Value-level API
    // ========================================================================

    /// Insert a task; `None` if the write did not succeed
    pub fn insert(&mut self, title: &str, description: &str) -> Option<i64> {
        self.try_insert(title, description)
            .inspect_err(|e| error!(error = %e, "Failed to insert task"))
            .ok()
    }

    /// Fetch a task; `None` when missing or on failure
    pub fn get(&self, id: i64) -> Option<Task> {
        self.try_get(id)
            .inspect_err(|e| error!(id, error = %e, "Failed to get task"))
            .ok()
            .flatten()
    }

    /// Run a page query; an empty page on failure
    pub fn query(&self, query: &TaskQuery) -> Vec<Task> {
        self.try_query(query)
            .inspect_err(|e| error!(error = %e, "Failed to query tasks"))
            .unwrap_or_default()
    }

    pub fn count_matching(&self, query: &TaskQuery) -> i64 {
        self.try_count_matching(query)
            .inspect_err(|e| error!(error = %e, "Failed to count matching tasks"))
            .unwrap_or(0)
    }

    pub fn update(&mut self, id: i64, title: &str, description: &str, completed: bool) -> bool {
        self.try_update(id, title, description, completed)
            .inspect_err(|e| error!(id, error = %e, "Failed to update task"))
            .unwrap_or(false)
    }

    pub fn toggle_completed(&mut self, id: i64, completed: bool) -> bool {
        self.try_toggle_completed(id, completed)
            .inspect_err(|e| error!(id, error = %e, "Failed to toggle task"))
            .unwrap_or(false)
    }

    pub fn delete(&mut self, id: i64) -> bool {
        self.try_delete(id)
            .inspect_err(|e| error!(id, error = %e, "Failed to delete task"))
            .unwrap_or(false)
    }

    /// True iff at least one completed task was removed
    pub fn clear_completed(&mut self) -> bool {
        self.try_clear_completed()
            .inspect_err(|e| error!(error = %e, "Failed to clear completed tasks"))
            .map(|removed| removed > 0)
            .unwrap_or(false)
    }

    pub fn count(&self) -> i64 {
        self.try_count()
            .inspect_err(|e| error!(error = %e, "Failed to count tasks"))
            .unwrap_or(0)
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// LIMIT/OFFSET are bound as SQLite integers
fn to_sql_int(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{SortOrder, TaskFilter};
    use tempfile::TempDir;

    #[test]
    fn test_store_open_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join(".todo_app");

        let store = Store::open(&dir).unwrap();
        assert!(dir.exists());
        assert!(dir.join("todos.db").exists());
        assert_eq!(store.db_path(), Some(dir.join("todos.db").as_path()));
        assert!(store.is_available());
    }

    #[test]
    fn test_reopen_keeps_data() {
        let temp = TempDir::new().unwrap();

        {
            let mut store = Store::open(temp.path()).unwrap();
            store.try_insert("Persisted", "across opens").unwrap();
        }

        let store = Store::open(temp.path()).unwrap();
        assert_eq!(store.try_count().unwrap(), 1);
        let task = store.try_get(1).unwrap().unwrap();
        assert_eq!(task.title, "Persisted");
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = Store::open_in_memory().unwrap();
        let before = now_ms();

        let id = store.try_insert("Buy milk", "2%").unwrap();
        assert_eq!(id, 1);

        let task = store.try_get(id).unwrap().unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "2%");
        assert!(!task.completed);
        assert!(task.created_at >= before);
        assert!(task.created_at <= now_ms());
    }

    #[test]
    fn test_get_nonexistent() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.try_get(42).unwrap().is_none());
        assert!(store.get(42).is_none());
    }

    #[test]
    fn test_update_overwrites_fields() {
        let mut store = Store::open_in_memory().unwrap();
        let id = store.try_insert("Draft", "").unwrap();
        let created_at = store.try_get(id).unwrap().unwrap().created_at;

        assert!(store.try_update(id, "Final", "with notes", true).unwrap());

        let task = store.try_get(id).unwrap().unwrap();
        assert_eq!(task.title, "Final");
        assert_eq!(task.description, "with notes");
        assert!(task.completed);
        assert_eq!(task.created_at, created_at);
    }

    #[test]
    fn test_update_missing_returns_false() {
        let mut store = Store::open_in_memory().unwrap();
        assert!(!store.try_update(5, "x", "y", false).unwrap());
        assert!(!store.update(5, "x", "y", false));
    }

    #[test]
    fn test_toggle_completed() {
        let mut store = Store::open_in_memory().unwrap();
        let id = store.try_insert("Task", "").unwrap();

        assert!(store.toggle_completed(id, true));
        assert!(store.get(id).unwrap().completed);

        assert!(store.toggle_completed(id, false));
        assert!(!store.get(id).unwrap().completed);

        assert!(!store.toggle_completed(id + 1, true));
    }

    #[test]
    fn test_delete() {
        let mut store = Store::open_in_memory().unwrap();
        let id = store.try_insert("To delete", "").unwrap();

        assert!(store.delete(id));
        assert!(store.get(id).is_none());
        assert!(!store.delete(id));
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_clear_completed_reports_removal() {
        let mut store = Store::open_in_memory().unwrap();
        let a = store.try_insert("a", "").unwrap();
        store.try_insert("b", "").unwrap();

        // Nothing completed yet
        assert!(!store.clear_completed());

        store.toggle_completed(a, true);
        assert_eq!(store.try_clear_completed().unwrap(), 1);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_count_matching() {
        let mut store = Store::open_in_memory().unwrap();
        let a = store.try_insert("Alpha", "").unwrap();
        store.try_insert("Beta", "alphabet soup").unwrap();
        store.try_insert("Gamma", "").unwrap();
        store.toggle_completed(a, true);

        let query = TaskQuery::page(1, 0).search("alpha");
        assert_eq!(store.count_matching(&query), 2);
        assert_eq!(store.count_matching(&query.clone().filter(TaskFilter::Active)), 1);
        assert_eq!(store.count_matching(&TaskQuery::default()), 3);
    }

    #[test]
    fn test_query_binds_search_before_paging() {
        let mut store = Store::open_in_memory().unwrap();
        for i in 0..5 {
            store.try_insert(&format!("match {}", i), "").unwrap();
            store.try_insert(&format!("other {}", i), "").unwrap();
        }

        let page = store
            .try_query(&TaskQuery::page(2, 1).search("MATCH").sort(SortOrder::CreatedAsc))
            .unwrap();
        let titles: Vec<_> = page.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["match 1", "match 2"]);
    }

    #[test]
    fn test_search_wildcards_are_literal() {
        let mut store = Store::open_in_memory().unwrap();
        store.try_insert("100% done", "").unwrap();
        store.try_insert("snake_case", "").unwrap();
        store.try_insert("plain", "").unwrap();

        let percent = store.try_query(&TaskQuery::default().search("%")).unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].title, "100% done");

        let underscore = store.try_query(&TaskQuery::default().search("_")).unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].title, "snake_case");
    }

    #[test]
    fn test_limit_zero_and_huge_offset() {
        let mut store = Store::open_in_memory().unwrap();
        store.try_insert("only", "").unwrap();

        assert!(store.try_query(&TaskQuery::page(0, 0)).unwrap().is_empty());
        assert!(store.try_query(&TaskQuery::page(10, usize::MAX)).unwrap().is_empty());
        assert_eq!(store.try_query(&TaskQuery::page(usize::MAX, 0)).unwrap().len(), 1);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut store = Store::open_in_memory().unwrap();
        store.try_insert("x", "").unwrap();

        store.shutdown();
        store.shutdown();
        assert!(!store.is_available());

        assert!(matches!(store.try_count(), Err(StoreError::Closed)));
        assert_eq!(store.count(), 0);
        assert!(store.query(&TaskQuery::default()).is_empty());
        assert_eq!(store.insert("y", ""), None);
    }

    #[test]
    fn test_initialize_degraded_when_location_unusable() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not-a-dir");
        fs::write(&blocker, "file in the way").unwrap();

        let err = Store::open(blocker.join("store")).err().unwrap();
        assert!(matches!(err, StoreError::StorageUnavailable { .. }));

        let mut store = Store::initialize_at(blocker.join("store"));
        assert!(!store.is_available());
        assert_eq!(store.insert("x", ""), None);
        assert!(!store.update(1, "x", "", false));
        assert!(!store.toggle_completed(1, true));
        assert!(!store.delete(1));
        assert!(!store.clear_completed());
        assert_eq!(store.count(), 0);
        assert!(store.query(&TaskQuery::default()).is_empty());

        // Shutdown on a store that never opened is a no-op
        store.shutdown();
    }
}

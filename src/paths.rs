// Fixed per-user storage location

use std::path::PathBuf;

/// Directory under the user's home that holds the database
pub const STORE_DIR_NAME: &str = ".todo_app";

/// Database file inside the store directory
pub const DB_FILE_NAME: &str = "todos.db";

/// `~/.todo_app`, or `./.todo_app` when no home directory can be determined
pub fn default_store_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STORE_DIR_NAME)
}

/// Full path of the database file inside `dir`
pub fn db_path_in(dir: &std::path::Path) -> PathBuf {
    dir.join(DB_FILE_NAME)
}

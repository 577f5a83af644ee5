// todostore - Local task list persisted in SQLite with paged, filtered, sorted queries

pub mod controller;
pub mod error;
pub mod filter;
pub mod models;
pub mod paths;
pub mod store;

// Re-export main types for convenience
pub use controller::{ListController, Notice};
pub use error::{Result, StoreError};
pub use filter::{DEFAULT_PAGE_SIZE, SortOrder, TaskFilter, TaskQuery};
pub use models::{Task, now_ms};
pub use store::Store;

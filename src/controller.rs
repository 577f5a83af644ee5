// List state for a task view: search/filter/sort, the loaded pages and the cursor
//
// Any change to search, filter or sort refetches page 0. `load_more` appends the
// next page while the previous one came back full.

use crate::filter::{DEFAULT_PAGE_SIZE, SortOrder, TaskFilter, TaskQuery};
use crate::models::Task;
use crate::store::Store;
use tracing::debug;

/// Rows from the end of the loaded list at which the next page is requested
pub const LOAD_MORE_THRESHOLD: usize = 3;

/// Outcome of a user action, suitable for a transient notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub success: bool,
    pub message: String,
}

impl Notice {
    fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }

    fn failed(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
        }
    }
}

/// Paged view over a [`Store`]
pub struct ListController<'a> {
    store: &'a mut Store,
    search: String,
    filter: TaskFilter,
    sort: SortOrder,
    page_size: usize,
    items: Vec<Task>,
    has_more: bool,
}

impl<'a> ListController<'a> {
    /// Create a controller and load the first page
    pub fn new(store: &'a mut Store) -> Self {
        Self::with_page_size(store, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(store: &'a mut Store, page_size: usize) -> Self {
        Self::from_query(store, &TaskQuery::page(page_size, 0))
    }

    /// Start from the query's search, filter and sort, with its limit as the page size
    ///
    /// Only the first page is loaded; the query's offset is ignored.
    pub fn from_query(store: &'a mut Store, query: &TaskQuery) -> Self {
        let mut controller = Self {
            store,
            search: query.search.clone(),
            filter: query.filter,
            sort: query.sort,
            page_size: query.limit,
            items: Vec::new(),
            has_more: true,
        };
        controller.reload();
        controller
    }

    pub fn items(&self) -> &[Task] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Whether any loaded row is completed (gates the "clear completed" action)
    pub fn has_completed(&self) -> bool {
        self.items.iter().any(|t| t.completed)
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.reload();
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
        self.reload();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        self.reload();
    }

    fn query_at(&self, offset: usize) -> TaskQuery {
        TaskQuery::page(self.page_size, offset)
            .search(self.search.clone())
            .filter(self.filter)
            .sort(self.sort)
    }

    /// Replace the loaded list with page 0
    pub fn reload(&mut self) {
        self.items = self.store.query(&self.query_at(0));
        self.has_more = self.items.len() >= self.page_size;
        debug!(loaded = self.items.len(), has_more = self.has_more, "reload");
    }

    /// Append the next page if the last one was full; returns the number of rows added
    ///
    /// The offset is the number of rows currently loaded, so rows dropped locally by
    /// `toggle` or `delete` (and therefore gone from the result set) do not shift it.
    pub fn load_more(&mut self) -> usize {
        if !self.has_more {
            return 0;
        }

        let rows = self.store.query(&self.query_at(self.items.len()));
        if rows.is_empty() {
            self.has_more = false;
            return 0;
        }

        let added = rows.len();
        self.has_more = added >= self.page_size;
        self.items.extend(rows);
        debug!(loaded = self.items.len(), added, has_more = self.has_more, "load_more");
        added
    }

    /// Scroll-proximity trigger: the last visible row is near the end of what is loaded
    pub fn should_load_more(&self, last_visible_index: usize) -> bool {
        self.has_more && last_visible_index.saturating_add(LOAD_MORE_THRESHOLD) >= self.items.len()
    }

    /// Insert a task; blank titles are rejected without touching the store
    pub fn add(&mut self, title: &str, description: &str) -> Notice {
        if title.trim().is_empty() {
            return Notice::failed("Title cannot be empty");
        }

        match self.store.insert(title, description) {
            Some(_) => {
                // A new task is never completed, so the completed view is unchanged
                if self.filter != TaskFilter::Completed {
                    self.reload();
                }
                Notice::ok("Task added successfully")
            }
            None => Notice::failed("Failed to add task"),
        }
    }

    /// Set the completion flag and reconcile the loaded rows with the current filter
    pub fn toggle(&mut self, id: i64, completed: bool) -> Notice {
        if !self.store.toggle_completed(id, completed) {
            return Notice::failed("Failed to update task");
        }

        if self.filter.matches(completed) {
            if let Some(task) = self.items.iter_mut().find(|t| t.id == id) {
                task.completed = completed;
            }
        } else {
            self.items.retain(|t| t.id != id);
        }
        Notice::ok(if completed { "Task completed" } else { "Task reopened" })
    }

    /// Change title and description, keeping the task's completion flag
    pub fn edit(&mut self, id: i64, title: &str, description: &str) -> Notice {
        if title.trim().is_empty() {
            return Notice::failed("Title cannot be empty");
        }

        let completed = match self.items.iter().find(|t| t.id == id) {
            Some(task) => task.completed,
            None => match self.store.get(id) {
                Some(task) => task.completed,
                None => return Notice::failed("Failed to update task"),
            },
        };

        if !self.store.update(id, title, description, completed) {
            return Notice::failed("Failed to update task");
        }

        if let Some(task) = self.items.iter_mut().find(|t| t.id == id) {
            task.title = title.to_string();
            task.description = description.to_string();
        }
        Notice::ok("Task updated")
    }

    pub fn delete(&mut self, id: i64) -> Notice {
        if self.store.delete(id) {
            self.items.retain(|t| t.id != id);
            Notice::ok("Task deleted")
        } else {
            Notice::failed("Failed to delete task")
        }
    }

    pub fn clear_completed(&mut self) -> Notice {
        if self.store.clear_completed() {
            self.reload();
            Notice::ok("Cleared completed tasks")
        } else {
            Notice::failed("Failed to clear tasks")
        }
    }
}

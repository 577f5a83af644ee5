// Query options for listing tasks: completion filter, sort order, search and paging

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default number of rows per page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Escape character used in LIKE patterns built by [`like_pattern`]
const LIKE_ESCAPE: char = '\\';

/// Predicate over completion status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub(crate) fn to_sql(self) -> Option<&'static str> {
        match self {
            TaskFilter::All => None,
            TaskFilter::Active => Some("completed = 0"),
            TaskFilter::Completed => Some("completed = 1"),
        }
    }

    /// Whether a task with the given completion flag passes this filter
    pub fn matches(self, completed: bool) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Active => !completed,
            TaskFilter::Completed => completed,
        }
    }
}

impl std::fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskFilter::All => write!(f, "all"),
            TaskFilter::Active => write!(f, "active"),
            TaskFilter::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "active" => Ok(TaskFilter::Active),
            "completed" | "done" => Ok(TaskFilter::Completed),
            other => Err(format!("unknown filter '{}' (expected all, active or completed)", other)),
        }
    }
}

/// Ordering applied to the filtered result set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    #[default]
    CreatedDesc,
    CreatedAsc,
    TitleAsc,
    TitleDesc,
}

impl SortOrder {
    /// ORDER BY clause; `id` breaks ties so adjacent pages never overlap
    pub(crate) fn to_sql(self) -> &'static str {
        match self {
            SortOrder::CreatedDesc => "created_at DESC, id DESC",
            SortOrder::CreatedAsc => "created_at ASC, id ASC",
            SortOrder::TitleAsc => "title COLLATE NOCASE ASC, id ASC",
            SortOrder::TitleDesc => "title COLLATE NOCASE DESC, id DESC",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::CreatedDesc => write!(f, "created-desc"),
            SortOrder::CreatedAsc => write!(f, "created-asc"),
            SortOrder::TitleAsc => write!(f, "title-asc"),
            SortOrder::TitleDesc => write!(f, "title-desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "created-desc" | "newest" => Ok(SortOrder::CreatedDesc),
            "created-asc" | "oldest" => Ok(SortOrder::CreatedAsc),
            "title-asc" | "title" => Ok(SortOrder::TitleAsc),
            "title-desc" => Ok(SortOrder::TitleDesc),
            other => Err(format!(
                "unknown sort order '{}' (expected created-desc, created-asc, title-asc or title-desc)",
                other
            )),
        }
    }
}

/// One page request against the task collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub limit: usize,
    pub offset: usize,
    /// Case-insensitive substring matched against title or description; ignored when blank
    pub search: String,
    pub filter: TaskFilter,
    pub sort: SortOrder,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            search: String::new(),
            filter: TaskFilter::default(),
            sort: SortOrder::default(),
        }
    }
}

impl TaskQuery {
    pub fn page(limit: usize, offset: usize) -> Self {
        Self {
            limit,
            offset,
            ..Self::default()
        }
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn filter(mut self, filter: TaskFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// WHERE clause (empty when unrestricted) and the LIKE parameters it binds, in order
    pub(crate) fn where_clause(&self) -> (String, Vec<String>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if !self.search.trim().is_empty() {
            conditions.push(format!(
                "(title LIKE ? ESCAPE '{0}' OR description LIKE ? ESCAPE '{0}')",
                LIKE_ESCAPE
            ));
            let pattern = like_pattern(&self.search);
            params.push(pattern.clone());
            params.push(pattern);
        }

        if let Some(condition) = self.filter.to_sql() {
            conditions.push(condition.to_string());
        }

        if conditions.is_empty() {
            (String::new(), params)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), params)
        }
    }
}

/// Wrap `text` in `%` wildcards, escaping LIKE metacharacters so it matches literally
pub(crate) fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query = TaskQuery::default();
        assert_eq!(query.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(query.offset, 0);
        assert_eq!(query.filter, TaskFilter::All);
        assert_eq!(query.sort, SortOrder::CreatedDesc);
    }

    #[test]
    fn test_where_clause_unrestricted() {
        let (clause, params) = TaskQuery::default().where_clause();
        assert!(clause.is_empty());
        assert!(params.is_empty());

        // Whitespace-only search is treated as no search
        let (clause, params) = TaskQuery::default().search("   ").where_clause();
        assert!(clause.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn test_where_clause_search_and_filter() {
        let (clause, params) = TaskQuery::page(10, 0)
            .search("milk")
            .filter(TaskFilter::Active)
            .where_clause();

        assert!(clause.starts_with("WHERE (title LIKE ?"));
        assert!(clause.ends_with(" AND completed = 0"));
        assert_eq!(params, vec!["%milk%".to_string(), "%milk%".to_string()]);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\tmp"), "%c:\\\\tmp%");
    }

    #[test]
    fn test_filter_matches() {
        assert!(TaskFilter::All.matches(true));
        assert!(TaskFilter::All.matches(false));
        assert!(TaskFilter::Active.matches(false));
        assert!(!TaskFilter::Active.matches(true));
        assert!(TaskFilter::Completed.matches(true));
        assert!(!TaskFilter::Completed.matches(false));
    }

    #[test]
    fn test_sort_order_to_sql() {
        assert_eq!(SortOrder::CreatedDesc.to_sql(), "created_at DESC, id DESC");
        assert_eq!(SortOrder::TitleAsc.to_sql(), "title COLLATE NOCASE ASC, id ASC");
    }

    #[test]
    fn test_parse_options() {
        assert_eq!("ACTIVE".parse::<TaskFilter>().unwrap(), TaskFilter::Active);
        assert_eq!("done".parse::<TaskFilter>().unwrap(), TaskFilter::Completed);
        assert!("pending".parse::<TaskFilter>().is_err());

        assert_eq!("title_desc".parse::<SortOrder>().unwrap(), SortOrder::TitleDesc);
        assert_eq!("oldest".parse::<SortOrder>().unwrap(), SortOrder::CreatedAsc);
        assert!("random".parse::<SortOrder>().is_err());

        // Display output parses back
        for sort in [
            SortOrder::CreatedDesc,
            SortOrder::CreatedAsc,
            SortOrder::TitleAsc,
            SortOrder::TitleDesc,
        ] {
            assert_eq!(sort.to_string().parse::<SortOrder>().unwrap(), sort);
        }
    }

    #[test]
    fn test_serialization_names() {
        assert_eq!(serde_json::to_string(&TaskFilter::Completed).unwrap(), "\"COMPLETED\"");
        assert_eq!(serde_json::to_string(&SortOrder::CreatedDesc).unwrap(), "\"CREATED_DESC\"");
    }
}

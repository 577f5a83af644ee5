use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result, bail, eyre};
use std::path::PathBuf;
use todostore::{DEFAULT_PAGE_SIZE, ListController, SortOrder, Store, Task, TaskFilter, TaskQuery};
use tracing::Level;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Local task list - add, complete, search and page through tasks")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding todos.db (default: ~/.todo_app)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// List tasks
    List {
        /// Case-insensitive text matched against title and description
        #[arg(short, long, default_value = "")]
        search: String,

        /// all, active or completed
        #[arg(short, long, default_value = "all")]
        filter: TaskFilter,

        /// created-desc, created-asc, title-asc or title-desc
        #[arg(long, default_value = "created-desc")]
        sort: SortOrder,

        /// Rows per page
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: usize,

        /// Zero-based page number
        #[arg(short, long, default_value_t = 0)]
        page: usize,

        /// Keep fetching pages until the result set is exhausted
        #[arg(long, conflicts_with = "page")]
        all_pages: bool,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a single task
    Show {
        id: i64,

        #[arg(long)]
        json: bool,
    },

    /// Change a task's title and/or description
    Edit {
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Mark a task completed
    Done { id: i64 },

    /// Mark a task active again
    Undone { id: i64 },

    /// Delete a task
    Delete { id: i64 },

    /// Delete every completed task
    ClearCompleted,

    /// Print the total number of tasks
    Count,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut store = match &cli.store_path {
        Some(path) => Store::initialize_at(path),
        None => Store::initialize(),
    };
    if !store.is_available() {
        let location = store
            .db_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        bail!("Task database unavailable at {}", location);
    }

    let result = run(&mut store, cli.command);
    store.shutdown();
    result
}

fn run(store: &mut Store, command: Commands) -> Result<()> {
    match command {
        Commands::Add { title, description } => {
            if title.trim().is_empty() {
                bail!("Title cannot be empty");
            }
            let id = store.try_insert(&title, &description).context("Failed to add task")?;
            success(&format!("Task {} added", id));
        }
        Commands::List {
            search,
            filter,
            sort,
            limit,
            page,
            all_pages,
            json,
        } => {
            let tasks = if all_pages {
                let query = TaskQuery::page(limit.max(1), 0).search(search).filter(filter).sort(sort);
                let mut controller = ListController::from_query(store, &query);
                while controller.load_more() > 0 {}
                controller.items().to_vec()
            } else {
                let offset = page
                    .checked_mul(limit)
                    .ok_or_else(|| eyre!("Page {} is out of range", page))?;
                let query = TaskQuery::page(limit, offset).search(search).filter(filter).sort(sort);
                store.try_query(&query).context("Failed to list tasks")?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("{}", "No tasks".dimmed());
            } else {
                for task in &tasks {
                    print_task(task);
                }
                let noun = if tasks.len() == 1 { "task" } else { "tasks" };
                println!("{}", format!("{} {}", tasks.len(), noun).dimmed());
            }
        }
        Commands::Show { id, json } => {
            let task = store
                .try_get(id)
                .context("Failed to read task")?
                .ok_or_else(|| eyre!("Task {} not found", id))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&task)?);
            } else {
                print_task(&task);
                if !task.description.is_empty() {
                    println!("      {}", task.description);
                }
            }
        }
        Commands::Edit { id, title, description } => {
            let current = store
                .try_get(id)
                .context("Failed to read task")?
                .ok_or_else(|| eyre!("Task {} not found", id))?;

            let title = title.unwrap_or(current.title);
            let description = description.unwrap_or(current.description);
            if title.trim().is_empty() {
                bail!("Title cannot be empty");
            }
            if !store
                .try_update(id, &title, &description, current.completed)
                .context("Failed to update task")?
            {
                bail!("Task {} not found", id);
            }
            success("Task updated");
        }
        Commands::Done { id } => set_completed(store, id, true)?,
        Commands::Undone { id } => set_completed(store, id, false)?,
        Commands::Delete { id } => {
            if !store.try_delete(id).context("Failed to delete task")? {
                bail!("Task {} not found", id);
            }
            success("Task deleted");
        }
        Commands::ClearCompleted => {
            let removed = store.try_clear_completed().context("Failed to clear tasks")?;
            if removed == 0 {
                println!("{}", "No completed tasks".dimmed());
            } else {
                success(&format!("Cleared {} completed tasks", removed));
            }
        }
        Commands::Count => {
            let count = store.try_count().context("Failed to count tasks")?;
            println!("{}", count);
        }
    }

    Ok(())
}

fn set_completed(store: &mut Store, id: i64, completed: bool) -> Result<()> {
    if !store
        .try_toggle_completed(id, completed)
        .context("Failed to update task")?
    {
        bail!("Task {} not found", id);
    }
    success(if completed { "Task completed" } else { "Task reopened" });
    Ok(())
}

fn success(message: &str) {
    println!("{}", message.green());
}

fn print_task(task: &Task) {
    let mark = if task.completed { "[x]".green() } else { "[ ]".normal() };
    let title = if task.completed {
        task.title.strikethrough().dimmed()
    } else {
        task.title.bold()
    };
    let created = chrono::DateTime::from_timestamp_millis(task.created_at)
        .map(|dt| dt.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    println!("{:>4} {} {} {}", task.id.to_string().cyan(), mark, title, created.dimmed());
}

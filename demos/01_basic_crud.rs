//! Example 01: Basic CRUD Operations
//!
//! This example demonstrates inserting, reading, updating, completing and
//! deleting tasks with the task store.
//!
//! Run with: cargo run --example 01_basic_crud

use eyre::Result;
use todostore::{Store, TaskQuery};

fn main() -> Result<()> {
    // Create a temporary directory for this example
    let temp_dir = tempfile::tempdir()?;

    println!("Task Store Basic CRUD Example");
    println!("=============================\n");

    let mut store = Store::open(temp_dir.path())?;
    if let Some(path) = store.db_path() {
        println!("Database: {}\n", path.display());
    }

    // CREATE
    println!("1. CREATE - Adding two tasks...");
    let milk = store.try_insert("Buy milk", "2%")?;
    let report = store.try_insert("Write report", "")?;
    println!("   Created tasks {} and {}\n", milk, report);

    // READ
    println!("2. READ - Retrieving task {}...", milk);
    match store.try_get(milk)? {
        Some(task) => {
            println!("   - Title: {}", task.title);
            println!("   - Description: {}", task.description);
            println!("   - Completed: {}", task.completed);
        }
        None => println!("   Task not found!"),
    }
    println!();

    // UPDATE
    println!("3. UPDATE - Renaming task {}...", report);
    store.try_update(report, "Write quarterly report", "due friday", false)?;
    println!("   Updated: {:?}\n", store.try_get(report)?.map(|t| t.title));

    // TOGGLE
    println!("4. TOGGLE - Completing task {}...", milk);
    store.try_toggle_completed(milk, true)?;

    println!("   All tasks, newest first:");
    for task in store.try_query(&TaskQuery::default())? {
        let mark = if task.completed { "x" } else { " " };
        println!("   [{}] #{} {}", mark, task.id, task.title);
    }
    println!();

    // DELETE
    println!("5. DELETE - Removing task {}...", report);
    let deleted = store.try_delete(report)?;
    println!("   Deleted: {}", deleted);
    println!("   Deleting it again: {}", store.try_delete(report)?);
    println!("   Remaining tasks: {}\n", store.try_count()?);

    store.shutdown();
    println!("Done.");
    Ok(())
}

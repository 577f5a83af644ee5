//! Example 02: Searching, Filtering, Sorting and Paging
//!
//! This example seeds a store and then walks through the query options:
//! completion filters, case-insensitive search, sort orders and offset paging.
//!
//! Run with: cargo run --example 02_filtering

use eyre::Result;
use todostore::{ListController, SortOrder, Store, TaskFilter, TaskQuery};

fn main() -> Result<()> {
    let mut store = Store::open_in_memory()?;

    println!("Task Store Filtering Example");
    println!("============================\n");

    let seed = [
        ("Buy milk", "2%", false),
        ("Write report", "quarterly numbers", true),
        ("call plumber", "kitchen sink", false),
        ("Book flights", "", true),
        ("buy birthday gift", "for Sam", false),
    ];
    for (title, description, completed) in seed {
        let id = store.try_insert(title, description)?;
        if completed {
            store.try_toggle_completed(id, true)?;
        }
    }
    println!("Seeded {} tasks\n", store.try_count()?);

    // Completion filter
    for filter in [TaskFilter::All, TaskFilter::Active, TaskFilter::Completed] {
        let tasks = store.try_query(&TaskQuery::default().filter(filter))?;
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        println!("filter={:<9} -> {:?}", filter.to_string(), titles);
    }
    println!();

    // Search matches title or description, ignoring ASCII case
    for needle in ["buy", "SINK", "zzz"] {
        let tasks = store.try_query(&TaskQuery::default().search(needle))?;
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        println!("search={:<5} -> {:?}", needle, titles);
    }
    println!();

    // Sort orders
    for sort in [SortOrder::TitleAsc, SortOrder::TitleDesc, SortOrder::CreatedAsc] {
        let tasks = store.try_query(&TaskQuery::default().sort(sort))?;
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        println!("sort={:<12} -> {:?}", sort.to_string(), titles);
    }
    println!();

    // Offset paging, two rows at a time
    let mut offset = 0;
    loop {
        let page = store.try_query(&TaskQuery::page(2, offset).sort(SortOrder::CreatedAsc))?;
        if page.is_empty() {
            break;
        }
        let ids: Vec<_> = page.iter().map(|t| t.id).collect();
        println!("offset={} -> {:?}", offset, ids);
        offset += page.len();
    }
    println!();

    // The list controller does the same paging and tracks whether more rows remain
    let query = TaskQuery::page(2, 0).filter(TaskFilter::Active);
    let mut controller = ListController::from_query(&mut store, &query);
    while controller.load_more() > 0 {}
    println!(
        "controller loaded {} active tasks, has_more={}",
        controller.items().len(),
        controller.has_more()
    );

    Ok(())
}

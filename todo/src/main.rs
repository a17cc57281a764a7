//! Command-line demo of the todo state layer.
//!
//! Loads a seeded list through the facade, adds, toggles and deletes records,
//! then drives a derived view over the result. Settings come from `TODO_*`
//! environment variables; logging follows `RUST_LOG`.

use anyhow::Context;
use futures::StreamExt;
use std::sync::Arc;
use todo::{
    InMemoryTodoSource, Record, RecordField, Records, TodoConfig, TodoEnvironment, TodoFacade,
    UuidIds, ViewPipeline,
};
use tracing_subscriber::EnvFilter;

fn print_items(heading: &str, items: &[Record]) {
    println!("\n{heading}");
    for record in items {
        let status = if record.completed { "✓" } else { " " };
        println!("  [{status}] {} ({})", record.title, record.id);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = TodoConfig::from_env().context("loading configuration")?;
    tracing::info!(?config, "Starting todo demo");

    println!("=== Todo Demo ===");

    let source = InMemoryTodoSource::with_records(vec![
        Record::new("1", "Learn X").with_completed(true),
        Record::new("2", "Learn Y"),
        Record::new("3", "Build Z"),
    ])
    .with_latency(config.source.latency());

    let facade = TodoFacade::with_environment(
        TodoEnvironment::new(Arc::new(UuidIds), Arc::new(source.clone())),
        config.store.store_config(),
    );

    let mut completed = Box::pin(facade.completed_count());
    tokio::spawn(async move {
        while let Some(count) = completed.next().await {
            tracing::info!(count, "Completed count changed");
        }
    });

    facade.load()?;
    facade.settled().await;
    print_items("Loaded:", &facade.snapshot().items);

    println!("\nAdding 'Write documentation' and a blank title...");
    facade.add("Write documentation")?;
    if let Err(error) = facade.add("   ") {
        println!("  rejected: {error}");
    }
    facade.settled().await;

    println!("Toggling 'Learn Y', deleting 'Build Z'...");
    facade.toggle(&"2".into())?;
    facade.settled().await;
    facade.delete(&"3".into())?;
    facade.settled().await;

    let snapshot = facade.snapshot();
    print_items("Current status:", &snapshot.items);
    println!(
        "\nCompleted: {}/{} ({} active)",
        snapshot.completed_count, snapshot.count, snapshot.active_count
    );

    println!("\nFailing the next load...");
    source.fail_next(1);
    facade.load()?;
    facade.settled().await;
    println!("  error: {}", facade.snapshot().error.unwrap_or_default());

    println!("\n=== Derived view ===");
    let items: Records = facade.snapshot().items;
    let view = ViewPipeline::new(
        items.to_vec(),
        config.view.page_size.min(2),
        config.view.debounce(),
    );

    view.toggle_sort(RecordField::Title)?;
    for text in ["l", "le", "lea", "learn"] {
        view.set_query(text)?;
        tokio::time::sleep(config.view.debounce() / 4).await;
    }
    tokio::time::sleep(config.view.debounce()).await;

    let output = view.output();
    println!(
        "Query {:?}, sorted by title: page {}/{} ({} matches)",
        view.state().query,
        output.current_page,
        output.total_pages,
        output.total_matches
    );
    print_items("Page:", &output.page);

    println!("\nFinal state as JSON:");
    println!("{}", serde_json::to_string_pretty(&*facade.snapshot().items)?);

    view.shutdown().await?;
    facade.shutdown().await?;

    println!("\n=== Demo Complete ===");
    Ok(())
}

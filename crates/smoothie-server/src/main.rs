use anyhow::Context;
use clap::Parser;
use smoothie_core::Order;
use smoothie_server::dto::parse_catalog_file;
use smoothie_server::{init_tracing, App, Cli, Command};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let config = cli.resolve_config().context("loading configuration")?;
    let app = App::open(&config)?;

    match cli.command {
        Command::Serve { .. } => app.serve(config.server.bind).await,
        Command::Init => {
            println!("Schema ready in {}", app.store().location());
            Ok(())
        }
        Command::SeedCatalog { file } => seed_catalog(&app, &file).await,
        Command::Pending { json } => print_pending(&app, json).await,
    }
}

async fn seed_catalog(app: &App, file: &Path) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let rows = parse_catalog_file(&text).with_context(|| format!("parsing {}", file.display()))?;
    let offered = rows.len();

    let added = app.store().seed_catalog(rows).await?;
    tracing::info!(offered, added, "Catalog seeded");
    println!("Added {added} of {offered} ingredients");
    Ok(())
}

async fn print_pending(app: &App, json: bool) -> anyhow::Result<()> {
    let orders = app.shop().pending().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&orders)?);
        return Ok(());
    }

    if orders.is_empty() {
        println!("No pending orders");
        return Ok(());
    }
    println!("{:>6}  {:<20}  INGREDIENTS", "ID", "NAME");
    for Order {
        id,
        customer_name,
        ingredients,
        ..
    } in &orders
    {
        println!("{:>6}  {:<20}  {}", id.value(), customer_name, ingredients);
    }
    Ok(())
}

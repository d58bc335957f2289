use anyhow::Context;
use attr_stock::adapters::load_catalog;
use attr_stock::core::csv_io::export_filename;
use attr_stock::domain::model::{format_stock, OrderId, TermId};
use attr_stock::utils::{logger, validation::Validate};
use attr_stock::{AppConfig, Cli, Command, FileStore, StockEngine};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config.display(), e);
            eprintln!("💡 Make sure the file is valid TOML");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(store) = &cli.store {
        config.store.path = store.clone();
    }
    if let Some(catalog) = &cli.catalog {
        config.catalog.path = catalog.clone();
    }
    if let Command::Serve { bind: Some(bind) } = &cli.command {
        config.server.bind = bind.clone();
    }

    logger::init_logger(cli.verbose, config.logging.format);
    tracing::debug!("Config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let catalog = load_catalog(&config.catalog.path)
        .await
        .with_context(|| format!("loading catalog {}", config.catalog.path))?;
    let store = FileStore::open(&config.store.path)
        .await
        .with_context(|| format!("opening stock file {}", config.store.path))?;
    let engine = StockEngine::new(Arc::new(store), Arc::new(catalog));

    if engine.registry().is_empty() {
        tracing::warn!("⚠️ Catalog has no attribute taxonomies");
    }

    match cli.command {
        Command::Serve { .. } => {
            let addr = config.bind_addr()?;
            let app = attr_stock::server::build_app(engine, config.script_timing());
            attr_stock::server::serve(addr, app).await?;
        }
        Command::Export { output } => {
            let path = output
                .unwrap_or_else(|| export_filename(chrono::Local::now().date_naive()).into());
            let file = std::fs::File::create(&path)
                .with_context(|| format!("creating {}", path.display()))?;
            let rows = engine.export_csv(file).await?;
            println!("✅ Exported {} term(s) to {}", rows, path.display());
        }
        Command::Import { file } => {
            let reader = std::fs::File::open(&file)
                .with_context(|| format!("opening {}", file.display()))?;
            let summary = engine.import_csv(reader).await?;
            println!("✅ {}", summary.notice());
            for skipped in &summary.skipped {
                println!("   line {}: {}", skipped.line, skipped.reason);
            }
        }
        Command::Set { term_id, stock } => {
            let term_id = TermId::parse(&term_id)?;
            let outcome = engine.save_field(term_id, Some(&stock)).await;
            match outcome {
                Ok(outcome) => println!("✅ Term {}: {:?}", term_id, outcome),
                Err(e) => {
                    eprintln!("❌ {}", e.user_friendly_message());
                    std::process::exit(2);
                }
            }
        }
        Command::BulkSet {
            taxonomy,
            stock,
            term_ids,
        } => {
            let binding = engine
                .registry()
                .binding(&taxonomy)
                .with_context(|| format!("'{}' is not an attribute taxonomy", taxonomy))?;
            let request = attr_stock::core::bulk::BulkRequest {
                action: Some(attr_stock::core::bulk::BULK_ACTION.to_string()),
                action2: None,
                term_ids,
                stock: Some(stock),
            };
            match engine.apply_bulk(binding.name(), &request).await? {
                Some(outcome) => {
                    println!("✅ {} attribute stock(s) updated.", outcome.updated);
                    for id in &outcome.skipped_ids {
                        println!("   skipped '{}'", id);
                    }
                }
                None => println!("Nothing to update"),
            }
        }
        Command::CompleteOrder { order_id } => {
            let order_id = OrderId::parse(&order_id)?;
            let report = engine.complete_order(order_id).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::List => {
            for binding in engine.registry().bindings() {
                println!("{} ({})", binding.label(), binding.name());
                for row in engine.term_rows(binding.name()).await? {
                    let stock = format_stock(row.stock);
                    println!(
                        "  {:>6}  {:<20} {:<20} {}",
                        row.term.id.0,
                        row.term.name,
                        row.term.slug,
                        if stock.is_empty() { "-" } else { stock.as_str() }
                    );
                }
            }
        }
    }

    Ok(())
}

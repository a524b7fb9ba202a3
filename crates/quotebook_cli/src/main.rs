//! Command-line front end for the quote book.
//!
//! # Responsibility
//! - Map subcommands onto quote store operations.
//! - Render results and errors as plain text; exit non-zero on failure.

use clap::{Parser, Subcommand};
use log::info;
use quotebook_core::{
    init_from_config, CategoryFilter, CycleOutcome, NoticeKind, PickOutcome, QuotePersistence,
    QuoteSource, QuoteStore, QuotebookConfig, SyncAgent, EXPORT_FILE_NAME,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "quotebook")]
#[command(about = "Random quotes with categories, import/export and server sync", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON config file.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides config and QUOTEBOOK_DB_PATH).
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a random quote, restricted to the saved filter unless overridden.
    Show {
        #[arg(long)]
        category: Option<String>,
    },
    /// Add a quote.
    Add { text: String, category: String },
    /// List every quote in order.
    List,
    /// List filter options.
    Categories,
    /// Save the category filter (`all` clears it).
    Filter { value: String },
    /// Export quotes as pretty JSON.
    Export {
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Import quotes from a JSON file.
    Import { path: PathBuf },
    /// Run one sync cycle.
    Sync,
    /// Sync on the configured interval until interrupted.
    Watch {
        /// Stop after this many notices.
        #[arg(long)]
        cycles: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let mut config = QuotebookConfig::load(cli.config.as_deref()).map_err(|e| e.to_string())?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    init_from_config(&config).map_err(|e| e.to_string())?;

    let mut store = open_store(&config.db_path)?;

    match cli.command {
        Command::Show { category } => {
            let filter = match category {
                Some(value) => CategoryFilter::parse(&value),
                None => store.filter().clone(),
            };
            match store.pick_random(&filter).map_err(|e| e.to_string())? {
                PickOutcome::Picked(quote) => println!("{}", quote.display_line()),
                PickOutcome::NoQuotesInCategory => println!("No quotes in this category."),
            }
        }
        Command::Add { text, category } => {
            let quote = store.add(&text, &category).map_err(|e| e.to_string())?;
            println!("Added {}", quote.display_line());
        }
        Command::List => {
            for (index, quote) in store.quotes().iter().enumerate() {
                println!("{index:>4}  {}", quote.display_line());
            }
        }
        Command::Categories => {
            let selected = store.filter().clone();
            for option in store.filter_options() {
                let marker = if option == selected { "*" } else { " " };
                println!("{marker} {option}");
            }
        }
        Command::Filter { value } => {
            let filter = CategoryFilter::parse(&value);
            store.set_filter(filter.clone()).map_err(|e| e.to_string())?;
            println!("Filter set to {filter}");
        }
        Command::Export { out } => {
            let out = out.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
            let blob = store.export_blob().map_err(|e| e.to_string())?;
            std::fs::write(&out, blob)
                .map_err(|e| format!("failed to write `{}`: {e}", out.display()))?;
            println!("Exported {} quote(s) to {}", store.len(), out.display());
        }
        Command::Import { path } => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| format!("failed to read `{}`: {e}", path.display()))?;
            let added = store.import_blob(&text).map_err(|e| e.to_string())?;
            println!("Imported {added} quote(s).");
        }
        Command::Sync => {
            let agent =
                SyncAgent::from_config(store.into_shared(), &config.sync).map_err(|e| e.to_string())?;
            match agent.run_cycle().await {
                CycleOutcome::Synced(report) => {
                    println!("Quotes synced with server: {}", report.merged.display_line());
                    if !report.mirrored {
                        println!("(server copy was not updated)");
                    }
                }
                CycleOutcome::Failed(err) => return Err(format!("sync failed: {err}")),
                CycleOutcome::Skipped => println!("Sync already in progress."),
            }
        }
        Command::Watch { cycles } => watch(store, &config, cycles).await?,
    }

    Ok(())
}

fn open_store(db_path: &Path) -> Result<QuoteStore, String> {
    let persistence = QuotePersistence::open_sqlite(db_path)
        .map_err(|e| format!("failed to open `{}`: {e}", db_path.display()))?;
    let store = QuoteStore::open(persistence).map_err(|e| e.to_string())?;
    if let QuoteSource::RecoveredFromCorrupt { reason } = store.load_source() {
        eprintln!("warning: stored quotes were unreadable ({reason}); using defaults");
    }
    Ok(store)
}

async fn watch(
    store: QuoteStore,
    config: &QuotebookConfig,
    cycles: Option<u32>,
) -> Result<(), String> {
    let agent = Arc::new(
        SyncAgent::from_config(store.into_shared(), &config.sync).map_err(|e| e.to_string())?,
    );
    let mut notices = agent.notices().subscribe();
    let handle = Arc::clone(&agent).spawn();
    info!(
        "event=cli_watch module=cli status=start interval_secs={} core_version={}",
        config.sync.interval_secs,
        quotebook_core::core_version()
    );
    println!(
        "Syncing every {}s; press Ctrl-C to stop.",
        config.sync.interval_secs
    );

    let mut seen = 0u32;
    loop {
        tokio::select! {
            changed = notices.changed() => {
                if changed.is_err() {
                    break;
                }
                let notice = notices.borrow_and_update().clone();
                let Some(notice) = notice else { continue };
                let tag = match notice.kind {
                    NoticeKind::Success => "ok",
                    NoticeKind::Failed => "failed",
                };
                println!("[{tag}] {}", notice.message);
                seen += 1;
                if cycles.is_some_and(|limit| seen >= limit) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.stop().await;
    Ok(())
}

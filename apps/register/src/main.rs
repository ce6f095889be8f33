//! # tillbook
//!
//! Command-line front end over a register database.
//!
//! ## Usage
//! ```bash
//! # Counts and takings
//! tillbook summary
//!
//! # Import products from a name,stock,price file
//! tillbook import products.csv
//!
//! # Exports (stdout unless --out is given)
//! tillbook export catalog
//! tillbook export ledger --month 3
//! tillbook export ledger --week --out this_week.csv
//!
//! # Use another database
//! tillbook --db ./tillbook_dev.db summary
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tillbook_core::{Money, TransactionFilter};
use tillbook_db::{Database, DbConfig};
use tillbook_register::{init_tracing, Register, RegisterConfig};
use tracing::info;

/// Tillbook register
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Database file path (overrides TILLBOOK_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show catalog, cart and ledger counts
    Summary,

    /// Import products from a `name,stock,price` file
    Import {
        /// File to read
        file: PathBuf,
    },

    /// Write a collection as CSV
    Export {
        #[command(subcommand)]
        target: ExportTarget,
    },
}

#[derive(Debug, Subcommand)]
enum ExportTarget {
    /// The product catalog
    Catalog {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// The transaction ledger
    Ledger {
        /// Only transactions in this month (1-12)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Only transactions in the current week (Monday start, UTC)
        #[arg(short, long)]
        week: bool,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();

    let mut config = RegisterConfig::from_env();
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    info!(db_path = ?config.database_path, "Opening register");

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    let mut register = Register::open(Arc::new(db.store())).await?;

    match cli.command {
        Command::Summary => print_summary(&register, &config),
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)?;
            let report = register.import_products(&text).await;
            println!(
                "Imported {} products, skipped {} rows",
                report.imported, report.skipped
            );
        }
        Command::Export { target } => match target {
            ExportTarget::Catalog { out } => {
                if register.products().is_empty() {
                    println!("Catalog is empty, nothing to export");
                } else {
                    write_output(&register.export_catalog()?, out)?;
                }
            }
            ExportTarget::Ledger { month, week, out } => {
                let filter = TransactionFilter {
                    month,
                    current_week: week,
                };
                if register.transactions(filter).is_empty() {
                    println!("No transactions match, nothing to export");
                } else {
                    write_output(&register.export_ledger(filter)?, out)?;
                }
            }
        },
    }

    db.close().await;
    Ok(())
}

fn print_summary(register: &Register, config: &RegisterConfig) {
    let state = register.state();
    let takings: Money = state.ledger.transactions().iter().map(|t| t.total).sum();
    let this_week: Money = register
        .transactions(TransactionFilter::this_week())
        .into_iter()
        .map(|t| t.total)
        .sum();

    println!("{}", config.store_name);
    println!("{}", "=".repeat(config.store_name.chars().count()));
    println!("Products:      {}", state.catalog.len());
    println!("Fixed taxes:   {}", state.taxes.len());
    println!(
        "Cart:          {} lines, {} units",
        state.cart.len(),
        state.cart.total_quantity()
    );
    println!("Transactions:  {}", state.ledger.len());
    println!("Takings:       {}", config.format_currency(takings));
    println!("This week:     {}", config.format_currency(this_week));
}

fn write_output(csv: &str, out: Option<PathBuf>) -> std::io::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(&path, csv)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        None => {
            print!("{}", csv);
            Ok(())
        }
    }
}

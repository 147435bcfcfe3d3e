//! order-intake - CLI for order totals, sheet export/import and the database store.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use order_intake::{
    compute_totals, export_order_file, import_order_file, send_order, validate_phone, AppConfig,
    ImageStore, OrderRecord, SerialStrategy, SheetLayout,
};

/// Order intake: totals, spreadsheet export/import and the database store.
#[derive(Parser, Debug)]
#[command(name = "order-intake")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print line sums and the commission-adjusted total
    Total {
        /// Order JSON file
        #[arg(short, long)]
        order: PathBuf,

        /// Commission in percent (0-100)
        #[arg(long)]
        commission: Option<u32>,

        /// Output totals as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save an order as a spreadsheet
    Export {
        /// Order JSON file
        #[arg(short, long)]
        order: PathBuf,

        /// Output .xlsx path
        #[arg(short = 'O', long)]
        output: Option<PathBuf>,

        /// Serial strategy (uniform-suffix, repeat-collapse)
        #[arg(long)]
        strategy: Option<SerialStrategy>,
    },

    /// Read an order spreadsheet and print it as JSON
    Import {
        /// Input .xlsx path
        #[arg(short, long)]
        input: PathBuf,

        /// Read the legacy A1..A3 layout
        #[arg(long)]
        legacy: bool,
    },

    /// Append an order to the database store
    Send {
        /// Order JSON file
        #[arg(short, long)]
        order: PathBuf,

        /// Database store path
        #[arg(long)]
        database: Option<PathBuf>,

        /// Serial strategy (uniform-suffix, repeat-collapse)
        #[arg(long)]
        strategy: Option<SerialStrategy>,
    },

    /// Check a phone number against +7 (DDD) DDD-DD-DD
    CheckPhone {
        /// Phone number
        phone: String,
    },

    /// Manage the image folder
    Image {
        #[command(subcommand)]
        action: ImageAction,
    },
}

#[derive(Subcommand, Debug)]
enum ImageAction {
    /// Copy an image into the folder
    Add { file: PathBuf },
    /// Delete a stored image
    Remove { name: String },
    /// List stored images
    List,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => AppConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };

    match args.command {
        Command::Total {
            order,
            commission,
            json,
        } => {
            let record = load_order(&order)?;
            let commission = commission.unwrap_or(config.commission_percent);
            let totals = compute_totals(&record.lines, commission)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&totals)?);
            } else {
                for (idx, (line, sum)) in record.lines.iter().zip(&totals.line_sums).enumerate() {
                    println!("{:>3}. {:<30} {:>12.2}", idx + 1, line.name, sum);
                }
                println!("{}", totals.display());
            }
        }

        Command::Export {
            order,
            output,
            strategy,
        } => {
            if let Some(strategy) = strategy {
                config.serial_strategy = strategy;
            }
            let record = load_order(&order)?;
            let output_path = output.unwrap_or_else(|| {
                let mut path = order.clone();
                path.set_extension("xlsx");
                path
            });

            let serials = export_order_file(&record, &output_path, &config)
                .with_context(|| format!("Failed to save {}", output_path.display()))?;
            info!(
                "Generated: {} ({} row(s))",
                output_path.display(),
                serials.len()
            );
        }

        Command::Import { input, legacy } => {
            let layout = if legacy {
                SheetLayout::Legacy
            } else {
                SheetLayout::Denormalized
            };
            let record = import_order_file(&input, layout, &config.date_format)
                .with_context(|| format!("Failed to load {}", input.display()))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Command::Send {
            order,
            database,
            strategy,
        } => {
            if let Some(database) = database {
                config.database_path = database;
            }
            if let Some(strategy) = strategy {
                config.serial_strategy = strategy;
            }
            if !config.seed_serials_from_database {
                warn!("Serials are not checked against earlier sends");
            }

            let record = load_order(&order)?;
            let outcome = send_order(&record, &config).with_context(|| {
                format!("Failed to append to {}", config.database_path.display())
            })?;
            info!(
                "Sent {} row(s) to {}",
                outcome.rows_written,
                config.database_path.display()
            );
        }

        Command::CheckPhone { phone } => {
            if validate_phone(&phone) {
                println!("valid");
            } else {
                println!("invalid");
                anyhow::bail!("'{}' does not match +7 (DDD) DDD-DD-DD", phone);
            }
        }

        Command::Image { action } => {
            let store = ImageStore::open(&config.images_dir).with_context(|| {
                format!("Failed to open image folder {}", config.images_dir.display())
            })?;
            match action {
                ImageAction::Add { file } => {
                    let stored = store.add(&file)?;
                    println!("{}", stored.display());
                }
                ImageAction::Remove { name } => {
                    if !store.remove(&name)? {
                        warn!("No stored image named {}", name);
                    }
                }
                ImageAction::List => {
                    for name in store.list()? {
                        println!("{}", name);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Read an order JSON file and recompute its line sums.
fn load_order(path: &Path) -> Result<OrderRecord> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut record: OrderRecord = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    record.recompute_sums();
    Ok(record)
}

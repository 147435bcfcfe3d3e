//! order-intake - Order records, commission totals and spreadsheet exchange.
//!
//! This library holds the headless core of the order form: the order record,
//! line sums and the commission-adjusted total, per-row serial allocation,
//! and reading/writing order sheets and the append-only database store.
//!
//! # Example
//!
//! ```no_run
//! use order_intake::{export_order_file, AppConfig, LineItem, OrderRecord};
//! use std::path::Path;
//!
//! let mut record = OrderRecord::new("%d.%m.%Y");
//! record.serial_base = "2000".to_string();
//! record.add_line(LineItem::new("Panel", "pcs", "3", "150.50", ""));
//!
//! let config = AppConfig::default();
//! let serials = export_order_file(&record, Path::new("order.xlsx"), &config).unwrap();
//! println!("{:?}", serials);
//! ```

pub mod calc;
pub mod codec;
pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod serial;
pub mod store;
pub mod validation;

// Re-exports for convenience
pub use calc::{compute_grand_total, compute_line_sum, compute_totals, Totals};
pub use codec::{decode, encode, read_sheet, write_sheet, Sheet, SheetLayout};
pub use config::AppConfig;
pub use error::{ErrorCode, OrderError, Result};
pub use form::OrderForm;
pub use model::{LineItem, OrderRecord};
pub use serial::{SerialAllocator, SerialStrategy};
pub use store::{AppendOutcome, DatabaseStore, ImageStore};
pub use validation::{validate_order, validate_phone, PhonePolicy, ValidationResult};

use std::path::Path;
use tracing::{info, warn};

/// Run the pre-submit checks and log what they found.
///
/// Fails only when the phone policy blocks submission.
pub fn check_submission(record: &OrderRecord, config: &AppConfig) -> Result<ValidationResult> {
    let validation = validate_order(record, config.phone_policy, &config.date_format);

    for warning in &validation.warnings {
        warn!("{}", warning);
    }

    if !validation.passed {
        return Err(OrderError::InvalidPhone {
            phone: record.phone.clone(),
        });
    }

    Ok(validation)
}

/// Build the serial allocator for one export or send.
///
/// A fresh allocator knows nothing about earlier operations, so repeated sends
/// with the same base serial repeat serials. With `seed_serials_from_database`
/// the serials already in the database store are skipped.
pub fn allocator_for(config: &AppConfig) -> Result<SerialAllocator> {
    let mut allocator = SerialAllocator::new(config.serial_strategy);
    if config.seed_serials_from_database {
        let store = DatabaseStore::new(&config.database_path);
        let existing = store.read_serials()?;
        info!(
            "Seeded serial allocator with {} serial(s) from {}",
            existing.len(),
            store.path().display()
        );
        allocator.seed(existing);
    }
    Ok(allocator)
}

/// Save `record` as an order sheet at `output`.
///
/// Returns the serials written, one per line.
pub fn export_order_file(
    record: &OrderRecord,
    output: &Path,
    config: &AppConfig,
) -> Result<Vec<String>> {
    check_submission(record, config)?;

    let serials =
        allocator_for(config)?.allocate(record.effective_serial_base(), record.lines.len());
    let sheet = encode(record, &serials)?;
    write_sheet(output, &sheet, config.atomic_writes)?;

    info!("Saved {} line(s) to {}", serials.len(), output.display());
    Ok(serials)
}

/// Load an order sheet from `input`, rendering date cells with `date_format`.
pub fn import_order_file(
    input: &Path,
    layout: SheetLayout,
    date_format: &str,
) -> Result<OrderRecord> {
    let sheet = read_sheet(input)?;
    let record = layout.decode(&sheet, date_format)?;
    info!(
        "Loaded {} line(s) from {}",
        record.lines.len(),
        input.display()
    );
    Ok(record)
}

/// Append `record` to the database store named in `config`.
pub fn send_order(record: &OrderRecord, config: &AppConfig) -> Result<AppendOutcome> {
    check_submission(record, config)?;

    let serials =
        allocator_for(config)?.allocate(record.effective_serial_base(), record.lines.len());
    DatabaseStore::new(&config.database_path)
        .with_atomic_writes(config.atomic_writes)
        .append(record, &serials)
}

//! Configuration constants and settings for order intake.

use crate::error::{OrderError, Result};
use crate::serial::SerialStrategy;
use crate::validation::PhonePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Base serial used when the operator leaves the field empty.
pub const DEFAULT_SERIAL: &str = "1111";

/// Commission applied by a fresh form, in percent.
pub const DEFAULT_COMMISSION_PERCENT: u32 = 15;

/// Upper bound of the commission spin box.
pub const MAX_COMMISSION_PERCENT: u32 = 100;

/// Largest quantity or price the table editor accepts.
pub const MAX_AMOUNT: u32 = 1_000_000;

/// Decimal places the table editor accepts for quantity and price.
pub const AMOUNT_DP: u32 = 2;

/// Database store location, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "database.xlsx";

/// Image side-store folder.
pub const DEFAULT_IMAGES_DIR: &str = "images/";

/// Display format of the date controls.
pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y";

/// Currency shown next to the grand total.
pub const CURRENCY: &str = "AZN";

/// Header row fill colour (RGB).
pub const HEADER_FILL_RGB: u32 = 0x4F81BD;

/// Column names of the order sheet, in order.
pub const SHEET_HEADERS: [&str; 13] = [
    "Serial",
    "Фирма",
    "Ответственное лицо",
    "Телефон",
    "Дата начала",
    "Дата окончания",
    "Адрес",
    "Название продукта",
    "Ед. изм.",
    "Кол-во",
    "Цена",
    "Сумма",
    "Примечание",
];

/// Number of columns in the order sheet.
pub const COLUMN_COUNT: usize = SHEET_HEADERS.len();

/// Number of leading columns that repeat the order header on every row.
pub const HEADER_COLUMN_COUNT: usize = 7;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Commission applied to the line total, in percent.
    pub commission_percent: u32,
    /// Path of the append-only database store.
    pub database_path: PathBuf,
    /// Folder holding uploaded images.
    pub images_dir: PathBuf,
    /// How per-row serials are derived from the base serial.
    pub serial_strategy: SerialStrategy,
    /// Whether an invalid phone blocks export/send.
    pub phone_policy: PhonePolicy,
    /// Seed the serial allocator with serials already in the database store.
    pub seed_serials_from_database: bool,
    /// Write through a temporary file and rename into place.
    pub atomic_writes: bool,
    /// chrono format of the date display text.
    pub date_format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            commission_percent: DEFAULT_COMMISSION_PERCENT,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
            serial_strategy: SerialStrategy::default(),
            phone_policy: PhonePolicy::default(),
            seed_serials_from_database: false,
            atomic_writes: false,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| OrderError::file_access(path, e))?;
        let config: AppConfig =
            serde_json::from_str(&content).map_err(|e| OrderError::InvalidConfig {
                message: format!("{}: {}", path.display(), e),
            })?;
        config.check()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn check(&self) -> Result<()> {
        if self.commission_percent > MAX_COMMISSION_PERCENT {
            return Err(OrderError::InvalidCommission {
                value: self.commission_percent,
            });
        }
        if self.date_format.trim().is_empty() {
            return Err(OrderError::InvalidConfig {
                message: "date_format is empty".to_string(),
            });
        }
        Ok(())
    }
}

//! Persistent stores: the append-only database sheet and the image folder.

mod database;
mod images;

pub use database::{AppendOutcome, DatabaseStore};
pub use images::{ImageStore, IMAGE_EXTENSIONS};

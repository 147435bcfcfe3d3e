//! Order sheet codec and `.xlsx` file I/O.

mod layout;
mod sheet;
mod xlsx;

pub(crate) use layout::check_header;
pub use layout::{data_rows, decode, decode_legacy, decode_with_date_format, encode, SheetLayout};
pub use sheet::{cell_name, serial_to_datetime, CellValue, Sheet};
pub use xlsx::{read_sheet, write_sheet};

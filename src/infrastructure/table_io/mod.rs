// ============================================================
// TABLE I/O INFRASTRUCTURE LAYER
// ============================================================
// Spreadsheet / CSV readers and the consolidated output writer

mod csv_reader;
mod writer;
mod xlsx_reader;

pub use csv_reader::{decode, CsvTableReader};
pub use writer::{write_records, write_records_to};
pub use xlsx_reader::XlsxTableReader;

use std::path::Path;

use crate::domain::address::AddressTable;
use crate::domain::error::{AppError, Result};

/// Read one input table, picking the reader from the file extension.
pub fn read_table(path: &Path) -> Result<AddressTable> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "csv" | "txt" => CsvTableReader::new().read_file(path),
        "xlsx" | "xls" | "xlsm" | "ods" => XlsxTableReader::new().read_file(path),
        other => Err(AppError::ValidationError(format!(
            "Unsupported file extension: {}",
            other
        ))),
    }
}

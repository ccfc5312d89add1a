// ============================================================
// SPREADSHEET TABLE READER
// ============================================================

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::debug;

use crate::domain::address::AddressTable;
use crate::domain::error::{AppError, Result};

/// Reads the first worksheet; its first row holds the headers.
#[derive(Debug, Default)]
pub struct XlsxTableReader;

impl XlsxTableReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_file(&self, path: &Path) -> Result<AddressTable> {
        let source = path.display().to_string();
        let mut workbook = open_workbook_auto(path).map_err(|e| {
            AppError::ParseError(format!("Failed to open workbook {}: {}", source, e))
        })?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::ParseError(format!("{}: no worksheet found", source)))?
            .map_err(|e| AppError::ParseError(format!("{}: failed to read sheet: {}", source, e)))?;

        let table = Self::table_from_range(&source, &range);
        debug!(source = %source, rows = table.row_count(), "Workbook read");
        Ok(table)
    }

    fn table_from_range(source: &str, range: &Range<Data>) -> AddressTable {
        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|row| {
                row.iter()
                    .map(|cell| cell_text(cell).unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();

        let mut table = AddressTable::new(source, headers);
        for row in rows {
            table.push_row(row.iter().map(cell_text));
        }
        table
    }
}

/// Cell as text. Integral floats lose their `.0` so numeric identifiers
/// read back as written.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(text) => Some(text.clone()),
        Data::Int(value) => Some(value.to_string()),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            Some(format!("{}", *value as i64))
        }
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::Float(1234567.0)).as_deref(), Some("1234567"));
        assert_eq!(cell_text(&Data::Float(2.5)).as_deref(), Some("2.5"));
        assert_eq!(cell_text(&Data::Int(42)).as_deref(), Some("42"));
        assert_eq!(
            cell_text(&Data::String("MZ A".into())).as_deref(),
            Some("MZ A")
        );
    }

    #[test]
    fn test_table_from_range() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("CLIENTE_ID".into()));
        range.set_value((0, 1), Data::String("DIRECCION".into()));
        range.set_value((1, 0), Data::Float(1001.0));
        range.set_value((1, 1), Data::String("BRR EL RECREO MZ D 12".into()));
        range.set_value((2, 0), Data::Float(1002.0));

        let table = XlsxTableReader::table_from_range("book.xlsx", &range);
        assert_eq!(table.headers, vec!["CLIENTE_ID", "DIRECCION"]);
        assert_eq!(table.cell(0, 0), Some("1001"));
        assert_eq!(table.cell(0, 1), Some("BRR EL RECREO MZ D 12"));
        assert_eq!(table.cell(1, 1), None);
    }

    #[test]
    fn test_unreadable_workbook() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let err = XlsxTableReader::new().read_file(file.path()).unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }
}

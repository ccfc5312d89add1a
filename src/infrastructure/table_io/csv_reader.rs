// ============================================================
// CSV TABLE READER
// ============================================================
// Delimiter fallback and Windows-1252 decoding for billing exports

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use encoding_rs::WINDOWS_1252;
use tracing::debug;

use crate::domain::address::AddressTable;
use crate::domain::error::{AppError, Result};

/// CSV reader trying `;` first, then `,`
pub struct CsvTableReader {
    /// Delimiters in the order they are tried
    delimiters: Vec<u8>,

    trim: bool,
}

impl Default for CsvTableReader {
    fn default() -> Self {
        Self {
            delimiters: vec![b';', b','],
            trim: true,
        }
    }
}

impl CsvTableReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a single delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiters = vec![delimiter];
        self
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn read_file(&self, path: &Path) -> Result<AddressTable> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        self.read_content(&path.display().to_string(), &decode(&bytes))
    }

    /// Parse with each delimiter in turn; a parse yielding more than one
    /// column wins, otherwise the last attempt is kept.
    pub fn read_content(&self, source: &str, content: &str) -> Result<AddressTable> {
        let content = content.trim_start_matches('\u{feff}');
        let mut last: Option<AddressTable> = None;
        for delimiter in &self.delimiters {
            let table = self.parse_with(source, content, *delimiter)?;
            if table.headers.len() > 1 {
                debug!(source, delimiter = %(*delimiter as char), rows = table.row_count(), "CSV parsed");
                return Ok(table);
            }
            last = Some(table);
        }
        last.ok_or_else(|| AppError::ParseError(format!("{}: no delimiter configured", source)))
    }

    fn parse_with(&self, source: &str, content: &str, delimiter: u8) -> Result<AddressTable> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("{}: failed to read headers: {}", source, e)))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut table = AddressTable::new(source, headers);
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("{}: failed to parse row {}: {}", source, index + 1, e))
            })?;
            table.push_row(record.iter().map(Some));
        }
        Ok(table)
    }
}

/// UTF-8 when valid, Windows-1252 otherwise.
pub fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_semicolon_export() {
        let table = CsvTableReader::new()
            .read_content("t", "NIU;DIRECCION\n1;URB 25 DE MAYO MZ A CS 1\n2;\n")
            .unwrap();
        assert_eq!(table.headers, vec!["NIU", "DIRECCION"]);
        assert_eq!(table.cell(0, 1), Some("URB 25 DE MAYO MZ A CS 1"));
        assert_eq!(table.cell(1, 1), None);
    }

    #[test]
    fn test_comma_fallback() {
        let table = CsvTableReader::new()
            .read_content("t", "CLIENTE_ID,DIRECCION\n7,\"CRA 5 CL 10 - 20\"\n")
            .unwrap();
        assert_eq!(table.headers.len(), 2);
        assert_eq!(table.cell(0, 0), Some("7"));
        assert_eq!(table.cell(0, 1), Some("CRA 5 CL 10 - 20"));
    }

    #[test]
    fn test_bom_is_ignored() {
        let table = CsvTableReader::new()
            .read_content("t", "\u{feff}NIU;DIRECCION\n1;X\n")
            .unwrap();
        assert_eq!(table.headers[0], "NIU");
    }

    #[test]
    fn test_windows_1252_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        // "DIRECCIÓN" with Ó as 0xD3
        file.write_all(b"NIU;DIRECCI\xd3N\n1;BRR LA UNI\xd3N MZ 1 CS 2\n").unwrap();
        let table = CsvTableReader::new().read_file(file.path()).unwrap();
        assert_eq!(table.headers[1], "DIRECCIÓN");
        assert_eq!(table.cell(0, 1), Some("BRR LA UNIÓN MZ 1 CS 2"));
    }
}

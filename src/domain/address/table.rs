// ============================================================
// ADDRESS TABLE
// ============================================================
// Tabular input as read from a spreadsheet or CSV export

use crate::domain::error::{AppError, Result};
use crate::shared::text_fold::header_key;
use serde::{Deserialize, Serialize};

/// Accepted names for the free-text address column.
pub const ADDRESS_COLUMNS: &[&str] = &["DIRECCION", "DIR"];

/// Accepted names for the identifier column. `CLIENTE_ID` is renamed to `NIU`.
pub const ID_COLUMNS: &[&str] = &["NIU", "CLIENTE_ID"];

/// Header row plus nullable cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressTable {
    /// Source file or label, for logging
    pub source: String,

    pub headers: Vec<String>,

    /// Cells per row; blank cells are `None`
    pub rows: Vec<Vec<Option<String>>>,
}

/// Column positions resolved for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub id: usize,
    pub address: usize,
}

impl AddressTable {
    pub fn new(source: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            source: source.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Push a row of raw strings, turning blank cells into `None`.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let row = cells
            .into_iter()
            .map(|cell| {
                cell.map(Into::into)
                    .filter(|value: &String| !value.trim().is_empty())
            })
            .collect();
        self.rows.push(row);
    }

    pub fn with_row(mut self, cells: &[&str]) -> Self {
        self.push_row(cells.iter().map(|c| Some(*c)));
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the first header matching any of `names`, ignoring case,
    /// accents and whitespace.
    pub fn column_index(&self, names: &[&str]) -> Option<usize> {
        let keys: Vec<String> = self.headers.iter().map(|h| header_key(h)).collect();
        names
            .iter()
            .find_map(|name| keys.iter().position(|key| key == name))
    }

    /// Locate the identifier and address columns.
    pub fn resolve_columns(&self) -> Result<ColumnLayout> {
        let address = self.column_index(ADDRESS_COLUMNS).ok_or_else(|| {
            AppError::MissingColumn(format!(
                "{}: no address column (expected one of {})",
                self.source,
                ADDRESS_COLUMNS.join(", ")
            ))
        })?;
        let id = self.column_index(ID_COLUMNS).ok_or_else(|| {
            AppError::MissingColumn(format!(
                "{}: no identifier column (expected one of {})",
                self.source,
                ID_COLUMNS.join(", ")
            ))
        })?;
        Ok(ColumnLayout { id, address })
    }

    /// Cell value, `None` when the row is short or the cell blank.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .and_then(|cell| cell.as_deref())
    }
}

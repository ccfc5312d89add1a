// ============================================================
// ADDRESS RECORD
// ============================================================
// One output row: identifier, original text, normalized text, flag

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary validation flag, rendered as the strings `"1"` / `"0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Validation {
    #[serde(rename = "1")]
    Normalized,
    #[serde(rename = "0")]
    Unnormalized,
}

impl Validation {
    pub fn from_bool(validated: bool) -> Self {
        if validated {
            Validation::Normalized
        } else {
            Validation::Unnormalized
        }
    }

    pub fn is_normalized(self) -> bool {
        matches!(self, Validation::Normalized)
    }

    pub fn as_flag(self) -> &'static str {
        match self {
            Validation::Normalized => "1",
            Validation::Unnormalized => "0",
        }
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

/// A row of the consolidated output table.
///
/// Field order matches the output column order; serde renames give the
/// exact header names written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Identifier, copied unchanged from the `NIU` / `CLIENTE_ID` column
    #[serde(rename = "NIU")]
    pub id: Option<String>,

    /// Original free text, never mutated
    #[serde(rename = "DIRECCION")]
    pub raw_address: Option<String>,

    /// Canonical reconstruction, or a cleaned copy when normalization failed
    #[serde(rename = "DIRECCION_NORMALIZADA")]
    pub normalized_address: Option<String>,

    #[serde(rename = "VALIDACION")]
    pub validated: Validation,
}

impl AddressRecord {
    pub fn new(
        id: Option<String>,
        raw_address: Option<String>,
        normalized_address: Option<String>,
        validated: Validation,
    ) -> Self {
        Self {
            id,
            raw_address,
            normalized_address,
            validated,
        }
    }

    pub fn is_normalized(&self) -> bool {
        self.validated.is_normalized()
    }

    /// Revert to the raw text with a `"0"` flag.
    pub fn revert_to_raw(&mut self) {
        self.normalized_address = self.raw_address.clone();
        self.validated = Validation::Unnormalized;
    }
}

/// Output column names, in order.
pub const OUTPUT_COLUMNS: [&str; 4] = ["NIU", "DIRECCION", "DIRECCION_NORMALIZADA", "VALIDACION"];

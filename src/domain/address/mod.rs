// ============================================================
// ADDRESS DOMAIN LAYER
// ============================================================
// Core types and value objects for address normalization
// No I/O

mod fields;
mod normalizer_config;
mod record;
mod stats;
mod table;

pub use fields::{ExtractedFields, FieldKind};
pub use normalizer_config::{BatchMode, NormalizerConfig};
pub use record::{AddressRecord, Validation, OUTPUT_COLUMNS};
pub use stats::NormalizationStats;
pub use table::{AddressTable, ColumnLayout, ADDRESS_COLUMNS, ID_COLUMNS};

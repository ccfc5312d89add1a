// ============================================================
// NORMALIZATION STATISTICS
// ============================================================
// Aggregate success counts over a set of output records

use super::AddressRecord;
use serde::{Deserialize, Serialize};

/// Row and success counts for a batch of records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    /// Total number of records
    pub total: usize,

    /// Records flagged `"1"`
    pub validated: usize,

    /// `validated / total` as a percentage, two decimals; 0 for an empty batch
    pub percentage: f64,
}

impl NormalizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[AddressRecord]) -> Self {
        let mut stats = Self::new();
        for record in records {
            stats.add(record);
        }
        stats
    }

    pub fn add(&mut self, record: &AddressRecord) {
        self.total += 1;
        if record.is_normalized() {
            self.validated += 1;
        }
        self.refresh();
    }

    pub fn merge(&mut self, other: &NormalizationStats) {
        self.total += other.total;
        self.validated += other.validated;
        self.refresh();
    }

    pub fn unvalidated(&self) -> usize {
        self.total - self.validated
    }

    fn refresh(&mut self) {
        self.percentage = if self.total == 0 {
            0.0
        } else {
            let raw = self.validated as f64 * 100.0 / self.total as f64;
            (raw * 100.0).round() / 100.0
        };
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Total addresses: {}\nNormalized: {}\nNot normalized: {}\nSuccess rate: {:.2}%",
            self.total,
            self.validated,
            self.unvalidated(),
            self.percentage
        )
    }
}

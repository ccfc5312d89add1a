// ============================================================
// BATCH ORCHESTRATOR USE CASE
// ============================================================
// Read every input table, run the selected families, write one
// consolidated output

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::application::use_cases::address_pipeline::AddressPipeline;
use crate::application::use_cases::normalization::{family, NeighborhoodNormalizer, FAMILIES};
use crate::domain::address::{AddressRecord, AddressTable, BatchMode, NormalizationStats, NormalizerConfig};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::table_io::{read_table, write_records};

/// Outcome of one batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub files_read: usize,
    pub files_skipped: usize,
    /// Stats per family id, for families that produced rows
    pub per_family: BTreeMap<String, NormalizationStats>,
    pub overall: NormalizationStats,
    pub output_path: PathBuf,
}

impl BatchSummary {
    /// Report printed at the end of a CLI run
    pub fn report(&self) -> String {
        let mut lines = vec![
            format!("Output: {}", self.output_path.display()),
            format!(
                "Files read: {} (skipped: {})",
                self.files_read, self.files_skipped
            ),
        ];
        for (id, stats) in &self.per_family {
            lines.push(format!(
                "  {:<16} {:>6} rows  {:>6} normalized  {:>6.2}%",
                id, stats.total, stats.validated, stats.percentage
            ));
        }
        lines.push(self.overall.summary());
        lines.push(format!(
            "Elapsed: {} ms",
            (self.finished_at - self.started_at).num_milliseconds()
        ));
        lines.join("\n")
    }
}

/// Runs the configured families over every table in the input directory
pub struct BatchOrchestrator {
    config: NormalizerConfig,
}

impl BatchOrchestrator {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Families named in the configuration, or every registered family,
    /// in registry order either way.
    pub fn selected_families(&self) -> Result<Vec<&'static dyn NeighborhoodNormalizer>> {
        if self.config.families.is_empty() {
            return Ok(FAMILIES.to_vec());
        }
        for id in &self.config.families {
            if family(id).is_none() {
                return Err(AppError::ValidationError(format!("Unknown family id: {}", id)));
            }
        }
        Ok(FAMILIES
            .iter()
            .copied()
            .filter(|f| self.config.families.iter().any(|id| id == f.id()))
            .collect())
    }

    /// Input files with an accepted extension, sorted by file name.
    pub fn input_files(&self) -> Result<Vec<PathBuf>> {
        let dir = &self.config.input_dir;
        if !dir.is_dir() {
            return Err(AppError::ValidationError(format!(
                "Input directory not found: {}",
                dir.display()
            )));
        }
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| self.config.accepts_extension(e))
            })
            .collect();
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Read, normalize and write. Unreadable files and families missing a
    /// column are skipped with a warning.
    pub fn run(&self) -> Result<BatchSummary> {
        let started_at = Utc::now();
        let families = self.selected_families()?;
        let pipeline = AddressPipeline::new(families);
        let files = self.input_files()?;

        let mut tables: Vec<AddressTable> = Vec::new();
        let mut files_skipped = 0;
        for path in &files {
            match read_table(path) {
                Ok(table) => tables.push(table),
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "Skipping unreadable file");
                    files_skipped += 1;
                }
            }
        }
        if tables.is_empty() {
            return Err(AppError::ValidationError(format!(
                "No readable input files in {}",
                self.config.input_dir.display()
            )));
        }

        let tagged = match self.config.mode {
            BatchMode::PerFamily => per_family(&pipeline, &tables),
            BatchMode::Dispatch => dispatched(&pipeline, &tables),
        };

        let mut per_family_stats: BTreeMap<String, NormalizationStats> = BTreeMap::new();
        for (id, record) in &tagged {
            per_family_stats.entry(id.to_string()).or_default().add(record);
        }
        let records: Vec<AddressRecord> = tagged.into_iter().map(|(_, record)| record).collect();
        let overall = NormalizationStats::from_records(&records);

        write_records(&self.config.output_path, &records)?;
        info!(
            output = %self.config.output_path.display(),
            files = tables.len(),
            rows = overall.total,
            validated = overall.validated,
            "Batch written"
        );

        Ok(BatchSummary {
            started_at,
            finished_at: Utc::now(),
            files_read: tables.len(),
            files_skipped,
            per_family: per_family_stats,
            overall,
            output_path: self.config.output_path.clone(),
        })
    }
}

/// Every family over every table; output grouped by family in registry
/// order, tables in file order within a family.
fn per_family(
    pipeline: &AddressPipeline,
    tables: &[AddressTable],
) -> Vec<(&'static str, AddressRecord)> {
    let mut out = Vec::new();
    for family in pipeline.families() {
        for table in tables {
            match pipeline.process(table, *family) {
                Ok(records) => out.extend(records.into_iter().map(|r| (family.id(), r))),
                Err(err) => warn!(
                    file = %table.source,
                    family = family.id(),
                    error = %err,
                    "Skipping family for file"
                ),
            }
        }
    }
    out
}

fn dispatched(
    pipeline: &AddressPipeline,
    tables: &[AddressTable],
) -> Vec<(&'static str, AddressRecord)> {
    let mut out = Vec::new();
    for table in tables {
        match pipeline.process_dispatch(table) {
            Ok(routed) => out.extend(routed.into_iter().map(|r| (r.family, r.record))),
            Err(err) => warn!(file = %table.source, error = %err, "Skipping file"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::table_io::CsvTableReader;
    use std::path::Path;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn config(dir: &Path) -> NormalizerConfig {
        NormalizerConfig::default()
            .with_input_dir(dir.join("in"))
            .with_output_path(dir.join("out.csv"))
    }

    #[test]
    fn test_per_family_run() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("in")).unwrap();
        write(
            &dir.path().join("in"),
            "c47.csv",
            "CLIENTE_ID;DIRECCION\n1;URB 25 DE MAYO MZN A CASA 12B\n2;BRR CHAMBRANAS MZA 3 CASA 7 PISO 02\n3;SIN DATO\n",
        );
        write(&dir.path().join("in"), "notes.txt", "ignored");

        let config = config(dir.path()).with_families(vec!["mayo".into(), "chambranas".into()]);
        let summary = BatchOrchestrator::new(config).run().unwrap();
        assert_eq!(summary.files_read, 1);
        assert_eq!(summary.overall.total, 2);
        assert_eq!(summary.overall.validated, 2);
        assert_eq!(summary.per_family["mayo"].total, 1);

        let written = CsvTableReader::new()
            .read_file(&dir.path().join("out.csv"))
            .unwrap();
        assert_eq!(
            written.headers,
            vec!["NIU", "DIRECCION", "DIRECCION_NORMALIZADA", "VALIDACION"]
        );
        assert_eq!(written.cell(0, 2), Some("URB 25 DE MAYO MZ A CS 12B"));
        assert_eq!(written.cell(1, 2), Some("BRR CHAMBRANAS MZ 3 CS 7 PI 2"));
        assert_eq!(written.cell(1, 3), Some("1"));
    }

    #[test]
    fn test_family_missing_column_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("in")).unwrap();
        write(&dir.path().join("in"), "a.csv", "NIU;BARRIO\n1;X\n");
        write(&dir.path().join("in"), "b.csv", "NIU;DIRECCION\n2;BRR EL RECREO MZ D 12\n");

        let config = config(dir.path()).with_families(vec!["recreo".into()]);
        let summary = BatchOrchestrator::new(config).run().unwrap();
        assert_eq!(summary.files_read, 2);
        assert_eq!(summary.overall.total, 1);
    }

    #[test]
    fn test_dispatch_mode() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("in")).unwrap();
        write(
            &dir.path().join("in"),
            "c1.csv",
            "NIU;DIRECCION\n1;CLL 26 CR 15 - 57 LC 1 PISO 2\n2;BRR EL RECREO MZ D 12\n",
        );
        let config = config(dir.path()).with_mode(BatchMode::Dispatch);
        let summary = BatchOrchestrator::new(config).run().unwrap();
        assert_eq!(summary.overall.total, 2);
        assert_eq!(summary.per_family.values().map(|s| s.total).sum::<usize>(), 2);
        assert!(summary.per_family.contains_key("recreo"));
    }

    #[test]
    fn test_missing_input_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = BatchOrchestrator::new(config(dir.path())).run().unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_unknown_family() {
        let config = NormalizerConfig::default().with_families(vec!["nowhere".into()]);
        assert!(BatchOrchestrator::new(config).selected_families().is_err());
    }

    #[test]
    fn test_selected_families_keep_registry_order() {
        let config =
            NormalizerConfig::default().with_families(vec!["recreo".into(), "mayo".into()]);
        let ids: Vec<&str> = BatchOrchestrator::new(config)
            .selected_families()
            .unwrap()
            .iter()
            .map(|f| f.id())
            .collect();
        assert_eq!(ids, vec!["mayo", "recreo"]);
    }
}

// ============================================================
// OUTPUT WRITER
// ============================================================

use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;

use crate::domain::address::{AddressRecord, OUTPUT_COLUMNS};
use crate::domain::error::{AppError, Result};

/// Write the consolidated table to `path`, creating parent directories.
pub fn write_records(path: &Path, records: &[AddressRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path).map_err(|e| {
        AppError::IoError(format!("Failed to create {}: {}", path.display(), e))
    })?;
    write_records_to(file, records)
}

/// Header row first, even for an empty batch.
pub fn write_records_to<W: Write>(out: W, records: &[AddressRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(OUTPUT_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::address::Validation;

    #[test]
    fn test_output_columns_and_flags() {
        let records = vec![
            AddressRecord::new(
                Some("1".into()),
                Some("brr chambranas mza 3 casa 7".into()),
                Some("BRR CHAMBRANAS MZ 3 CS 7".into()),
                Validation::Normalized,
            ),
            AddressRecord::new(Some("2".into()), None, None, Validation::Unnormalized),
        ];
        let mut out = Vec::new();
        write_records_to(&mut out, &records).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "NIU,DIRECCION,DIRECCION_NORMALIZADA,VALIDACION");
        assert_eq!(lines[1], "1,brr chambranas mza 3 casa 7,BRR CHAMBRANAS MZ 3 CS 7,1");
        assert_eq!(lines[2], "2,,,0");
    }

    #[test]
    fn test_empty_batch_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("result.csv");
        write_records(&path, &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), "NIU,DIRECCION,DIRECCION_NORMALIZADA,VALIDACION");
    }
}

// ============================================================
// ADDRESS PIPELINE USE CASE
// ============================================================
// Normalize every row of a table, keep the relevant ones, collapse
// over-generic street results

use std::time::Instant;

use tracing::debug;

use crate::application::use_cases::normalization::{
    clean, collapse_generic_duplicates, is_relevant, normalize_address, NeighborhoodNormalizer,
    NormalizedAddress, FAMILIES,
};
use crate::domain::address::{AddressRecord, AddressTable, ColumnLayout, Validation};
use crate::domain::error::Result;

/// A record together with the family that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedRecord {
    pub family: &'static str,
    pub record: AddressRecord,
}

/// Record pipeline over a fixed set of families
pub struct AddressPipeline {
    families: Vec<&'static dyn NeighborhoodNormalizer>,
}

impl AddressPipeline {
    pub fn new(families: Vec<&'static dyn NeighborhoodNormalizer>) -> Self {
        Self { families }
    }

    /// Pipeline over every registered family
    pub fn all_families() -> Self {
        Self::new(FAMILIES.to_vec())
    }

    pub fn families(&self) -> &[&'static dyn NeighborhoodNormalizer] {
        &self.families
    }

    /// Run one family over `table`.
    ///
    /// Rows whose raw address the family does not mention are dropped, as
    /// are rows with no address cell; the rest come back in input order,
    /// flagged by the family's own validation. Fails only when the
    /// identifier or address column is missing.
    pub fn process(
        &self,
        table: &AddressTable,
        family: &dyn NeighborhoodNormalizer,
    ) -> Result<Vec<AddressRecord>> {
        let start = Instant::now();
        let layout = table.resolve_columns()?;

        let mut records: Vec<AddressRecord> = (0..table.row_count())
            .filter_map(|row| {
                let raw = table.cell(row, layout.address)?;
                let cleaned = clean(raw);
                if !is_relevant(family, raw, &cleaned) {
                    return None;
                }
                Some(build_record(table, layout, row, family.normalize(&cleaned)))
            })
            .collect();

        let reverted = if family.collapses_generic_duplicates() {
            collapse_generic_duplicates(&mut records)
        } else {
            0
        };

        debug!(
            source = %table.source,
            family = family.id(),
            rows = table.row_count(),
            kept = records.len(),
            reverted,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Family processed table"
        );
        Ok(records)
    }

    /// Route each row once through the ordered dispatcher.
    ///
    /// Rows no family claims, and rows claimed by a family outside this
    /// pipeline's selection, are dropped. The duplicate collapse runs per
    /// family over that family's share of the table.
    pub fn process_dispatch(&self, table: &AddressTable) -> Result<Vec<RoutedRecord>> {
        let layout = table.resolve_columns()?;

        let mut routed: Vec<RoutedRecord> = (0..table.row_count())
            .filter_map(|row| {
                let raw = table.cell(row, layout.address)?;
                let outcome = normalize_address(raw);
                let family = outcome.family.filter(|id| self.selects(id))?;
                Some(RoutedRecord {
                    family,
                    record: build_record(table, layout, row, outcome.result),
                })
            })
            .collect();

        for family in self.families.iter().filter(|f| f.collapses_generic_duplicates()) {
            collapse_family_share(&mut routed, family.id());
        }

        debug!(
            source = %table.source,
            rows = table.row_count(),
            kept = routed.len(),
            "Dispatched table"
        );
        Ok(routed)
    }

    fn selects(&self, id: &str) -> bool {
        self.families.iter().any(|f| f.id() == id)
    }
}

fn build_record(
    table: &AddressTable,
    layout: ColumnLayout,
    row: usize,
    result: NormalizedAddress,
) -> AddressRecord {
    AddressRecord::new(
        table.cell(row, layout.id).map(str::to_string),
        table.cell(row, layout.address).map(str::to_string),
        Some(result.text),
        Validation::from_bool(result.validated),
    )
}

fn collapse_family_share(routed: &mut [RoutedRecord], family: &str) {
    let positions: Vec<usize> = routed
        .iter()
        .enumerate()
        .filter(|(_, r)| r.family == family)
        .map(|(i, _)| i)
        .collect();
    let mut share: Vec<AddressRecord> = positions.iter().map(|i| routed[*i].record.clone()).collect();
    if collapse_generic_duplicates(&mut share) == 0 {
        return;
    }
    for (i, record) in positions.into_iter().zip(share) {
        routed[i].record = record;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::normalization::family;
    use crate::domain::error::AppError;

    fn table(rows: &[(&str, &str)]) -> AddressTable {
        let mut table = AddressTable::new("test", vec!["CLIENTE_ID".into(), "DIRECCION".into()]);
        for (id, address) in rows {
            table.push_row(vec![Some(*id), Some(*address)]);
        }
        table
    }

    #[test]
    fn test_process_filters_to_relevant_rows() {
        let pipeline = AddressPipeline::all_families();
        let mayo = family("mayo").unwrap();
        let input = table(&[
            ("1", "urb 25 de mayo mzn a casa 12b"),
            ("2", "BRR LA MIRANDA MZ C CS 12"),
            ("3", "25 DE MAYO URB ZONA COMUN"),
        ]);

        let records = pipeline.process(&input, mayo).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_deref(), Some("1"));
        assert_eq!(records[0].raw_address.as_deref(), Some("urb 25 de mayo mzn a casa 12b"));
        assert_eq!(
            records[0].normalized_address.as_deref(),
            Some("URB 25 DE MAYO MZ A CS 12B")
        );
        assert!(records[0].is_normalized());
        assert_eq!(records[1].id.as_deref(), Some("3"));
        assert!(!records[1].is_normalized());
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let pipeline = AddressPipeline::all_families();
        let input = AddressTable::new("test", vec!["NIU".into(), "BARRIO".into()])
            .with_row(&["1", "MAYO"]);
        let err = pipeline.process(&input, family("mayo").unwrap()).unwrap_err();
        assert!(matches!(err, AppError::MissingColumn(_)));
    }

    #[test]
    fn test_null_address_rows() {
        let mayo = family("mayo").unwrap();
        let mut input = table(&[]);
        input.push_row(vec![Some("9"), None::<&str>]);
        let records = AddressPipeline::all_families().process(&input, mayo).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_relevance_reads_the_raw_cell() {
        let input = table(&[("4", "NIU 25 DE MAYO MZ A CS 1")]);
        let pipeline = AddressPipeline::all_families();

        let records = pipeline.process(&input, family("mayo").unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].validated, Validation::Unnormalized);
        assert_eq!(records[0].normalized_address.as_deref(), Some("DE MAYO MZ A CS 1"));

        let routed = pipeline.process_dispatch(&input).unwrap();
        assert_eq!(routed.len(), 1);
        assert_eq!(routed[0].family, "mayo");
        assert!(!routed[0].record.is_normalized());
    }

    #[test]
    fn test_collapse_only_for_collapsing_family() {
        let rows: Vec<(&str, &str)> = (0..5).map(|_| ("7", "CRA 5 CL 10 - 20")).collect();
        let input = table(&rows);
        let pipeline = AddressPipeline::all_families();

        let chambranas = pipeline.process(&input, family("chambranas").unwrap()).unwrap();
        assert_eq!(chambranas.len(), 5);
        assert!(chambranas.iter().all(|r| !r.is_normalized()));
        assert!(chambranas
            .iter()
            .all(|r| r.normalized_address.as_deref() == Some("CRA 5 CL 10 - 20")));

        let intersection = pipeline.process(&input, family("intersection").unwrap()).unwrap();
        assert!(intersection.iter().all(|r| r.is_normalized()));
    }

    #[test]
    fn test_dispatch_routes_each_row_once() {
        let input = table(&[
            ("1", "URB 25 DE MAYO MZN A CASA 12B"),
            ("2", "BRR CHAMBRANAS MZA 3 CASA 7 PISO 02"),
            ("3", "SIN DIRECCION CONOCIDA"),
        ]);
        let routed = AddressPipeline::all_families().process_dispatch(&input).unwrap();
        assert_eq!(routed.len(), 2);
        assert_eq!(routed[0].family, "mayo");
        assert_eq!(routed[1].family, "chambranas");
        assert_eq!(
            routed[1].record.normalized_address.as_deref(),
            Some("BRR CHAMBRANAS MZ 3 CS 7 PI 2")
        );
    }

    #[test]
    fn test_dispatch_respects_family_selection() {
        let input = table(&[("1", "URB 25 DE MAYO MZN A CASA 12B")]);
        let pipeline = AddressPipeline::new(vec![family("cecilia").unwrap()]);
        assert!(pipeline.process_dispatch(&input).unwrap().is_empty());
    }
}

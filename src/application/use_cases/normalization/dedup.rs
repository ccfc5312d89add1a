// ============================================================
// GENERIC DUPLICATE COLLAPSE
// ============================================================
// Second pass over one family's batch output

use crate::domain::address::AddressRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// A bare intersection repeated more often than this is reverted.
pub const GENERIC_REPEAT_LIMIT: usize = 2;

static QUALIFIER_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:AP|PI|BQ|TO|ET|CS|LC|MZ|MACRO|MACROMEDIDOR|PU|MOTOBOMBA|OF|ECR|CN)\b")
        .unwrap()
});

static BARE_CARRERA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^CRA\s+\d+\s+CL\s+\S+\s+-\s+\S+\s*$").unwrap());

static BARE_CALLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^CLL\s+\S+\s+CR\s+\S+\s+-\s+\S+\s*$").unwrap());

/// Two street numbers and an offset with no qualifier after them.
pub fn is_bare_intersection(text: &str) -> bool {
    !QUALIFIER_WORD.is_match(text) && (BARE_CARRERA.is_match(text) || BARE_CALLE.is_match(text))
}

/// Revert every row whose normalized text is a bare intersection seen more
/// than [`GENERIC_REPEAT_LIMIT`] times in `records`. Counts include rows of
/// either flag. Returns the number of reverted rows.
pub fn collapse_generic_duplicates(records: &mut [AddressRecord]) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records.iter() {
        if let Some(text) = record.normalized_address.as_deref() {
            *counts.entry(text).or_insert(0) += 1;
        }
    }

    let generic: HashSet<String> = counts
        .into_iter()
        .filter(|(text, count)| *count > GENERIC_REPEAT_LIMIT && is_bare_intersection(text))
        .map(|(text, _)| text.to_string())
        .collect();

    let mut reverted = 0;
    for record in records.iter_mut() {
        let hit = record
            .normalized_address
            .as_ref()
            .is_some_and(|text| generic.contains(text));
        if hit {
            record.revert_to_raw();
            reverted += 1;
        }
    }
    reverted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::address::Validation;

    fn record(raw: &str, normalized: &str) -> AddressRecord {
        AddressRecord::new(
            Some("1".into()),
            Some(raw.into()),
            Some(normalized.into()),
            Validation::Normalized,
        )
    }

    #[test]
    fn test_bare_intersection() {
        assert!(is_bare_intersection("CRA 10 CL 20 - 30"));
        assert!(is_bare_intersection("CLL 26 CR 15 - 57"));
        assert!(!is_bare_intersection("CRA 10 CL 20 - 30 AP 2"));
        assert!(!is_bare_intersection("CRA 10 CL 20"));
        assert!(!is_bare_intersection("URB X MZ 1 CS 2"));
    }

    #[test]
    fn test_three_bare_repeats_revert_qualified_row_survives() {
        let mut records = vec![
            record("cra 10 cl 20-30", "CRA 10 CL 20 - 30"),
            record("CRA 10 CL 20 # 30", "CRA 10 CL 20 - 30"),
            record("K 10 CL 20 - 30", "CRA 10 CL 20 - 30"),
            record("CRA 10 CL 20 - 30 APTO 2", "CRA 10 CL 20 - 30 AP 2"),
        ];
        assert_eq!(collapse_generic_duplicates(&mut records), 3);
        assert_eq!(records[0].normalized_address.as_deref(), Some("cra 10 cl 20-30"));
        assert_eq!(records[0].validated, Validation::Unnormalized);
        assert!(records[3].is_normalized());
    }

    #[test]
    fn test_two_repeats_are_kept() {
        let mut records = vec![
            record("a", "CRA 10 CL 20 - 30"),
            record("b", "CRA 10 CL 20 - 30"),
        ];
        assert_eq!(collapse_generic_duplicates(&mut records), 0);
        assert!(records.iter().all(|r| r.is_normalized()));
    }
}

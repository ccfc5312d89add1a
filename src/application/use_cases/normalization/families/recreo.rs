// ============================================================
// PALMARES DEL RECREO / EL RECREO
// ============================================================

use crate::application::use_cases::normalization::canonical::{
    render_residential, residential_pattern, NormalizedAddress,
};
use crate::application::use_cases::normalization::residential::{checked, conforms_to};
use crate::application::use_cases::normalization::scanner::{Hit, Scanner, Shape};
use crate::application::use_cases::normalization::NeighborhoodNormalizer;
use crate::domain::address::{ExtractedFields, FieldKind};
use once_cell::sync::Lazy;
use regex::Regex;

const PALMARES: &[&[&str]] = &[
    &["PALMARES", "DEL", "RECREO"],
    &["PALMARES", "DE", "RECREO"],
    &["PALMARES", "RECREO"],
    &["PALMA", "DEL", "RECREO"],
    &["PALMA", "DE", "RECREO"],
];

const BLOCK_KEYS: &[&str] = &["MNZ", "MZN", "MZNA", "MZ", "MANZANA", "MZA", "M"];
const HOUSE_KEYS: &[&str] = &["CS", "CASA", "CAS", "C"];
const APARTMENT_KEYS: &[&str] = &["AP", "APT", "APTO", "APARTAMENTO"];
const FLOOR_KEYS: &[&str] = &["PI", "PISO", "PIS"];

const OPTIONAL: &[FieldKind] = &[FieldKind::Apartment, FieldKind::Floor];

static TEMPLATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![Regex::new(&residential_pattern(
        &["URB PALMARES DEL RECREO", "BRR EL RECREO"],
        OPTIONAL,
    ))
    .unwrap()]
});

pub struct Recreo;

impl NeighborhoodNormalizer for Recreo {
    fn id(&self) -> &'static str {
        "recreo"
    }

    fn display_name(&self) -> &'static str {
        "URB PALMARES DEL RECREO, BRR EL RECREO"
    }

    fn mentions(&self, cleaned: &str) -> bool {
        cleaned.contains("RECREO")
    }

    fn normalize(&self, cleaned: &str) -> NormalizedAddress {
        let scanner = Scanner::new(cleaned);
        // Palmares first: its names also contain RECREO.
        let named = scanner
            .find_any_phrase(PALMARES, 0)
            .map(|(_, span)| ("URB PALMARES DEL RECREO", span.end))
            .or_else(|| {
                scanner
                    .find_word(&["RECREO"], 0)
                    .map(|i| ("BRR EL RECREO", i + 1))
            });
        let Some((head, from)) = named else {
            return NormalizedAddress::passthrough(cleaned);
        };

        match extract(&scanner, from) {
            Some(fields) => checked(render_residential(head, &fields, OPTIONAL), &TEMPLATES, cleaned),
            None => NormalizedAddress::passthrough(cleaned),
        }
    }

    fn conforms(&self, text: &str) -> bool {
        conforms_to(&TEMPLATES, text)
    }
}

/// House keyed with a digit in it (`C12`, `A4`), or the first bare number.
fn house(scanner: &Scanner<'_>, from: usize) -> Option<Hit> {
    scanner
        .find_keyed(HOUSE_KEYS, Shape::Alnum(6), from)
        .filter(|hit| hit.value.chars().any(|c| c.is_ascii_digit()))
        .or_else(|| (from..scanner.len()).find_map(|i| scanner.bare_at(i, Shape::DigitsSuffix(4))))
}

fn extract(scanner: &Scanner<'_>, from: usize) -> Option<ExtractedFields> {
    let block = scanner.find_keyed(BLOCK_KEYS, Shape::Alnum(3), from)?;
    let house = house(scanner, block.next)?;
    let apartment = scanner.find_keyed(APARTMENT_KEYS, Shape::DigitsSuffix(4), block.next);
    let floor = scanner.find_keyed(FLOOR_KEYS, Shape::Digits(2), block.next);

    let mut fields = ExtractedFields::new()
        .with(FieldKind::Block, block.value)
        .with(FieldKind::Unit, house.value);
    fields.set_opt(FieldKind::Apartment, apartment.map(|hit| hit.value));
    fields.set_opt(FieldKind::Floor, floor.map(|hit| hit.value));
    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::normalization::preprocess::clean;

    fn run(raw: &str) -> NormalizedAddress {
        Recreo.normalize(&clean(raw))
    }

    #[test]
    fn test_palmares_before_el_recreo() {
        let out = run("CND PALMARES DE RECREO MZN B CASA 4");
        assert_eq!(out.text, "URB PALMARES DEL RECREO MZ B CS 4");
        assert!(out.validated);
    }

    #[test]
    fn test_el_recreo_bare_house() {
        let out = run("BRR EL RECREO MZ D 12");
        assert_eq!(out.text, "BRR EL RECREO MZ D CS 12");
        assert!(out.validated);
    }

    #[test]
    fn test_el_recreo_apartment_floor() {
        let out = run("BARRIO EL RECREO MZ A CS 12 APTO 201 PISO 02");
        assert_eq!(out.text, "BRR EL RECREO MZ A CS 12 AP 201 PI 2");
    }

    #[test]
    fn test_without_block_passes_through() {
        let out = run("PARQUE EL RECREO LOCAL 3");
        assert!(!out.validated);
        assert_eq!(out.text, "PARQUE EL RECREO LOCAL 3");
    }
}

// ============================================================
// CIUDAD DORADA / COOPERATIVO CIUDAD DORADA
// ============================================================

use crate::application::use_cases::normalization::canonical::{
    render_residential, residential_pattern, NormalizedAddress,
};
use crate::application::use_cases::normalization::residential::{
    checked, conforms_to, contains_any, find_loose,
};
use crate::application::use_cases::normalization::scanner::{Scanner, Shape};
use crate::application::use_cases::normalization::vocabulary::FLOOR;
use crate::application::use_cases::normalization::NeighborhoodNormalizer;
use crate::domain::address::{ExtractedFields, FieldKind};
use once_cell::sync::Lazy;
use regex::Regex;

const SIGNATURES: &[&str] = &["DORADA", "COOP", "COOPERAT"];

const BLOCK_KEYS: &[&str] = &["MNZ", "MZN", "MZ", "MZA", "MANZANA"];
const UNIT_KEYS: &[&str] = &["CS", "CASA", "C", "LT", "LOTE"];
const COOP_WORDS: &[&str] = &["COOP", "COOPERATIVO", "COOPERATIVA"];

const CIUDAD_DORADA: &str = "URB CIUDAD DORADA";
const COOPERATIVO: &str = "URB COOPERATIVO CIUDAD DORADA";

static TEMPLATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![Regex::new(&residential_pattern(&[CIUDAD_DORADA, COOPERATIVO], &[FieldKind::Floor])).unwrap()]
});

pub struct Dorada;

impl NeighborhoodNormalizer for Dorada {
    fn id(&self) -> &'static str {
        "dorada"
    }

    fn display_name(&self) -> &'static str {
        "URB CIUDAD DORADA, URB COOPERATIVO CIUDAD DORADA"
    }

    fn mentions(&self, cleaned: &str) -> bool {
        contains_any(cleaned, SIGNATURES)
    }

    fn normalize(&self, cleaned: &str) -> NormalizedAddress {
        let scanner = Scanner::new(cleaned);
        let cooperative = cleaned.contains("COOP");

        let head = if cooperative {
            scanner.find_word(COOP_WORDS, 0).map(|i| {
                match scanner.find_any_phrase(&[&["CIUDAD", "DORADA"], &["DORADA"]], i + 1) {
                    Some((_, span)) if span.start == i + 1 => span.end,
                    _ => i + 1,
                }
            })
        } else {
            scanner.find_word(&["DORADA"], 0).map(|i| i + 1)
        };
        let Some(from) = head else {
            return NormalizedAddress::passthrough(cleaned);
        };

        let name = if cooperative { COOPERATIVO } else { CIUDAD_DORADA };
        match extract(&scanner, from) {
            Some(fields) => checked(
                render_residential(name, &fields, &[FieldKind::Floor]),
                &TEMPLATES,
                cleaned,
            ),
            None => NormalizedAddress::passthrough(cleaned),
        }
    }

    fn conforms(&self, text: &str) -> bool {
        conforms_to(&TEMPLATES, text)
    }
}

/// Block and unit with or without keywords, then an optional floor.
fn extract(scanner: &Scanner<'_>, from: usize) -> Option<ExtractedFields> {
    let block = find_loose(scanner, BLOCK_KEYS, Shape::Alnum(3), Shape::DigitsSuffix(3), from)?;
    let unit = find_loose(
        scanner,
        UNIT_KEYS,
        Shape::DigitsSuffix(4),
        Shape::DigitsSuffix(4),
        block.next,
    )?;
    let floor = scanner.find_keyed(FLOOR, Shape::Digits(2), unit.next);
    let mut fields = ExtractedFields::new()
        .with(FieldKind::Block, block.value)
        .with(FieldKind::Unit, unit.value);
    fields.set_opt(FieldKind::Floor, floor.map(|hit| hit.value));
    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::normalization::preprocess::clean;

    fn run(raw: &str) -> NormalizedAddress {
        Dorada.normalize(&clean(raw))
    }

    #[test]
    fn test_ciudad_dorada() {
        let out = run("BRR CIUDAD DORADA MZ 12 CS 3 PISO 2");
        assert_eq!(out.text, "URB CIUDAD DORADA MZ 12 CS 3 PI 2");
        assert!(out.validated);
    }

    #[test]
    fn test_keywords_optional() {
        assert_eq!(run("CIUDAD DORADA 4 21").text, "URB CIUDAD DORADA MZ 4 CS 21");
    }

    #[test]
    fn test_cooperative_wins_over_dorada() {
        let out = run("URB COOPERATIVO CIUDAD DORADA MZ A LOTE 8");
        assert_eq!(out.text, "URB COOPERATIVO CIUDAD DORADA MZ A CS 8");
    }

    #[test]
    fn test_missing_unit() {
        let out = run("CIUDAD DORADA MZ 4");
        assert!(!out.validated);
        assert_eq!(out.text, "CIUDAD DORADA MZ 4");
    }
}

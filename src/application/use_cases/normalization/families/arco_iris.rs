// ============================================================
// ARCO IRIS / GIBRALTAR / BOSQUES DE GIBRALTAR
// ============================================================

use crate::application::use_cases::normalization::canonical::{
    render_residential, residential_pattern, NormalizedAddress,
};
use crate::application::use_cases::normalization::residential::{
    checked, conforms_to, contains_any, find_loose,
};
use crate::application::use_cases::normalization::scanner::{Scanner, Shape, Span};
use crate::application::use_cases::normalization::vocabulary::{stage_value, FLOOR};
use crate::application::use_cases::normalization::NeighborhoodNormalizer;
use crate::domain::address::{ExtractedFields, FieldKind};
use once_cell::sync::Lazy;
use regex::Regex;

const SIGNATURES: &[&str] = &["ARCO IRIS", "ARCOIRIS", "GIBRALTAR"];

const BLOCK_KEYS: &[&str] = &["MNZ", "MZN", "MZ", "MZA", "MANZANA"];
const UNIT_KEYS: &[&str] = &["CS", "CASA", "C"];
/// Gibraltar lots are numbered like houses.
const GIBRALTAR_UNIT_KEYS: &[&str] = &["CS", "CASA", "C", "LT", "LOTE"];
const STAGE_KEYS: &[&str] = &["ETAPA", "ETP", "ET"];
const BOSQUES: &[&str] = &["BOSQUES", "BOSQ", "BQ", "BQS"];

const OPTIONAL: &[FieldKind] = &[FieldKind::Floor, FieldKind::Stage];

static TEMPLATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![Regex::new(&residential_pattern(
        &["URB ARCO IRIS", "URB GIBRALTAR", "URB BOSQUES DE GIBRALTAR"],
        OPTIONAL,
    ))
    .unwrap()]
});

pub struct ArcoIris;

impl NeighborhoodNormalizer for ArcoIris {
    fn id(&self) -> &'static str {
        "arco_iris"
    }

    fn display_name(&self) -> &'static str {
        "URB ARCO IRIS, URB GIBRALTAR, URB BOSQUES DE GIBRALTAR"
    }

    fn mentions(&self, cleaned: &str) -> bool {
        contains_any(cleaned, SIGNATURES)
    }

    fn normalize(&self, cleaned: &str) -> NormalizedAddress {
        let scanner = Scanner::new(cleaned);

        let arco_iris = scanner
            .find_any_phrase(&[&["ARCO", "IRIS"], &["ARCOIRIS"]], 0)
            .map(|(_, span)| span);
        if let Some(head) = arco_iris {
            return render(&scanner, head, false, "URB ARCO IRIS", cleaned);
        }

        let Some(gibraltar) = scanner.find_word(&["GIBRALTAR"], 0) else {
            return NormalizedAddress::passthrough(cleaned);
        };
        let head = Span {
            start: gibraltar,
            end: gibraltar + 1,
        };
        let bosques = (0..gibraltar).any(|i| scanner.is_word(i, BOSQUES));
        let name = if bosques {
            "URB BOSQUES DE GIBRALTAR"
        } else {
            "URB GIBRALTAR"
        };
        render(&scanner, head, true, name, cleaned)
    }

    fn conforms(&self, text: &str) -> bool {
        conforms_to(&TEMPLATES, text)
    }
}

/// Stage anywhere after the name, then block, unit and floor in order.
/// Gibraltar addresses may omit the block and unit keywords.
fn render(
    scanner: &Scanner<'_>,
    head: Span,
    gibraltar: bool,
    name: &str,
    cleaned: &str,
) -> NormalizedAddress {
    match extract(scanner, head.end, gibraltar) {
        Some(fields) => checked(render_residential(name, &fields, OPTIONAL), &TEMPLATES, cleaned),
        None => NormalizedAddress::passthrough(cleaned),
    }
}

fn extract(scanner: &Scanner<'_>, from: usize, gibraltar: bool) -> Option<ExtractedFields> {
    let mut fields = ExtractedFields::new();

    let stage = scanner.find_keyed(STAGE_KEYS, Shape::Stage, from);
    fields.set_opt(FieldKind::Stage, stage.as_ref().map(|hit| stage_value(&hit.value)));

    let block = if gibraltar {
        find_loose(scanner, BLOCK_KEYS, Shape::Alnum(3), Shape::DigitsSuffix(3), from)?
    } else {
        scanner.find_keyed(BLOCK_KEYS, Shape::Alnum(3), from)?
    };
    let unit_keys = if gibraltar {
        GIBRALTAR_UNIT_KEYS
    } else {
        UNIT_KEYS
    };
    let unit = find_loose(
        scanner,
        unit_keys,
        Shape::DigitsSuffix(4),
        Shape::DigitsSuffix(4),
        block.next,
    )?;
    let floor = scanner.find_keyed(FLOOR, Shape::Digits(2), unit.next);

    fields.set(FieldKind::Block, block.value);
    fields.set(FieldKind::Unit, unit.value);
    fields.set_opt(FieldKind::Floor, floor.map(|hit| hit.value));
    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::normalization::preprocess::clean;

    fn run(raw: &str) -> NormalizedAddress {
        ArcoIris.normalize(&clean(raw))
    }

    #[test]
    fn test_arco_iris_stage_and_floor() {
        let out = run("URB ARCO IRIS ETAPA II MZ 4 CASA 12 PISO 01");
        assert_eq!(out.text, "URB ARCO IRIS MZ 4 CS 12 PI 1 ET 2");
        assert!(out.validated);
    }

    #[test]
    fn test_arco_iris_unit_without_keyword() {
        let out = run("ARCOIRIS MZ B 7");
        assert_eq!(out.text, "URB ARCO IRIS MZ B CS 7");
    }

    #[test]
    fn test_arco_iris_requires_block_keyword() {
        assert!(!run("ARCO IRIS 4 12").validated);
    }

    #[test]
    fn test_gibraltar_lot_as_unit() {
        let out = run("URB GIBRALTAR MZ 3 LOTE 15");
        assert_eq!(out.text, "URB GIBRALTAR MZ 3 CS 15");
        assert!(out.validated);
    }

    #[test]
    fn test_gibraltar_without_keywords() {
        let out = run("BRR GIBRALTAR 3 15 - ARMENIA");
        assert_eq!(out.text, "URB GIBRALTAR MZ 3 CS 15");
    }

    #[test]
    fn test_bosques_de_gibraltar() {
        let out = run("BOSQUES DE GIBRALTAR ET 3 MZ C CS 2");
        assert_eq!(out.text, "URB BOSQUES DE GIBRALTAR MZ C CS 2 ET 3");
    }
}

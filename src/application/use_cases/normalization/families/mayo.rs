// ============================================================
// 25 DE MAYO / CIUDADELA EL SOL / EL PLACER
// ============================================================

use crate::application::use_cases::normalization::canonical::{
    render_residential, residential_pattern, NormalizedAddress,
};
use crate::application::use_cases::normalization::residential::{
    checked, conforms_to, extract_fields, has_lot_marker, FieldRule,
};
use crate::application::use_cases::normalization::scanner::{Scanner, Shape};
use crate::application::use_cases::normalization::vocabulary::{APARTMENT, BLOCK, FLOOR, UNIT};
use crate::application::use_cases::normalization::NeighborhoodNormalizer;
use crate::domain::address::{ExtractedFields, FieldKind};
use once_cell::sync::Lazy;
use regex::Regex;

const MAYO: &[&str] = &["25", "DE", "MAYO"];
const EL_SOL: &[&str] = &["CIUDADELA", "EL", "SOL"];

const MAYO_FIELDS: &[FieldRule] = &[
    FieldRule::required(FieldKind::Block, BLOCK, Shape::Alnum(4)),
    FieldRule::required(FieldKind::Unit, UNIT, Shape::DigitsSuffix(4)),
    FieldRule::optional(FieldKind::Apartment, APARTMENT, Shape::Digits(4)),
    FieldRule::optional(FieldKind::Floor, FLOOR, Shape::Digits(2)),
];

/// Shared by CIUDADELA EL SOL and EL PLACER.
const FLOOR_ONLY_FIELDS: &[FieldRule] = &[
    FieldRule::required(FieldKind::Block, BLOCK, Shape::Alnum(4)),
    FieldRule::required(FieldKind::Unit, UNIT, Shape::DigitsSuffix(4)),
    FieldRule::optional(FieldKind::Floor, FLOOR, Shape::Digits(2)),
];

static TEMPLATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(&residential_pattern(
            &["URB 25 DE MAYO"],
            &[FieldKind::Apartment, FieldKind::Floor],
        ))
        .unwrap(),
        Regex::new(&residential_pattern(
            &["URB CIUDADELA EL SOL", "URB EL PLACER"],
            &[FieldKind::Floor],
        ))
        .unwrap(),
    ]
});

pub struct Mayo;

impl NeighborhoodNormalizer for Mayo {
    fn id(&self) -> &'static str {
        "mayo"
    }

    fn display_name(&self) -> &'static str {
        "URB 25 DE MAYO, URB CIUDADELA EL SOL, URB EL PLACER"
    }

    fn mentions(&self, cleaned: &str) -> bool {
        cleaned.contains("25 DE MAYO")
            || cleaned.contains("CIUDADELA EL SOL")
            || cleaned.contains("PLACER")
    }

    fn normalize(&self, cleaned: &str) -> NormalizedAddress {
        let scanner = Scanner::new(cleaned);
        if has_lot_marker(&scanner) {
            return NormalizedAddress::passthrough(cleaned);
        }

        if let Some(span) = scanner.find_phrase(MAYO, 0) {
            if let Some(fields) = apt_variant(&scanner, span.end) {
                let text = render_residential("URB 25 DE MAYO", &fields, &[FieldKind::Apartment]);
                return checked(text, &TEMPLATES, cleaned);
            }
            return render(
                &scanner,
                span.end,
                MAYO_FIELDS,
                "URB 25 DE MAYO",
                &[FieldKind::Apartment, FieldKind::Floor],
                cleaned,
            );
        }

        if let Some(span) = scanner.find_phrase(EL_SOL, 0) {
            return render(
                &scanner,
                span.end,
                FLOOR_ONLY_FIELDS,
                "URB CIUDADELA EL SOL",
                &[FieldKind::Floor],
                cleaned,
            );
        }

        if let Some(placer) = scanner.find_word(&["PLACER"], 0) {
            return render(
                &scanner,
                placer + 1,
                FLOOR_ONLY_FIELDS,
                "URB EL PLACER",
                &[FieldKind::Floor],
                cleaned,
            );
        }

        NormalizedAddress::passthrough(cleaned)
    }

    fn conforms(&self, text: &str) -> bool {
        conforms_to(&TEMPLATES, text)
    }
}

fn render(
    scanner: &Scanner<'_>,
    from: usize,
    rules: &[FieldRule],
    head: &str,
    optional: &[FieldKind],
    cleaned: &str,
) -> NormalizedAddress {
    match extract_fields(scanner, from, rules) {
        Some(fields) => checked(render_residential(head, &fields, optional), &TEMPLATES, cleaned),
        None => NormalizedAddress::passthrough(cleaned),
    }
}

/// `25 DE MAYO [MZ] A 12 APT 302`: block and unit written without a unit
/// keyword, apartment spelled `APT`.
fn apt_variant(scanner: &Scanner<'_>, from: usize) -> Option<ExtractedFields> {
    let mut at = scanner.skip_separators(from);
    if scanner.is_word(at, BLOCK) {
        at = scanner.skip_separators(at + 1);
    }
    let block = scanner.value_at(at, Shape::Alnum(4))?;
    let unit = scanner.value_at(block.next, Shape::DigitsSuffix(4))?;
    if !scanner.is_word(unit.next, &["APT"]) {
        return None;
    }
    let apartment = scanner.value_at(unit.next + 1, Shape::Digits(4))?;
    Some(
        ExtractedFields::new()
            .with(FieldKind::Block, block.value)
            .with(FieldKind::Unit, unit.value)
            .with(FieldKind::Apartment, apartment.value),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::normalization::preprocess::clean;

    fn run(raw: &str) -> NormalizedAddress {
        Mayo.normalize(&clean(raw))
    }

    #[test]
    fn test_mayo_synonyms() {
        let out = run("URB 25 DE MAYO MZN A CASA 12B");
        assert_eq!(out.text, "URB 25 DE MAYO MZ A CS 12B");
        assert!(out.validated);
        assert_eq!(run("25 de mayo manzana A casa 12B").text, out.text);
    }

    #[test]
    fn test_mayo_apartment_and_floor() {
        let out = run("URB 25 DE MAYO MZ 3 CS 4 APTO 0201 PISO 02");
        assert_eq!(out.text, "URB 25 DE MAYO MZ 3 CS 4 AP 201 PI 2");
    }

    #[test]
    fn test_mayo_apt_variant() {
        let out = run("25 DE MAYO MZ A 12 APT 302");
        assert_eq!(out.text, "URB 25 DE MAYO MZ A CS 12 AP 302");
        assert!(out.validated);
    }

    #[test]
    fn test_mayo_without_block_passes_through() {
        let out = run("25 DE MAYO URB ZONA COMUN");
        assert!(!out.validated);
        assert_eq!(out.text, "25 DE MAYO URB ZONA COMUN");
    }

    #[test]
    fn test_el_sol_lot_excluded() {
        let out = run("LOTE 4 URB CIUDADELA EL SOL MZ B CS 9");
        assert!(!out.validated);
        assert_eq!(out.text, "LOTE 4 URB CIUDADELA EL SOL MZ B CS 9");
        assert!(run("URB CIUDADELA EL SOL MZ B CS 9 PI 1").validated);
    }

    #[test]
    fn test_el_placer() {
        let out = run("BRR EL PLACER M 7 C 3 - ARMENIA");
        assert_eq!(out.text, "URB EL PLACER MZ 7 CS 3");
        let out = run("EL PLACER CERCA A LA IGLESIA");
        assert!(!out.validated);
        assert_eq!(out.text, "EL PLACER CERCA A LA IGLESIA");
    }
}

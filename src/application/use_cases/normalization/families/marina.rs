// ============================================================
// VILLA JULIANA / VILLA ITALIA / VILLA DEL CAFE / QUINTAS DE LA MARINA
// ============================================================

use crate::application::use_cases::normalization::canonical::{
    render_residential, residential_pattern, NormalizedAddress,
};
use crate::application::use_cases::normalization::residential::{
    checked, conforms_to, contains_any, find_loose,
};
use crate::application::use_cases::normalization::scanner::{Hit, Scanner, Shape};
use crate::application::use_cases::normalization::tokenizer::TokenKind;
use crate::application::use_cases::normalization::vocabulary::{is_reserved, stage_value};
use crate::application::use_cases::normalization::NeighborhoodNormalizer;
use crate::domain::address::{ExtractedFields, FieldKind};
use once_cell::sync::Lazy;
use regex::Regex;

const SIGNATURES: &[&str] = &["JULIANA", "VILLA ITALIA", "VILLA DEL CAFE", "MARIN", "M ARINA"];
const JULIANA_EXCLUSIONS: &[&str] = &["CASETA", "NIU", "ZONA", "LOCAL"];

const HOUSE_KEYS: &[&str] = &["CS", "CASA", "C"];
const STAGE_KEYS: &[&str] = &["ET", "ETAPA", "ETP"];
const JULIANA_BLOCK: &[&str] = &["MNZ", "MZN", "MZ", "MNA", "M"];
const ITALIA_BLOCK: &[&str] = &["MNZ", "MZN", "MZ"];
const CAFE_BLOCK: &[&str] = &["MNZ", "MZN", "MZ", "MZA", "MHNZ"];
const MARINA_BLOCK: &[&str] = &["MZ", "MZN", "MNZ", "MZA", "MN", "M"];
const MARINA_HOUSE: &[&str] = &["CS", "CASA", "CAS", "C", "CA", "APT", "AP", "INT", "APU"];
const MARINA_FLOOR: &[&str] = &["PISO", "PI", "P", "PIS"];
const MARINA_STAGE: &[&str] = &["ETAPA", "ET", "TP", "ETP"];

const JULIANA_OPTIONAL: &[FieldKind] = &[FieldKind::Apartment, FieldKind::Floor, FieldKind::Stage];
const ITALIA_OPTIONAL: &[FieldKind] = &[FieldKind::Apartment, FieldKind::Floor];
const CAFE_OPTIONAL: &[FieldKind] = &[FieldKind::Floor];
const MARINA_OPTIONAL: &[FieldKind] = &[FieldKind::Floor, FieldKind::Stage];

static TEMPLATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        ("URB VILLA JULIANA", JULIANA_OPTIONAL),
        ("URB VILLA ITALIA", ITALIA_OPTIONAL),
        ("URB VILLA DEL CAFE", CAFE_OPTIONAL),
        ("URB QUINTAS DE LA MARINA", MARINA_OPTIONAL),
    ]
    .iter()
    .map(|(head, optional)| Regex::new(&residential_pattern(&[head], optional)).unwrap())
    .collect()
});

pub struct Marina;

impl NeighborhoodNormalizer for Marina {
    fn id(&self) -> &'static str {
        "marina"
    }

    fn display_name(&self) -> &'static str {
        "URB VILLA JULIANA, URB VILLA ITALIA, URB VILLA DEL CAFE, URB QUINTAS DE LA MARINA"
    }

    fn mentions(&self, cleaned: &str) -> bool {
        contains_any(cleaned, SIGNATURES)
    }

    fn normalize(&self, cleaned: &str) -> NormalizedAddress {
        let scanner = Scanner::new(cleaned);

        if cleaned.contains("JULIANA") {
            if contains_any(cleaned, JULIANA_EXCLUSIONS) {
                return NormalizedAddress::passthrough(cleaned);
            }
            if let Some(fields) = juliana(&scanner) {
                return render("URB VILLA JULIANA", &fields, JULIANA_OPTIONAL, cleaned);
            }
        }
        if let Some(fields) = italia(&scanner) {
            return render("URB VILLA ITALIA", &fields, ITALIA_OPTIONAL, cleaned);
        }
        if let Some(fields) = cafe(&scanner) {
            return render("URB VILLA DEL CAFE", &fields, CAFE_OPTIONAL, cleaned);
        }
        if let Some(fields) = marina(&scanner) {
            return render("URB QUINTAS DE LA MARINA", &fields, MARINA_OPTIONAL, cleaned);
        }
        NormalizedAddress::passthrough(cleaned)
    }

    fn conforms(&self, text: &str) -> bool {
        conforms_to(&TEMPLATES, text)
    }
}

fn render(
    head: &str,
    fields: &ExtractedFields,
    optional: &[FieldKind],
    cleaned: &str,
) -> NormalizedAddress {
    checked(render_residential(head, fields, optional), &TEMPLATES, cleaned)
}

/// Stage right after `index`: keyed, or a bare number / roman numeral.
fn stage_at(scanner: &Scanner<'_>, index: usize, keys: &[&str]) -> Option<Hit> {
    let at = scanner.skip_separators(index);
    scanner
        .keyed_at(at, keys, Shape::Stage)
        .or_else(|| scanner.bare_at(at, Shape::ShortStage))
}

/// `VILLA JULIANA [stage] MZ m [CS] c [PI p] [AP a]`
fn juliana(scanner: &Scanner<'_>) -> Option<ExtractedFields> {
    let name = scanner.find_word(&["JULIANA"], 0)?;
    let stage = stage_at(scanner, name + 1, STAGE_KEYS)
        .filter(|hit| scanner.is_word(scanner.skip_separators(hit.next), JULIANA_BLOCK));
    let from = stage.as_ref().map_or(name + 1, |hit| hit.next);

    let block = scanner.find_keyed(JULIANA_BLOCK, Shape::Alnum(3), from)?;
    let house = find_loose(
        scanner,
        HOUSE_KEYS,
        Shape::DigitsSuffix(3),
        Shape::DigitsSuffix(3),
        block.next,
    )?;
    let floor = scanner.find_keyed(&["PISO", "PI"], Shape::Digits(2), house.next);
    let apartment = scanner.find_keyed(&["APT", "AP"], Shape::Digits(4), house.next);

    let mut fields = ExtractedFields::new()
        .with(FieldKind::Block, block.value)
        .with(FieldKind::Unit, house.value);
    fields.set_opt(FieldKind::Apartment, apartment.map(|hit| hit.value));
    fields.set_opt(FieldKind::Floor, floor.map(|hit| hit.value));
    fields.set_opt(FieldKind::Stage, stage.map(|hit| stage_value(&hit.value)));
    Some(fields)
}

/// `VILLA ITALIA MZ m [CS] c`, then either a floor or an apartment.
fn italia(scanner: &Scanner<'_>) -> Option<ExtractedFields> {
    let name = scanner.find_phrase(&["VILLA", "ITALIA"], 0)?;
    let block = scanner.find_keyed(ITALIA_BLOCK, Shape::Digits(3), name.end)?;
    let house = find_loose(
        scanner,
        HOUSE_KEYS,
        Shape::DigitsSuffix(3),
        Shape::DigitsSuffix(3),
        block.next,
    )?;
    let marker = (house.next..scanner.len()).find_map(|i| {
        let hit = scanner.keyed_at(i, &["PISO", "PI", "AP"], Shape::Digits(3))?;
        let kind = if scanner.is_word(i, &["AP"]) {
            FieldKind::Apartment
        } else {
            FieldKind::Floor
        };
        Some((kind, hit.value))
    });

    let mut fields = ExtractedFields::new()
        .with(FieldKind::Block, block.value)
        .with(FieldKind::Unit, house.value);
    if let Some((kind, value)) = marker {
        fields.set(kind, value);
    }
    Some(fields)
}

/// `VILLA DEL CAFE [MZ] <letter> [CS] c [PI] [p]`
fn cafe(scanner: &Scanner<'_>) -> Option<ExtractedFields> {
    let name = scanner.find_phrase(&["VILLA", "DEL", "CAFE"], 0)?;
    let (letter, after) = (name.end..scanner.len()).find_map(|i| {
        let at = if scanner.is_word(i, CAFE_BLOCK) {
            scanner.skip_separators(i + 1)
        } else {
            i
        };
        let token = scanner.token(at)?;
        let single = token.kind == TokenKind::Word
            && token.text.len() == 1
            && (at != i || !is_reserved(token.text));
        single.then(|| (token.text.to_string(), at + 1))
    })?;

    let at = scanner.skip_separators(after);
    let house = scanner
        .keyed_at(at, &["CS", "CASA"], Shape::DigitsSuffix(4))
        .or_else(|| scanner.value_at(at, Shape::DigitsSuffix(4)))?;
    let at = scanner.skip_separators(house.next);
    let floor = scanner
        .keyed_at(at, &["PISO", "PI", "P"], Shape::Digits(2))
        .or_else(|| scanner.value_at(at, Shape::Digits(2)));

    let mut fields = ExtractedFields::new()
        .with(FieldKind::Block, letter)
        .with(FieldKind::Unit, house.value);
    fields.set_opt(FieldKind::Floor, floor.map(|hit| hit.value));
    Some(fields)
}

/// Name written `MARINA`, `MARIN` or `M ARINA`.
fn marina_name(scanner: &Scanner<'_>) -> Option<usize> {
    scanner
        .find_word(&["MARINA", "MARIN"], 0)
        .map(|i| i + 1)
        .or_else(|| scanner.find_phrase(&["M", "ARINA"], 0).map(|span| span.end))
}

/// Adjacent sequence after the name: `[stage] [MZ] m [CS] c [PI] [p] [ET e]`.
fn marina(scanner: &Scanner<'_>) -> Option<ExtractedFields> {
    let mut at = scanner.skip_separators(marina_name(scanner)?);

    let stage = scanner.keyed_at(at, &["ET", "ETAPA", "ETP"], Shape::Stage).or_else(|| {
        let hit = scanner.bare_at(at, Shape::ShortStage)?;
        let block_follows = scanner.is_word(scanner.skip_separators(hit.next), MARINA_BLOCK);
        block_follows.then_some(hit)
    });
    if let Some(hit) = &stage {
        at = scanner.skip_separators(hit.next);
    }

    let block = scanner
        .keyed_at(at, MARINA_BLOCK, Shape::Alnum(3))
        .or_else(|| scanner.bare_at(at, Shape::Alnum(3)))?;
    at = scanner.skip_separators(block.next);

    let house = scanner
        .keyed_at(at, MARINA_HOUSE, Shape::Digits(4))
        .or_else(|| scanner.value_at(at, Shape::Digits(4)))?;
    at = scanner.skip_separators(house.next);

    let floor = scanner
        .keyed_at(at, MARINA_FLOOR, Shape::Digits(2))
        .or_else(|| scanner.value_at(at, Shape::Digits(2)));
    if let Some(hit) = &floor {
        at = scanner.skip_separators(hit.next);
    }
    let stage = stage.or_else(|| scanner.keyed_at(at, MARINA_STAGE, Shape::Stage));

    let mut fields = ExtractedFields::new()
        .with(FieldKind::Block, block.value)
        .with(FieldKind::Unit, house.value);
    fields.set_opt(FieldKind::Floor, floor.map(|hit| hit.value));
    fields.set_opt(FieldKind::Stage, stage.map(|hit| stage_value(&hit.value)));
    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::normalization::preprocess::clean;

    fn run(raw: &str) -> NormalizedAddress {
        Marina.normalize(&clean(raw))
    }

    #[test]
    fn test_villa_juliana_with_stage() {
        let out = run("URB VILLA JULIANA ETAPA II MZ 4 CS 12 AP 201");
        assert_eq!(out.text, "URB VILLA JULIANA MZ 4 CS 12 AP 201 ET 2");
        assert!(out.validated);
    }

    #[test]
    fn test_villa_juliana_exclusions() {
        let out = run("VILLA JULIANA CASETA COMUNAL");
        assert!(!out.validated);
        assert_eq!(out.text, "VILLA JULIANA CASETA COMUNAL");
    }

    #[test]
    fn test_villa_italia_marker() {
        assert_eq!(
            run("BRR VILLA ITALIA MZ 5 CASA 7 AP 2").text,
            "URB VILLA ITALIA MZ 5 CS 7 AP 2"
        );
        assert_eq!(
            run("VILLA ITALIA MZ 5 7 PISO 2").text,
            "URB VILLA ITALIA MZ 5 CS 7 PI 2"
        );
    }

    #[test]
    fn test_villa_del_cafe_letter_block() {
        let out = run("URB VILLA DEL CAFE MZ B CASA 007");
        assert_eq!(out.text, "URB VILLA DEL CAFE MZ B CS 7");
        assert_eq!(run("VILLA DEL CAFE D 12 2").text, "URB VILLA DEL CAFE MZ D CS 12 PI 2");
    }

    #[test]
    fn test_quintas_de_la_marina() {
        let out = run("QUINTAS DE LA MARINA MZ 3 CS 14");
        assert_eq!(out.text, "URB QUINTAS DE LA MARINA MZ 3 CS 14");
        assert!(out.validated);
        assert_eq!(
            run("QTAS DE LA M ARINA III MZ B 5").text,
            "URB QUINTAS DE LA MARINA MZ B CS 5 ET 3"
        );
        assert_eq!(
            run("MARINA MZ 4 CS 2 PISO 1 ETAPA 2").text,
            "URB QUINTAS DE LA MARINA MZ 4 CS 2 PI 1 ET 2"
        );
    }

    #[test]
    fn test_marina_needs_house() {
        assert!(!run("QUINTAS DE LA MARINA MZ 3").validated);
    }
}

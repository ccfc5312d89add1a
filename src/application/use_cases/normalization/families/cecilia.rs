// ============================================================
// LA CECILIA / BOSQUES DE LA CECILIA / VILLA YOLANDA
// ============================================================
// One alternation over the three sectors, adjacency-strict field sequence

use crate::application::use_cases::normalization::canonical::{CanonicalAddress, NormalizedAddress};
use crate::application::use_cases::normalization::preprocess::collapse_whitespace;
use crate::application::use_cases::normalization::residential::{
    conforms_to, contains_any, has_lot_marker,
};
use crate::application::use_cases::normalization::scanner::{Scanner, Shape};
use crate::application::use_cases::normalization::vocabulary::{canonical_number, stage_value};
use crate::application::use_cases::normalization::NeighborhoodNormalizer;
use crate::domain::address::{ExtractedFields, FieldKind};
use once_cell::sync::Lazy;
use regex::Regex;

const SIGNATURES: &[&str] = &["ECILIA", "CECICLIA", "VILLA YOLANDA", "KOA"];

const PREFIXES: &[&str] = &["URB", "BRR", "CJT", "UR"];
const CECILIA_NAMES: &[&str] = &["CECILIA", "CECICLIA", "ECILIA"];
const BOSQUES_NAMES: &[&str] = &["BOSQUES", "BQ", "BQUES", "UES", "BQDE"];

const LEADING_STAGE_KEYS: &[&str] = &["E", "ET", "ETAPA", "ETP"];
const BLOCK_KEYS: &[&str] = &["M", "MZ", "MZN", "MNZ", "MZA", "MN"];
const UNIT_KEYS: &[&str] = &["CS", "CASA", "CAS", "C"];
const FLOOR_KEYS: &[&str] = &["PISO", "PI", "P", "PIS"];
const TRAILING_STAGE_KEYS: &[&str] = &["ETAPA", "ET", "TP"];

/// Landmark notes dropped before matching.
static EXTRA_INFO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\b(?:FTE(?:\s+A)?|FT|FRENTE(?:\s+A\s+LA\s+CANCHA)?|CANCHA|ENS(?:\s+CANCHA)?",
        r"|DETRÁS(?:\s+DE\s+LA\s+CANCHA)?|DETRAS|DT|ETPI|ENSEG)\b"
    ))
    .unwrap()
});

static TRAILING_STREET_NOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*-\s*(?:AV|CALLE|CARRERA|CLL|CR|TO|AP|VILLA CECILIA)$").unwrap()
});

static TEMPLATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^URB LA CECILIA MZ \d+[A-Z]? CS \d+(?: PI \d+)?(?: ET \d+)?$",
        r"^BRR BOSQUES DE LA CECILIA MZ \d+[A-Z]? CS \d+(?: PI \d+)?(?: ET \d+)?$",
        r"^URB VILLA YOLANDA MZ [A-Z\d]+ CS \d+(?: PI \d+)?$",
        r"^CLL \d+ CR \d+\s*-\s*\d+ TO \d+ (?:AC|AP \d+) VILLA CECILIA$",
        r"^CRA \d+[A-Z]? CL \d+(?:\s*-\s*|\s+)\d+ AP \d+ ED [A-Z\d\s]+$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sector {
    LaCecilia,
    Bosques,
    Yolanda,
}

impl Sector {
    fn head(self) -> &'static str {
        match self {
            Sector::LaCecilia => "URB LA CECILIA",
            Sector::Bosques => "BRR BOSQUES DE LA CECILIA",
            Sector::Yolanda => "URB VILLA YOLANDA",
        }
    }
}

pub struct Cecilia;

impl NeighborhoodNormalizer for Cecilia {
    fn id(&self) -> &'static str {
        "cecilia"
    }

    fn display_name(&self) -> &'static str {
        "URB LA CECILIA, BRR BOSQUES DE LA CECILIA, URB VILLA YOLANDA"
    }

    fn mentions(&self, cleaned: &str) -> bool {
        contains_any(cleaned, SIGNATURES)
    }

    fn normalize(&self, cleaned: &str) -> NormalizedAddress {
        let text = collapse_whitespace(&EXTRA_INFO.replace_all(cleaned, " "));
        let scanner = Scanner::new(&text);
        if has_lot_marker(&scanner) {
            return NormalizedAddress::passthrough(cleaned);
        }
        let text = TRAILING_STREET_NOTE.replace(&text, "").to_string();
        let scanner = Scanner::new(&text);

        let rebuilt = tower_street(&scanner).or_else(|| sector_address(&scanner));
        match rebuilt {
            Some(out) if conforms_to(&TEMPLATES, &out) => NormalizedAddress::canonical(out),
            // Text already in a canonical form is accepted as is.
            _ if conforms_to(&TEMPLATES, &text) => NormalizedAddress::canonical(text),
            _ => NormalizedAddress::passthrough(cleaned),
        }
    }

    fn conforms(&self, text: &str) -> bool {
        conforms_to(&TEMPLATES, text)
    }
}

/// `CLL a CR b - g TO t AP n` at the start of the text, which always lies in
/// Villa Cecilia.
fn tower_street(scanner: &Scanner<'_>) -> Option<String> {
    if !scanner.is_word(0, &["CLL"]) {
        return None;
    }
    let street = scanner.value_at(1, Shape::Digits(4))?;
    if !scanner.is_word(street.next, &["CR"]) {
        return None;
    }
    let cross = scanner.value_at(street.next + 1, Shape::Digits(4))?;
    if !scanner.is_symbol(cross.next, &["-"]) {
        return None;
    }
    let offset = scanner.value_at(cross.next + 1, Shape::Digits(4))?;
    let tower = scanner.keyed_at(offset.next, &["TO"], Shape::Digits(3))?;
    let apartment = scanner.keyed_at(tower.next, &["AP"], Shape::Digits(4))?;
    Some(format!(
        "CLL {} CR {} - {} TO {} AP {} VILLA CECILIA",
        canonical_number(&street.value),
        canonical_number(&cross.value),
        canonical_number(&offset.value),
        canonical_number(&tower.value),
        canonical_number(&apartment.value),
    ))
}

/// First `URB|BRR|CJT|UR <sector>` followed by a complete field sequence.
fn sector_address(scanner: &Scanner<'_>) -> Option<String> {
    (0..scanner.len())
        .filter(|i| scanner.is_word(*i, PREFIXES))
        .find_map(|i| {
            let (sector, end) = sector_at(scanner, i + 1)?;
            let fields = read_sequence(scanner, end)?;
            Some(
                CanonicalAddress::new(sector.head())
                    .fields(
                        &fields,
                        &[
                            FieldKind::Block,
                            FieldKind::Unit,
                            FieldKind::Floor,
                            FieldKind::Stage,
                        ],
                    )
                    .build(),
            )
        })
}

fn sector_at(scanner: &Scanner<'_>, at: usize) -> Option<(Sector, usize)> {
    if scanner.is_word(at, CECILIA_NAMES) {
        return Some((Sector::LaCecilia, at + 1));
    }
    if scanner.is_word(at, &["LA"]) && scanner.is_word(at + 1, CECILIA_NAMES) {
        return Some((Sector::LaCecilia, at + 2));
    }
    if scanner.is_word(at, BOSQUES_NAMES) {
        let mut i = at + 1;
        if scanner.is_word(i, &["DE"]) {
            i += 1;
        }
        if scanner.is_word(i, &["LA"]) && scanner.is_word(i + 1, &["CECILIA"]) {
            return Some((Sector::Bosques, i + 2));
        }
        return None;
    }
    if scanner.is_word(at, &["YOLANDA"]) {
        return Some((Sector::Yolanda, at + 1));
    }
    if scanner.is_word(at, &["VILLA"]) && scanner.is_word(at + 1, &["YOLANDA"]) {
        return Some((Sector::Yolanda, at + 2));
    }
    None
}

/// `[stage] block [unit] [floor] [stage]`, each part directly after the
/// previous one. The leading stage wins over the trailing one.
fn read_sequence(scanner: &Scanner<'_>, at: usize) -> Option<ExtractedFields> {
    let mut fields = ExtractedFields::new();
    let mut i = at;

    if scanner.is_word(i, LEADING_STAGE_KEYS) && scanner.is_number(i + 1) {
        fields.set_opt(FieldKind::Stage, scanner.word(i + 1).map(stage_value));
        i += 2;
    } else if scanner
        .token(i)
        .is_some_and(|t| Shape::ShortStage.accepts(t))
        && scanner.is_word(i + 1, BLOCK_KEYS)
    {
        fields.set_opt(FieldKind::Stage, scanner.word(i).map(stage_value));
        i += 1;
    }

    if !scanner.is_word(i, BLOCK_KEYS) {
        return None;
    }
    let block = scanner.value_at(scanner.skip_separators(i + 1), Shape::Alnum(4))?;
    fields.set(FieldKind::Block, block.value);
    i = block.next;

    if scanner.is_word(i, UNIT_KEYS) || scanner.is_symbol(i, &["#"]) {
        i += 1;
    }
    if scanner.is_number(i) {
        fields.set_opt(FieldKind::Unit, scanner.word(i).map(str::to_string));
        i += 1;
    }

    if scanner.is_word(i, FLOOR_KEYS) {
        i += 1;
    }
    if scanner.is_number(i) {
        fields.set_opt(FieldKind::Floor, scanner.word(i).map(str::to_string));
        i += 1;
    }

    if scanner.is_word(i, TRAILING_STAGE_KEYS) {
        i += 1;
    }
    if scanner.is_number(i) && !fields.has(FieldKind::Stage) {
        fields.set_opt(FieldKind::Stage, scanner.word(i).map(stage_value));
    }

    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::normalization::preprocess::clean;

    fn run(raw: &str) -> NormalizedAddress {
        Cecilia.normalize(&clean(raw))
    }

    #[test]
    fn test_la_cecilia_with_roman_stage() {
        let out = run("URB LA CECILIA III MZ 12 CS 4");
        assert_eq!(out.text, "URB LA CECILIA MZ 12 CS 4 ET 3");
        assert!(out.validated);
    }

    #[test]
    fn test_bosques_with_floor_and_extra_info() {
        let out = run("BRR BQ DE LA CECILIA MZ 3 CASA 5 PISO 2 FRENTE A LA CANCHA");
        assert_eq!(out.text, "BRR BOSQUES DE LA CECILIA MZ 3 CS 5 PI 2");
        assert!(out.validated);
    }

    #[test]
    fn test_trailing_stage_is_fallback() {
        let out = run("URB LA CECILIA MZ 7 CS 2 ETAPA 2");
        assert_eq!(out.text, "URB LA CECILIA MZ 7 CS 2 ET 2");
        let out = run("URB LA CECILIA ET 1 MZ 7 CS 2 ETAPA 2");
        assert_eq!(out.text, "URB LA CECILIA MZ 7 CS 2 ET 1");
    }

    #[test]
    fn test_yolanda_has_no_stage_template() {
        let out = run("URB VILLA YOLANDA MZ B CS 10");
        assert_eq!(out.text, "URB VILLA YOLANDA MZ B CS 10");
        assert!(out.validated);
        // documented as observed: the Yolanda template carries no stage
        assert!(!run("URB VILLA YOLANDA II MZ B CS 10").validated);
    }

    #[test]
    fn test_adjacency_is_strict() {
        assert!(!run("URB LA CECILIA CERCA AL PARQUE MZ 12 CS 4").validated);
    }

    #[test]
    fn test_lot_excluded() {
        let out = run("URB LA CECILIA MZ 12 LOTE 4");
        assert!(!out.validated);
        assert_eq!(out.text, "URB LA CECILIA MZ 12 LOTE 4");
    }

    #[test]
    fn test_tower_street_gains_suffix() {
        let out = run("CLL 10 CR 5 - 20 TO 2 AP 301");
        assert_eq!(out.text, "CLL 10 CR 5 - 20 TO 2 AP 301 VILLA CECILIA");
        assert!(out.validated);
    }

    #[test]
    fn test_canonical_text_is_stable() {
        let canonical = "URB LA CECILIA MZ 12 CS 4 ET 3";
        assert_eq!(run(canonical).text, canonical);
        assert!(Cecilia.conforms(canonical));
    }
}

// ============================================================
// CHAMBRANAS / ZAGUANES / PORTAL PRADERA / MONTEAZUL
// ============================================================
// Plus the CRA/CL and CLL/CR street rows of the same cycle

use crate::application::use_cases::normalization::canonical::NormalizedAddress;
use crate::application::use_cases::normalization::locale::{
    strip_trailing_avenue_and_building, strip_trailing_landmarks, LocaleTail,
};
use crate::application::use_cases::normalization::preprocess::collapse_whitespace;
use crate::application::use_cases::normalization::residential::{checked, conforms_to};
use crate::application::use_cases::normalization::scanner::{Scanner, Shape};
use crate::application::use_cases::normalization::street_grid::{
    find_head, read_qualifiers, Axis, HeadRules, StreetHead, StreetQualifiers, STREET_TEMPLATE,
};
use crate::application::use_cases::normalization::vocabulary::{
    canonical_number, APARTMENT, BLOCK_LETTER, TOWER,
};
use crate::application::use_cases::normalization::NeighborhoodNormalizer;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static RELEVANT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"PRADERA|ZAGUANES|CHAMBRANAS|MONTEAZUL|CRA\s*\d+\s*CL\s*\d+|CLL\s*\d+\s*(?:CR|CRA|CL)\s*\d+",
    )
    .unwrap()
});

static APARTMENT_DASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(AP|APT|APTO|APARTAMENTO)\s*-\s*").unwrap());
static CONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bCONS\b").unwrap());
static STRAY_8000: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\S+)\s+8000\b").unwrap());
static DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*").unwrap());
static LEVEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bNIVEL\s*\d+\b").unwrap());
static TRAILING_NOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+-\s+([A-ZÁÉÍÓÚÜÑ]{3,})(?:\s+[A-ZÁÉÍÓÚÜÑ0-9]{2,})*$").unwrap()
});
static INTERIOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bIN(\s*\d)").unwrap());
static LOT_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bLT\s*\d+\b").unwrap());

static TEMPLATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    let tail = r"(?: OF \d+(?:-\d+)?)?(?: CN [A-Z0-9]+)?$";
    vec![
        STREET_TEMPLATE.clone(),
        Regex::new(&format!(r"^CJT PORTAL PRADERA BQ [A-Z] AP \d+{}", tail)).unwrap(),
        Regex::new(&format!(
            r"^BRR (?:ZAGUANES|CHAMBRANAS) MZ \d+[A-Z]? (?:CS|LC) [A-Z0-9]+(?: AP \d+)?(?: PI \d+)?{}",
            tail
        ))
        .unwrap(),
    ]
});

/// Notes after a trailing dash that are kept.
const KEPT_NOTES: &[&str] = &["ECR", "MACRO", "MACROMEDIDOR", "LOCAL"];
const PLATTED_BLOCK: &[&str] = &["MZ", "MZA", "MNZ", "MZN", "MANZANA", "M"];
const PLATTED_UNIT: &[&str] = &["CS", "CASA", "C", "LC", "LOCAL"];
const PRADERA_BLOCK: &[&str] = &["BLQ", "BL", "BLOQUE", "BQ"];

fn calle_rules() -> HeadRules {
    HeadRules::new(Axis::Calle, &["CLL"], &["CR", "CRA", "KR", "KRA", "K", "CL"])
        .offset_separators(&["-", "#"])
        .bare_offset()
}

fn carrera_rules() -> HeadRules {
    HeadRules::new(Axis::Carrera, &["CRA"], &["CL"]).bare_offset()
}

fn tower_label(word: &str) -> &'static str {
    if BLOCK_LETTER.contains(&word) {
        "BQ"
    } else {
        "TO"
    }
}

pub struct Chambranas;

impl NeighborhoodNormalizer for Chambranas {
    fn id(&self) -> &'static str {
        "chambranas"
    }

    fn display_name(&self) -> &'static str {
        "BRR CHAMBRANAS, BRR ZAGUANES, CJT PORTAL PRADERA, URB MONTEAZUL, CRA/CL, CLL/CR"
    }

    fn mentions(&self, cleaned: &str) -> bool {
        RELEVANT.is_match(cleaned)
    }

    fn normalize(&self, cleaned: &str) -> NormalizedAddress {
        let text = prepare(cleaned);
        if LOT_NUMBER.is_match(&text) {
            return NormalizedAddress::passthrough(cleaned);
        }
        let scanner = Scanner::new(&text);
        let locale = LocaleTail::of(&scanner);
        if locale == LocaleTail::Complex {
            return NormalizedAddress::passthrough(cleaned);
        }

        if let Some(head) = find_head(&scanner, &calle_rules()) {
            if head.offset.is_none() {
                return NormalizedAddress::passthrough(cleaned);
            }
            return street(&scanner, &head, &locale, cleaned);
        }
        if let Some(head) = find_head(&scanner, &carrera_rules()) {
            return street(&scanner, &head, &locale, cleaned);
        }

        let rendered = monteazul(&scanner)
            .or_else(|| portal_pradera(&scanner))
            .or_else(|| platted(&scanner, "ZAGUANES", false))
            .or_else(|| platted(&scanner, "CHAMBRANAS", true));

        match rendered {
            Some(text) => checked(text, &TEMPLATES, cleaned),
            None => NormalizedAddress::passthrough(cleaned),
        }
    }

    fn conforms(&self, text: &str) -> bool {
        conforms_to(&TEMPLATES, text)
    }

    fn collapses_generic_duplicates(&self) -> bool {
        true
    }
}

/// Row-level cleanup ahead of parsing: dash spacing, `CONS` → `CN`, stray
/// `8000` meter codes, `NIVEL n`, trailing free-text notes and `IN n`
/// interiors (read as apartments).
fn prepare(cleaned: &str) -> String {
    let text = APARTMENT_DASH.replace_all(cleaned, "$1 ");
    let text = CONS.replace_all(&text, "CN");
    let text = STRAY_8000.replace_all(&text, |caps: &Captures<'_>| {
        let prev = &caps[1];
        if prev == "MACRO" || prev == "MACROMEDIDOR" {
            caps[0].to_string()
        } else {
            prev.to_string()
        }
    });
    let text = DASH.replace_all(&text, " - ");
    let text = strip_trailing_avenue_and_building(&strip_trailing_landmarks(&text));
    let text = LEVEL.replace_all(&text, "");
    let text = TRAILING_NOTE.replace(&text, |caps: &Captures<'_>| {
        if KEPT_NOTES.contains(&&caps[1]) {
            caps[0].to_string()
        } else {
            String::new()
        }
    });
    let text = INTERIOR.replace_all(&text, "AP$1");
    collapse_whitespace(&text)
        .trim_end_matches(['-', ' '])
        .to_string()
}

fn street(
    scanner: &Scanner<'_>,
    head: &StreetHead,
    locale: &LocaleTail,
    cleaned: &str,
) -> NormalizedAddress {
    let until = locale.start_or(scanner.len());
    let mut qualifiers = read_qualifiers(scanner, head.end, until, tower_label);
    qualifiers.locale = locale.text();
    // Without an offset only a house or a locale pins the address down.
    if head.offset.is_none() && qualifiers.unit.is_none() && qualifiers.locale.is_none() {
        return NormalizedAddress::passthrough(cleaned);
    }
    checked(qualifiers.render(head), &TEMPLATES, cleaned)
}

/// Monteazul towers share one street address: `CRA 6 CL 51N - 25`.
fn monteazul(scanner: &Scanner<'_>) -> Option<String> {
    let name = scanner.find_word(&["MONTEAZUL"], 0)?;
    let tower_keys: Vec<&str> = TOWER.iter().chain(BLOCK_LETTER).copied().collect();
    let tower = scanner
        .find_keyed(&tower_keys, Shape::Digits(3), name + 1)
        .or_else(|| scanner.find_keyed(&tower_keys, Shape::Digits(3), 0))?;
    let apartment = scanner
        .find_keyed(APARTMENT, Shape::Digits(5), name + 1)
        .or_else(|| scanner.find_keyed(APARTMENT, Shape::Digits(5), 0))?;

    let head = StreetHead {
        axis: Axis::Carrera,
        primary: "6".to_string(),
        secondary: "51N".to_string(),
        offset: Some("25".to_string()),
        start: name,
        end: name + 1,
    };
    let mut qualifiers = global_tail(scanner);
    qualifiers.tower = Some(("TO", canonical_number(&tower.value)));
    qualifiers.apartment = Some(canonical_number(&apartment.value));
    Some(qualifiers.render(&head))
}

/// `CJT PORTAL PRADERA BQ <letter> AP <n>`; the apartment keyword is optional.
fn portal_pradera(scanner: &Scanner<'_>) -> Option<String> {
    let name = scanner.find_word(&["PRADERA"], 0)?;
    let key = (name + 1..scanner.len()).find(|i| scanner.is_word(*i, PRADERA_BLOCK))?;
    let at = scanner.skip_separators(key + 1);
    let letter = scanner
        .word(at)
        .filter(|w| w.len() == 1 && w.chars().all(|c| c.is_ascii_uppercase()))?;
    let next = scanner.skip_separators(at + 1);
    let apartment = scanner
        .keyed_at(next, APARTMENT, Shape::Digits(5))
        .or_else(|| scanner.value_at(next, Shape::Digits(5)))?;

    let out = format!(
        "CJT PORTAL PRADERA BQ {} AP {}",
        letter,
        canonical_number(&apartment.value)
    );
    Some(with_global_tail(out, scanner))
}

/// `BRR <name> MZ <m> CS|LC <c>`, with apartment and floor for Chambranas.
fn platted(scanner: &Scanner<'_>, name: &str, with_interior: bool) -> Option<String> {
    let name_at = scanner.find_word(&[name], 0)?;
    let block = scanner.find_keyed(PLATTED_BLOCK, Shape::DigitsSuffix(3), name_at + 1)?;
    let unit = scanner.find_keyed(PLATTED_UNIT, Shape::Alnum(4), block.next)?;
    let label = match scanner.word(unit.at) {
        Some("LC") | Some("LOCAL") => "LC",
        _ => "CS",
    };

    let mut out = format!(
        "BRR {} MZ {} {} {}",
        name,
        canonical_number(&block.value),
        label,
        canonical_number(&unit.value)
    );
    if with_interior {
        let apartment = scanner.find_keyed(APARTMENT, Shape::Digits(5), unit.next);
        let floor = scanner.find_keyed(&["PI", "PISO"], Shape::Digits(2), unit.next);
        if let Some(apartment) = apartment {
            out.push_str(&format!(" AP {}", canonical_number(&apartment.value)));
        }
        if let Some(floor) = floor {
            out.push_str(&format!(" PI {}", canonical_number(&floor.value)));
        }
    }
    Some(with_global_tail(out, scanner))
}

/// Office and CN codes are read anywhere in the row.
fn global_tail(scanner: &Scanner<'_>) -> StreetQualifiers {
    let found = read_qualifiers(scanner, 0, scanner.len(), tower_label);
    StreetQualifiers {
        office: found.office,
        cn: found.cn,
        ..Default::default()
    }
}

fn with_global_tail(mut out: String, scanner: &Scanner<'_>) -> String {
    let tail = global_tail(scanner);
    if let Some(office) = tail.office {
        out.push_str(&format!(" OF {}", office));
    }
    if let Some(cn) = tail.cn {
        out.push_str(&format!(" CN {}", cn));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::normalization::preprocess::clean;

    fn run(raw: &str) -> NormalizedAddress {
        Chambranas.normalize(&clean(raw))
    }

    #[test]
    fn test_chambranas_block_house_floor() {
        let out = run("BRR CHAMBRANAS MZA 3 CASA 7 PISO 02");
        assert_eq!(out.text, "BRR CHAMBRANAS MZ 3 CS 7 PI 2");
        assert!(out.validated);
    }

    #[test]
    fn test_zaguanes_locale_unit() {
        let out = run("URB ZAGUANES MZ 04 LC 2");
        assert_eq!(out.text, "BRR ZAGUANES MZ 4 LC 2");
        assert!(out.validated);
    }

    #[test]
    fn test_calle_head_with_locale() {
        let out = run("CLL 26 CR 15 - 57 LC 1 PISO 2");
        assert_eq!(out.text, "CLL 26 CR 15 - 57 LC 1 PI 2");
        assert!(out.validated);
    }

    #[test]
    fn test_calle_without_offset_passes_through() {
        let out = run("CLL 26 CR 15 CASA ESQUINERA");
        assert!(!out.validated);
        assert_eq!(out.text, "CLL 26 CR 15 CASA ESQUINERA");
    }

    #[test]
    fn test_carrera_tower_and_apartment() {
        let out = run("CRA 6 CL 51N - 25 TORRE 3 APTO 402 URB MONTEAZUL");
        assert_eq!(out.text, "CRA 6 CL 51N - 25 TO 3 AP 402");
        assert!(out.validated);
        let out = run("CRA 12 CL 3 - 40 BLOQUE 2 AP 101 PI 1");
        assert_eq!(out.text, "CRA 12 CL 3 - 40 BQ 2 AP 101 PI 1");
    }

    #[test]
    fn test_carrera_markers_and_codes() {
        assert_eq!(
            run("CRA 14 CL 2 - 10 PU VIGILANCIA").text,
            "CRA 14 CL 2 - 10 PU VIGILANCIA"
        );
        assert_eq!(
            run("CRA 14 CL 2 - 10 MACRO 8000").text,
            "CRA 14 CL 2 - 10 MACRO 8000"
        );
        assert_eq!(run("CRA 14 CL 2 - 10 8000").text, "CRA 14 CL 2 - 10");
        assert_eq!(run("CRA 14 CL 2 - 10 CONS 44").text, "CRA 14 CL 2 - 10 CN 44");
        assert_eq!(run("CRA 14 CL 2 - 10 AP").text, "CRA 14 CL 2 - 10 AP");
    }

    #[test]
    fn test_monteazul_without_street() {
        let out = run("URB MONTEAZUL AP 201 TO 4");
        assert_eq!(out.text, "CRA 6 CL 51N - 25 TO 4 AP 201");
        assert!(out.validated);
    }

    #[test]
    fn test_portal_pradera() {
        let out = run("PORTAL PRADERA BLQ C 302");
        assert_eq!(out.text, "CJT PORTAL PRADERA BQ C AP 302");
        assert!(out.validated);
    }

    #[test]
    fn test_lot_and_complex_locale_guards() {
        let out = run("CRA 5 CL 10 - 20 LT 4");
        assert!(!out.validated);
        assert_eq!(out.text, "CRA 5 CL 10 - 20 LT 4");
        assert!(!run("CLL 26 CR 15 - 57 LC FRENTE AL PARQUE").validated);
    }

    #[test]
    fn test_trailing_note_dropped() {
        let out = run("CRA 5 CL 10 - 20 - FRENTE PARQUE");
        assert_eq!(out.text, "CRA 5 CL 10 - 20");
        assert!(Chambranas.collapses_generic_duplicates());
    }
}

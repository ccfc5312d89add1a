// ============================================================
// CIBELES / VILLA LILIANA
// ============================================================

use crate::application::use_cases::normalization::canonical::{NormalizedAddress, INT};
use crate::application::use_cases::normalization::residential::{checked, conforms_to};
use crate::application::use_cases::normalization::scanner::{Scanner, Shape};
use crate::application::use_cases::normalization::street_grid::{
    find_head, Axis, HeadRules, StreetHead,
};
use crate::application::use_cases::normalization::tokenizer::TokenKind;
use crate::application::use_cases::normalization::vocabulary::{canonical_number, UNIT};
use crate::application::use_cases::normalization::NeighborhoodNormalizer;
use once_cell::sync::Lazy;
use regex::Regex;

/// Street address shared by every Cibeles tower.
const CIBELES_STREET: &str = "CRA 40 CL 51 -41";

const TOWER_KEYS: &[&str] = &["TO", "TORRE", "T"];
const APARTMENT_KEYS: &[&str] = &["APT", "AP", "APU", "APTO"];
const QUINTAS: &[&str] = &["QUINTAS", "QTAS", "QTA"];
const LILIANA_BLOCK: &[&str] = &["MNZ", "MZN", "MZ"];
const LILIANA_FLOOR: &[&str] = &["PI", "PISO", "PIS"];

static TEMPLATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^CRA 40 CL 51 -41 TO {n} AP {n}[A-Z]?$",
        r"^CRA {n}[A-Z]? CL {n}-{n} URB QUINTAS DE VILLA LILIANA CS {n}[A-Z]?$",
        r"^CRA {n}[A-Z]? CL {n}-{n}(?: PI {n})? URB VILLA LILIANA$",
        r"^URB VILLA LILIANA MZ [A-ZÑ]{1,3} CS {n}[A-Z]?(?: PI {n})?$",
        r"^URB BOSQUES DE VILLA LILIANA CS {n}[A-Z]?$",
    ]
    .iter()
    .map(|pattern| Regex::new(&pattern.replace("{n}", INT)).unwrap())
    .collect()
});

fn liliana_head_rules() -> HeadRules {
    HeadRules::new(Axis::Carrera, &["CRA"], &["CL"])
        .cross_optional()
        .bare_offset()
}

pub struct Cibeles;

impl NeighborhoodNormalizer for Cibeles {
    fn id(&self) -> &'static str {
        "cibeles"
    }

    fn display_name(&self) -> &'static str {
        "CIBELES, URB VILLA LILIANA, URB QUINTAS DE VILLA LILIANA, URB BOSQUES DE VILLA LILIANA"
    }

    fn mentions(&self, cleaned: &str) -> bool {
        ["CIBELES", CIBELES_STREET, "LILIANA", "BOSQUES"]
            .iter()
            .any(|needle| cleaned.contains(needle))
    }

    fn normalize(&self, cleaned: &str) -> NormalizedAddress {
        // templates reject leading zeros, so a match is already canonical
        if conforms_to(&TEMPLATES, cleaned) {
            return NormalizedAddress::canonical(cleaned);
        }
        let scanner = Scanner::new(cleaned);
        let head = find_head(&scanner, &liliana_head_rules());

        let is_cibeles_street = head.as_ref().is_some_and(|h| {
            h.start == 0
                && h.primary == "40"
                && h.secondary == "51"
                && h.offset.as_deref() == Some("41")
        });
        let rendered = if is_cibeles_street || scanner.contains_word(&["CIBELES"]) {
            let from = head.as_ref().filter(|_| is_cibeles_street).map_or(0, |h| h.end);
            cibeles(&scanner, from)
        } else if let Some(liliana) = scanner.find_word(&["LILIANA"], 0) {
            liliana_street(&scanner, head.as_ref(), liliana)
                .or_else(|| liliana_block(&scanner, liliana))
                .or_else(|| bosques(&scanner, liliana))
        } else {
            None
        };

        match rendered {
            Some(text) => checked(text, &TEMPLATES, cleaned),
            None => NormalizedAddress::passthrough(cleaned),
        }
    }

    fn conforms(&self, text: &str) -> bool {
        conforms_to(&TEMPLATES, text)
    }
}

/// Tower number, then an apartment written `A302`, `302A` or `A 302`.
fn cibeles(scanner: &Scanner<'_>, from: usize) -> Option<String> {
    let tower = scanner.find_keyed(TOWER_KEYS, Shape::Digits(2), from)?;
    let key = (tower.next..scanner.len()).find(|i| scanner.is_word(*i, APARTMENT_KEYS))?;
    let apartment = cibeles_apartment(scanner, scanner.skip_separators(key + 1))?;
    Some(format!(
        "{} TO {} AP {}",
        CIBELES_STREET,
        canonical_number(&tower.value),
        apartment
    ))
}

fn cibeles_apartment(scanner: &Scanner<'_>, index: usize) -> Option<String> {
    let token = scanner.token(index)?;
    match token.kind {
        TokenKind::Number if token.text.len() <= 3 => Some(canonical_number(token.text)),
        TokenKind::AlphaNum => {
            let letters: String = token.text.chars().filter(|c| c.is_alphabetic()).collect();
            let digits: String = token.text.chars().filter(|c| c.is_ascii_digit()).collect();
            let split = token.text.starts_with(letters.as_str())
                || token.text.ends_with(letters.as_str());
            if letters.len() == 1 && (1..=3).contains(&digits.len()) && split {
                Some(format!("{}{}", canonical_number(&digits), letters))
            } else {
                None
            }
        }
        TokenKind::Word if token.text.len() == 1 => {
            let number = scanner.token(index + 1)?;
            if number.kind == TokenKind::Number && number.text.len() <= 3 {
                Some(format!("{}{}", canonical_number(number.text), token.text))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// `CRA a [CL] b c ... LILIANA`: the Quintas form when a Quintas word sits
/// between the street and the name, the plain street form otherwise.
fn liliana_street(
    scanner: &Scanner<'_>,
    head: Option<&StreetHead>,
    liliana: usize,
) -> Option<String> {
    let head = head.filter(|h| h.end <= liliana)?;
    let offset = head.offset.as_ref()?;
    let street = format!("CRA {} CL {}-{}", head.primary, head.secondary, offset);

    let quintas = (head.end..liliana).any(|i| scanner.is_word(i, QUINTAS));
    if quintas {
        let house = (liliana + 1..scanner.len())
            .find_map(|i| scanner.value_at(i, Shape::DigitsSuffix(4)))?;
        return Some(format!(
            "{} URB QUINTAS DE VILLA LILIANA CS {}",
            street,
            canonical_number(&house.value)
        ));
    }

    let floor = scanner.find_keyed_within(LILIANA_FLOOR, Shape::Digits(2), head.end, liliana);
    let mut out = street;
    if let Some(floor) = floor {
        out.push_str(&format!(" PI {}", canonical_number(&floor.value)));
    }
    out.push_str(" URB VILLA LILIANA");
    Some(out)
}

/// `URB VILLA LILIANA MZ <letters> [CS] <n> [PI <p>]`
fn liliana_block(scanner: &Scanner<'_>, liliana: usize) -> Option<String> {
    let block = scanner.find_keyed(LILIANA_BLOCK, Shape::Letters(3), liliana + 1)?;
    let house = scanner.find_keyed_or_bare(UNIT, Shape::DigitsSuffix(4), block.next)?;
    let floor = scanner.find_keyed(LILIANA_FLOOR, Shape::Digits(2), house.next);

    let mut out = format!(
        "URB VILLA LILIANA MZ {} CS {}",
        block.value,
        canonical_number(&house.value)
    );
    if let Some(floor) = floor {
        out.push_str(&format!(" PI {}", canonical_number(&floor.value)));
    }
    Some(out)
}

/// `URB BOSQUES DE VILLA LILIANA [CS] <n>`
fn bosques(scanner: &Scanner<'_>, liliana: usize) -> Option<String> {
    if !(0..liliana).any(|i| scanner.is_word(i, &["BOSQUES"])) {
        return None;
    }
    let at = scanner.skip_separators(liliana + 1);
    let house = scanner
        .keyed_at(at, &["CS"], Shape::DigitsSuffix(4))
        .or_else(|| scanner.value_at(at, Shape::DigitsSuffix(4)))?;
    Some(format!(
        "URB BOSQUES DE VILLA LILIANA CS {}",
        canonical_number(&house.value)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::normalization::preprocess::clean;

    fn run(raw: &str) -> NormalizedAddress {
        Cibeles.normalize(&clean(raw))
    }

    #[test]
    fn test_cibeles_tower_apartment_forms() {
        let out = run("CONJUNTO CIBELES TORRE 3 APTO A302");
        assert_eq!(out.text, "CRA 40 CL 51 -41 TO 3 AP 302A");
        assert!(out.validated);
        assert_eq!(run("CIBELES T 03 AP 302B").text, "CRA 40 CL 51 -41 TO 3 AP 302B");
        assert_eq!(
            run("CRA 40 CL 51 - 41 TO 2 AP C 101").text,
            "CRA 40 CL 51 -41 TO 2 AP 101C"
        );
    }

    #[test]
    fn test_canonical_cibeles_kept() {
        let out = run("CRA 40 CL 51 -41 TO 3 AP 302A");
        assert!(out.validated);
        assert_eq!(out.text, "CRA 40 CL 51 -41 TO 3 AP 302A");
    }

    #[test]
    fn test_cibeles_without_apartment() {
        assert!(!run("CIBELES TORRE 3").validated);
    }

    #[test]
    fn test_quintas_street_form() {
        let out = run("CRA 19 25 40 QUINTAS DE VILLA LILIANA 12");
        assert_eq!(out.text, "CRA 19 CL 25-40 URB QUINTAS DE VILLA LILIANA CS 12");
        assert!(out.validated);
    }

    #[test]
    fn test_street_plus_villa_liliana() {
        let out = run("CRA 19 CL 25 - 40 PISO 2 VILLA LILIANA");
        assert_eq!(out.text, "CRA 19 CL 25-40 PI 2 URB VILLA LILIANA");
    }

    #[test]
    fn test_liliana_block_house() {
        let out = run("URB VILLA LILIANA MZ B CASA 14 PISO 1");
        assert_eq!(out.text, "URB VILLA LILIANA MZ B CS 14 PI 1");
        assert!(out.validated);
    }

    #[test]
    fn test_bosques_de_villa_liliana() {
        let out = run("URB BOSQUES DE VILLA LILIANA CS 07");
        assert_eq!(out.text, "URB BOSQUES DE VILLA LILIANA CS 7");
        assert!(out.validated);
    }
}

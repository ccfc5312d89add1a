// ============================================================
// LA MIRANDA / ACACIAS
// ============================================================

use crate::application::use_cases::normalization::canonical::{
    CanonicalAddress, NormalizedAddress,
};
use crate::application::use_cases::normalization::residential::{checked, conforms_to};
use crate::application::use_cases::normalization::scanner::{Hit, Scanner, Shape};
use crate::application::use_cases::normalization::tokenizer::TokenKind;
use crate::application::use_cases::normalization::vocabulary::is_reserved;
use crate::application::use_cases::normalization::NeighborhoodNormalizer;
use crate::domain::address::{ExtractedFields, FieldKind};
use once_cell::sync::Lazy;
use regex::Regex;

const BLOCK_KEYS: &[&str] = &["MNZ", "MZN", "MZNA", "MZ", "MANZANA", "MZA"];
const HOUSE_KEYS: &[&str] = &["CS", "CASA", "CAS", "C"];
const APARTMENT_KEYS: &[&str] = &["AP", "APT", "APTO", "APARTAMENTO"];
const FLOOR_KEYS: &[&str] = &["PI", "PISO", "PIS"];
const LOCALE_KEYS: &[&str] = &["LC", "LOC", "LOCAL", "LO"];

const ORDER: &[FieldKind] = &[
    FieldKind::Block,
    FieldKind::Unit,
    FieldKind::Apartment,
    FieldKind::Floor,
    FieldKind::Locale,
];

static TEMPLATE: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![Regex::new(concat!(
        r"^BRR (?:LA MIRANDA|ACACIAS) MZ [A-ZÑ0-9]+",
        r"(?: CS [A-Z0-9]+(?: AP [A-Z0-9]+)?(?: PI \d+)?(?: LC [A-Z0-9]+)?",
        r"|(?: AP [A-Z0-9]+)?(?: PI \d+)? LC [A-Z0-9]+)$"
    ))
    .unwrap()]
});

pub struct Miranda;

impl NeighborhoodNormalizer for Miranda {
    fn id(&self) -> &'static str {
        "miranda"
    }

    fn display_name(&self) -> &'static str {
        "BRR LA MIRANDA, BRR ACACIAS"
    }

    fn mentions(&self, cleaned: &str) -> bool {
        cleaned.contains("MIRANDA") || cleaned.contains("ACACIAS")
    }

    fn normalize(&self, cleaned: &str) -> NormalizedAddress {
        let scanner = Scanner::new(cleaned);
        let named = scanner
            .find_word(&["MIRANDA"], 0)
            .map(|i| ("BRR LA MIRANDA", i))
            .or_else(|| {
                scanner
                    .find_word(&["ACACIAS", "ACACIA"], 0)
                    .map(|i| ("BRR ACACIAS", i))
            });
        let Some((head, name)) = named else {
            return NormalizedAddress::passthrough(cleaned);
        };

        match extract(&scanner, name + 1) {
            Some(fields) => checked(
                CanonicalAddress::new(head).fields(&fields, ORDER).build(),
                &TEMPLATE,
                cleaned,
            ),
            None => NormalizedAddress::passthrough(cleaned),
        }
    }

    fn conforms(&self, text: &str) -> bool {
        conforms_to(&TEMPLATE, text)
    }
}

/// Block letter (one or two) or number of up to three digits.
fn block_at(scanner: &Scanner<'_>, from: usize) -> Option<Hit> {
    (from..scanner.len()).find_map(|i| {
        if !scanner.is_word(i, BLOCK_KEYS) {
            return None;
        }
        let at = scanner.skip_separators(i + 1);
        let token = scanner.token(at)?;
        let len = token.text.chars().count();
        let letters = token.kind == TokenKind::Word
            && len <= 2
            && !(len > 1 && is_reserved(token.text));
        let digits = token.kind == TokenKind::Number && len <= 3;
        (letters || digits).then(|| Hit {
            value: token.text.to_string(),
            at: i,
            next: at + 1,
        })
    })
}

/// Block, then a house (keyed, or the first bare number when no locale is
/// given), apartment, floor and locale.
fn extract(scanner: &Scanner<'_>, from: usize) -> Option<ExtractedFields> {
    let block = block_at(scanner, from)?;
    let locale = scanner.find_keyed(LOCALE_KEYS, Shape::DigitsSuffix(4), from);
    let house = scanner
        .find_keyed(HOUSE_KEYS, Shape::Alnum(6), block.next)
        .filter(|hit| hit.value.chars().any(|c| c.is_ascii_digit()))
        .or_else(|| {
            if locale.is_some() {
                return None;
            }
            scanner
                .value_at(scanner.skip_separators(block.next), Shape::DigitsSuffix(4))
                .or_else(|| {
                    (block.next..scanner.len())
                        .find_map(|i| scanner.bare_at(i, Shape::DigitsSuffix(4)))
                })
        });
    if house.is_none() && locale.is_none() {
        return None;
    }
    let apartment = scanner.find_keyed(APARTMENT_KEYS, Shape::DigitsSuffix(4), block.next);
    let floor = scanner.find_keyed(FLOOR_KEYS, Shape::Digits(2), block.next);

    let mut fields = ExtractedFields::new().with(FieldKind::Block, block.value);
    fields.set_opt(FieldKind::Unit, house.map(|hit| hit.value));
    fields.set_opt(FieldKind::Apartment, apartment.map(|hit| hit.value));
    fields.set_opt(FieldKind::Floor, floor.map(|hit| hit.value));
    fields.set_opt(FieldKind::Locale, locale.map(|hit| hit.value));
    Some(fields)
}

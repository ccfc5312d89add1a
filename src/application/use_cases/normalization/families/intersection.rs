// ============================================================
// STREET INTERSECTIONS
// ============================================================
// Rows that open with a carrera or calle and name no neighborhood

use crate::application::use_cases::normalization::canonical::{CanonicalAddress, NormalizedAddress};
use crate::application::use_cases::normalization::locale::LocaleTail;
use crate::application::use_cases::normalization::residential::checked;
use crate::application::use_cases::normalization::scanner::Scanner;
use crate::application::use_cases::normalization::street_grid::{
    find_head, read_qualifiers, Axis, HeadRules, StreetHead, STREET_TEMPLATE,
};
use crate::application::use_cases::normalization::tokenizer::TokenKind;
use crate::application::use_cases::normalization::vocabulary::{canonical_number, BLOCK_LETTER};
use crate::application::use_cases::normalization::NeighborhoodNormalizer;

const STREET_WORDS: &[&str] = &["CLL", "CRA", "CR", "KR", "KRA", "K"];

fn calle_rules() -> HeadRules {
    HeadRules::new(Axis::Calle, &["CLL"], &["CR", "CRA", "KR", "KRA", "K", "CL"])
        .anchored()
        .cross_optional()
        .offset_separators(&["-", "#"])
}

fn carrera_rules() -> HeadRules {
    HeadRules::new(Axis::Carrera, &["CR", "CRA", "KR", "KRA", "K"], &["CL", "CLL"])
        .anchored()
        .cross_optional()
        .offset_separators(&["-", "#"])
        .bare_offset()
}

fn tower_label(word: &str) -> &'static str {
    if BLOCK_LETTER.contains(&word) {
        "BQ"
    } else if word == "T" {
        "T"
    } else {
        "TO"
    }
}

/// Short form of a qualifier keyword; other words are returned unchanged.
fn canonical_keyword(word: &str) -> &str {
    match word {
        "CASA" => "CS",
        "PISO" | "PIS" => "PI",
        "APTO" | "APT" | "APARTAMENTO" | "APU" => "AP",
        "TORRE" => "TO",
        "BLOQUE" | "BLQ" | "BL" => "BQ",
        "LOCAL" => "LC",
        "OFICINA" | "OFI" => "OF",
        "CONS" => "CN",
        "ETAPA" => "ET",
        "MANZANA" | "MZA" | "MZN" | "MNZ" => "MZ",
        other => other,
    }
}

pub struct Intersection;

impl NeighborhoodNormalizer for Intersection {
    fn id(&self) -> &'static str {
        "intersection"
    }

    fn display_name(&self) -> &'static str {
        "CLL/CR and CRA/CL intersections"
    }

    fn mentions(&self, cleaned: &str) -> bool {
        cleaned
            .split(' ')
            .next()
            .is_some_and(|first| STREET_WORDS.contains(&first))
    }

    fn normalize(&self, cleaned: &str) -> NormalizedAddress {
        let scanner = Scanner::new(cleaned);
        let locale = LocaleTail::of(&scanner);
        if locale == LocaleTail::Complex {
            return NormalizedAddress::passthrough(cleaned);
        }
        let Some(head) = find_head(&scanner, &calle_rules())
            .filter(|h| h.offset.is_some())
            .or_else(|| find_head(&scanner, &carrera_rules()))
        else {
            return NormalizedAddress::passthrough(cleaned);
        };

        let until = locale.start_or(scanner.len());
        let mut tail = canonical_tail(&scanner, head.end, until);
        // Without an offset the house number has to carry the address.
        if head.offset.is_none() && !tail.iter().any(|word| word == "CS") {
            return NormalizedAddress::passthrough(cleaned);
        }
        if let Some(text) = locale.text() {
            tail.extend(text.split(' ').map(str::to_string));
        }

        let literal = CanonicalAddress::new(head.render()).push(tail.join(" ")).build();
        if STREET_TEMPLATE.is_match(&literal) {
            return NormalizedAddress::canonical(literal);
        }
        reordered(&scanner, &head, until, &locale, &literal, cleaned)
    }

    fn conforms(&self, text: &str) -> bool {
        STREET_TEMPLATE.is_match(text)
    }
}

/// Tail words from `from..until` with keywords shortened, numbers canonical
/// and `8000` meter codes and `ARMENIA` dropped. `3 - 4` ranges are glued.
fn canonical_tail(scanner: &Scanner<'_>, from: usize, until: usize) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut i = from;
    while i < until {
        let Some(token) = scanner.token(i) else {
            break;
        };
        match token.kind {
            TokenKind::Symbol => {
                let range = token.text == "-"
                    && i > from
                    && scanner.is_number(i - 1)
                    && i + 1 < until
                    && scanner.is_number(i + 1);
                if range {
                    if let (Some(last), Some(second)) = (words.last_mut(), scanner.word(i + 1)) {
                        last.push('-');
                        last.push_str(&canonical_number(second));
                        i += 2;
                        continue;
                    }
                }
            }
            TokenKind::Number if token.text == "8000" => {
                let after_meter = words
                    .last()
                    .is_some_and(|w| w == "MACRO" || w == "MACROMEDIDOR");
                if after_meter {
                    words.push(token.text.to_string());
                }
            }
            TokenKind::Word if token.text == "ARMENIA" => {}
            TokenKind::Word => words.push(canonical_keyword(token.text).to_string()),
            TokenKind::Number | TokenKind::AlphaNum => words.push(canonical_number(token.text)),
        }
        i += 1;
    }
    words
}

/// Qualifiers written out of order: accepted when putting them in order
/// drops no word of the literal form.
fn reordered(
    scanner: &Scanner<'_>,
    head: &StreetHead,
    until: usize,
    locale: &LocaleTail,
    literal: &str,
    cleaned: &str,
) -> NormalizedAddress {
    let mut qualifiers = read_qualifiers(scanner, head.end, until, tower_label);
    qualifiers.locale = locale.text();
    let rendered = qualifiers.render(head);
    if rendered.split(' ').count() != literal.split(' ').count() {
        return NormalizedAddress::passthrough(cleaned);
    }
    checked(rendered, std::slice::from_ref(&*STREET_TEMPLATE), cleaned)
}

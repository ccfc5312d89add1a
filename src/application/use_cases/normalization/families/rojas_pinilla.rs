// ============================================================
// ROJAS PINILLA / FREE-FORM STREET ADDRESSES
// ============================================================
// Last resort for rows opening with a street: free text may sit between
// the street and its crossing, and unread words after the head are dropped

use crate::application::use_cases::normalization::canonical::{NormalizedAddress, INT};
use crate::application::use_cases::normalization::locale::{strip_trailing_landmarks, LocaleTail};
use crate::application::use_cases::normalization::preprocess::collapse_whitespace;
use crate::application::use_cases::normalization::residential::{checked, conforms_to};
use crate::application::use_cases::normalization::scanner::Scanner;
use crate::application::use_cases::normalization::street_grid::{
    find_head, read_qualifiers, Axis, HeadRules, StreetHead, StreetQualifiers, STREET_TEMPLATE,
};
use crate::application::use_cases::normalization::vocabulary::{canonical_number, BLOCK_LETTER};
use crate::application::use_cases::normalization::NeighborhoodNormalizer;
use once_cell::sync::Lazy;
use regex::Regex;

const STREET_WORDS: &[&str] = &["CLL", "CRA", "CR"];

static KR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bKR\s*(\d)|\bKR\b").unwrap());

static TEMPLATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        STREET_TEMPLATE.clone(),
        Regex::new(&format!(
            r"^CRA {m}(?:(?: -)? {m}){{0,2}} (?:BRR )?ROJAS PINILLA$",
            m = format!("{}[A-Z]?", INT)
        ))
        .unwrap(),
    ]
});

fn calle_rules() -> HeadRules {
    HeadRules::new(Axis::Calle, &["CLL"], &["CR", "CRA", "KR", "KRA", "K", "CL"]).gap_before_cross()
}

fn carrera_rules() -> HeadRules {
    HeadRules::new(Axis::Carrera, &["CRA"], &["CL"])
        .gap_before_cross()
        .bare_offset()
}

/// Block words become `BQ`, tower words `T`.
fn tower_label(word: &str) -> &'static str {
    if BLOCK_LETTER.contains(&word) {
        "BQ"
    } else {
        "T"
    }
}

pub struct RojasPinilla;

impl NeighborhoodNormalizer for RojasPinilla {
    fn id(&self) -> &'static str {
        "rojas_pinilla"
    }

    fn display_name(&self) -> &'static str {
        "BRR ROJAS PINILLA, free-form CLL/CRA addresses"
    }

    fn mentions(&self, cleaned: &str) -> bool {
        cleaned.contains("ROJAS PINILLA")
            || cleaned
                .split(' ')
                .next()
                .is_some_and(|first| STREET_WORDS.contains(&first))
    }

    fn normalize(&self, cleaned: &str) -> NormalizedAddress {
        if cleaned.contains("ROJAS PINILLA") {
            return rojas_pinilla(cleaned);
        }

        let scanner = Scanner::new(cleaned);
        let locale = LocaleTail::of(&scanner);
        if locale == LocaleTail::Complex {
            return NormalizedAddress::passthrough(cleaned);
        }
        let Some(head) = find_head(&scanner, &calle_rules())
            .or_else(|| find_head(&scanner, &carrera_rules()))
        else {
            return NormalizedAddress::passthrough(cleaned);
        };
        checked(street(&scanner, &head, &locale), &TEMPLATES, cleaned)
    }

    fn conforms(&self, text: &str) -> bool {
        conforms_to(&TEMPLATES, text)
    }
}

/// Rows naming the neighborhood are carrera addresses kept as written,
/// with leading zeros dropped from the numbers.
fn rojas_pinilla(cleaned: &str) -> NormalizedAddress {
    let text = KR.replace_all(cleaned, |caps: &regex::Captures<'_>| match caps.get(1) {
        Some(digit) => format!("CRA {}", digit.as_str()),
        None => "CRA".to_string(),
    });
    let text = collapse_whitespace(&strip_trailing_landmarks(&text))
        .split(' ')
        .map(canonical_number)
        .collect::<Vec<_>>()
        .join(" ");
    let text = if Scanner::new(&text).contains_word(&["CRA"]) {
        text
    } else {
        format!("CRA {}", text)
    };
    checked(text, &TEMPLATES, cleaned)
}

/// Head plus tower, apartment, floor, office and locale.
fn street(scanner: &Scanner<'_>, head: &StreetHead, locale: &LocaleTail) -> String {
    let read = read_qualifiers(scanner, head.end, locale.start_or(scanner.len()), tower_label);
    StreetQualifiers {
        tower: read.tower,
        apartment: read.apartment,
        floor: read.floor,
        office: read.office,
        locale: locale.text(),
        ..StreetQualifiers::default()
    }
    .render(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::normalization::preprocess::clean;

    fn run(raw: &str) -> NormalizedAddress {
        RojasPinilla.normalize(&clean(raw))
    }

    #[test]
    fn test_rojas_pinilla_kept_as_carrera() {
        let out = run("KR 19 20 15 BRR ROJAS PINILLA");
        assert_eq!(out.text, "CRA 19 20 15 BRR ROJAS PINILLA");
        assert!(out.validated);
        let out = run("KR 019 020 015 BRR ROJAS PINILLA");
        assert_eq!(out.text, "CRA 19 20 15 BRR ROJAS PINILLA");
        assert!(out.validated);
    }

    #[test]
    fn test_rojas_pinilla_without_carrera_numbers() {
        let out = run("ROJAS PINILLA 07");
        assert!(!out.validated);
        assert_eq!(out.text, "ROJAS PINILLA 07");
        let out = run("BRR ROJAS PINILLA MZ 4");
        assert!(!out.validated);
        assert_eq!(out.text, "BRR ROJAS PINILLA MZ 4");
    }

    #[test]
    fn test_text_between_street_and_crossing() {
        let out = run("CLL 26 FRENTE AL PARQUE CR 15 - 57 AP 201");
        assert_eq!(out.text, "CLL 26 CR 15 - 57 AP 201");
        assert!(out.validated);
    }

    #[test]
    fn test_tower_labels() {
        assert_eq!(
            run("CRA 14 CL 10 - 30 BLOQUE 2 APTO 301 PISO 3").text,
            "CRA 14 CL 10 - 30 BQ 2 AP 301 PI 3"
        );
        assert_eq!(run("CRA 14 CL 10 TORRE B OF 201").text, "CRA 14 CL 10 T B OF 201");
    }

    #[test]
    fn test_locale_without_offset() {
        let out = run("CLL 26 CR 15 LOCAL 3");
        assert_eq!(out.text, "CLL 26 CR 15 LC 3");
        assert!(out.validated);
    }

    #[test]
    fn test_only_street_rows_claimed() {
        assert!(RojasPinilla.mentions("CRA 5 CL 2"));
        assert!(RojasPinilla.mentions("URB X ROJAS PINILLA"));
        assert!(!RojasPinilla.mentions("URB X CRA 5 CL 2"));
    }
}

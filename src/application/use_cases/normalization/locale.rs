// ============================================================
// LOCALE SEGMENT CLEANUP
// ============================================================
// Reduces "LC ..." commercial tails to `LC <id>[ PI <n>]`

use super::scanner::Scanner;
use super::tokenizer::TokenKind;
use super::vocabulary::{canonical_number, is_reserved};
use once_cell::sync::Lazy;
use regex::Regex;

/// Mall and landmark names that trail commercial addresses.
pub const LANDMARKS: &[&str] = &[
    "CLUB HOUSE",
    "CLUBHOUSE",
    "CENTENARIO MALL",
    "MALL CENTENARIO",
    "FLORIDA BAJA",
    "BALEARES",
    "AV BOLIVAR",
    "ED EL PILAR",
    "AMANECER",
    "MALL ZN ORO",
    "LUXOR",
];

static TRAILING_AVENUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+AV(?:ENIDA)?\s+[A-ZÁÉÍÓÚÜÑ0-9\s]+$").unwrap());

static TRAILING_BUILDING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+ED(?:IFICIO)?\s+[A-ZÁÉÍÓÚÜÑ0-9\s]+$").unwrap());

static LOCALE_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:LC|LOCAL)\b").unwrap());

/// Remove landmark labels sitting at the end of `text`, repeatedly.
pub fn strip_trailing_landmarks(text: &str) -> String {
    let mut out = text.trim().to_string();
    loop {
        let before = out.len();
        for landmark in LANDMARKS {
            if let Some(head) = out.strip_suffix(landmark) {
                if head.is_empty() || head.ends_with(' ') {
                    out = head.trim_end_matches([' ', '.', '-']).to_string();
                }
            }
            out = out.trim_end_matches(['.', '-', ' ']).to_string();
        }
        if out.len() == before {
            return out;
        }
    }
}

/// Remove trailing avenue / building descriptions.
pub fn strip_trailing_avenue_and_building(text: &str) -> String {
    let out = TRAILING_AVENUE.replace(text, "");
    TRAILING_BUILDING.replace(&out, "").to_string()
}

/// Byte offset of the first `LC` / `LOCAL` word.
pub fn locale_start(text: &str) -> Option<usize> {
    LOCALE_START.find(text).map(|m| m.start())
}

/// Reduce a segment starting at `LC` to `LC <id>[ PI <n>]`.
///
/// Basement (`SOTANO n` → `SOT n`) and ATM (`CAJERO n` → `CAJ n`) notes,
/// `PL LIBRE` and `GRUPO ...` are folded away. Returns `None` when the id is
/// missing or malformed, or when anything else remains after the id.
pub fn normalize_locale_segment(segment: &str) -> Option<String> {
    let cleaned = strip_trailing_avenue_and_building(&strip_trailing_landmarks(segment));
    let scanner = Scanner::new(&cleaned);
    let key = scanner.find_word(&["LC", "LOCAL"], 0)?;
    let (id, mut i) = read_locale_id(&scanner, scanner.skip_separators(key + 1))?;

    let mut floor: Option<String> = None;
    while i < scanner.len() {
        i = scanner.skip_separators(i);
        let Some(word) = scanner.word(i) else {
            if i < scanner.len() {
                return None;
            }
            break;
        };
        match word {
            "SOTANO" | "SOT" | "CAJERO" | "CAJ" => {
                let value = scanner.skip_separators(i + 1);
                if !scanner.is_number(value) {
                    return None;
                }
                i = value + 1;
            }
            "PL" if scanner.is_word(i + 1, &["LIBRE"]) => i += 2,
            "GRUPO" => break,
            "PI" | "PISO" => {
                let value = scanner.skip_separators(i + 1);
                if !scanner.is_number(value) || floor.is_some() {
                    return None;
                }
                floor = scanner.word(value).map(canonical_number);
                i = value + 1;
            }
            _ => return None,
        }
    }

    let mut out = format!("LC {}", id);
    if let Some(floor) = floor {
        out.push_str(&format!(" PI {}", floor));
    }
    Some(out)
}

/// The `LC` tail of a tokenized address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleTail {
    Absent,
    /// Reduced segment and the token index of its `LC` keyword
    Reduced { at: usize, text: String },
    /// Something other than an id and a floor follows `LC`
    Complex,
}

impl LocaleTail {
    pub fn of(scanner: &Scanner<'_>) -> Self {
        let Some(at) = scanner.find_word(&["LC", "LOCAL"], 0) else {
            return LocaleTail::Absent;
        };
        match normalize_locale_segment(scanner.rest(at)) {
            Some(text) => LocaleTail::Reduced { at, text },
            None => LocaleTail::Complex,
        }
    }

    /// Token index where the tail starts, or `len` without one.
    pub fn start_or(&self, len: usize) -> usize {
        match self {
            LocaleTail::Reduced { at, .. } => *at,
            _ => len,
        }
    }

    pub fn text(&self) -> Option<String> {
        match self {
            LocaleTail::Reduced { text, .. } => Some(text.clone()),
            _ => None,
        }
    }
}

/// Locale id forms: `12`, `12B`, `A12`, `A 12`, `3-4`.
fn read_locale_id(scanner: &Scanner<'_>, index: usize) -> Option<(String, usize)> {
    let token = scanner.token(index)?;
    match token.kind {
        TokenKind::Number => {
            let dash = index + 1;
            if scanner.is_symbol(dash, &["-"]) && scanner.is_number(dash + 1) {
                let second = scanner.word(dash + 1)?;
                return Some((format!("{}-{}", token.text, second), dash + 2));
            }
            Some((token.text.to_string(), index + 1))
        }
        TokenKind::AlphaNum => {
            let letters = token.text.chars().take_while(|c| c.is_alphabetic()).count();
            let digits = token.text.chars().take_while(|c| c.is_ascii_digit()).count();
            let len = token.text.chars().count();
            let digit_first = digits >= 1 && len == digits + 1;
            let letter_first = (1..=3).contains(&letters) && (1..=4).contains(&(len - letters));
            if digit_first || letter_first {
                Some((token.text.to_string(), index + 1))
            } else {
                None
            }
        }
        TokenKind::Word => {
            let letters = token.text.chars().count();
            let next = scanner.token(index + 1)?;
            if (1..=3).contains(&letters)
                && !is_reserved(token.text)
                && next.kind == TokenKind::Number
                && next.text.len() <= 4
            {
                Some((format!("{} {}", token.text, canonical_number(next.text)), index + 2))
            } else {
                None
            }
        }
        TokenKind::Symbol => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_locale() {
        assert_eq!(normalize_locale_segment("LC 1 PISO 2").as_deref(), Some("LC 1 PI 2"));
        assert_eq!(normalize_locale_segment("LC 12B").as_deref(), Some("LC 12B"));
        assert_eq!(normalize_locale_segment("LOCAL 3-4").as_deref(), Some("LC 3-4"));
        assert_eq!(normalize_locale_segment("LC A12 PI 02").as_deref(), Some("LC A12 PI 2"));
    }

    #[test]
    fn test_annotations_fold_away() {
        assert_eq!(
            normalize_locale_segment("LC 5 SOTANO 1 PL LIBRE").as_deref(),
            Some("LC 5")
        );
        assert_eq!(
            normalize_locale_segment("LC 7 CAJERO 2 PI 1").as_deref(),
            Some("LC 7 PI 1")
        );
        assert_eq!(
            normalize_locale_segment("LC 9 GRUPO EXITO SAS").as_deref(),
            Some("LC 9")
        );
    }

    #[test]
    fn test_landmarks_and_buildings_removed() {
        assert_eq!(
            normalize_locale_segment("LC 101 CENTENARIO MALL").as_deref(),
            Some("LC 101")
        );
        assert_eq!(
            normalize_locale_segment("LC 4 ED TORRE CENTRAL").as_deref(),
            Some("LC 4")
        );
    }

    #[test]
    fn test_locale_tail_of_scanner() {
        let scanner = Scanner::new("CLL 26 CR 15 - 57 LC 1 PISO 2");
        let tail = LocaleTail::of(&scanner);
        assert_eq!(tail.start_or(scanner.len()), 6);
        assert_eq!(tail.text().as_deref(), Some("LC 1 PI 2"));
        assert_eq!(LocaleTail::of(&Scanner::new("CRA 5 CL 10 - 20")), LocaleTail::Absent);
        assert_eq!(
            LocaleTail::of(&Scanner::new("CRA 5 CL 10 - 20 LOCAL DEL FONDO")),
            LocaleTail::Complex
        );
    }

    #[test]
    fn test_complex_locale_rejected() {
        assert_eq!(normalize_locale_segment("LC FRENTE AL PARQUE"), None);
        assert_eq!(normalize_locale_segment("LC 5 FRENTE AL PARQUE"), None);
        assert_eq!(normalize_locale_segment("LC"), None);
        assert_eq!(normalize_locale_segment("LC 5 PI"), None);
    }

    #[test]
    fn test_locale_start() {
        assert_eq!(locale_start("CLL 26 CR 15 - 57 LC 1"), Some(18));
        assert_eq!(locale_start("CLL 26 CR 15 - 57"), None);
        assert_eq!(locale_start("CRA 5 CL 10 - 20 LOCALIDAD"), None);
    }

    #[test]
    fn test_strip_trailing_landmarks() {
        assert_eq!(strip_trailing_landmarks("LC 3 LUXOR -"), "LC 3");
        assert_eq!(strip_trailing_landmarks("LC 3 MALL ZN ORO LUXOR"), "LC 3");
        assert_eq!(strip_trailing_landmarks("PARQUE AMANECERES"), "PARQUE AMANECERES");
    }
}

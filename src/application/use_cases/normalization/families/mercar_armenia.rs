// ============================================================
// MERCAR MARKET / URB NUEVO ARMENIA
// ============================================================
// Wholesale market stalls and the Nuevo Armenia housing estate

use crate::application::use_cases::normalization::canonical::{
    residential_pattern, CanonicalAddress, NormalizedAddress,
};
use crate::application::use_cases::normalization::preprocess::collapse_whitespace;
use crate::application::use_cases::normalization::residential::contains_any;
use crate::application::use_cases::normalization::scanner::{Scanner, Shape};
use crate::application::use_cases::normalization::vocabulary::stage_value;
use crate::application::use_cases::normalization::NeighborhoodNormalizer;
use crate::domain::address::{ExtractedFields, FieldKind};
use crate::shared::text_fold::fold_accents;
use once_cell::sync::Lazy;
use regex::Regex;

/// Substrings that place a row in the market.
const MARKET_SIGNATURES: &[&str] = &[
    "ARMENIA PLAZA",
    "MERCAR",
    "PABELLON",
    "MAYORISTA",
    "BODEGA",
    "VERDURAS",
    "VERDUR",
    "AZUL",
    "VERDE",
    "AMAR",
    "PLASTICO",
];

/// Named warehouses, checked in order as substrings.
const BODEGA_NAMES: &[(&str, &str)] = &[
    ("BODEGA VERDE", "VERDE"),
    ("B.VERDE", "VERDE"),
    ("BODEGA AMARILLA", "AMARILLA"),
    ("AMARILLAS", "AMARILLA"),
    ("BODEGA AZUL", "AZUL"),
    ("3 AZUL", "AZUL"),
    ("PLATANEROS", "PLATANOS"),
    ("PLATANERO", "PLATANOS"),
    ("PLATANERA", "PLATANOS"),
    ("PLATANOS", "PLATANOS"),
    ("PLATANO", "PLATANOS"),
    ("BODEGA VERDURAS", "DE VERDURAS"),
    ("DE VERDURAS", "DE VERDURAS"),
    ("VERDURA", "DE VERDURAS"),
];

const BODEGA_KEYS: &[&str] = &["BODEGA", "BOD", "BG", "BQ", "PABELLON", "BLOQUE", "SECCION"];

const STALL_KEYS: &[&str] = &[
    "LOCAL", "LOC", "LC", "LCAL", "PT", "PU", "PTO", "PTOS", "L", "MERCAR",
];

/// Leading words replaced by `PTO` when both bodega and stall are known.
const GENERIC_INDICATORS: &[&str] = &["KMT", "CLL", "SAS", "URB", "VIA", "GAL"];

const NUEVO_ARMENIA_HEAD: &str = "URB NUEVO ARMENIA";
const STAGE_KEYS: &[&str] = &["ET", "ETAPA", "ETP", "TP", "P"];
const BLOCK_KEYS: &[&str] = &["MNZ", "MZ", "MNZA", "MNA"];
const UNIT_KEYS: &[&str] = &["CS", "CASA", "C"];
const FLOOR_KEYS: &[&str] = &["PI", "PISO"];
const APARTMENT_KEYS: &[&str] = &["AP"];

static MARKET_TEMPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:LOC MERCAR (?:BODEGA(?: DE VERDURAS| PLATANOS| VERDE| AZUL| AMARILLA)?",
        r"(?: \d+[A-Z]?)?|BG \d+[A-Z]?)(?: PTO \d+[A-Z]?(?:[-,]\d+[A-Z]?)*)?",
        r"|KMT 2 ARMENIA PLAZA BG \d+(?:-\d+)?)$"
    ))
    .unwrap()
});

static NUEVO_ARMENIA_TEMPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&residential_pattern(
        &[NUEVO_ARMENIA_HEAD],
        &[FieldKind::Floor, FieldKind::Apartment, FieldKind::Stage],
    ))
    .unwrap()
});

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-.,]").unwrap());
static BAJOS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bBAJOS\b").unwrap());
static ALTOS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bALTOS\b").unwrap());

pub struct MercarArmenia;

impl NeighborhoodNormalizer for MercarArmenia {
    fn id(&self) -> &'static str {
        "mercar_armenia"
    }

    fn display_name(&self) -> &'static str {
        "MERCAR / ARMENIA PLAZA, URB NUEVO ARMENIA"
    }

    fn mentions(&self, cleaned: &str) -> bool {
        contains_any(cleaned, MARKET_SIGNATURES) || cleaned.contains("NUEVO ARMENIA")
    }

    fn normalize(&self, cleaned: &str) -> NormalizedAddress {
        if cleaned.contains("NUEVO ARMENIA") {
            return normalize_nuevo_armenia(cleaned);
        }
        normalize_market(cleaned)
    }

    fn conforms(&self, text: &str) -> bool {
        MARKET_TEMPLATE.is_match(text) || NUEVO_ARMENIA_TEMPLATE.is_match(text)
    }
}

// ------------------------------------------------------------
// Market
// ------------------------------------------------------------

fn normalize_market(cleaned: &str) -> NormalizedAddress {
    let scanner = Scanner::new(cleaned);
    let bodega = market_bodega(cleaned, &scanner);
    let stalls = market_stalls(&scanner);

    let rebuilt = match (bodega, stalls) {
        (Some(bodega), Some(stalls)) => Some(format!(
            "LOC MERCAR BODEGA {} {} {}",
            bodega,
            market_indicator(cleaned, &scanner),
            stalls
        )),
        _ => None,
    };

    match rebuilt {
        Some(text) if MARKET_TEMPLATE.is_match(&text) => NormalizedAddress::canonical(text),
        _ if MARKET_TEMPLATE.is_match(cleaned) => NormalizedAddress::canonical(cleaned),
        _ => NormalizedAddress::passthrough(cleaned),
    }
}

/// Named warehouse, else the number list after a warehouse keyword.
fn market_bodega(cleaned: &str, scanner: &Scanner<'_>) -> Option<String> {
    if let Some((_, name)) = BODEGA_NAMES.iter().find(|(key, _)| cleaned.contains(key)) {
        return Some(name.to_string());
    }
    (0..scanner.len())
        .filter(|i| scanner.is_word(*i, BODEGA_KEYS))
        .find_map(|i| read_number_list(scanner, i + 1))
        .map(|(numbers, _)| numbers.join("-"))
}

/// Every stall number after a stall keyword, deduplicated and sorted by
/// numeric part.
fn market_stalls(scanner: &Scanner<'_>) -> Option<String> {
    let mut stalls: Vec<String> = Vec::new();
    for i in 0..scanner.len() {
        if !scanner.is_word(i, STALL_KEYS) {
            continue;
        }
        if let Some((numbers, _)) = read_number_list(scanner, i + 1) {
            for number in numbers {
                if !stalls.contains(&number) {
                    stalls.push(number);
                }
            }
        }
    }
    if stalls.is_empty() {
        return None;
    }
    stalls.sort_by(|a, b| numeric_part(a).cmp(&numeric_part(b)).then_with(|| a.cmp(b)));
    Some(stalls.join("-"))
}

fn numeric_part(value: &str) -> u64 {
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(u64::MAX)
}

/// `3`, `3-4`, `3,4B` starting at token `index`.
fn read_number_list(scanner: &Scanner<'_>, index: usize) -> Option<(Vec<String>, usize)> {
    let first = scanner.value_at(index, Shape::DigitsSuffix(6))?;
    let mut numbers = vec![first.value];
    let mut next = first.next;
    while scanner.is_symbol(next, &["-", ","]) {
        match scanner.value_at(next + 1, Shape::DigitsSuffix(6)) {
            Some(hit) => {
                numbers.push(hit.value);
                next = hit.next;
            }
            None => break,
        }
    }
    Some((numbers, next))
}

fn market_indicator(cleaned: &str, scanner: &Scanner<'_>) -> String {
    if cleaned.contains("ARMENIA PLAZA") {
        return "ARMENIA PLAZA".to_string();
    }
    match scanner.word(0) {
        Some(first) if GENERIC_INDICATORS.contains(&first) || first == "LOC" => "PTO".to_string(),
        Some(first) => first.to_string(),
        None => "PTO".to_string(),
    }
}

// ------------------------------------------------------------
// Nuevo Armenia
// ------------------------------------------------------------

/// Accent-free text with `- . ,` as spaces and `BAJOS` / `ALTOS` as floors.
fn prepare_nuevo_armenia(cleaned: &str) -> String {
    let folded = fold_accents(cleaned);
    let spaced = PUNCTUATION.replace_all(&folded, " ");
    let text = BAJOS.replace_all(&spaced, " PI 1");
    let text = ALTOS.replace_all(&text, " PI 2");
    collapse_whitespace(&text)
}

fn normalize_nuevo_armenia(cleaned: &str) -> NormalizedAddress {
    let prepared = prepare_nuevo_armenia(cleaned);
    let scanner = Scanner::new(&prepared);
    if !(scanner.contains_word(&["NUEVO"]) && scanner.contains_word(&["ARMENIA"])) {
        return NormalizedAddress::passthrough(cleaned);
    }

    let mut fields = ExtractedFields::new();
    fields.set_opt(
        FieldKind::Stage,
        explicit_stage(&scanner).or_else(|| stage_before_block(&scanner)),
    );

    let mut i = 0;
    while i < scanner.len() {
        let Some(word) = scanner.word(i) else {
            i += 1;
            continue;
        };
        let value = scanner.word(i + 1);
        let kind = if BLOCK_KEYS.contains(&word) {
            Some(FieldKind::Block)
        } else if UNIT_KEYS.contains(&word) {
            Some(FieldKind::Unit)
        } else if FLOOR_KEYS.contains(&word) {
            Some(FieldKind::Floor)
        } else if APARTMENT_KEYS.contains(&word) {
            Some(FieldKind::Apartment)
        } else {
            None
        };
        match (kind, value) {
            (Some(kind), Some(value)) => {
                fields.set(kind, value);
                i += 2;
            }
            _ if STAGE_KEYS.contains(&word) && value.is_some() => i += 2,
            _ => {
                let bare = scanner
                    .token(i)
                    .is_some_and(|t| t.starts_with_digit() && Shape::DigitsSuffix(6).accepts(t));
                if bare && fields.has(FieldKind::Block) && !fields.has(FieldKind::Unit) {
                    fields.set(FieldKind::Unit, word);
                }
                i += 1;
            }
        }
    }

    if !fields.has_all(&[FieldKind::Block, FieldKind::Unit]) {
        return NormalizedAddress::passthrough(cleaned);
    }
    let text = CanonicalAddress::new(NUEVO_ARMENIA_HEAD)
        .fields(
            &fields,
            &[
                FieldKind::Block,
                FieldKind::Unit,
                FieldKind::Floor,
                FieldKind::Apartment,
                FieldKind::Stage,
            ],
        )
        .build();
    if NUEVO_ARMENIA_TEMPLATE.is_match(&text) {
        NormalizedAddress::canonical(text)
    } else {
        NormalizedAddress::passthrough(cleaned)
    }
}

/// Value after the first stage keyword.
fn explicit_stage(scanner: &Scanner<'_>) -> Option<String> {
    let key = scanner.find_word(STAGE_KEYS, 0)?;
    scanner.word(key + 1).map(stage_value)
}

/// Roman numeral or number written right before the block keyword.
fn stage_before_block(scanner: &Scanner<'_>) -> Option<String> {
    let key = scanner.find_word(BLOCK_KEYS, 1)?;
    scanner
        .token(key - 1)
        .filter(|candidate| Shape::ShortStage.accepts(candidate))
        .map(|candidate| stage_value(candidate.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::normalization::preprocess::clean;

    fn run(raw: &str) -> NormalizedAddress {
        MercarArmenia.normalize(&clean(raw))
    }

    #[test]
    fn test_market_colour_bodega() {
        let out = run("LOC BODEGA VERDE LC 12 - 3");
        assert_eq!(out.text, "LOC MERCAR BODEGA VERDE PTO 3-12");
        assert!(out.validated);
    }

    #[test]
    fn test_market_numbered_bodega() {
        let out = run("KMT 2 VIA MERCAR BG 4 PT 7,7");
        assert_eq!(out.text, "LOC MERCAR BODEGA 4 PTO 7");
        assert!(out.validated);
    }

    #[test]
    fn test_market_without_stall_passes_through() {
        let out = run("BODEGA 4 MAYORISTA");
        assert!(!out.validated);
        assert_eq!(out.text, "BODEGA 4 MAYORISTA");
    }

    #[test]
    fn test_already_canonical_market_text_validates() {
        assert!(run("KMT 2 ARMENIA PLAZA BG 14").validated);
    }

    #[test]
    fn test_armenia_plaza_indicator_does_not_validate() {
        let out = run("ARMENIA PLAZA BODEGA 3 LOCAL 5");
        assert!(!out.validated);
    }

    #[test]
    fn test_nuevo_armenia_basic() {
        let out = run("URB NUEVO ARMENIA MZ 5 CS 12 BAJOS");
        assert_eq!(out.text, "URB NUEVO ARMENIA MZ 5 CS 12 PI 1");
        assert!(out.validated);
    }

    #[test]
    fn test_nuevo_armenia_stage_before_block() {
        let out = run("NUEVO ARMENIA III MZ 02 14");
        assert_eq!(out.text, "URB NUEVO ARMENIA MZ 2 CS 14 ET 3");
        assert!(out.validated);
    }

    #[test]
    fn test_nuevo_armenia_explicit_stage_and_apartment() {
        let out = run("NUEVO ARMENIA ETAPA II MZ. B CASA 3 AP 201");
        assert_eq!(out.text, "URB NUEVO ARMENIA MZ B CS 3 AP 201 ET 2");
    }

    #[test]
    fn test_nuevo_armenia_without_unit() {
        let out = run("URB NUEVO ARMENIA MZ 5");
        assert!(!out.validated);
        assert_eq!(out.text, "URB NUEVO ARMENIA MZ 5");
    }

    #[test]
    fn test_mentions() {
        assert!(MercarArmenia.mentions("LOC 5 PABELLON AZUL"));
        assert!(MercarArmenia.mentions("URB NUEVO ARMENIA MZ 1 CS 1"));
        assert!(!MercarArmenia.mentions("URB LA CECILIA MZ 1 CS 1"));
    }
}

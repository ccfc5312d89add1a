// ============================================================
// VOCABULARY
// ============================================================
// Accepted spellings for structural tokens and numeric canonicalization

use once_cell::sync::Lazy;
use std::collections::HashSet;

pub const BLOCK: &[&str] = &["MZ", "MZA", "MZN", "MNZ", "MANZANA", "M"];
pub const UNIT: &[&str] = &["CS", "CASA", "C"];
pub const FLOOR: &[&str] = &["PI", "PISO", "PIS", "P"];
pub const APARTMENT: &[&str] = &["AP", "APTO", "APARTAMENTO", "APT"];
pub const STAGE: &[&str] = &["ET", "ETAPA", "ETP", "TP"];
pub const TOWER: &[&str] = &["TO", "TORRE", "T"];
pub const BLOCK_LETTER: &[&str] = &["BQ", "BL", "BLQ", "BLOQUE"];
pub const LOCALE: &[&str] = &["LC", "LOCAL"];
pub const OFFICE: &[&str] = &["OF", "OFI", "OFICINA"];
pub const LOT: &[&str] = &["LOTE", "LT"];
pub const SECTOR: &[&str] = &["SC", "SEC", "SECT", "SECTOR"];
pub const CARRERA: &[&str] = &["CRA", "CR", "KR", "KRA", "K", "CARRERA"];
pub const CALLE: &[&str] = &["CLL", "CALLE"];

/// Words that carry structure and are never read as a bare value.
static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let extra: &[&str] = &[
        "MNZA", "MNA", "MN", "MZNA", "MNZS", "MMZ", "MNZZ", "MLZ", "CAS", "APTOS", "APU", "INT",
        "IN", "CL", "MACRO", "MACROMEDIDOR", "CN", "CONS", "SOT", "SOTANO", "CAJ", "CAJERO", "NIU",
        "BIS", "LOC", "NIVEL", "URB", "BRR", "CJT", "BARRIO",
    ];
    [
        BLOCK, UNIT, FLOOR, APARTMENT, STAGE, TOWER, BLOCK_LETTER, LOCALE, OFFICE, LOT, SECTOR,
        CARRERA, CALLE, extra,
    ]
    .into_iter()
    .flatten()
    .copied()
    .collect()
});

pub fn is_reserved(word: &str) -> bool {
    RESERVED.contains(word)
}

/// Roman numerals accepted as stage values.
const ROMAN: [(&str, &str); 10] = [
    ("I", "1"),
    ("II", "2"),
    ("III", "3"),
    ("IV", "4"),
    ("V", "5"),
    ("VI", "6"),
    ("VII", "7"),
    ("VIII", "8"),
    ("IX", "9"),
    ("X", "10"),
];

/// Arabic form of a roman numeral between I and X.
pub fn roman_to_arabic(token: &str) -> Option<&'static str> {
    ROMAN
        .iter()
        .find(|(roman, _)| *roman == token)
        .map(|(_, arabic)| *arabic)
}

/// Strip leading zeros from the digit prefix of `value`: `02` → `2`,
/// `005A` → `5A`, `0` → `0`. Values starting with a letter are unchanged.
pub fn canonical_number(value: &str) -> String {
    let digits = value.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return value.to_string();
    }
    let trimmed = value[..digits].trim_start_matches('0');
    let head = if trimmed.is_empty() { "0" } else { trimmed };
    format!("{}{}", head, &value[digits..])
}

/// Canonical stage value: roman I–X to arabic, integers without leading
/// zeros, anything else verbatim. A glued stage keyword (`ETII`) is dropped.
pub fn stage_value(raw: &str) -> String {
    let bare = if STAGE.contains(&raw) {
        raw
    } else {
        ["ETAPA", "ETP", "ET"]
            .iter()
            .find_map(|prefix| raw.strip_prefix(prefix).filter(|rest| !rest.is_empty()))
            .unwrap_or(raw)
    };
    if let Some(arabic) = roman_to_arabic(bare) {
        return arabic.to_string();
    }
    if bare.chars().all(|c| c.is_ascii_digit()) {
        return canonical_number(bare);
    }
    bare.to_string()
}

/// Abbreviation of an orientation word.
pub fn orientation(word: &str) -> Option<&'static str> {
    match word {
        "NORTE" | "NTE" | "N" => Some("N"),
        "SUR" | "STE" | "S" => Some("S"),
        "ESTE" | "ORIENTE" | "OTE" | "E" => Some("E"),
        "OESTE" | "OCCIDENTE" | "OCC" | "O" => Some("O"),
        _ => None,
    }
}

// ============================================================
// STREET GRID ADDRESSES
// ============================================================
// Carrera/calle intersection heads and their qualifier tails

use super::canonical::{CanonicalAddress, INT};
use super::scanner::{Hit, Scanner, Shape};
use super::tokenizer::TokenKind;
use super::vocabulary::{
    canonical_number, is_reserved, orientation, stage_value, APARTMENT, BLOCK_LETTER, OFFICE,
    TOWER,
};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `CRA <n> CL <m>`
    Carrera,
    /// `CLL <n> CR <m>`
    Calle,
}

impl Axis {
    pub fn label(self) -> &'static str {
        match self {
            Axis::Carrera => "CRA",
            Axis::Calle => "CLL",
        }
    }

    pub fn cross_label(self) -> &'static str {
        match self {
            Axis::Carrera => "CL",
            Axis::Calle => "CR",
        }
    }
}

/// Two street numbers and the optional offset after them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetHead {
    pub axis: Axis,
    pub primary: String,
    pub secondary: String,
    pub offset: Option<String>,
    /// Token index of the primary keyword
    pub start: usize,
    /// Token index just past the head
    pub end: usize,
}

impl StreetHead {
    /// `CRA 5 CL 10 - 20`
    pub fn render(&self) -> String {
        CanonicalAddress::new(format!(
            "{} {} {} {}",
            self.axis.label(),
            self.primary,
            self.axis.cross_label(),
            self.secondary
        ))
        .push_opt(self.offset.as_ref().map(|o| format!("- {}", o)).as_deref())
        .build()
    }
}

/// How strictly a head is recognized.
#[derive(Debug, Clone, Copy)]
pub struct HeadRules {
    pub axis: Axis,
    pub primary_words: &'static [&'static str],
    pub cross_words: &'static [&'static str],
    /// Head must start at the first token
    pub anchored: bool,
    /// `CLL 26 15 - 57`: second number without a crossing keyword
    pub cross_optional: bool,
    /// Free text allowed between the first number and the crossing keyword
    pub gap_before_cross: bool,
    pub offset_separators: &'static [&'static str],
    /// Offset may follow the second number after plain whitespace
    pub bare_offset: bool,
}

impl HeadRules {
    pub fn new(
        axis: Axis,
        primary_words: &'static [&'static str],
        cross_words: &'static [&'static str],
    ) -> Self {
        Self {
            axis,
            primary_words,
            cross_words,
            anchored: false,
            cross_optional: false,
            gap_before_cross: false,
            offset_separators: &["-"],
            bare_offset: false,
        }
    }

    pub fn anchored(mut self) -> Self {
        self.anchored = true;
        self
    }

    pub fn cross_optional(mut self) -> Self {
        self.cross_optional = true;
        self
    }

    pub fn gap_before_cross(mut self) -> Self {
        self.gap_before_cross = true;
        self
    }

    pub fn offset_separators(mut self, separators: &'static [&'static str]) -> Self {
        self.offset_separators = separators;
        self
    }

    pub fn bare_offset(mut self) -> Self {
        self.bare_offset = true;
        self
    }
}

/// First head matching `rules`.
pub fn find_head(scanner: &Scanner<'_>, rules: &HeadRules) -> Option<StreetHead> {
    let last = if rules.anchored { 1 } else { scanner.len() };
    (0..last.min(scanner.len()))
        .filter(|i| scanner.is_word(*i, rules.primary_words))
        .find_map(|start| parse_head_at(scanner, start, rules))
}

fn parse_head_at(scanner: &Scanner<'_>, start: usize, rules: &HeadRules) -> Option<StreetHead> {
    let (primary, after_primary) = read_street_number(scanner, start + 1, rules.cross_words)?;

    let secondary_at = if scanner.is_word(after_primary, rules.cross_words) {
        after_primary + 1
    } else if rules.gap_before_cross {
        (after_primary..scanner.len())
            .find(|j| {
                scanner.is_word(*j, rules.cross_words)
                    && read_street_number(scanner, j + 1, &[]).is_some()
            })
            .map(|j| j + 1)?
    } else if rules.cross_optional {
        after_primary
    } else {
        return None;
    };

    let (secondary, after_secondary) = read_street_number(scanner, secondary_at, &[])?;

    let mut j = after_secondary;
    let mut separated = false;
    while scanner.is_symbol(j, rules.offset_separators) {
        separated = true;
        j += 1;
    }
    let offset = if separated || rules.bare_offset {
        read_offset(scanner, j)
    } else {
        None
    };
    let end = if offset.is_some() { j + 1 } else { after_secondary };

    Some(StreetHead {
        axis: rules.axis,
        primary,
        secondary,
        offset,
        start,
        end,
    })
}

/// Digits of an offset token (`57`, `057` → `57`; `57A` keeps `57`).
fn read_offset(scanner: &Scanner<'_>, index: usize) -> Option<String> {
    let token = scanner.token(index)?;
    match token.kind {
        TokenKind::Number => Some(canonical_number(token.text)),
        TokenKind::AlphaNum if token.starts_with_digit() => {
            let digits: String = token.text.chars().take_while(|c| c.is_ascii_digit()).collect();
            Some(canonical_number(&digits))
        }
        _ => None,
    }
}

/// A street number: `26`, `51N`, `5 BIS A`, `15 NORTE` (→ `15N`).
///
/// A single-letter orientation is only read when `next_keywords`, a symbol
/// or the end of text follows it.
pub fn read_street_number(
    scanner: &Scanner<'_>,
    index: usize,
    next_keywords: &[&str],
) -> Option<(String, usize)> {
    let token = scanner.token(index)?;
    let suffix_ok = |text: &str| {
        let letters: String = text.chars().skip_while(|c| c.is_ascii_digit()).collect();
        letters.chars().count() <= 2 && letters.chars().all(|c| c.is_ascii_uppercase())
    };
    let base = match token.kind {
        TokenKind::Number => token.text,
        TokenKind::AlphaNum if token.starts_with_digit() && suffix_ok(token.text) => token.text,
        _ => return None,
    };

    let mut value = canonical_number(base);
    let has_suffix = token.kind == TokenKind::AlphaNum;
    let mut j = index + 1;

    if scanner.is_word(j, &["BIS"]) {
        value.push_str(" BIS");
        j += 1;
        if let Some(letter) = scanner.word(j) {
            if letter.len() == 1 && !is_reserved(letter) && orientation(letter).is_none() {
                value.push(' ');
                value.push_str(letter);
                j += 1;
            }
        }
    }

    if let Some(word) = scanner.word(j) {
        if let Some(abbr) = orientation(word) {
            let follows_ok = word.len() > 1
                || scanner.token(j + 1).map_or(true, |t| t.is_symbol())
                || scanner.is_word(j + 1, next_keywords);
            if follows_ok {
                if !has_suffix && !value.contains(' ') {
                    value.push_str(abbr);
                }
                j += 1;
            }
        }
    }

    Some((value, j))
}

/// Qualifiers that may follow a street head, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreetQualifiers {
    /// (`TO` | `BQ` | `T`, id)
    pub tower: Option<(&'static str, String)>,
    pub block_unit: Option<(String, String)>,
    /// Single number or `5-6` range
    pub apartment: Option<String>,
    /// `AP` written without a number
    pub bare_apartment: bool,
    pub floor: Option<String>,
    pub stage: Option<String>,
    pub macro_meter: Option<String>,
    pub unit: Option<String>,
    /// Already reduced `LC <id>[ PI <n>]`
    pub locale: Option<String>,
    /// `PU VIGILANCIA`, `MOTOBOMBA`, `MACROMEDIDOR <n>`, `ECR <words>`
    pub marker: Option<String>,
    pub office: Option<String>,
    pub cn: Option<String>,
}

impl StreetQualifiers {
    /// No qualifier at all: the head alone.
    pub fn is_empty(&self) -> bool {
        *self == StreetQualifiers::default()
    }

    pub fn render(&self, head: &StreetHead) -> String {
        let mut out = CanonicalAddress::new(head.render());
        if let Some((label, id)) = &self.tower {
            out = out.push(format!("{} {}", label, id));
        }
        if let Some((block, unit)) = &self.block_unit {
            out = out.field("MZ", block).field("CS", unit);
        }
        match &self.apartment {
            Some(apartment) => out = out.push(format!("AP {}", apartment)),
            None if self.bare_apartment => out = out.push("AP"),
            None => {}
        }
        out = out
            .field_opt("PI", self.floor.as_deref())
            .push_opt(self.stage.as_ref().map(|s| format!("ET {}", s)).as_deref())
            .field_opt("MACRO", self.macro_meter.as_deref())
            .field_opt("CS", self.unit.as_deref())
            .push_opt(self.locale.as_deref())
            .push_opt(self.marker.as_deref())
            .push_opt(self.office.as_ref().map(|o| format!("OF {}", o)).as_deref())
            .push_opt(self.cn.as_ref().map(|c| format!("CN {}", c)).as_deref());
        out.build()
    }
}

const QUALIFIER_BLOCK: &[&str] = &["MZ", "MZA", "MZN", "MNZ", "MANZANA"];
const QUALIFIER_UNIT: &[&str] = &["CS", "CASA"];
const QUALIFIER_FLOOR: &[&str] = &["PI", "PISO", "PIS"];
const QUALIFIER_STAGE: &[&str] = &["ET", "ETAPA"];

/// Read the qualifiers found in tokens `from..until`. Words that start no
/// qualifier are skipped and only the first occurrence of each one counts.
///
/// `tower_label` maps the tower keyword actually written (`TORRE`, `BLQ`...)
/// to its output label.
pub fn read_qualifiers(
    scanner: &Scanner<'_>,
    from: usize,
    until: usize,
    tower_label: fn(&str) -> &'static str,
) -> StreetQualifiers {
    let until = until.min(scanner.len());
    let mut qualifiers = StreetQualifiers::default();
    let mut i = from;
    while i < until {
        i = read_qualifier(scanner, i, until, tower_label, &mut qualifiers).unwrap_or(i + 1);
    }
    qualifiers
}

fn read_qualifier(
    scanner: &Scanner<'_>,
    i: usize,
    until: usize,
    tower_label: fn(&str) -> &'static str,
    out: &mut StreetQualifiers,
) -> Option<usize> {
    let word = scanner.word(i)?;

    if TOWER.contains(&word) || BLOCK_LETTER.contains(&word) {
        let hit = scanner.keyed_at(i, &[word], Shape::Alnum(4))?;
        if out.tower.is_none() {
            out.tower = Some((tower_label(word), canonical_number(&hit.value)));
        }
        return Some(hit.next);
    }

    if QUALIFIER_BLOCK.contains(&word) {
        let block = scanner.keyed_at(i, QUALIFIER_BLOCK, Shape::Alnum(4))?;
        let unit = scanner.keyed_at(
            scanner.skip_separators(block.next),
            &["CS", "CASA", "C"],
            Shape::Alnum(4),
        )?;
        if out.block_unit.is_none() {
            out.block_unit = Some((block.value, unit.value));
        }
        return Some(unit.next);
    }

    if APARTMENT.contains(&word) || word == "APU" {
        let at = scanner.skip_separators(i + 1);
        if let Some(hit) = scanner
            .value_at(at, Shape::Digits(6))
            .or_else(|| suffixed_number(scanner, at))
        {
            let (value, next) = with_range(scanner, hit);
            out.apartment.get_or_insert(value);
            return Some(next);
        }
        // `AP SEGUNDO PISO 2`: the number after a few plain words
        let worded = (i + 1..(i + 4).min(until))
            .take_while(|j| {
                scanner
                    .token(*j)
                    .is_some_and(|t| t.kind != TokenKind::Word || !is_reserved(t.text))
            })
            .find(|j| scanner.is_number(*j));
        match worded {
            Some(j) => {
                let value = scanner.word(j).map(canonical_number)?;
                out.apartment.get_or_insert(value);
                return Some(j + 1);
            }
            None => {
                out.bare_apartment = i + 1 >= until;
                return Some(i + 1);
            }
        }
    }

    if QUALIFIER_FLOOR.contains(&word) {
        let hit = scanner.keyed_at(i, QUALIFIER_FLOOR, Shape::Digits(3))?;
        out.floor.get_or_insert(hit.value);
        return Some(hit.next);
    }

    if QUALIFIER_STAGE.contains(&word) {
        let hit = scanner.keyed_at(i, QUALIFIER_STAGE, Shape::Stage)?;
        out.stage.get_or_insert(stage_value(&hit.value));
        return Some(hit.next);
    }

    if QUALIFIER_UNIT.contains(&word) {
        let hit = scanner.keyed_at(i, QUALIFIER_UNIT, Shape::Alnum(5))?;
        out.unit.get_or_insert(canonical_number(&hit.value));
        return Some(hit.next);
    }

    if OFFICE.contains(&word) {
        let hit = scanner.keyed_at(i, OFFICE, Shape::Digits(6))?;
        let (value, next) = with_range(scanner, hit);
        out.office.get_or_insert(value);
        return Some(next);
    }

    match word {
        "MACRO" => {
            let hit = scanner.keyed_at(i, &["MACRO"], Shape::Digits(10))?;
            out.macro_meter.get_or_insert(hit.value);
            Some(hit.next)
        }
        "CN" | "CONS" => {
            let hit = scanner.keyed_at(i, &["CN", "CONS"], Shape::Code)?;
            out.cn.get_or_insert(hit.value);
            Some(hit.next)
        }
        "PU" if scanner.is_word(i + 1, &["VIGILANCIA"]) => {
            out.marker.get_or_insert_with(|| "PU VIGILANCIA".to_string());
            Some(i + 2)
        }
        "MOTOBOMBA" => {
            out.marker.get_or_insert_with(|| "MOTOBOMBA".to_string());
            Some(i + 1)
        }
        "MACROMEDIDOR" => {
            let hit = scanner.keyed_at(i, &["MACROMEDIDOR"], Shape::Digits(10))?;
            out.marker
                .get_or_insert_with(|| format!("MACROMEDIDOR {}", canonical_number(&hit.value)));
            Some(hit.next)
        }
        "ECR" => {
            let words: Vec<&str> = (i + 1..until)
                .map_while(|j| {
                    scanner
                        .token(j)
                        .filter(|t| t.kind == TokenKind::Word)
                        .map(|t| t.text)
                })
                .collect();
            if words.is_empty() {
                return None;
            }
            let next = i + 1 + words.len();
            out.marker
                .get_or_insert_with(|| format!("ECR {}", words.join(" ")));
            Some(next)
        }
        _ => None,
    }
}

/// `301` or `301-302` when a dash and a second number follow.
/// `302A`: the digits of a number written with a letter suffix.
fn suffixed_number(scanner: &Scanner<'_>, at: usize) -> Option<Hit> {
    let token = scanner.token(at).filter(|t| t.kind == TokenKind::AlphaNum)?;
    let digits: String = token.text.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || digits.len() > 6 {
        return None;
    }
    Some(Hit {
        value: digits,
        at,
        next: at + 1,
    })
}

fn with_range(scanner: &Scanner<'_>, hit: Hit) -> (String, usize) {
    let first = canonical_number(&hit.value);
    if scanner.is_symbol(hit.next, &["-"]) && scanner.is_number(hit.next + 1) {
        if let Some(second) = scanner.word(hit.next + 1) {
            return (format!("{}-{}", first, canonical_number(second)), hit.next + 2);
        }
    }
    (first, hit.next)
}

/// Canonical street grammar shared by every street-grid family.
pub static STREET_TEMPLATE: Lazy<Regex> = Lazy::new(|| {
    let n = format!(r"{}[A-Z]{{0,2}}(?: BIS(?: [A-Z])?)?", INT);
    Regex::new(&format!(
        concat!(
            r"^(?:CRA {n} CL {n}|CLL {n} CR {n})(?: - {i})?",
            r"(?: (?:TO|BQ|T) [A-Z0-9]+)?",
            r"(?: MZ [A-Z0-9]+ CS [A-Z0-9]+)?",
            r"(?: AP(?: {i}(?:-{i})?)?)?",
            r"(?: PI {i})?",
            r"(?: ET [A-Z0-9]+)?",
            r"(?: MACRO {i})?",
            r"(?: CS [A-Z0-9]+)?",
            r"(?: LC [A-Z0-9-]+(?: {i})?(?: PI {i})?)?",
            r"(?: (?:PU VIGILANCIA|MOTOBOMBA|MACROMEDIDOR {i}|ECR [A-ZÑ ]+))?",
            r"(?: OF {i}(?:-{i})?)?",
            r"(?: CN [A-Z0-9]+)?$"
        ),
        n = n,
        i = INT
    ))
    .unwrap()
});

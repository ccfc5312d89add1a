// ============================================================
// RESIDENTIAL FIELD SEQUENCES
// ============================================================
// Shared block/unit/floor/apartment/stage extraction for platted neighborhoods

use super::canonical::NormalizedAddress;
use super::scanner::{Hit, Scanner, Shape};
use super::vocabulary::{stage_value, LOT};
use crate::domain::address::{ExtractedFields, FieldKind};
use regex::Regex;

/// One expected field in a residential sequence.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub kind: FieldKind,
    pub keys: &'static [&'static str],
    pub shape: Shape,
    pub required: bool,
}

impl FieldRule {
    pub const fn required(kind: FieldKind, keys: &'static [&'static str], shape: Shape) -> Self {
        Self {
            kind,
            keys,
            shape,
            required: true,
        }
    }

    pub const fn optional(kind: FieldKind, keys: &'static [&'static str], shape: Shape) -> Self {
        Self {
            kind,
            keys,
            shape,
            required: false,
        }
    }
}

/// Read `rules` in order starting at token `from`.
///
/// Each field is the nearest keyword after the previously found one, so free
/// text between fields is skipped. A missing optional field leaves the
/// position unchanged; a missing required field aborts the match.
pub fn extract_fields(
    scanner: &Scanner<'_>,
    from: usize,
    rules: &[FieldRule],
) -> Option<ExtractedFields> {
    let mut fields = ExtractedFields::new();
    let mut position = from;
    for rule in rules {
        match scanner.find_keyed(rule.keys, rule.shape, position) {
            Some(hit) => {
                let value = match rule.kind {
                    FieldKind::Stage => stage_value(&hit.value),
                    _ => hit.value,
                };
                fields.set(rule.kind, value);
                position = hit.next;
            }
            None if rule.required => return None,
            None => {}
        }
    }
    Some(fields)
}

/// Nearest value from `from`, either after one of `keys` (shape `keyed`)
/// or standing alone (shape `bare`).
pub fn find_loose(
    scanner: &Scanner<'_>,
    keys: &[&str],
    keyed: Shape,
    bare: Shape,
    from: usize,
) -> Option<Hit> {
    (from..scanner.len())
        .find_map(|i| scanner.keyed_at(i, keys, keyed).or_else(|| scanner.bare_at(i, bare)))
}

/// `LOTE` / `LT` anywhere as a word.
pub fn has_lot_marker(scanner: &Scanner<'_>) -> bool {
    scanner.contains_word(LOT)
}

/// Any of `needles` occurs as a substring of `text`.
pub fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

/// Any template matches `text` in full.
pub fn conforms_to(templates: &[Regex], text: &str) -> bool {
    templates.iter().any(|re| re.is_match(text))
}

/// Validated only when the reconstruction fits a family template; otherwise
/// the cleaned input is passed through.
pub fn checked(rendered: String, templates: &[Regex], cleaned: &str) -> NormalizedAddress {
    if conforms_to(templates, &rendered) {
        NormalizedAddress::canonical(rendered)
    } else {
        NormalizedAddress::passthrough(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::normalization::vocabulary::{BLOCK, FLOOR, STAGE, UNIT};

    const RULES: &[FieldRule] = &[
        FieldRule::required(FieldKind::Block, BLOCK, Shape::Alnum(4)),
        FieldRule::required(FieldKind::Unit, UNIT, Shape::DigitsSuffix(4)),
        FieldRule::optional(FieldKind::Floor, FLOOR, Shape::Digits(2)),
        FieldRule::optional(FieldKind::Stage, STAGE, Shape::Stage),
    ];

    #[test]
    fn test_gap_tolerant_sequence() {
        let scanner = Scanner::new("URB X FRENTE AL PARQUE MZ 4 ESQUINA CS 10 ET IV");
        let fields = extract_fields(&scanner, 0, RULES).unwrap();
        assert_eq!(fields.block.as_deref(), Some("4"));
        assert_eq!(fields.unit.as_deref(), Some("10"));
        assert_eq!(fields.floor, None);
        assert_eq!(fields.stage.as_deref(), Some("4"));
    }

    #[test]
    fn test_missing_required_field() {
        let scanner = Scanner::new("URB X MZ 4");
        assert!(extract_fields(&scanner, 0, RULES).is_none());
    }

    #[test]
    fn test_find_loose_prefers_nearest() {
        let scanner = Scanner::new("GIBRALTAR 4 PISO 2 CASA 9");
        let block = find_loose(&scanner, BLOCK, Shape::Alnum(3), Shape::DigitsSuffix(3), 1).unwrap();
        assert_eq!(block.value, "4");
        let unit = find_loose(&scanner, UNIT, Shape::DigitsSuffix(4), Shape::DigitsSuffix(4), block.next)
            .unwrap();
        assert_eq!(unit.value, "9");
    }

    #[test]
    fn test_lot_marker_is_whole_word() {
        assert!(has_lot_marker(&Scanner::new("LOTE 4 MZ A")));
        assert!(has_lot_marker(&Scanner::new("MZ A LT 4")));
        assert!(!has_lot_marker(&Scanner::new("LOTERIA MZ A")));
    }

    #[test]
    fn test_checked_falls_back_to_cleaned_text() {
        let templates = vec![Regex::new(r"^URB X MZ \d+ CS \d+$").unwrap()];
        assert!(checked("URB X MZ 1 CS 2".into(), &templates, "raw").validated);
        let out = checked("URB X MZ 1".into(), &templates, "URB X MZ 1 ???");
        assert!(!out.validated);
        assert_eq!(out.text, "URB X MZ 1 ???");
    }
}

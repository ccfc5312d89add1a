// ============================================================
// LAS COLINAS / LA ADIELA / LA ESMERALDA / 7 DE AGOSTO / LA UNION / LA GRECIA
// ============================================================

use crate::application::use_cases::normalization::canonical::{
    render_residential, residential_pattern, NormalizedAddress,
};
use crate::application::use_cases::normalization::residential::{
    checked, conforms_to, contains_any, find_loose,
};
use crate::application::use_cases::normalization::scanner::{Scanner, Shape};
use crate::application::use_cases::normalization::vocabulary::{
    canonical_number, stage_value, APARTMENT, FLOOR, SECTOR,
};
use crate::application::use_cases::normalization::NeighborhoodNormalizer;
use crate::domain::address::{ExtractedFields, FieldKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Field read besides block, house and floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extra {
    None,
    /// `SC n` before the block, part of the head
    Sector,
    Stage,
    Apartment,
}

/// One neighborhood of the family.
struct Barrio {
    /// Substring that routes a row here
    signature: &'static str,
    /// Words the fields are read after
    anchor: &'static [&'static str],
    head: &'static str,
    /// Substrings that mark a row as something other than a home
    exclusions: &'static [&'static str],
    block_keys: &'static [&'static str],
    block: Shape,
    bare_block: bool,
    house_keys: &'static [&'static str],
    house: Shape,
    /// A floor may also be a bare number right after the house
    bare_floor: bool,
    extra: Extra,
    optional: &'static [FieldKind],
}

const HOUSE: &[&str] = &["CS", "CASA", "C"];

const BARRIOS: &[Barrio] = &[
    Barrio {
        signature: "COLINAS",
        anchor: &["COLINAS"],
        head: "URB LAS COLINAS",
        exclusions: &[],
        block_keys: &["MNZ", "MZN", "MZ", "MANZANA"],
        block: Shape::Alnum(3),
        bare_block: false,
        house_keys: HOUSE,
        house: Shape::DigitsSuffix(4),
        bare_floor: true,
        extra: Extra::Sector,
        optional: &[FieldKind::Floor],
    },
    Barrio {
        signature: "ADIELA",
        anchor: &["ADIELA"],
        head: "BRR LA ADIELA",
        exclusions: &[],
        block_keys: &["MNZ", "MZN", "MZ"],
        block: Shape::Digits(3),
        bare_block: false,
        house_keys: HOUSE,
        house: Shape::DigitsSuffix(4),
        bare_floor: true,
        extra: Extra::Stage,
        optional: &[FieldKind::Floor, FieldKind::Stage],
    },
    Barrio {
        signature: "ESMERALDA",
        anchor: &["ESMERALDA"],
        head: "BRR LA ESMERALDA",
        exclusions: &["LOC", "ZONA", "NIU", "CAMBUCHE", "LC"],
        block_keys: &["MNZ", "MZN", "MZ"],
        block: Shape::Digits(3),
        bare_block: true,
        house_keys: HOUSE,
        house: Shape::DigitsSuffix(3),
        bare_floor: true,
        extra: Extra::None,
        optional: &[FieldKind::Floor],
    },
    Barrio {
        signature: "7 DE AGOSTO",
        anchor: &["7", "DE", "AGOSTO"],
        head: "BRR 7 DE AGOSTO",
        exclusions: &[],
        block_keys: &["MNZ", "MZN", "MZ", "MN", "MNZS", "MMZ"],
        block: Shape::Digits(3),
        bare_block: false,
        house_keys: HOUSE,
        house: Shape::DigitsSuffix(4),
        bare_floor: true,
        extra: Extra::None,
        optional: &[FieldKind::Floor],
    },
    Barrio {
        signature: "UNION",
        anchor: &["UNION"],
        head: "BRR LA UNION",
        exclusions: &[
            "NIU", "LOCAL", "FTE", "ENT", "ENTR", "JUNT", "ALT", "BAJ", "ZONA", "ARA",
        ],
        block_keys: &["MNZ", "MZN", "MZ", "MZA"],
        block: Shape::Alnum(3),
        bare_block: false,
        house_keys: &["CS", "CASA", "C", "LT"],
        house: Shape::DigitsSuffix(4),
        bare_floor: false,
        extra: Extra::None,
        optional: &[FieldKind::Floor],
    },
    Barrio {
        signature: "GRECIA",
        anchor: &["GRECIA"],
        head: "URB LA GRECIA",
        exclusions: &[],
        block_keys: &["MNZZ", "MNZ", "MZN", "MZ", "MZA", "MLZ"],
        block: Shape::Digits(3),
        bare_block: false,
        house_keys: &["CS", "CASA"],
        house: Shape::Digits(4),
        bare_floor: false,
        extra: Extra::Apartment,
        optional: &[FieldKind::Apartment, FieldKind::Floor],
    },
];

const STAGE_KEYS: &[&str] = &["ETA", "ETAPA", "ETP", "ET"];

/// `Y 12` and `12-34` make La Grecia rows ambiguous.
static GRECIA_AMBIGUOUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bY\s+\d{1,4}|\d+\s*-\s*\d+").unwrap());

static TEMPLATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    BARRIOS
        .iter()
        .map(|barrio| {
            let head = match barrio.extra {
                Extra::Sector => format!(r"{} SC \d+", barrio.head),
                _ => barrio.head.to_string(),
            };
            Regex::new(&residential_pattern(&[head.as_str()], barrio.optional)).unwrap()
        })
        .collect()
});

pub struct Colinas;

impl NeighborhoodNormalizer for Colinas {
    fn id(&self) -> &'static str {
        "colinas"
    }

    fn display_name(&self) -> &'static str {
        "URB LAS COLINAS, BRR LA ADIELA, BRR LA ESMERALDA, BRR 7 DE AGOSTO, BRR LA UNION, URB LA GRECIA"
    }

    fn mentions(&self, cleaned: &str) -> bool {
        BARRIOS.iter().any(|barrio| cleaned.contains(barrio.signature))
    }

    fn normalize(&self, cleaned: &str) -> NormalizedAddress {
        let Some(barrio) = BARRIOS.iter().find(|b| cleaned.contains(b.signature)) else {
            return NormalizedAddress::passthrough(cleaned);
        };
        if contains_any(cleaned, barrio.exclusions) {
            return NormalizedAddress::passthrough(cleaned);
        }
        if barrio.extra == Extra::Apartment && GRECIA_AMBIGUOUS.is_match(cleaned) {
            return NormalizedAddress::passthrough(cleaned);
        }

        let scanner = Scanner::new(cleaned);
        let Some(anchor) = scanner.find_phrase(barrio.anchor, 0) else {
            return NormalizedAddress::passthrough(cleaned);
        };
        match barrio.extract(&scanner, anchor.end) {
            Some((head, fields)) => checked(
                render_residential(&head, &fields, barrio.optional),
                &TEMPLATES,
                cleaned,
            ),
            None => NormalizedAddress::passthrough(cleaned),
        }
    }

    fn conforms(&self, text: &str) -> bool {
        conforms_to(&TEMPLATES, text)
    }
}

impl Barrio {
    fn extract(&self, scanner: &Scanner<'_>, from: usize) -> Option<(String, ExtractedFields)> {
        let mut fields = ExtractedFields::new();
        let mut head = self.head.to_string();
        let mut from = from;

        match self.extra {
            Extra::Sector => {
                let sector = scanner.find_keyed(SECTOR, Shape::Digits(2), from)?;
                head = format!("{} SC {}", head, canonical_number(&sector.value));
                from = sector.next;
            }
            Extra::Stage => {
                // "LA ADIELA II" names the neighborhood, not a stage.
                if scanner.is_word(from, &["II"]) {
                    from += 1;
                }
                let stage = scanner.find_keyed(STAGE_KEYS, Shape::Stage, from);
                fields.set_opt(FieldKind::Stage, stage.map(|hit| stage_value(&hit.value)));
            }
            Extra::None | Extra::Apartment => {}
        }

        let block = if self.bare_block {
            find_loose(scanner, self.block_keys, self.block, self.block, from)?
        } else {
            scanner.find_keyed(self.block_keys, self.block, from)?
        };
        let house = find_loose(scanner, self.house_keys, self.house, self.house, block.next)?;

        let floor = scanner.find_keyed(FLOOR, Shape::Digits(2), house.next).or_else(|| {
            if self.bare_floor {
                scanner.bare_at(scanner.skip_separators(house.next), Shape::Digits(2))
            } else {
                None
            }
        });
        if self.extra == Extra::Apartment {
            let apartment = scanner.find_keyed(APARTMENT, Shape::Digits(4), house.next);
            fields.set_opt(FieldKind::Apartment, apartment.map(|hit| hit.value));
        }

        fields.set(FieldKind::Block, block.value);
        fields.set(FieldKind::Unit, house.value);
        fields.set_opt(FieldKind::Floor, floor.map(|hit| hit.value));
        Some((head, fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::normalization::preprocess::clean;

    fn run(raw: &str) -> NormalizedAddress {
        Colinas.normalize(&clean(raw))
    }

    #[test]
    fn test_las_colinas_sector() {
        let out = run("URB LAS COLINAS SECTOR 02 MZ 4 CASA 12 2");
        assert_eq!(out.text, "URB LAS COLINAS SC 2 MZ 4 CS 12 PI 2");
        assert!(out.validated);
        assert!(!run("LAS COLINAS MZ 4 CS 12").validated);
    }

    #[test]
    fn test_adiela_stage_after_name() {
        let out = run("BRR LA ADIELA II ETAPA III MZ 7 CS 5");
        assert_eq!(out.text, "BRR LA ADIELA MZ 7 CS 5 ET 3");
        assert!(out.validated);
    }

    #[test]
    fn test_esmerald_bare_block_and_exclusions() {
        assert_eq!(run("BRR LA ESMERALDA 12 4").text, "BRR LA ESMERALDA MZ 12 CS 4");
        let out = run("BRR LA ESMERALDA ZONA VERDE MZ 1");
        assert!(!out.validated);
        assert_eq!(out.text, "BRR LA ESMERALDA ZONA VERDE MZ 1");
    }

    #[test]
    fn test_7_de_agosto() {
        let out = run("7 DE AGOSTO MN 3 C 21 PISO 2");
        assert_eq!(out.text, "BRR 7 DE AGOSTO MZ 3 CS 21 PI 2");
    }

    #[test]
    fn test_la_union_needs_floor_keyword() {
        assert_eq!(run("BRR LA UNION MZ B LT 9").text, "BRR LA UNION MZ B CS 9");
        assert!(!run("BRR LA UNION MZ B CS 9 ALTOS").validated);
    }

    #[test]
    fn test_la_grecia() {
        let out = run("URB LA GRECIA MZ 10 CS 3 APTO 201 PISO 2");
        assert_eq!(out.text, "URB LA GRECIA MZ 10 CS 3 AP 201 PI 2");
        assert!(out.validated);
        assert!(!run("URB LA GRECIA MZ 10 CS 3 Y 4").validated);
        assert!(!run("URB LA GRECIA MZ 10 CS 3-4").validated);
    }
}

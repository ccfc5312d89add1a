// ============================================================
// TEXT PREPROCESSOR
// ============================================================
// Uppercasing, Unicode space/dash canonicalization, boilerplate removal

use once_cell::sync::Lazy;
use regex::Regex;

static NIU_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\s*\bNIU\s*#?\s*-?\s*\d+").unwrap());

static CITY_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\s*-\s*|\s+)ARMENIA$").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Zero-width characters that `char::is_whitespace` does not cover.
const EXTRA_SPACES: &[char] = &['\u{200B}', '\u{FEFF}'];

const DASHES: &[char] = &[
    '\u{00AD}', '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}',
    '\u{2212}', '\u{FE58}', '\u{FE63}', '\u{FF0D}',
];

/// Canonical uppercase form of a raw address.
///
/// Idempotent: `clean(&clean(x)) == clean(x)`.
pub fn clean(raw: &str) -> String {
    let mut text: String = raw
        .chars()
        .map(|c| {
            if c.is_whitespace() || EXTRA_SPACES.contains(&c) {
                ' '
            } else if DASHES.contains(&c) {
                '-'
            } else {
                c
            }
        })
        .collect::<String>()
        .to_uppercase();

    // Every pass only shortens the text, so this terminates.
    loop {
        let next = clean_pass(&text);
        if next == text {
            return text;
        }
        text = next;
    }
}

fn clean_pass(text: &str) -> String {
    let without_niu = NIU_ANNOTATION.replace_all(text, " ");
    let collapsed = collapse_whitespace(&without_niu);
    strip_city_suffix(&collapsed)
}

/// Collapse whitespace runs to one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

fn strip_city_suffix(text: &str) -> String {
    let Some(found) = CITY_SUFFIX.find(text) else {
        return text.to_string();
    };
    let head = text[..found.start()].trim_end();
    // "URB NUEVO ARMENIA" names a neighborhood, not the city.
    if head.ends_with("NUEVO") || head.is_empty() {
        return text.to_string();
    }
    head.trim_end_matches(|c: char| c == '-' || c == ' ').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase_and_collapse() {
        assert_eq!(clean("  urb 25 de  mayo   mz a "), "URB 25 DE MAYO MZ A");
    }

    #[test]
    fn test_unicode_spaces_and_dashes() {
        assert_eq!(clean("CLL\u{00A0}26 CR 15 \u{2013} 57"), "CLL 26 CR 15 - 57");
        assert_eq!(clean("CRA\u{2009}5\u{200B}CL 10\u{2212}20"), "CRA 5 CL 10-20");
    }

    #[test]
    fn test_city_suffix_removed() {
        assert_eq!(clean("MZ 3 CS 4 - ARMENIA"), "MZ 3 CS 4");
        assert_eq!(clean("MZ 3 CS 4 ARMENIA"), "MZ 3 CS 4");
        assert_eq!(clean("MZ 3 CS 4 -ARMENIA - ARMENIA"), "MZ 3 CS 4");
    }

    #[test]
    fn test_nuevo_armenia_is_kept() {
        assert_eq!(clean("mz 4 cs 2 nuevo armenia"), "MZ 4 CS 2 NUEVO ARMENIA");
    }

    #[test]
    fn test_niu_annotations_removed() {
        assert_eq!(clean("MZ 3 CS 4 NIU #12345 ET 2"), "MZ 3 CS 4 ET 2");
        assert_eq!(clean("MZ 3 CS 4 - NIU 998"), "MZ 3 CS 4");
        assert_eq!(clean("NIU-55 MZ 1"), "MZ 1");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "urb la cecilia mz 5 cs 3 - armenia",
            "  CRA 5 CL 10 -  20  NIU # 77 armenia ",
            "25 DE MAYO – MZ\u{2003}A NIU 1 NIU 2",
            "ARMENIA",
            "",
            "- ARMENIA ARMENIA",
        ];
        for sample in samples {
            let once = clean(sample);
            assert_eq!(clean(&once), once, "not idempotent for {:?}", sample);
        }
    }
}

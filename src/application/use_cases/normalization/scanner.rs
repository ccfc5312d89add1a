// ============================================================
// TOKEN SCANNER
// ============================================================
// Keyword/value lookup over a token stream with gap tolerance

use super::tokenizer::{tokenize, Token, TokenKind};
use super::vocabulary::{is_reserved, roman_to_arabic};

/// Punctuation skipped between a keyword and its value.
const SEPARATORS: &[&str] = &[".", "#", ":", "-", ",", "°", "º", "_"];

/// Accepted form of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Letters and/or digits, at most `n` characters
    Alnum(usize),
    /// Digits only, at most `n` of them
    Digits(usize),
    /// At most `n` digits with an optional one-letter suffix
    DigitsSuffix(usize),
    /// Letters only, at most `n` of them
    Letters(usize),
    /// Integer or a word written in roman numeral letters, kept verbatim past X
    Stage,
    /// Integer or roman numeral I–X; used where the stage has no keyword
    ShortStage,
    /// Any alphanumeric token
    Code,
}

impl Shape {
    pub fn accepts(self, token: &Token<'_>) -> bool {
        let text = token.text;
        let len = text.chars().count();
        match (self, token.kind) {
            (_, TokenKind::Symbol) => false,
            (Shape::Alnum(max), _) => len <= max,
            (Shape::Digits(max), TokenKind::Number) => len <= max,
            (Shape::DigitsSuffix(max), TokenKind::Number) => len <= max,
            (Shape::DigitsSuffix(max), TokenKind::AlphaNum) => {
                let digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
                digits >= 1 && digits <= max && len == digits + 1
            }
            (Shape::Letters(max), TokenKind::Word) => len <= max,
            (Shape::Stage | Shape::ShortStage, TokenKind::Number) => true,
            (Shape::Stage, TokenKind::Word) => {
                len <= 6 && text.chars().all(|c| "IVXLCDM".contains(c))
            }
            (Shape::ShortStage, TokenKind::Word) => roman_to_arabic(text).is_some(),
            (Shape::Code, _) => true,
            _ => false,
        }
    }
}

/// Token index range, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A value found in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub value: String,
    /// Index of the keyword, or of the value itself when it was bare
    pub at: usize,
    /// Index just past the value
    pub next: usize,
}

pub struct Scanner<'a> {
    text: &'a str,
    tokens: Vec<Token<'a>>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            tokens: tokenize(text),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> Option<&Token<'a>> {
        self.tokens.get(index)
    }

    /// Text of a non-symbol token.
    pub fn word(&self, index: usize) -> Option<&'a str> {
        self.tokens
            .get(index)
            .filter(|t| !t.is_symbol())
            .map(|t| t.text)
    }

    pub fn is_word(&self, index: usize, words: &[&str]) -> bool {
        self.word(index).is_some_and(|w| words.contains(&w))
    }

    pub fn is_symbol(&self, index: usize, symbols: &[&str]) -> bool {
        self.tokens
            .get(index)
            .is_some_and(|t| t.is_symbol() && symbols.contains(&t.text))
    }

    pub fn is_number(&self, index: usize) -> bool {
        self.tokens
            .get(index)
            .is_some_and(|t| t.kind == TokenKind::Number)
    }

    /// First index at or after `index` that is not separator punctuation.
    pub fn skip_separators(&self, mut index: usize) -> usize {
        while self.is_symbol(index, SEPARATORS) {
            index += 1;
        }
        index
    }

    /// Previous non-symbol token before `index`.
    pub fn prev_word_index(&self, index: usize) -> Option<usize> {
        (0..index.min(self.tokens.len()))
            .rev()
            .find(|i| !self.tokens[*i].is_symbol())
    }

    pub fn find_word(&self, words: &[&str], from: usize) -> Option<usize> {
        (from..self.tokens.len()).find(|i| self.is_word(*i, words))
    }

    pub fn contains_word(&self, words: &[&str]) -> bool {
        self.find_word(words, 0).is_some()
    }

    /// Consecutive words, separator punctuation allowed between them.
    pub fn phrase_at(&self, index: usize, phrase: &[&str]) -> Option<Span> {
        let mut i = index;
        for (n, word) in phrase.iter().enumerate() {
            if n > 0 {
                i = self.skip_separators(i);
            }
            if self.word(i) != Some(*word) {
                return None;
            }
            i += 1;
        }
        Some(Span {
            start: index,
            end: i,
        })
    }

    pub fn find_phrase(&self, phrase: &[&str], from: usize) -> Option<Span> {
        (from..self.tokens.len()).find_map(|i| self.phrase_at(i, phrase))
    }

    /// Earliest occurrence of any phrase; on a tie the first listed wins.
    pub fn find_any_phrase(&self, phrases: &[&[&str]], from: usize) -> Option<(usize, Span)> {
        (from..self.tokens.len()).find_map(|i| {
            phrases
                .iter()
                .enumerate()
                .find_map(|(n, phrase)| self.phrase_at(i, phrase).map(|span| (n, span)))
        })
    }

    /// Value of `shape` at `index`. A reserved word is accepted only when it
    /// is a single letter not followed by a number (`MZ C CS 5`).
    pub fn value_at(&self, index: usize, shape: Shape) -> Option<Hit> {
        let token = self.tokens.get(index)?;
        if !shape.accepts(token) {
            return None;
        }
        if token.kind == TokenKind::Word && is_reserved(token.text) {
            let followed_by_value = self
                .tokens
                .get(self.skip_separators(index + 1))
                .is_some_and(|t| matches!(t.kind, TokenKind::Number | TokenKind::AlphaNum));
            if token.text.chars().count() > 1 || followed_by_value {
                return None;
            }
        }
        Some(Hit {
            value: token.text.to_string(),
            at: index,
            next: index + 1,
        })
    }

    /// `index` holds one of `keys` followed by a value of `shape`.
    pub fn keyed_at(&self, index: usize, keys: &[&str], shape: Shape) -> Option<Hit> {
        if !self.is_word(index, keys) {
            return None;
        }
        let hit = self.value_at(self.skip_separators(index + 1), shape)?;
        Some(Hit { at: index, ..hit })
    }

    /// Nearest keyword from `from` onwards whose value fits.
    pub fn find_keyed(&self, keys: &[&str], shape: Shape, from: usize) -> Option<Hit> {
        self.find_keyed_within(keys, shape, from, self.tokens.len())
    }

    pub fn find_keyed_within(
        &self,
        keys: &[&str],
        shape: Shape,
        from: usize,
        until: usize,
    ) -> Option<Hit> {
        (from..until.min(self.tokens.len())).find_map(|i| self.keyed_at(i, keys, shape))
    }

    /// Value at `index` that belongs to no keyword: not reserved itself and
    /// not directly preceded by a reserved word.
    pub fn bare_at(&self, index: usize, shape: Shape) -> Option<Hit> {
        let token = self.tokens.get(index)?;
        if token.is_symbol() || is_reserved(token.text) || !shape.accepts(token) {
            return None;
        }
        if let Some(prev) = self.prev_word_index(index) {
            if is_reserved(self.tokens[prev].text) {
                return None;
            }
        }
        Some(Hit {
            value: token.text.to_string(),
            at: index,
            next: index + 1,
        })
    }

    /// Nearest value from `from`: keyed when a keyword comes first, bare
    /// otherwise.
    pub fn find_keyed_or_bare(&self, keys: &[&str], shape: Shape, from: usize) -> Option<Hit> {
        (from..self.tokens.len())
            .find_map(|i| self.keyed_at(i, keys, shape).or_else(|| self.bare_at(i, shape)))
    }

    /// Source text from token `index` to the end.
    pub fn rest(&self, index: usize) -> &'a str {
        match self.tokens.get(index) {
            Some(token) => &self.text[token.start..],
            None => "",
        }
    }

    /// Source text covering tokens `from..to`.
    pub fn slice(&self, from: usize, to: usize) -> &'a str {
        let to = to.min(self.tokens.len());
        if from >= to {
            return "";
        }
        &self.text[self.tokens[from].start..self.tokens[to - 1].end]
    }

    /// Byte offset where token `index` starts, or the text length.
    pub fn offset(&self, index: usize) -> usize {
        self.tokens
            .get(index)
            .map(|t| t.start)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::normalization::vocabulary::{BLOCK, FLOOR, UNIT};

    #[test]
    fn test_find_keyed_skips_separators() {
        let scanner = Scanner::new("URB X MZ. A CASA # 12B");
        let block = scanner.find_keyed(BLOCK, Shape::Alnum(3), 0).unwrap();
        assert_eq!(block.value, "A");
        let unit = scanner
            .find_keyed(UNIT, Shape::DigitsSuffix(4), block.next)
            .unwrap();
        assert_eq!(unit.value, "12B");
    }

    #[test]
    fn test_nearest_keyword_wins() {
        let scanner = Scanner::new("MZ 1 FRENTE AL PARQUE MZ 2");
        assert_eq!(scanner.find_keyed(BLOCK, Shape::Alnum(3), 0).unwrap().value, "1");
    }

    #[test]
    fn test_keyword_without_value_is_skipped() {
        let scanner = Scanner::new("CASA ESQUINERA CASA 4");
        assert_eq!(scanner.find_keyed(UNIT, Shape::Digits(4), 0).unwrap().value, "4");
    }

    #[test]
    fn test_single_letter_keyword_as_value() {
        let scanner = Scanner::new("MZ C CS 5");
        assert_eq!(scanner.find_keyed(BLOCK, Shape::Alnum(3), 0).unwrap().value, "C");
        let scanner = Scanner::new("MZ C 5");
        assert!(scanner.find_keyed(BLOCK, Shape::Alnum(3), 0).is_none());
    }

    #[test]
    fn test_bare_value_rules() {
        let scanner = Scanner::new("MZ 3 PI 2 5");
        let unit = scanner
            .find_keyed_or_bare(UNIT, Shape::Digits(4), 2)
            .unwrap();
        assert_eq!(unit.value, "5");
        assert_eq!(unit.at, 4);
    }

    #[test]
    fn test_phrases() {
        let scanner = Scanner::new("BRR LA-UNION MZ 1");
        assert_eq!(
            scanner.find_phrase(&["LA", "UNION"], 0),
            Some(Span { start: 1, end: 4 })
        );
        let found = scanner.find_any_phrase(&[&["UNION"], &["LA", "UNION"]], 0);
        assert_eq!(found.map(|(n, _)| n), Some(1));
    }

    #[test]
    fn test_stage_shape() {
        let scanner = Scanner::new("ET III ET B");
        assert!(scanner.value_at(1, Shape::Stage).is_some());
        assert!(scanner.value_at(3, Shape::Stage).is_none());

        let scanner = Scanner::new("ETAPA XII MZ 3");
        assert_eq!(scanner.value_at(1, Shape::Stage).unwrap().value, "XII");
        assert!(scanner.value_at(1, Shape::ShortStage).is_none());
        assert!(scanner.value_at(3, Shape::ShortStage).is_some());
    }

    #[test]
    fn test_rest_and_slice() {
        let scanner = Scanner::new("CRA 5 CL 10 - 20 LC 3");
        assert_eq!(scanner.rest(6), "LC 3");
        assert_eq!(scanner.slice(0, 2), "CRA 5");
        assert!(scanner.find_keyed(FLOOR, Shape::Digits(2), 0).is_none());
    }
}

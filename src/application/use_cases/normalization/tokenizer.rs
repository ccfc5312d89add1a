// ============================================================
// TOKENIZER
// ============================================================
// Splits cleaned address text into typed tokens with byte offsets

use once_cell::sync::Lazy;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Letters only: `MZ`, `CASA`, `A`
    Word,
    /// Digits only: `12`, `02`
    Number,
    /// Mixed letters and digits: `12B`, `51N`, `A1`
    AlphaNum,
    /// One punctuation character: `-`, `#`, `.`
    Symbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

impl<'a> Token<'a> {
    pub fn is_symbol(&self) -> bool {
        self.kind == TokenKind::Symbol
    }

    pub fn starts_with_digit(&self) -> bool {
        self.text.chars().next().is_some_and(|c| c.is_ascii_digit())
    }
}

/// Structural keywords that may be glued to the number that follows them
/// (`MZ3`, `CRA5`, `CS12B`).
static GLUE_PREFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "MZ", "MZA", "MZN", "MNZ", "MNZA", "MNA", "MN", "MANZANA", "M", "CS", "CASA", "CAS", "C",
        "PI", "PISO", "PIS", "P", "AP", "APT", "APTO", "APTOS", "APU", "APARTAMENTO", "ET",
        "ETAPA", "ETP", "TP", "TO", "TORRE", "T", "BQ", "BL", "BLQ", "BLOQUE", "LC", "LOC",
        "LOCAL", "L", "OF", "OFI", "OFICINA", "CN", "CONS", "SC", "SEC", "SECT", "LT", "LOTE",
        "CRA", "CR", "KR", "KRA", "K", "CL", "CLL", "CALLE", "MACRO", "MACROMEDIDOR", "BG",
        "BOD", "BODEGA", "PTO", "PT", "PU", "SOT", "SOTANO", "CAJ", "CAJERO", "IN", "INT",
    ]
    .into_iter()
    .collect()
});

/// Split `text` into tokens. Whitespace separates tokens and is dropped;
/// every other non-alphanumeric character becomes its own symbol token.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chunk_start: Option<usize> = None;

    for (idx, c) in text.char_indices() {
        if c.is_alphanumeric() {
            if chunk_start.is_none() {
                chunk_start = Some(idx);
            }
            continue;
        }
        if let Some(start) = chunk_start.take() {
            split_chunk(text, start, idx, &mut tokens);
        }
        if !c.is_whitespace() {
            let end = idx + c.len_utf8();
            tokens.push(Token {
                kind: TokenKind::Symbol,
                text: &text[idx..end],
                start: idx,
                end,
            });
        }
    }
    if let Some(start) = chunk_start {
        split_chunk(text, start, text.len(), &mut tokens);
    }
    tokens
}

/// Maximal run of letters or of digits inside an alphanumeric chunk.
struct Run {
    digits: bool,
    start: usize,
    end: usize,
}

fn split_runs(text: &str, start: usize, end: usize) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for (offset, c) in text[start..end].char_indices() {
        let idx = start + offset;
        let digits = c.is_ascii_digit();
        match runs.last_mut() {
            Some(run) if run.digits == digits => run.end = idx + c.len_utf8(),
            _ => runs.push(Run {
                digits,
                start: idx,
                end: idx + c.len_utf8(),
            }),
        }
    }
    runs
}

fn split_chunk<'a>(text: &'a str, start: usize, end: usize, tokens: &mut Vec<Token<'a>>) {
    let runs = split_runs(text, start, end);
    let is_glue = |i: usize| -> bool {
        let run = &runs[i];
        !run.digits
            && i + 1 < runs.len()
            && runs[i + 1].digits
            && GLUE_PREFIXES.contains(&text[run.start..run.end])
    };

    let mut i = 0;
    while i < runs.len() {
        if is_glue(i) {
            push_token(text, runs[i].start, runs[i].end, TokenKind::Word, tokens);
            i += 1;
            continue;
        }
        // Group runs until the next glued keyword. A keyword only splits a
        // group when it has at least two letters, so `12C` stays one token.
        let mut j = i + 1;
        while j < runs.len() {
            let run = &runs[j];
            if is_glue(j) && (run.end - run.start) >= 2 {
                break;
            }
            j += 1;
        }
        let kind = if j - i > 1 {
            TokenKind::AlphaNum
        } else if runs[i].digits {
            TokenKind::Number
        } else {
            TokenKind::Word
        };
        push_token(text, runs[i].start, runs[j - 1].end, kind, tokens);
        i = j;
    }
}

fn push_token<'a>(text: &'a str, start: usize, end: usize, kind: TokenKind, tokens: &mut Vec<Token<'a>>) {
    tokens.push(Token {
        kind,
        text: &text[start..end],
        start,
        end,
    });
}

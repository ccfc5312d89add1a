// ============================================================
// CANONICAL RECONSTRUCTION
// ============================================================
// Builds the space-separated canonical string from extracted fields

use super::vocabulary::canonical_number;
use crate::domain::address::{ExtractedFields, FieldKind};

/// Outcome of normalizing one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAddress {
    pub text: String,
    pub validated: bool,
}

impl NormalizedAddress {
    /// A canonical reconstruction.
    pub fn canonical(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            validated: true,
        }
    }

    /// Text passed through without reconstruction.
    pub fn passthrough(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            validated: false,
        }
    }
}

/// Incremental builder for a canonical address string.
///
/// Absent fields are skipped entirely, so the output never carries empty
/// placeholders or trailing spaces.
#[derive(Debug, Clone, Default)]
pub struct CanonicalAddress {
    parts: Vec<String>,
}

impl CanonicalAddress {
    pub fn new(head: impl Into<String>) -> Self {
        Self::default().push(head)
    }

    /// Append a ready-made segment.
    pub fn push(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        let segment = segment.trim();
        if !segment.is_empty() {
            self.parts.push(segment.to_string());
        }
        self
    }

    pub fn push_opt(self, segment: Option<&str>) -> Self {
        match segment {
            Some(segment) => self.push(segment),
            None => self,
        }
    }

    /// `label value`, with leading zeros stripped from the value.
    pub fn field(self, label: &str, value: &str) -> Self {
        self.push(format!("{} {}", label, canonical_number(value)))
    }

    pub fn field_opt(self, label: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.field(label, value),
            None => self,
        }
    }

    /// Append the given fields in order. Stage values are expected to be
    /// canonical already and are emitted verbatim.
    pub fn fields(mut self, fields: &ExtractedFields, order: &[FieldKind]) -> Self {
        for kind in order {
            if let Some(value) = fields.get(*kind) {
                self = match kind {
                    FieldKind::Stage | FieldKind::Locale => {
                        self.push(format!("{} {}", kind.label(), value))
                    }
                    _ => self.field(kind.label(), value),
                };
            }
        }
        self
    }

    pub fn build(self) -> String {
        self.parts.join(" ")
    }
}

/// `<head> MZ <block> CS <unit>` followed by the optional fields in order.
pub fn render_residential(head: &str, fields: &ExtractedFields, optional: &[FieldKind]) -> String {
    CanonicalAddress::new(head)
        .fields(fields, &[FieldKind::Block, FieldKind::Unit])
        .fields(fields, optional)
        .build()
}

/// Regex source for the residential template of one family.
/// Template fragment for a number with no leading zeros.
pub const INT: &str = r"(?:0|[1-9]\d*)";

pub fn residential_pattern(heads: &[&str], optional: &[FieldKind]) -> String {
    let mut pattern = format!("^(?:{}) MZ [A-Z0-9]+ CS [A-Z0-9]+", heads.join("|"));
    for kind in optional {
        let value = match kind {
            FieldKind::Floor => INT,
            _ => r"[A-Z0-9]+",
        };
        pattern.push_str(&format!("(?: {} {})?", kind.label(), value));
    }
    pattern.push('$');
    pattern
}

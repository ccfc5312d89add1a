// ============================================================
// EXTRACTED FIELDS
// ============================================================
// Transient per-match structure filled by a family extractor

/// Semantic field of a residential address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Block,
    Unit,
    Floor,
    Apartment,
    Stage,
    Tower,
    Locale,
}

impl FieldKind {
    /// Canonical label emitted before the value.
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Block => "MZ",
            FieldKind::Unit => "CS",
            FieldKind::Floor => "PI",
            FieldKind::Apartment => "AP",
            FieldKind::Stage => "ET",
            FieldKind::Tower => "TO",
            FieldKind::Locale => "LC",
        }
    }
}

/// Optional values found in one address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub block: Option<String>,
    pub unit: Option<String>,
    pub floor: Option<String>,
    pub apartment: Option<String>,
    pub stage: Option<String>,
    pub tower: Option<String>,
    pub locale: Option<String>,
}

impl ExtractedFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: FieldKind) -> Option<&str> {
        self.slot(kind).as_deref()
    }

    /// Store `value`; empty strings are treated as absent.
    pub fn set(&mut self, kind: FieldKind, value: impl Into<String>) {
        let value = value.into();
        *self.slot_mut(kind) = if value.is_empty() { None } else { Some(value) };
    }

    pub fn set_opt(&mut self, kind: FieldKind, value: Option<String>) {
        if let Some(value) = value {
            self.set(kind, value);
        }
    }

    pub fn with(mut self, kind: FieldKind, value: impl Into<String>) -> Self {
        self.set(kind, value);
        self
    }

    pub fn has(&self, kind: FieldKind) -> bool {
        self.slot(kind).is_some()
    }

    /// True when every field in `required` carries a value.
    pub fn has_all(&self, required: &[FieldKind]) -> bool {
        required.iter().all(|kind| self.has(*kind))
    }

    fn slot(&self, kind: FieldKind) -> &Option<String> {
        match kind {
            FieldKind::Block => &self.block,
            FieldKind::Unit => &self.unit,
            FieldKind::Floor => &self.floor,
            FieldKind::Apartment => &self.apartment,
            FieldKind::Stage => &self.stage,
            FieldKind::Tower => &self.tower,
            FieldKind::Locale => &self.locale,
        }
    }

    fn slot_mut(&mut self, kind: FieldKind) -> &mut Option<String> {
        match kind {
            FieldKind::Block => &mut self.block,
            FieldKind::Unit => &mut self.unit,
            FieldKind::Floor => &mut self.floor,
            FieldKind::Apartment => &mut self.apartment,
            FieldKind::Stage => &mut self.stage,
            FieldKind::Tower => &mut self.tower,
            FieldKind::Locale => &mut self.locale,
        }
    }
}

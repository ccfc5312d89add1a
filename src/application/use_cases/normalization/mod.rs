mod canonical;
mod dedup;
mod families;
mod locale;
mod preprocess;
mod residential;
mod scanner;
mod street_grid;
mod tokenizer;
mod vocabulary;


pub use canonical::NormalizedAddress;
pub use dedup::{collapse_generic_duplicates, is_bare_intersection, GENERIC_REPEAT_LIMIT};
pub use families::FAMILIES;
pub use preprocess::clean;

use preprocess::collapse_whitespace;

use tracing::debug;

/// One neighborhood family: its signature test, extraction and
/// reconstruction, and its canonical templates.
///
/// Implementations are stateless unit structs registered once in
/// [`FAMILIES`]; every method is a pure function of its input.
pub trait NeighborhoodNormalizer: Send + Sync {
    /// Stable identifier used in configuration and on the CLI
    fn id(&self) -> &'static str;

    /// Human readable neighborhoods covered by the family
    fn display_name(&self) -> &'static str;

    /// Row relevance: does the text mention one of the family's
    /// neighborhoods at all? Called on the uppercased raw cell and on the
    /// cleaned text; see [`is_relevant`].
    fn mentions(&self, text: &str) -> bool;

    /// Normalize cleaned text. Never fails: a text that cannot be
    /// reconstructed comes back as an unvalidated pass-through.
    fn normalize(&self, cleaned: &str) -> NormalizedAddress;

    /// `text` matches one of the family's canonical templates in full.
    fn conforms(&self, text: &str) -> bool;

    /// Whether the batch-level collapse of over-generic bare intersections
    /// applies to this family's output.
    fn collapses_generic_duplicates(&self) -> bool {
        false
    }
}

/// Family registered under `id`.
pub fn family(id: &str) -> Option<&'static dyn NeighborhoodNormalizer> {
    FAMILIES.iter().copied().find(|f| f.id() == id)
}

/// Registered family ids in registry order.
pub fn family_ids() -> Vec<&'static str> {
    FAMILIES.iter().map(|f| f.id()).collect()
}

/// A row belongs to `family` when its raw cell, uppercased, mentions one of
/// the family's neighborhoods. The cleaned text is also checked so that
/// spelling fixed by cleanup still counts; cleanup dropping an `NIU`
/// annotation never hides a row.
pub fn is_relevant(family: &dyn NeighborhoodNormalizer, raw: &str, cleaned: &str) -> bool {
    family.mentions(&collapse_whitespace(&raw.to_uppercase())) || family.mentions(cleaned)
}

/// Result of routing one address through the ordered registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Family that produced the result, `None` when no family claimed the text
    pub family: Option<&'static str>,
    pub result: NormalizedAddress,
}

/// Ordered fallthrough over [`FAMILIES`].
///
/// The first family that mentions the text and validates wins. When some
/// families claim the text but none validates, the first claimant's
/// pass-through is kept. Unclaimed text comes back cleaned and unvalidated.
fn dispatch(raw: &str, cleaned: &str) -> Dispatch {
    let mut first_claim: Option<Dispatch> = None;

    for family in FAMILIES.iter().filter(|f| is_relevant(**f, raw, cleaned)) {
        let result = family.normalize(cleaned);
        debug!(family = family.id(), validated = result.validated, "Family claimed address");
        if result.validated {
            return Dispatch {
                family: Some(family.id()),
                result,
            };
        }
        if first_claim.is_none() {
            first_claim = Some(Dispatch {
                family: Some(family.id()),
                result,
            });
        }
    }

    first_claim.unwrap_or_else(|| Dispatch {
        family: None,
        result: NormalizedAddress::passthrough(cleaned),
    })
}

/// Clean then dispatch a raw address.
pub fn normalize_address(raw: &str) -> Dispatch {
    dispatch(raw, &clean(raw))
}

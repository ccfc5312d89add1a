// ============================================================
// FAMILY REGISTRY
// ============================================================
// Registry order is dispatch precedence and batch output order

mod arco_iris;
mod cecilia;
mod chambranas;
mod cibeles;
mod colinas;
mod dorada;
mod intersection;
mod marina;
mod mayo;
mod mercar_armenia;
mod miranda;
mod recreo;
mod rojas_pinilla;

pub use arco_iris::ArcoIris;
pub use cecilia::Cecilia;
pub use chambranas::Chambranas;
pub use cibeles::Cibeles;
pub use colinas::Colinas;
pub use dorada::Dorada;
pub use intersection::Intersection;
pub use marina::Marina;
pub use mayo::Mayo;
pub use mercar_armenia::MercarArmenia;
pub use miranda::Miranda;
pub use recreo::Recreo;
pub use rojas_pinilla::RojasPinilla;

use super::NeighborhoodNormalizer;

/// Every family, in dispatch order.
pub static FAMILIES: &[&dyn NeighborhoodNormalizer] = &[
    &MercarArmenia,
    &Mayo,
    &Cecilia,
    &ArcoIris,
    &Dorada,
    &Chambranas,
    &Cibeles,
    &Colinas,
    &Intersection,
    &Miranda,
    &Marina,
    &Recreo,
    &RojasPinilla,
];

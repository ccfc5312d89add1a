pub mod use_cases;

pub use use_cases::address_pipeline::{AddressPipeline, RoutedRecord};
pub use use_cases::batch_orchestrator::{BatchOrchestrator, BatchSummary};

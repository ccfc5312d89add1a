pub mod address_pipeline;
pub mod batch_orchestrator;
pub mod normalization;

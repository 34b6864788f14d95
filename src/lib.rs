//! Rate-shock risk - collapse probability and resilience health index for banks
//!
//! This library provides:
//! - Shock grid generation with stable grouping keys
//! - Duration loss and collapse probability, with and without TLI adjustment
//! - Holdings-weighted aggregate collapse curves
//! - Resilience health index (REHI) per institution and asset-weighted by region
//! - CSV ingestion and export around the pipeline

pub mod config;
pub mod error;
pub mod export;
pub mod institution;
pub mod pipeline;
pub mod rehi;
pub mod risk;
pub mod shock;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use error::{Result, RiskError};
pub use institution::{Institution, InstitutionRecord};
pub use pipeline::{InstitutionSnapshot, PipelineOutput, RiskPipeline};
pub use rehi::{JoinPolicy, RegionalRehiRow, RehiEngine, RehiRow};
pub use risk::{AggregateRow, CollapseEngine, LossRow, TliPolicy};
pub use shock::generate_grid;

//! Resilience health index (REHI) engine

mod engine;
mod index;
mod join;

pub use engine::{RegionalRehiRow, RehiEngine, RehiRow};
pub use index::{
    clamp01, rehi_score, RehiComponents, REHI_DIVERSIFICATION_WEIGHT, REHI_LOSS_WEIGHT,
    REHI_NPL_WEIGHT, REHI_SCALE, REHI_TLI_WEIGHT,
};
pub use join::{InstitutionIndex, JoinPolicy, JoinedAttributes};

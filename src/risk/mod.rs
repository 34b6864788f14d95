//! Loss and collapse-probability engine

pub mod aggregate;
mod collapse;
mod engine;
mod loss;

pub use aggregate::{weighted_mean_by, WeightedAccumulator, WeightedGroup};
pub use collapse::{
    collapse_probability, validate_tli, CollapseThresholds, INSOLVENT_THRESHOLD,
    STRESSED_THRESHOLD, TLI_INSOLVENT_FLOOR, TLI_INSOLVENT_SLOPE, TLI_STRESSED_FLOOR,
    TLI_STRESSED_SLOPE,
};
pub use engine::{AggregateRow, CollapseEngine, LossRow};
pub use loss::{
    institution_loss_to_equity, loss_to_equity, raw_loss, shocked_loss, TliPolicy,
    LOSS_TLI_AMPLIFIER,
};

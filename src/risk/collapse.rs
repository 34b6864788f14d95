//! Mapping from loss-to-equity to collapse probability
//!
//! Both policies use the same piecewise-linear ramp between a "stressed" and
//! an "insolvent" threshold. The TLI-adjusted policy lowers both thresholds as
//! TLI rises.

use super::loss::{institution_loss_to_equity, TliPolicy};
use crate::error::{Result, RiskError};
use crate::institution::Institution;

/// Loss-to-equity at which collapse probability starts to rise
pub const STRESSED_THRESHOLD: f64 = 0.30;

/// Loss-to-equity at which collapse is certain
pub const INSOLVENT_THRESHOLD: f64 = 1.00;

/// Stressed threshold reduction per unit of TLI
pub const TLI_STRESSED_SLOPE: f64 = 0.10;

/// Lowest stressed threshold under TLI adjustment
pub const TLI_STRESSED_FLOOR: f64 = 0.15;

/// Insolvent threshold reduction per unit of TLI
pub const TLI_INSOLVENT_SLOPE: f64 = 0.20;

/// Lowest insolvent threshold under TLI adjustment
pub const TLI_INSOLVENT_FLOOR: f64 = 0.60;

/// Stressed/insolvent pair defining the probability ramp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollapseThresholds {
    pub stressed: f64,
    pub insolvent: f64,
}

impl CollapseThresholds {
    /// Fixed thresholds of the baseline policy
    pub fn baseline() -> Self {
        Self {
            stressed: STRESSED_THRESHOLD,
            insolvent: INSOLVENT_THRESHOLD,
        }
    }

    /// Thresholds shifted by an institution's TLI.
    ///
    /// TLI outside [0, 1] is rejected: the floors only guarantee a non-empty
    /// ramp inside that interval.
    pub fn for_tli(tli: f64) -> Result<Self> {
        validate_tli(tli)?;
        Ok(Self {
            stressed: (STRESSED_THRESHOLD - TLI_STRESSED_SLOPE * tli).max(TLI_STRESSED_FLOOR),
            insolvent: (INSOLVENT_THRESHOLD - TLI_INSOLVENT_SLOPE * tli).max(TLI_INSOLVENT_FLOOR),
        })
    }

    /// Thresholds an institution is judged against under `policy`
    pub fn for_institution(institution: &Institution, policy: TliPolicy) -> Result<Self> {
        match policy {
            TliPolicy::Baseline => Ok(Self::baseline()),
            TliPolicy::TliAdjusted => Self::for_tli(institution.tli).map_err(|_| {
                RiskError::invalid(
                    "tli",
                    format!(
                        "institution `{}`: value {} outside [0, 1]",
                        institution.name, institution.tli
                    ),
                )
            }),
        }
    }

    /// Collapse probability for a loss-to-equity ratio, always in [0, 1]
    pub fn probability(&self, loss_to_equity: f64) -> f64 {
        if loss_to_equity <= self.stressed {
            0.0
        } else if loss_to_equity >= self.insolvent {
            1.0
        } else {
            let p = (loss_to_equity - self.stressed) / (self.insolvent - self.stressed);
            p.clamp(0.0, 1.0)
        }
    }
}

/// Reject TLI values the threshold model is not defined for
pub fn validate_tli(tli: f64) -> Result<()> {
    if tli.is_finite() && (0.0..=1.0).contains(&tli) {
        Ok(())
    } else {
        Err(RiskError::invalid("tli", format!("value {} outside [0, 1]", tli)))
    }
}

/// Loss-to-equity and collapse probability for one institution at one shock
pub fn collapse_probability(
    institution: &Institution,
    shock: f64,
    policy: TliPolicy,
) -> Result<(f64, f64)> {
    let thresholds = CollapseThresholds::for_institution(institution, policy)?;
    let lte = institution_loss_to_equity(institution, shock, policy);
    Ok((lte, thresholds.probability(lte)))
}

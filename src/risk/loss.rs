//! Mark-to-market loss model for rate-sensitive holdings

use serde::{Deserialize, Serialize};

use crate::institution::Institution;

/// Loss uplift per unit of TLI in the TLI-adjusted variant
pub const LOSS_TLI_AMPLIFIER: f64 = 0.8;

/// Which collapse policy a computation runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TliPolicy {
    /// Plain duration loss and fixed thresholds
    Baseline,
    /// TLI amplifies the loss and tightens the thresholds
    TliAdjusted,
}

impl TliPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TliPolicy::Baseline => "no_tli",
            TliPolicy::TliAdjusted => "with_tli",
        }
    }
}

/// Duration loss on holdings for a shock given in percentage points.
///
/// `duration * (dy / 100) * holdings`
pub fn raw_loss(institution: &Institution, shock: f64) -> f64 {
    institution.duration_years * (shock / 100.0) * institution.jgb_holdings_jpy
}

/// Loss under the given policy
pub fn shocked_loss(institution: &Institution, shock: f64, policy: TliPolicy) -> f64 {
    let raw = raw_loss(institution, shock);
    match policy {
        TliPolicy::Baseline => raw,
        TliPolicy::TliAdjusted => raw * (1.0 + LOSS_TLI_AMPLIFIER * institution.tli),
    }
}

/// Loss divided by equity; `+inf` when equity is zero or negative
pub fn loss_to_equity(loss: f64, equity: f64) -> f64 {
    if equity > 0.0 {
        loss / equity
    } else {
        f64::INFINITY
    }
}

/// Loss-to-equity for one institution at one shock
pub fn institution_loss_to_equity(institution: &Institution, shock: f64, policy: TliPolicy) -> f64 {
    loss_to_equity(
        shocked_loss(institution, shock, policy),
        institution.equity_capital_jpy,
    )
}

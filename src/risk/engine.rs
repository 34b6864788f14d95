//! Loss and collapse-probability engine over the institution × shock grid

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::aggregate::weighted_mean_by;
use super::collapse::{collapse_probability, CollapseThresholds};
use super::loss::TliPolicy;
use crate::error::Result;
use crate::institution::Institution;
use crate::shock::ShockKey;

/// Loss and collapse probability for one institution at one shock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossRow {
    pub name: String,
    pub region: String,
    pub rate_shock: f64,
    pub policy: TliPolicy,
    /// `+inf` when the institution has no positive equity
    pub loss_to_equity: f64,
    pub collapse_probability: f64,
    /// Aggregation weight
    pub jgb_holdings_jpy: f64,
}

impl LossRow {
    pub fn shock_key(&self) -> ShockKey {
        ShockKey::from_shock(self.rate_shock)
    }
}

/// Holdings-weighted collapse probability at one shock, under both policies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub rate_shock: f64,
    pub no_tli_collapse_probability: f64,
    pub with_tli_collapse_probability: f64,
}

/// Evaluates every institution at every shock.
///
/// Rows are ordered shock-major: all institutions at the first shock, then
/// all institutions at the next, in input order.
#[derive(Debug, Clone, Default)]
pub struct CollapseEngine {
    parallel: bool,
}

impl CollapseEngine {
    pub fn new() -> Self {
        Self { parallel: false }
    }

    /// Evaluate institutions within each shock on the rayon pool
    pub fn with_parallel(parallel: bool) -> Self {
        Self { parallel }
    }

    /// Loss rows for every (shock, institution) pair under `policy`
    pub fn evaluate(
        &self,
        institutions: &[Institution],
        shocks: &[f64],
        policy: TliPolicy,
    ) -> Result<Vec<LossRow>> {
        // Fail before computing anything if any TLI is out of range
        for institution in institutions {
            CollapseThresholds::for_institution(institution, policy)?;
        }

        let insolvent = institutions.iter().filter(|i| !i.has_positive_equity()).count();
        if insolvent > 0 {
            log::warn!(
                "{} institution(s) have no positive equity; loss-to-equity is infinite",
                insolvent
            );
        }

        let mut rows = Vec::with_capacity(institutions.len() * shocks.len());
        for &shock in shocks {
            let chunk: Vec<LossRow> = if self.parallel {
                institutions
                    .par_iter()
                    .map(|inst| evaluate_one(inst, shock, policy))
                    .collect::<Result<Vec<_>>>()?
            } else {
                institutions
                    .iter()
                    .map(|inst| evaluate_one(inst, shock, policy))
                    .collect::<Result<Vec<_>>>()?
            };
            rows.extend(chunk);
        }

        log::debug!(
            "{}: evaluated {} institutions x {} shocks",
            policy.as_str(),
            institutions.len(),
            shocks.len()
        );
        Ok(rows)
    }

    /// Holdings-weighted mean collapse probability at each grid shock.
    ///
    /// Shocks with no rows, or whose holdings sum to zero, report 0.
    pub fn aggregate(rows: &[LossRow], shocks: &[f64]) -> Vec<(f64, f64)> {
        let groups = weighted_mean_by(
            rows,
            |r| r.shock_key(),
            |r| r.jgb_holdings_jpy,
            |r| r.collapse_probability,
        );
        let by_shock: std::collections::HashMap<ShockKey, f64> =
            groups.into_iter().map(|g| (g.key, g.mean)).collect();

        shocks
            .iter()
            .map(|&shock| {
                let mean = by_shock
                    .get(&ShockKey::from_shock(shock))
                    .copied()
                    .unwrap_or(0.0);
                (shock, mean)
            })
            .collect()
    }

    /// Aggregate table with both policies side by side
    pub fn aggregate_table(
        &self,
        institutions: &[Institution],
        shocks: &[f64],
    ) -> Result<Vec<AggregateRow>> {
        let baseline = self.evaluate(institutions, shocks, TliPolicy::Baseline)?;
        let adjusted = self.evaluate(institutions, shocks, TliPolicy::TliAdjusted)?;
        Ok(Self::combine(
            &Self::aggregate(&baseline, shocks),
            &Self::aggregate(&adjusted, shocks),
        ))
    }

    /// Zip per-policy aggregates computed over the same grid
    pub fn combine(baseline: &[(f64, f64)], adjusted: &[(f64, f64)]) -> Vec<AggregateRow> {
        baseline
            .iter()
            .zip(adjusted)
            .map(|(&(rate_shock, no_tli), &(_, with_tli))| AggregateRow {
                rate_shock,
                no_tli_collapse_probability: no_tli,
                with_tli_collapse_probability: with_tli,
            })
            .collect()
    }
}

fn evaluate_one(institution: &Institution, shock: f64, policy: TliPolicy) -> Result<LossRow> {
    let (loss_to_equity, probability) = collapse_probability(institution, shock, policy)?;
    Ok(LossRow {
        name: institution.name.clone(),
        region: institution.region.clone(),
        rate_shock: shock,
        policy,
        loss_to_equity,
        collapse_probability: probability,
        jgb_holdings_jpy: institution.jgb_holdings_jpy,
    })
}

//! REHI scoring over loss rows and regional aggregation

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::index::RehiComponents;
use super::join::{InstitutionIndex, JoinPolicy};
use crate::error::{Result, RiskError};
use crate::institution::Institution;
use crate::risk::{weighted_mean_by, LossRow, TliPolicy};
use crate::shock::ShockKey;

/// REHI for one institution at one shock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RehiRow {
    pub name: String,
    pub region: String,
    pub rate_shock: f64,
    #[serde(rename = "REHI")]
    pub rehi: f64,
    pub total_assets_jpy: f64,
}

/// Asset-weighted REHI of one region at one shock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalRehiRow {
    pub region: String,
    pub rate_shock: f64,
    #[serde(rename = "REHI_region")]
    pub rehi_region: f64,
}

/// Joins TLI-adjusted loss rows with institution attributes and scores them
#[derive(Debug, Clone, Copy, Default)]
pub struct RehiEngine {
    join_policy: JoinPolicy,
}

impl RehiEngine {
    pub fn new(join_policy: JoinPolicy) -> Self {
        Self { join_policy }
    }

    pub fn join_policy(&self) -> JoinPolicy {
        self.join_policy
    }

    /// One REHI row per loss row, in the same order.
    ///
    /// # Errors
    /// `InvalidParameter` if a row was computed under the baseline policy;
    /// `MissingField` for an unmatched (name, region) under a strict join.
    pub fn score(&self, loss_rows: &[LossRow], institutions: &[Institution]) -> Result<Vec<RehiRow>> {
        let index = InstitutionIndex::build(institutions)?;
        let mut defaulted = 0usize;

        let rows = loss_rows
            .iter()
            .map(|row| {
                if row.policy != TliPolicy::TliAdjusted {
                    return Err(RiskError::invalid(
                        "policy",
                        format!(
                            "institution `{}`: REHI needs TLI-adjusted loss rows, got {}",
                            row.name,
                            row.policy.as_str()
                        ),
                    ));
                }

                let attrs = index.resolve(&row.name, &row.region, self.join_policy)?;
                if !attrs.matched {
                    defaulted += 1;
                }

                let components = RehiComponents::new(
                    row.loss_to_equity,
                    attrs.npl_ratio,
                    attrs.tli,
                    attrs.diversification_index,
                );

                Ok(RehiRow {
                    name: row.name.clone(),
                    region: row.region.clone(),
                    rate_shock: row.rate_shock,
                    rehi: components.score(),
                    total_assets_jpy: attrs.total_assets_jpy,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if defaulted > 0 {
            log::warn!("{} loss row(s) had no matching institution; used default attributes", defaulted);
        }
        Ok(rows)
    }

    /// Asset-weighted mean REHI per (region, shock).
    ///
    /// Regions appear in order of first appearance, shocks ascending within a
    /// region. A group whose assets sum to zero reports 0.
    pub fn aggregate_by_region(rows: &[RehiRow]) -> Vec<RegionalRehiRow> {
        let mut region_order: HashMap<&str, usize> = HashMap::new();
        for row in rows {
            let next = region_order.len();
            region_order.entry(row.region.as_str()).or_insert(next);
        }

        let mut groups = weighted_mean_by(
            rows,
            |r| (r.region.clone(), ShockKey::from_shock(r.rate_shock)),
            |r| r.total_assets_jpy,
            |r| r.rehi,
        );
        groups.sort_by_key(|g| (region_order[g.key.0.as_str()], g.key.1));

        groups
            .into_iter()
            .map(|g| RegionalRehiRow {
                rate_shock: g.key.1.shock(),
                region: g.key.0,
                rehi_region: g.mean,
            })
            .collect()
    }
}

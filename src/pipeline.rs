//! End-to-end pipeline: grid → collapse engine → REHI engine
//!
//! Holds the validated configuration and runs the three stages over one
//! institution table. Nothing is cached between runs.
//!
//! # Example
//! ```ignore
//! let pipeline = RiskPipeline::new(PipelineConfig::default())?;
//! let output = pipeline.run(&load_sample()?)?;
//! for row in &output.aggregate {
//!     println!("{} {}", row.rate_shock, row.with_tli_collapse_probability);
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::institution::{validate_all, Institution, InstitutionRecord};
use crate::rehi::{RegionalRehiRow, RehiEngine, RehiRow};
use crate::risk::{AggregateRow, CollapseEngine, LossRow, TliPolicy};
use crate::shock::{generate_grid, round_shock};

/// All result tables of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub shocks: Vec<f64>,
    /// Holdings-weighted collapse probability per shock, both policies
    pub aggregate: Vec<AggregateRow>,
    /// TLI-adjusted loss rows, shock-major
    pub loss_rows: Vec<LossRow>,
    /// REHI per institution and shock, aligned with `loss_rows`
    pub rehi: Vec<RehiRow>,
    /// Asset-weighted REHI per region and shock
    pub regional: Vec<RegionalRehiRow>,
}

/// One institution's standing at a single shock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionSnapshot {
    pub name: String,
    pub region: String,
    pub rate_shock: f64,
    pub loss_to_equity: f64,
    /// TLI-adjusted
    pub collapse_probability: f64,
    #[serde(rename = "REHI")]
    pub rehi: f64,
    pub breaches_redline: bool,
}

#[derive(Debug, Clone)]
pub struct RiskPipeline {
    config: PipelineConfig,
    collapse: CollapseEngine,
    rehi: RehiEngine,
}

impl RiskPipeline {
    /// Build a pipeline from a configuration, rejecting invalid settings
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            collapse: CollapseEngine::with_parallel(config.parallel),
            rehi: RehiEngine::new(config.join_policy),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn shock_grid(&self) -> Result<Vec<f64>> {
        generate_grid(self.config.max_shock, self.config.step)
    }

    /// Validate raw records and run every stage
    pub fn run(&self, records: &[InstitutionRecord]) -> Result<PipelineOutput> {
        let institutions = validate_all(records)?;
        self.run_institutions(&institutions)
    }

    /// Run every stage over already-validated institutions
    pub fn run_institutions(&self, institutions: &[Institution]) -> Result<PipelineOutput> {
        let shocks = self.shock_grid()?;

        let baseline = self.collapse.evaluate(institutions, &shocks, TliPolicy::Baseline)?;
        let loss_rows = self.collapse.evaluate(institutions, &shocks, TliPolicy::TliAdjusted)?;
        let aggregate = CollapseEngine::combine(
            &CollapseEngine::aggregate(&baseline, &shocks),
            &CollapseEngine::aggregate(&loss_rows, &shocks),
        );

        let rehi = self.rehi.score(&loss_rows, institutions)?;
        let regional = RehiEngine::aggregate_by_region(&rehi);

        log::info!(
            "pipeline: {} institutions, {} shocks, {} regional rows",
            institutions.len(),
            shocks.len(),
            regional.len()
        );

        Ok(PipelineOutput {
            shocks,
            aggregate,
            loss_rows,
            rehi,
            regional,
        })
    }

    /// Per-institution probability and REHI at one shock, riskiest first.
    ///
    /// Ties keep input order.
    pub fn snapshot(&self, institutions: &[Institution], shock: f64) -> Result<Vec<InstitutionSnapshot>> {
        let shock = round_shock(shock);
        let loss_rows = self.collapse.evaluate(institutions, &[shock], TliPolicy::TliAdjusted)?;
        let rehi = self.rehi.score(&loss_rows, institutions)?;

        let mut snapshot: Vec<InstitutionSnapshot> = loss_rows
            .into_iter()
            .zip(rehi)
            .map(|(loss, score)| InstitutionSnapshot {
                breaches_redline: loss.collapse_probability >= self.config.redline,
                name: loss.name,
                region: loss.region,
                rate_shock: loss.rate_shock,
                loss_to_equity: loss.loss_to_equity,
                collapse_probability: loss.collapse_probability,
                rehi: score.rehi,
            })
            .collect();

        snapshot.sort_by(|a, b| b.collapse_probability.total_cmp(&a.collapse_probability));
        Ok(snapshot)
    }
}

impl Default for RiskPipeline {
    fn default() -> Self {
        let config = PipelineConfig::default();
        Self {
            collapse: CollapseEngine::with_parallel(config.parallel),
            rehi: RehiEngine::new(config.join_policy),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RiskError;
    use crate::institution::load_sample;
    use crate::rehi::JoinPolicy;
    use approx::assert_abs_diff_eq;

    fn sample() -> Vec<Institution> {
        validate_all(&load_sample().unwrap()).unwrap()
    }

    #[test]
    fn test_sample_run_shapes() {
        let output = RiskPipeline::default().run(&load_sample().unwrap()).unwrap();

        assert_eq!(output.shocks.len(), 13);
        assert_eq!(output.aggregate.len(), 13);
        assert_eq!(output.loss_rows.len(), 3 * 13);
        assert_eq!(output.rehi.len(), 3 * 13);
        // Three single-bank regions
        assert_eq!(output.regional.len(), 3 * 13);
        assert_eq!(output.regional[0].region, "Tokyo");
        assert_eq!(output.regional[13].region, "Osaka");
    }

    #[test]
    fn test_sample_run_values() {
        let output = RiskPipeline::default().run(&load_sample().unwrap()).unwrap();

        let first = &output.aggregate[0];
        assert_eq!(first.rate_shock, 0.0);
        assert_eq!(first.no_tli_collapse_probability, 0.0);
        assert_eq!(first.with_tli_collapse_probability, 0.0);

        // Shinkin A at 1%: lte = 6 * 0.01 * 350 / 50 = 0.42 baseline
        let a_at_one = output
            .loss_rows
            .iter()
            .find(|r| r.name == "Shinkin A" && r.rate_shock == 1.0)
            .unwrap();
        // TLI 0.5: 0.42 * 1.4 = 0.588, ramp [0.25, 0.90]
        assert_abs_diff_eq!(a_at_one.loss_to_equity, 0.588, epsilon = 1e-9);
        assert_abs_diff_eq!(a_at_one.collapse_probability, 0.338 / 0.65, epsilon = 1e-9);

        for row in &output.aggregate {
            assert!(row.with_tli_collapse_probability >= row.no_tli_collapse_probability);
        }
        for pair in output.aggregate.windows(2) {
            assert!(pair[1].no_tli_collapse_probability >= pair[0].no_tli_collapse_probability);
            assert!(pair[1].with_tli_collapse_probability >= pair[0].with_tli_collapse_probability);
        }
        for row in &output.regional {
            assert!((0.0..=100.0).contains(&row.rehi_region));
        }
    }

    #[test]
    fn test_missing_required_field_aborts() {
        let mut records = load_sample().unwrap();
        records[1].equity_capital_jpy = None;
        match RiskPipeline::default().run(&records) {
            Err(RiskError::MissingField { institution, field }) => {
                assert_eq!(institution, "Shinkin B");
                assert_eq!(field, "equity_capital_jpy");
            }
            other => panic!("expected MissingField, got {:?}", other.map(|o| o.shocks)),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PipelineConfig { step: -0.25, ..Default::default() };
        assert!(matches!(RiskPipeline::new(config), Err(RiskError::InvalidParameter { .. })));
    }

    #[test]
    fn test_regional_weighting_across_banks() {
        let mut records = load_sample().unwrap();
        records[1].region = Some("Tokyo".to_string());
        let config = PipelineConfig { max_shock: 0.0, join_policy: JoinPolicy::Left, ..Default::default() };
        let output = RiskPipeline::new(config).unwrap().run(&records).unwrap();

        assert_eq!(output.regional.len(), 2);
        let tokyo = &output.regional[0];
        let a = output.rehi[0].rehi;
        let b = output.rehi[1].rehi;
        let expected = (a * 1.2e12 + b * 0.8e12) / 2.0e12;
        assert_abs_diff_eq!(tokyo.rehi_region, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_snapshot_sorted_and_flagged() {
        let pipeline = RiskPipeline::default();
        let snapshot = pipeline.snapshot(&sample(), 1.0).unwrap();

        assert_eq!(snapshot.len(), 3);
        assert!(snapshot
            .windows(2)
            .all(|w| w[0].collapse_probability >= w[1].collapse_probability));
        for row in &snapshot {
            assert_eq!(row.breaches_redline, row.collapse_probability >= 0.5);
            assert_eq!(row.rate_shock, 1.0);
        }
    }

    #[test]
    fn test_snapshot_at_zero_keeps_input_order() {
        let snapshot = RiskPipeline::default().snapshot(&sample(), 0.0).unwrap();
        let names: Vec<_> = snapshot.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Shinkin A", "Shinkin B", "Shinkin C"]);
        assert!(snapshot.iter().all(|s| !s.breaches_redline));
    }
}

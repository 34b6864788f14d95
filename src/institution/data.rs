//! Institution balance-sheet records

use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};

/// Region assigned when the input carries none
pub const UNKNOWN_REGION: &str = "Unknown";

/// Raw institution row as supplied by an ingestion collaborator.
///
/// Every attribute is optional here; [`Institution::from_record`] decides
/// which absences are defaults and which are errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstitutionRecord {
    pub name: Option<String>,
    pub region: Option<String>,
    pub duration_years: Option<f64>,
    pub jgb_holdings_jpy: Option<f64>,
    pub equity_capital_jpy: Option<f64>,
    pub npl_ratio: Option<f64>,
    pub tli: Option<f64>,
    pub diversification_index: Option<f64>,
    pub total_assets_jpy: Option<f64>,
}

/// A validated institution, immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    /// Unique identifier
    pub name: String,

    /// Grouping key for regional aggregation
    pub region: String,

    /// Effective duration of rate-sensitive holdings, in years
    pub duration_years: f64,

    /// Notional of rate-sensitive (JGB) holdings
    pub jgb_holdings_jpy: f64,

    /// Equity capital; zero or negative means no loss-absorbing buffer
    pub equity_capital_jpy: f64,

    /// Non-performing loan ratio
    pub npl_ratio: f64,

    /// Tail-liquidity indicator
    pub tli: f64,

    /// Diversification index
    pub diversification_index: f64,

    /// Aggregation weight, always positive
    pub total_assets_jpy: f64,
}

impl Institution {
    /// Validate a raw record.
    ///
    /// Duration, holdings and equity are required. NPL ratio, TLI and
    /// diversification default to 0, region to [`UNKNOWN_REGION`], and an
    /// absent or zero asset total to 1.
    pub fn from_record(record: &InstitutionRecord) -> Result<Self> {
        let name = match record.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(RiskError::missing("<unnamed>", "name")),
        };

        let region = record
            .region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(UNKNOWN_REGION)
            .to_string();

        let required = |value: Option<f64>, field: &str| -> Result<f64> {
            let value = value.ok_or_else(|| RiskError::missing(&name, field))?;
            finite(&name, field, value)
        };

        let duration_years = required(record.duration_years, "duration_years")?;
        let jgb_holdings_jpy = required(record.jgb_holdings_jpy, "jgb_holdings_jpy")?;
        let equity_capital_jpy = required(record.equity_capital_jpy, "equity_capital_jpy")?;

        non_negative(&name, "duration_years", duration_years)?;
        non_negative(&name, "jgb_holdings_jpy", jgb_holdings_jpy)?;

        let optional = |value: Option<f64>, field: &str| -> Result<f64> {
            finite(&name, field, value.unwrap_or(0.0))
        };

        let npl_ratio = optional(record.npl_ratio, "npl_ratio")?;
        let tli = optional(record.tli, "tli")?;
        let diversification_index =
            optional(record.diversification_index, "diversification_index")?;

        let total_assets_jpy = match record.total_assets_jpy {
            None => 1.0,
            Some(assets) => {
                let assets = finite(&name, "total_assets_jpy", assets)?;
                non_negative(&name, "total_assets_jpy", assets)?;
                // A zero weight would drop the institution from regional means
                if assets == 0.0 { 1.0 } else { assets }
            }
        };

        Ok(Self {
            name,
            region,
            duration_years,
            jgb_holdings_jpy,
            equity_capital_jpy,
            npl_ratio,
            tli,
            diversification_index,
            total_assets_jpy,
        })
    }

    /// Composite join key (name, region)
    pub fn key(&self) -> (&str, &str) {
        (&self.name, &self.region)
    }

    /// Whether the institution has any equity buffer at all
    pub fn has_positive_equity(&self) -> bool {
        self.equity_capital_jpy > 0.0
    }
}

/// Validate every record, aborting on the first failure
pub fn validate_all(records: &[InstitutionRecord]) -> Result<Vec<Institution>> {
    records.iter().map(Institution::from_record).collect()
}

fn finite(institution: &str, field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RiskError::invalid(
            field,
            format!("institution `{}`: value {} is not finite", institution, value),
        ))
    }
}

fn non_negative(institution: &str, field: &str, value: f64) -> Result<()> {
    if value < 0.0 {
        return Err(RiskError::invalid(
            field,
            format!("institution `{}`: value {} must be non-negative", institution, value),
        ));
    }
    Ok(())
}

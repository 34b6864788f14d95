//! Pipeline configuration
//!
//! Resolved in layers: built-in defaults, then an optional JSON file, then
//! environment variables (`MAX_SHOCK`, `SHOCK_STEP`, `REDLINE`, `PARALLEL`),
//! then whatever the caller sets explicitly.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Result, RiskError};
use crate::rehi::JoinPolicy;
use crate::shock::{DEFAULT_MAX_SHOCK, DEFAULT_SHOCK_STEP};

/// Collapse probability at or above which an institution is flagged
pub const DEFAULT_REDLINE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Largest shock on the grid, in percentage points
    pub max_shock: f64,

    /// Grid spacing, in percentage points
    pub step: f64,

    /// Handling of loss rows without institution attributes
    pub join_policy: JoinPolicy,

    /// Snapshot flag threshold on TLI-adjusted collapse probability
    pub redline: f64,

    /// Evaluate institutions on the rayon pool
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_shock: DEFAULT_MAX_SHOCK,
            step: DEFAULT_SHOCK_STEP,
            join_policy: JoinPolicy::Strict,
            redline: DEFAULT_REDLINE,
            parallel: false,
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file; absent keys keep their defaults
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Override fields from the process environment
    pub fn with_env(self) -> Result<Self> {
        self.with_vars(|key| env::var(key).ok())
    }

    /// Override fields from any variable source
    pub fn with_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "MAX_SHOCK")? {
            self.max_shock = v;
        }
        if let Some(v) = parse_var(&lookup, "SHOCK_STEP")? {
            self.step = v;
        }
        if let Some(v) = parse_var(&lookup, "REDLINE")? {
            self.redline = v;
        }
        if let Some(v) = lookup("PARALLEL") {
            self.parallel = matches!(v.trim(), "1" | "true" | "yes");
        }
        Ok(self)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(RiskError::invalid("step", format!("must be positive, got {}", self.step)));
        }
        if !self.max_shock.is_finite() || self.max_shock < 0.0 {
            return Err(RiskError::invalid(
                "max_shock",
                format!("must be non-negative, got {}", self.max_shock),
            ));
        }
        if !(0.0..=1.0).contains(&self.redline) {
            return Err(RiskError::invalid(
                "redline",
                format!("must lie in [0, 1], got {}", self.redline),
            ));
        }
        Ok(())
    }
}

fn parse_var<F>(lookup: &F, key: &str) -> Result<Option<f64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| RiskError::invalid(key, format!("`{}`: {}", raw, e))),
    }
}

//! Rate-shock grid construction
//!
//! Shock values are later used as grouping keys, so every value is rounded to
//! a fixed precision and computed from its index rather than by repeated
//! addition.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};

/// Decimal digits kept on every grid value
pub const SHOCK_PRECISION_DIGITS: i32 = 6;

/// Default maximum shock, in percentage points
pub const DEFAULT_MAX_SHOCK: f64 = 3.0;

/// Default grid spacing, in percentage points
pub const DEFAULT_SHOCK_STEP: f64 = 0.25;

/// Upper bound on grid size
pub const MAX_GRID_POINTS: usize = 100_000;

/// Slack applied to `max_shock / step` so that e.g. 0.3 / 0.1 keeps its endpoint
const GRID_TOLERANCE: f64 = 1e-9;

const SHOCK_SCALE: f64 = 1_000_000.0;

/// Round a shock to [`SHOCK_PRECISION_DIGITS`] decimals
pub fn round_shock(shock: f64) -> f64 {
    (shock * SHOCK_SCALE).round() / SHOCK_SCALE
}

/// Integer grouping key for a shock value (micro percentage points).
///
/// Two shocks that round to the same grid value always share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShockKey(i64);

impl ShockKey {
    pub fn from_shock(shock: f64) -> Self {
        ShockKey((shock * SHOCK_SCALE).round() as i64)
    }

    /// Shock value in percentage points
    pub fn shock(self) -> f64 {
        self.0 as f64 / SHOCK_SCALE
    }
}

impl From<f64> for ShockKey {
    fn from(shock: f64) -> Self {
        ShockKey::from_shock(shock)
    }
}

/// Generate the ascending shock grid `0, step, 2·step, ..` up to `max_shock`.
///
/// The last point is the largest multiple of `step` not exceeding
/// `max_shock` (up to rounding), so `max_shock` itself is included whenever it
/// is a multiple of `step`.
///
/// # Errors
/// `InvalidParameter` if `step <= 0`, `max_shock < 0`, either is not finite,
/// or the grid would exceed [`MAX_GRID_POINTS`].
pub fn generate_grid(max_shock: f64, step: f64) -> Result<Vec<f64>> {
    if !step.is_finite() || step <= 0.0 {
        return Err(RiskError::invalid(
            "step",
            format!("must be a positive number, got {}", step),
        ));
    }
    if !max_shock.is_finite() || max_shock < 0.0 {
        return Err(RiskError::invalid(
            "max_shock",
            format!("must be a non-negative number, got {}", max_shock),
        ));
    }

    let intervals = (max_shock / step + GRID_TOLERANCE).floor();
    if intervals + 1.0 > MAX_GRID_POINTS as f64 {
        return Err(RiskError::invalid(
            "step",
            format!(
                "grid 0..={} at step {} exceeds {} points",
                max_shock, step, MAX_GRID_POINTS
            ),
        ));
    }

    let intervals = intervals as usize;
    let mut grid: Vec<f64> = Vec::with_capacity(intervals + 1);
    for k in 0..=intervals {
        let shock = round_shock(k as f64 * step);
        // Steps finer than the rounding precision collapse onto one value
        if grid.last().map_or(true, |&prev| shock > prev) {
            grid.push(shock);
        }
    }

    log::debug!(
        "shock grid: {} points from 0 to {} (step {})",
        grid.len(),
        grid.last().copied().unwrap_or(0.0),
        step
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_grid() {
        let grid = generate_grid(DEFAULT_MAX_SHOCK, DEFAULT_SHOCK_STEP).unwrap();
        assert_eq!(grid.len(), 13);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[1], 0.25);
        assert_eq!(*grid.last().unwrap(), 3.0);
    }

    #[test]
    fn test_grid_properties() {
        let cases = [(3.0, 0.25), (1.0, 0.1), (0.3, 0.1), (2.0, 0.3), (5.0, 0.05), (0.7, 0.07)];
        for (max_shock, step) in cases {
            let grid = generate_grid(max_shock, step).unwrap();
            let expected_len = (max_shock / step + 1e-9).floor() as usize + 1;
            assert_eq!(grid.len(), expected_len, "len for ({}, {})", max_shock, step);
            assert_eq!(grid[0], 0.0);
            assert!(grid.windows(2).all(|w| w[1] > w[0]), "not ascending: {:?}", grid);
            assert!(*grid.last().unwrap() <= max_shock + 1e-6);
            assert!(max_shock - grid.last().unwrap() < step);
        }
    }

    #[test]
    fn test_endpoint_survives_float_accumulation() {
        // 0.1 summed ten times is 0.9999999999999999
        let grid = generate_grid(1.0, 0.1).unwrap();
        assert_eq!(grid.len(), 11);
        assert_eq!(*grid.last().unwrap(), 1.0);
        assert_eq!(grid[3], 0.3);

        let grid = generate_grid(0.3, 0.1).unwrap();
        assert_eq!(grid, vec![0.0, 0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_non_multiple_max() {
        let grid = generate_grid(1.0, 0.3).unwrap();
        assert_eq!(grid, vec![0.0, 0.3, 0.6, 0.9]);
    }

    #[test]
    fn test_zero_max_shock() {
        assert_eq!(generate_grid(0.0, 0.25).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(generate_grid(3.0, 0.0), Err(RiskError::InvalidParameter { .. })));
        assert!(matches!(generate_grid(3.0, -0.25), Err(RiskError::InvalidParameter { .. })));
        assert!(matches!(generate_grid(-1.0, 0.25), Err(RiskError::InvalidParameter { .. })));
        assert!(matches!(generate_grid(f64::NAN, 0.25), Err(RiskError::InvalidParameter { .. })));
        assert!(matches!(generate_grid(3.0, f64::INFINITY), Err(RiskError::InvalidParameter { .. })));
        assert!(matches!(generate_grid(1e6, 1e-3), Err(RiskError::InvalidParameter { .. })));
    }

    #[test]
    fn test_tiny_step_deduplicates() {
        let grid = generate_grid(0.000002, 0.0000004).unwrap();
        assert!(grid.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(grid[0], 0.0);
    }

    #[test]
    fn test_shock_key() {
        assert_eq!(ShockKey::from_shock(0.1 + 0.2), ShockKey::from_shock(0.3));
        assert_ne!(ShockKey::from_shock(0.25), ShockKey::from_shock(0.5));
        assert!(ShockKey::from_shock(0.25) < ShockKey::from_shock(0.5));
        assert_abs_diff_eq!(ShockKey::from(2.75).shock(), 2.75, epsilon = 1e-12);
    }
}

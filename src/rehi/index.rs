//! Resilience health index formula

/// Weight of loss absorption capacity `(1 - L)`
pub const REHI_LOSS_WEIGHT: f64 = 0.30;

/// Weight of loan book quality `(1 - F)`
pub const REHI_NPL_WEIGHT: f64 = 0.30;

/// Weight of tail liquidity `(1 - T)`
pub const REHI_TLI_WEIGHT: f64 = 0.20;

/// Weight of diversification `D`
pub const REHI_DIVERSIFICATION_WEIGHT: f64 = 0.20;

/// Index scale; REHI lies in `[0, REHI_SCALE]`
pub const REHI_SCALE: f64 = 100.0;

/// Clamp into [0, 1]; `+inf` maps to 1
pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// The four clamped inputs of the index, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RehiComponents {
    pub loss: f64,
    pub npl: f64,
    pub tli: f64,
    pub diversification: f64,
}

impl RehiComponents {
    pub fn new(loss_to_equity: f64, npl_ratio: f64, tli: f64, diversification_index: f64) -> Self {
        Self {
            loss: clamp01(loss_to_equity),
            npl: clamp01(npl_ratio),
            tli: clamp01(tli),
            diversification: clamp01(diversification_index),
        }
    }

    /// `100 * (0.3(1-L) + 0.3(1-F) + 0.2(1-T) + 0.2D)`
    pub fn score(&self) -> f64 {
        let blend = REHI_LOSS_WEIGHT * (1.0 - self.loss)
            + REHI_NPL_WEIGHT * (1.0 - self.npl)
            + REHI_TLI_WEIGHT * (1.0 - self.tli)
            + REHI_DIVERSIFICATION_WEIGHT * self.diversification;
        (REHI_SCALE * blend).clamp(0.0, REHI_SCALE)
    }
}

/// REHI from raw inputs
pub fn rehi_score(loss_to_equity: f64, npl_ratio: f64, tli: f64, diversification_index: f64) -> f64 {
    RehiComponents::new(loss_to_equity, npl_ratio, tli, diversification_index).score()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_weights_sum_to_one() {
        let total = REHI_LOSS_WEIGHT + REHI_NPL_WEIGHT + REHI_TLI_WEIGHT + REHI_DIVERSIFICATION_WEIGHT;
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reference_score() {
        assert_abs_diff_eq!(rehi_score(0.2, 0.1, 0.3, 0.8), 81.0, epsilon = 1e-9);
    }

    #[test]
    fn test_extremes() {
        assert_abs_diff_eq!(rehi_score(0.0, 0.0, 0.0, 1.0), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rehi_score(f64::INFINITY, 1.0, 1.0, 0.0), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_out_of_range_inputs_stay_bounded() {
        let inputs = [-3.0, -0.5, 0.0, 0.4, 1.0, 1.5, 40.0, f64::INFINITY];
        for &l in &inputs {
            for &f in &inputs {
                for &t in &inputs {
                    for &d in &inputs {
                        let score = rehi_score(l, f, t, d);
                        assert!((0.0..=100.0).contains(&score), "{} for {:?}", score, (l, f, t, d));
                    }
                }
            }
        }
    }

    #[test]
    fn test_infinite_loss_clamps_to_one() {
        let c = RehiComponents::new(f64::INFINITY, 1.5, -0.2, 0.5);
        assert_eq!(c.loss, 1.0);
        assert_eq!(c.npl, 1.0);
        assert_eq!(c.tli, 0.0);
        assert_eq!(c.diversification, 0.5);
    }
}

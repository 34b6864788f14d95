//! Rate-shock grid generation

mod grid;

pub use grid::{
    generate_grid, round_shock, ShockKey, DEFAULT_MAX_SHOCK, DEFAULT_SHOCK_STEP,
    MAX_GRID_POINTS, SHOCK_PRECISION_DIGITS,
};

//! Institution data structures and table loading

mod data;
pub mod loader;

pub use data::{Institution, InstitutionRecord, UNKNOWN_REGION, validate_all};
pub use loader::{load_institutions, load_institutions_from_reader, load_sample};

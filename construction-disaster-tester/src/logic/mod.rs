pub mod reports;
pub mod seeds;
pub mod sweep;

pub use seeds::{resolve_difficulty_inputs, resolve_seed_inputs};
pub use sweep::{SweepCase, SweepResult, SweepTester, build_matrix};

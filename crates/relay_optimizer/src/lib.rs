pub mod error;
pub mod json;
pub mod problem;
pub mod solver;
mod utils;

pub use error::OptimizerError;
pub use solver::optimize::{OptimizationResult, OptimizeParams, optimize};
pub use utils::time::format_minutes;

#[cfg(test)]
pub(crate) mod test_utils;

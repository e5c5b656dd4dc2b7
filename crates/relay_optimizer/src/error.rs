use thiserror::Error;

use crate::problem::time_window::Minutes;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing field '{field}' in {table} data")]
    MissingField { table: &'static str, field: &'static str },

    #[error("Invalid time value '{value}' for '{field}' in {table} row {row}")]
    InvalidTimeFormat {
        table: &'static str,
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("Depot '{key}' not found ({matches} matching stops)")]
    DepotNotFound { key: String, matches: usize },

    #[error("Stop '{stop}' cannot be assigned to any vehicle: {reason}")]
    UnassignableStop { stop: String, reason: String },

    #[error(
        "Time window violated at '{stop}' on vehicle '{vehicle}': \
         arrival {arrival} after latest {latest}"
    )]
    TimeWindowViolation {
        vehicle: String,
        stop: String,
        arrival: Minutes,
        latest: Minutes,
    },

    #[error("No feasible solution: none of the {stops} stops could be placed")]
    NoFeasibleSolution { stops: usize },
}

impl OptimizerError {
    /// Input errors must be corrected upstream, everything else comes out of the search.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            OptimizerError::InvalidInput(_)
                | OptimizerError::MissingField { .. }
                | OptimizerError::InvalidTimeFormat { .. }
                | OptimizerError::DepotNotFound { .. }
        )
    }
}

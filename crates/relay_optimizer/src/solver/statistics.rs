use std::collections::BTreeMap;

use jiff::SignedDuration;
use serde::Serialize;

use crate::solver::{construction::first_solution_strategy::FirstSolutionStrategy, score::Cost};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// No improving move left.
    #[default]
    Converged,
    TimeLimit,
    MaxIterations,
    /// An accepted move failed to apply. The solution is the last valid one.
    Aborted,
}

/// Summary of a run, reported next to the routes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStatistics {
    pub strategy: FirstSolutionStrategy,
    pub initial_objective: Cost,
    pub final_objective: Cost,
    pub iterations: usize,
    pub applied_moves: usize,
    pub moves_by_operator: BTreeMap<&'static str, usize>,
    pub termination: TerminationReason,
    pub construction_duration: SignedDuration,
    pub search_duration: SignedDuration,
}

impl SearchStatistics {
    pub fn improvement(&self) -> Cost {
        self.initial_objective - self.final_objective
    }
}

use jiff::SignedDuration;

use crate::{
    problem::time_window::Minutes,
    solver::construction::first_solution_strategy::FirstSolutionStrategy,
};

#[derive(Clone, Debug)]
pub struct SolverParams {
    pub first_solution_strategy: FirstSolutionStrategy,

    /// Wall-clock budget for the whole run, checked between local search iterations.
    pub time_limit: SignedDuration,

    /// Optional cap on local search iterations.
    pub max_iterations: Option<usize>,

    /// Longest a vehicle may wait for a window to open. Unlimited when `None`.
    pub max_waiting: Option<Minutes>,

    pub threads: Threads,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Threads {
    Single,
    Auto,
    Multi(usize),
}

impl Threads {
    pub fn number_of_threads(&self) -> usize {
        match self {
            Threads::Single => 1,
            Threads::Multi(num) => (*num).max(1),
            Threads::Auto => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            first_solution_strategy: FirstSolutionStrategy::PathCheapestArc,
            time_limit: SignedDuration::from_secs(30),
            max_iterations: None,
            max_waiting: None,
            threads: Threads::Auto,
        }
    }
}

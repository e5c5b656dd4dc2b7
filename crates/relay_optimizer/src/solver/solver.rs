use std::sync::Arc;

use jiff::Timestamp;
use tracing::{debug, info, instrument};

use crate::{
    error::OptimizerError,
    problem::vehicle_routing_problem::VehicleRoutingProblem,
    solver::{
        construction::construct_solution::construct_solution,
        ls::local_search::{LocalSearch, SearchTermination},
        schedule::{VehicleItinerary, extract_itineraries},
        solution::working_solution::WorkingSolution,
        solver_params::SolverParams,
        statistics::SearchStatistics,
    },
};

pub struct SolverOutcome {
    pub solution: WorkingSolution,
    pub itineraries: Vec<VehicleItinerary>,
    pub statistics: SearchStatistics,
}

/// Runs construction, then local search, then the schedule replay, on a dedicated
/// thread pool.
pub struct Solver {
    problem: Arc<VehicleRoutingProblem>,
    params: SolverParams,
}

impl Solver {
    pub fn new(problem: VehicleRoutingProblem, params: SolverParams) -> Self {
        Solver {
            problem: Arc::new(problem),
            params,
        }
    }

    pub fn problem(&self) -> &VehicleRoutingProblem {
        &self.problem
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    #[instrument(skip_all, level = "debug")]
    pub fn solve(&self) -> Result<SolverOutcome, OptimizerError> {
        if self.params.time_limit.is_negative() {
            return Err(OptimizerError::InvalidInput(format!(
                "time limit must not be negative, got {}",
                self.params.time_limit
            )));
        }

        let threads = self.params.threads.number_of_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("relay-solver-{index}"))
            .build()
            .map_err(|error| {
                OptimizerError::InvalidInput(format!(
                    "cannot start {threads} solver threads: {error}"
                ))
            })?;

        debug!(threads, "Starting solver");
        pool.install(|| self.run())
    }

    fn run(&self) -> Result<SolverOutcome, OptimizerError> {
        let started_at = Timestamp::now();
        let deadline = started_at.checked_add(self.params.time_limit).ok();

        let mut solution =
            construct_solution(self.problem.clone(), self.params.first_solution_strategy)?;
        let constructed_at = Timestamp::now();

        let num_stops = self.problem.num_stops();
        if num_stops > 0 && solution.num_assigned() == 0 {
            return Err(OptimizerError::NoFeasibleSolution { stops: num_stops });
        }

        let initial_objective = solution.objective();

        let mut local_search = LocalSearch::new(&solution);
        let applied_moves = local_search.improve(
            &mut solution,
            &SearchTermination {
                deadline,
                max_iterations: self.params.max_iterations,
            },
        );

        let itineraries = extract_itineraries(&self.problem, &solution)?;
        let finished_at = Timestamp::now();

        let statistics = SearchStatistics {
            strategy: self.params.first_solution_strategy,
            initial_objective,
            final_objective: solution.objective(),
            iterations: local_search.iterations(),
            applied_moves,
            moves_by_operator: local_search.moves_by_operator().clone(),
            termination: local_search.termination(),
            construction_duration: constructed_at.duration_since(started_at),
            search_duration: finished_at.duration_since(constructed_at),
        };

        info!(
            strategy = %statistics.strategy,
            initial_objective,
            objective = statistics.final_objective,
            improvement = statistics.improvement(),
            routes = solution.non_empty_routes_iter().count(),
            assigned = solution.num_assigned(),
            unassigned = solution.unassigned().len(),
            "Solver finished"
        );

        Ok(SolverOutcome {
            solution,
            itineraries,
            statistics,
        })
    }
}

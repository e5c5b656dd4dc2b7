use fxhash::FxHashMap;
use jiff::Timestamp;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::collections::BTreeMap;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    problem::vehicle_routing_problem::VehicleRoutingProblem,
    solver::{
        ls::{
            inter_relocate::InterRelocateOperator,
            inter_swap::InterSwapOperator,
            r#move::{LocalSearchMove, LocalSearchOperator},
            relocate::RelocateOperator,
            two_opt::TwoOptOperator,
        },
        score::Cost,
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
        statistics::TerminationReason,
    },
};

type RoutePair = (RouteIdx, RouteIdx);

/// Only strictly improving moves are kept.
const MAX_DELTA: Cost = 0;

/// When to stop improving. Both limits are checked between iterations only.
#[derive(Debug, Clone, Copy)]
pub struct SearchTermination {
    pub deadline: Option<Timestamp>,
    pub max_iterations: Option<usize>,
}

impl SearchTermination {
    pub fn unbounded() -> Self {
        SearchTermination {
            deadline: None,
            max_iterations: None,
        }
    }

    fn reached(&self, iteration: usize) -> Option<TerminationReason> {
        if let Some(max_iterations) = self.max_iterations
            && iteration >= max_iterations
        {
            return Some(TerminationReason::MaxIterations);
        }

        if let Some(deadline) = self.deadline
            && Timestamp::now() >= deadline
        {
            return Some(TerminationReason::TimeLimit);
        }

        None
    }
}

/// Best-improvement descent over relocate, inter-relocate, inter-swap and 2-opt.
///
/// The best move of every route pair is cached and only recomputed once one of
/// the two routes changes.
pub struct LocalSearch {
    pairs: Vec<RoutePair>,
    best_moves: FxHashMap<RoutePair, Option<(Cost, LocalSearchMove)>>,
    iterations: usize,
    moves_by_operator: BTreeMap<&'static str, usize>,
    termination: TerminationReason,
}

impl LocalSearch {
    pub fn new(solution: &WorkingSolution) -> Self {
        let count = solution.routes().len();
        let pairs = (0..count)
            .flat_map(|i| (i..count).map(move |j| (RouteIdx::new(i), RouteIdx::new(j))))
            .collect();

        LocalSearch {
            pairs,
            best_moves: FxHashMap::default(),
            iterations: 0,
            moves_by_operator: BTreeMap::new(),
            termination: TerminationReason::Converged,
        }
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn moves_by_operator(&self) -> &BTreeMap<&'static str, usize> {
        &self.moves_by_operator
    }

    pub fn termination(&self) -> TerminationReason {
        self.termination
    }

    /// Applies improving moves until none is left or `termination` is reached.
    /// Returns the number of applied moves.
    #[instrument(skip_all, level = "debug")]
    pub fn improve(
        &mut self,
        solution: &mut WorkingSolution,
        termination: &SearchTermination,
    ) -> usize {
        let mut applied = 0;
        let initial_objective = solution.objective();

        loop {
            if let Some(reason) = termination.reached(self.iterations) {
                self.termination = reason;
                break;
            }

            self.iterations += 1;
            self.refresh_best_moves(solution);

            let Some(pair) = self.best_pair() else {
                self.termination = TerminationReason::Converged;
                break;
            };

            let Some(Some((delta, op))) = self.best_moves.remove(&pair) else {
                break;
            };

            if !self.apply(solution, delta, &op) {
                self.termination = TerminationReason::Aborted;
                break;
            }

            applied += 1;
            *self.moves_by_operator.entry(op.operator_name()).or_default() += 1;
        }

        info!(
            iterations = self.iterations,
            applied,
            initial_objective,
            objective = solution.objective(),
            termination = ?self.termination,
            "Local search finished"
        );

        applied
    }

    fn apply(&mut self, solution: &mut WorkingSolution, delta: Cost, op: &LocalSearchMove) -> bool {
        let updated_routes = op.updated_routes();
        let snapshot = updated_routes
            .iter()
            .map(|&route_id| (route_id, solution.route(route_id).clone()))
            .collect::<Vec<_>>();
        let before = solution.objective();

        if let Err(violation) = op.apply(solution) {
            error!(?op, %violation, "Accepted move failed to apply");
            return false;
        }

        let after = solution.objective();
        if after - before != delta {
            warn!(
                operator = op.operator_name(),
                expected = delta,
                actual = after - before,
                "Move delta deviates from the objective change"
            );
        }

        if after >= before {
            solution.restore_routes(snapshot);
            error!(?op, "Move did not improve the objective, reverted");
            return false;
        }

        debug!(
            "Apply {} (d={}) {:?}",
            op.operator_name(),
            delta,
            updated_routes
        );

        self.best_moves
            .retain(|&(r1, r2), _| !updated_routes.contains(&r1) && !updated_routes.contains(&r2));

        true
    }

    /// Lowest cached delta, lowest pair on ties.
    fn best_pair(&self) -> Option<RoutePair> {
        self.pairs
            .iter()
            .filter_map(|pair| match self.best_moves.get(pair) {
                Some(Some((delta, _))) if *delta < MAX_DELTA => Some((*delta, *pair)),
                _ => None,
            })
            .min()
            .map(|(_, pair)| pair)
    }

    fn refresh_best_moves(&mut self, solution: &WorkingSolution) {
        let stale = self
            .pairs
            .iter()
            .copied()
            .filter(|pair| !self.best_moves.contains_key(pair))
            .collect::<Vec<_>>();

        if stale.is_empty() {
            return;
        }

        let problem = solution.problem();
        let results = stale
            .into_par_iter()
            .map(|pair| (pair, find_best_move(problem, solution, pair)))
            .collect::<Vec<_>>();

        self.best_moves.extend(results);
    }
}

fn find_best_move(
    problem: &VehicleRoutingProblem,
    solution: &WorkingSolution,
    pair: RoutePair,
) -> Option<(Cost, LocalSearchMove)> {
    let mut best_delta = MAX_DELTA;
    let mut best_move: Option<LocalSearchMove> = None;

    RelocateOperator::generate_moves(problem, solution, pair, |op| {
        let delta = op.delta(solution);
        if delta < best_delta && op.is_valid(solution) {
            best_delta = delta;
            best_move = Some(LocalSearchMove::Relocate(op));
        }
    });

    TwoOptOperator::generate_moves(problem, solution, pair, |op| {
        let delta = op.delta(solution);
        if delta < best_delta && op.is_valid(solution) {
            best_delta = delta;
            best_move = Some(LocalSearchMove::TwoOpt(op));
        }
    });

    InterRelocateOperator::generate_moves(problem, solution, pair, |op| {
        let delta = op.delta(solution);
        if delta < best_delta && op.is_valid(solution) {
            best_delta = delta;
            best_move = Some(LocalSearchMove::InterRelocate(op));
        }
    });

    InterSwapOperator::generate_moves(problem, solution, pair, |op| {
        let delta = op.delta(solution);
        if delta < best_delta && op.is_valid(solution) {
            best_delta = delta;
            best_move = Some(LocalSearchMove::InterSwap(op));
        }
    });

    best_move.map(|op| (best_delta, op))
}

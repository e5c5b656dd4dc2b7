use crate::{
    problem::{
        node::{DEPOT, NodeIdx},
        vehicle_routing_problem::VehicleRoutingProblem,
    },
    solver::score::Cost,
};

/// Objective cost of serving a stop right before a more urgent one.
pub const PRIORITY_PENALTY: Cost = 500;

/// Penalty of the arc `from -> to`: paid when `to` is more urgent than `from`.
///
/// Leaving or returning to the depot is never penalized.
#[inline(always)]
pub fn priority_penalty(problem: &VehicleRoutingProblem, from: NodeIdx, to: NodeIdx) -> Cost {
    if from == DEPOT || to == DEPOT {
        return 0;
    }

    if problem.priority(from) < problem.priority(to) {
        PRIORITY_PENALTY
    } else {
        0
    }
}

pub fn route_penalty(problem: &VehicleRoutingProblem, stops: &[NodeIdx]) -> Cost {
    stops
        .windows(2)
        .map(|arc| priority_penalty(problem, arc[0], arc[1]))
        .sum()
}

use std::{cmp::Reverse, sync::Arc};

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, instrument, warn};

use crate::{
    error::OptimizerError,
    problem::{
        node::NodeIdx,
        vehicle::VehicleIdx,
        vehicle_routing_problem::VehicleRoutingProblem,
    },
    solver::{
        constraints::compute_insertion_score::insertion_cost,
        construction::first_solution_strategy::FirstSolutionStrategy,
        insertion::{CandidateInsertion, ServiceInsertion, best_route_insertion},
        score::{CostDelta, arc_cost},
        solution::{
            route::WorkingSolutionRoute,
            route_id::RouteIdx,
            working_solution::{UnassignedReason, WorkingSolution},
        },
    },
    timer_debug,
};

/// Builds the first solution. Stops that fit nowhere end up unassigned with a reason.
#[instrument(skip_all, level = "debug")]
pub fn construct_solution(
    problem: Arc<VehicleRoutingProblem>,
    strategy: FirstSolutionStrategy,
) -> Result<WorkingSolution, OptimizerError> {
    let mut solution = WorkingSolution::new(problem);
    let pending: Vec<NodeIdx> = solution.problem().stops_iter().collect();

    let leftovers = timer_debug!("Construction", {
        match strategy {
            FirstSolutionStrategy::GlobalCheapestArc => {
                global_cheapest_insertion(&mut solution, pending)?
            }
            FirstSolutionStrategy::LocalCheapestArc => {
                local_cheapest_insertion(&mut solution, pending)?
            }
            FirstSolutionStrategy::PathCheapestArc => {
                let leftovers = path_cheapest_arc(&mut solution, pending)?;
                global_cheapest_insertion(&mut solution, leftovers)?
            }
        }
    });

    for node in leftovers {
        let reason = classify_unassigned(solution.problem(), node);
        warn!(
            stop = solution.problem().node(node).label(),
            %reason,
            "Stop left unassigned"
        );
        solution.mark_unassigned(node, reason);
    }

    debug!(
        %strategy,
        assigned = solution.num_assigned(),
        unassigned = solution.unassigned().len(),
        objective = solution.objective(),
        "Constructed initial solution"
    );

    Ok(solution)
}

fn commit(
    solution: &mut WorkingSolution,
    insertion: &ServiceInsertion,
) -> Result<(), OptimizerError> {
    solution.insert(insertion).map_err(|violation| {
        let vehicle_id = solution.route(insertion.route_id).vehicle_id();
        violation.into_error(solution.problem(), vehicle_id)
    })
}

/// Best insertion of any of `nodes` into any route. Routes are scanned in parallel.
fn best_insertion(solution: &WorkingSolution, nodes: &[NodeIdx]) -> Option<CandidateInsertion> {
    let per_route: Vec<Option<CandidateInsertion>> = (0..solution.routes().len())
        .into_par_iter()
        .map(|index| {
            let route_id = RouteIdx::new(index);
            nodes
                .iter()
                .filter_map(|&node| best_route_insertion(solution, route_id, node))
                .min_by_key(CandidateInsertion::key)
        })
        .collect();

    per_route
        .into_iter()
        .flatten()
        .min_by_key(CandidateInsertion::key)
}

/// Returns the stops that could not be inserted anywhere.
fn global_cheapest_insertion(
    solution: &mut WorkingSolution,
    mut pending: Vec<NodeIdx>,
) -> Result<Vec<NodeIdx>, OptimizerError> {
    // An insertion only tightens routes, so a stop without a feasible position
    // now will never get one later.
    while let Some(candidate) = best_insertion(solution, &pending) {
        commit(solution, &candidate.insertion)?;
        pending.retain(|&node| node != candidate.insertion.node);
    }

    Ok(pending)
}

fn local_cheapest_insertion(
    solution: &mut WorkingSolution,
    pending: Vec<NodeIdx>,
) -> Result<Vec<NodeIdx>, OptimizerError> {
    let mut leftovers = Vec::new();

    for node in pending {
        match best_insertion(solution, &[node]) {
            Some(candidate) => commit(solution, &candidate.insertion)?,
            None => leftovers.push(node),
        }
    }

    Ok(leftovers)
}

fn path_cheapest_arc(
    solution: &mut WorkingSolution,
    mut pending: Vec<NodeIdx>,
) -> Result<Vec<NodeIdx>, OptimizerError> {
    for route_id in solution.route_ids() {
        loop {
            let problem = solution.problem();
            let route = solution.route(route_id);
            let last = route.previous_node(route.len());

            let next = pending
                .iter()
                .copied()
                .filter(|&node| insertion_cost(problem, route, route.len(), node).is_feasible())
                .min_by_key(|&node| {
                    (
                        arc_cost(problem, last, node),
                        Reverse(problem.priority(node)),
                        node,
                    )
                });

            let Some(node) = next else {
                break;
            };

            let insertion = ServiceInsertion {
                route_id,
                node,
                position: route.len(),
            };
            commit(solution, &insertion)?;
            pending.retain(|&pending_node| pending_node != node);
        }
    }

    Ok(pending)
}

/// Explains an unplaceable stop by trying it alone on every vehicle.
pub fn classify_unassigned(problem: &VehicleRoutingProblem, node: NodeIdx) -> UnassignedReason {
    if problem.vehicles().is_empty() {
        return UnassignedReason::NoFeasiblePosition;
    }
    if problem.demand(node) > problem.max_capacity() {
        return UnassignedReason::ExceedsCapacity;
    }

    let mut only_capacity = true;

    for vehicle_id in (0..problem.vehicles().len()).map(VehicleIdx::new) {
        let route = WorkingSolutionRoute::empty(problem, vehicle_id);

        match insertion_cost(problem, &route, 0, node) {
            CostDelta::Feasible(_) => return UnassignedReason::NoFeasiblePosition,
            CostDelta::Infeasible(violation) => only_capacity &= violation.is_capacity(),
        }
    }

    if only_capacity {
        UnassignedReason::ExceedsCapacity
    } else {
        UnassignedReason::UnreachableTimeWindow
    }
}

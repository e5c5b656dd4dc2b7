use crate::{
    problem::{node::NodeIdx, vehicle_routing_problem::VehicleRoutingProblem},
    solver::{
        constraints::{
            capacity_constraint::add_load,
            time_window_constraint::{compute_return, compute_visit, depot_departure},
            violation::Violation,
        },
        score::{Cost, CostDelta, arc_cost},
        solution::route::WorkingSolutionRoute,
    },
};

/// Objective delta of visiting `node` at `position` in `route`.
///
/// Hard constraints are checked first (capacity, then the schedule from `position`
/// onwards). A new first stop moves the depot departure along with it. Propagation
/// stops as soon as a departure matches the current schedule, since everything
/// downstream is then unchanged.
pub fn insertion_cost(
    problem: &VehicleRoutingProblem,
    route: &WorkingSolutionRoute,
    position: usize,
    node: NodeIdx,
) -> CostDelta {
    match check_insertion(problem, route, position, node) {
        Ok(()) => CostDelta::Feasible(insertion_cost_delta(problem, route, position, node)),
        Err(violation) => CostDelta::Infeasible(violation),
    }
}

fn check_insertion(
    problem: &VehicleRoutingProblem,
    route: &WorkingSolutionRoute,
    position: usize,
    node: NodeIdx,
) -> Result<(), Violation> {
    add_load(
        problem,
        route.vehicle_id(),
        route.total_load(),
        problem.demand(node),
    )?;

    let previous = route.previous_node(position);
    let previous_departure = if position == 0 {
        depot_departure(problem, route.vehicle_id(), Some(node))
    } else {
        route.previous_departure(position)
    };
    let visit = compute_visit(
        problem,
        node,
        previous_departure + problem.travel_time(previous, node),
    )?;

    let mut previous = node;
    let mut departure = visit.departure;

    for index in position..route.len() {
        let stop = route.stop(index);
        let visit = compute_visit(problem, stop, departure + problem.travel_time(previous, stop))?;

        if visit.departure == route.departure(index) {
            return Ok(());
        }

        previous = stop;
        departure = visit.departure;
    }

    compute_return(problem, route.vehicle_id(), previous, departure).map(|_| ())
}

#[inline]
fn insertion_cost_delta(
    problem: &VehicleRoutingProblem,
    route: &WorkingSolutionRoute,
    position: usize,
    node: NodeIdx,
) -> Cost {
    let previous = route.previous_node(position);
    let next = route.node_or_depot(position);

    arc_cost(problem, previous, node) + arc_cost(problem, node, next)
        - arc_cost(problem, previous, next)
}

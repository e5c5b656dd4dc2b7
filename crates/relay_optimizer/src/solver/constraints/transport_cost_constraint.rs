use crate::{
    problem::{
        node::{DEPOT, NodeIdx},
        vehicle_routing_problem::VehicleRoutingProblem,
    },
    solver::score::Cost,
};

#[inline(always)]
pub fn arc_distance(problem: &VehicleRoutingProblem, from: NodeIdx, to: NodeIdx) -> Cost {
    problem.travel_distance(from, to) as Cost
}

/// Depot to depot distance through `stops`.
pub fn route_distance(problem: &VehicleRoutingProblem, stops: &[NodeIdx]) -> Cost {
    if stops.is_empty() {
        return 0;
    }

    let inner: Cost = stops
        .windows(2)
        .map(|arc| arc_distance(problem, arc[0], arc[1]))
        .sum();

    arc_distance(problem, DEPOT, stops[0])
        + inner
        + arc_distance(problem, stops[stops.len() - 1], DEPOT)
}

/// Extra distance of visiting `node` between `previous` and `next`.
pub fn insertion_distance_delta(
    problem: &VehicleRoutingProblem,
    previous: NodeIdx,
    node: NodeIdx,
    next: NodeIdx,
) -> Cost {
    arc_distance(problem, previous, node) + arc_distance(problem, node, next)
        - arc_distance(problem, previous, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, TestStop};

    #[test]
    fn test_route_distance_includes_depot_legs() {
        let problem = test_utils::create_problem(
            &[TestStop::at(0.0, 0.01), TestStop::at(0.0, 0.02)],
            &[10],
        );

        assert_eq!(route_distance(&problem, &[]), 0);
        assert_eq!(
            route_distance(&problem, &[NodeIdx::new(1)]),
            2 * problem.travel_distance(DEPOT, NodeIdx::new(1)) as Cost
        );

        let delta = insertion_distance_delta(&problem, DEPOT, NodeIdx::new(1), DEPOT);
        assert_eq!(delta, route_distance(&problem, &[NodeIdx::new(1)]));
    }
}

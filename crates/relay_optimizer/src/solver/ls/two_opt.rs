use crate::{
    problem::{node::NodeIdx, vehicle_routing_problem::VehicleRoutingProblem},
    solver::{
        constraints::{route_evaluation::evaluate_route, violation::Violation},
        ls::r#move::LocalSearchOperator,
        score::{Cost, arc_cost},
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

/// **Intra-Route 2-Opt**
///
/// Reverses the stops between `start` and `end`, both inclusive.
///
/// ```text
/// BEFORE:
///    Route: (P) -> [S] -> (B) -> (C) -> [E] -> (N)
///
/// AFTER:
///    Route: (P) -> [E] -> (C) -> (B) -> [S] -> (N)
/// ```
///
/// Distances are symmetric, but the priority penalty is not, so every arc inside
/// the segment contributes to the delta.
#[derive(Debug)]
pub struct TwoOptOperator {
    params: TwoOptParams,
}

#[derive(Debug)]
pub struct TwoOptParams {
    pub route_id: RouteIdx,
    pub start: usize,
    pub end: usize,
}

impl TwoOptOperator {
    pub fn new(params: TwoOptParams) -> Self {
        debug_assert!(params.start < params.end);
        Self { params }
    }

    fn candidate_stops(&self, solution: &WorkingSolution) -> Vec<NodeIdx> {
        let mut stops = solution.route(self.params.route_id).stops().to_vec();
        stops[self.params.start..=self.params.end].reverse();
        stops
    }
}

impl LocalSearchOperator for TwoOptOperator {
    fn generate_moves<C>(
        _problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        (r1, r2): (RouteIdx, RouteIdx),
        mut consumer: C,
    ) where
        C: FnMut(Self),
    {
        if r1 != r2 {
            return;
        }

        let len = solution.route(r1).len();
        for start in 0..len {
            for end in start + 1..len {
                consumer(TwoOptOperator::new(TwoOptParams {
                    route_id: r1,
                    start,
                    end,
                }));
            }
        }
    }

    fn delta(&self, solution: &WorkingSolution) -> Cost {
        let problem = solution.problem();
        let route = solution.route(self.params.route_id);
        let TwoOptParams { start, end, .. } = self.params;

        let previous = route.previous_node(start);
        let next = route.next_node(end);
        let first = route.stop(start);
        let last = route.stop(end);

        let boundary = arc_cost(problem, previous, last) + arc_cost(problem, first, next)
            - arc_cost(problem, previous, first)
            - arc_cost(problem, last, next);

        let inner: Cost = route.stops()[start..=end]
            .windows(2)
            .map(|arc| arc_cost(problem, arc[1], arc[0]) - arc_cost(problem, arc[0], arc[1]))
            .sum();

        boundary + inner
    }

    fn is_valid(&self, solution: &WorkingSolution) -> bool {
        let route = solution.route(self.params.route_id);
        evaluate_route(
            solution.problem(),
            route.vehicle_id(),
            &self.candidate_stops(solution),
        )
        .is_ok()
    }

    fn apply(&self, solution: &mut WorkingSolution) -> Result<(), Violation> {
        let stops = self.candidate_stops(solution);
        solution.replace_route(self.params.route_id, stops)
    }

    fn updated_routes(&self) -> Vec<RouteIdx> {
        vec![self.params.route_id]
    }
}

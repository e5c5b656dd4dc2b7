use crate::{
    problem::{
        node::{DEPOT, NodeIdx},
        vehicle_routing_problem::VehicleRoutingProblem,
    },
    solver::{
        constraints::{route_evaluation::evaluate_route, violation::Violation},
        ls::r#move::LocalSearchOperator,
        score::{Cost, arc_cost},
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

/// **Intra-Route Relocate**
///
/// Removes the stop at `from`, then inserts it at index `to` of the shortened route.
///
/// ```text
/// BEFORE:
///    Route: ... (A) -> [X] -> (C) ... (P) -> (N) ...
///
/// AFTER:
///    Route: ... (A) -> (C) ... (P) -> [X] -> (N) ...
/// ```
#[derive(Debug)]
pub struct RelocateOperator {
    params: RelocateOperatorParams,
}

#[derive(Debug)]
pub struct RelocateOperatorParams {
    pub route_id: RouteIdx,
    pub from: usize,
    pub to: usize,
}

impl RelocateOperator {
    pub fn new(params: RelocateOperatorParams) -> Self {
        debug_assert_ne!(params.from, params.to);
        Self { params }
    }

    fn candidate_stops(&self, solution: &WorkingSolution) -> Vec<NodeIdx> {
        let mut stops = solution.route(self.params.route_id).stops().to_vec();
        let node = stops.remove(self.params.from);
        stops.insert(self.params.to, node);
        stops
    }
}

impl LocalSearchOperator for RelocateOperator {
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
        for from in 0..len {
            for to in 0..len {
                if from == to {
                    continue;
                }

                consumer(RelocateOperator::new(RelocateOperatorParams {
                    route_id: r1,
                    from,
                    to,
                }));
            }
        }
    }

    fn delta(&self, solution: &WorkingSolution) -> Cost {
        let problem = solution.problem();
        let route = solution.route(self.params.route_id);
        let RelocateOperatorParams { from, to, .. } = self.params;

        let a = route.previous_node(from);
        let x = route.stop(from);
        let c = route.next_node(from);

        let removal = arc_cost(problem, a, c) - arc_cost(problem, a, x) - arc_cost(problem, x, c);

        // Node at index `k` once `x` is removed.
        let shortened = |k: usize| {
            if k + 1 >= route.len() {
                DEPOT
            } else if k < from {
                route.stop(k)
            } else {
                route.stop(k + 1)
            }
        };

        let previous = if to == 0 { DEPOT } else { shortened(to - 1) };
        let next = shortened(to);

        let insertion = arc_cost(problem, previous, x) + arc_cost(problem, x, next)
            - arc_cost(problem, previous, next);

        removal + insertion
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

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_utils::{self, TestStop};

    #[test]
    fn test_delta_matches_objective_change() {
        let problem = Arc::new(test_utils::create_problem(
            &[
                TestStop::at(0.0, 0.01).priority(1),
                TestStop::at(0.0, 0.03),
                TestStop::at(0.0, 0.02).priority(3),
                TestStop::at(0.01, 0.02),
            ],
            &[10],
        ));
        let solution = test_utils::create_test_working_solution(problem, &[&[1, 2, 3, 4]]);
        let route_id = RouteIdx::new(0);

        RelocateOperator::generate_moves(
            solution.problem(),
            &solution,
            (route_id, route_id),
            |op| {
                let mut applied = solution.clone();
                op.apply(&mut applied).unwrap();

                assert_eq!(
                    applied.objective() - solution.objective(),
                    op.delta(&solution),
                    "{op:?}"
                );
            },
        );
    }

    #[test]
    fn test_relocate_forward_and_backward() {
        let problem = Arc::new(test_utils::create_problem(
            &[
                TestStop::at(0.0, 0.01),
                TestStop::at(0.0, 0.02),
                TestStop::at(0.0, 0.03),
            ],
            &[10],
        ));
        let solution = test_utils::create_test_working_solution(problem, &[&[1, 2, 3]]);

        let forward = RelocateOperator::new(RelocateOperatorParams {
            route_id: RouteIdx::new(0),
            from: 0,
            to: 2,
        });
        assert_eq!(
            forward.candidate_stops(&solution),
            vec![NodeIdx::new(2), NodeIdx::new(3), NodeIdx::new(1)]
        );

        let backward = RelocateOperator::new(RelocateOperatorParams {
            route_id: RouteIdx::new(0),
            from: 2,
            to: 0,
        });
        assert_eq!(
            backward.candidate_stops(&solution),
            vec![NodeIdx::new(3), NodeIdx::new(1), NodeIdx::new(2)]
        );
    }
}

use crate::{
    problem::{node::NodeIdx, vehicle_routing_problem::VehicleRoutingProblem},
    solver::{
        constraints::{
            capacity_constraint::fits_after_exchange, route_evaluation::evaluate_route,
            violation::Violation,
        },
        ls::r#move::LocalSearchOperator,
        score::{Cost, arc_cost},
        solution::{
            route::WorkingSolutionRoute, route_id::RouteIdx, working_solution::WorkingSolution,
        },
    },
};

/// **Inter-Route Swap**
///
/// Exchanges the stop at `first` in `first_route_id` with the stop at `second`
/// in `second_route_id`.
///
/// ```text
/// BEFORE:
///    R1: ... (A) -> [X] -> (C) ...
///    R2: ... (P) -> [Y] -> (N) ...
///
/// AFTER:
///    R1: ... (A) -> [Y] -> (C) ...
///    R2: ... (P) -> [X] -> (N) ...
/// ```
#[derive(Debug)]
pub struct InterSwapOperator {
    params: InterSwapOperatorParams,
}

#[derive(Debug)]
pub struct InterSwapOperatorParams {
    pub first_route_id: RouteIdx,
    pub second_route_id: RouteIdx,
    pub first: usize,
    pub second: usize,
}

impl InterSwapOperator {
    pub fn new(params: InterSwapOperatorParams) -> Self {
        debug_assert_ne!(params.first_route_id, params.second_route_id);
        Self { params }
    }

    fn candidate_stops(&self, solution: &WorkingSolution) -> (Vec<NodeIdx>, Vec<NodeIdx>) {
        let mut first_stops = solution.route(self.params.first_route_id).stops().to_vec();
        let mut second_stops = solution.route(self.params.second_route_id).stops().to_vec();

        std::mem::swap(
            &mut first_stops[self.params.first],
            &mut second_stops[self.params.second],
        );

        (first_stops, second_stops)
    }
}

/// Cost change of replacing the stop at `position` with `replacement`.
fn replacement_delta(
    problem: &VehicleRoutingProblem,
    route: &WorkingSolutionRoute,
    position: usize,
    replacement: NodeIdx,
) -> Cost {
    let previous = route.previous_node(position);
    let current = route.stop(position);
    let next = route.next_node(position);

    arc_cost(problem, previous, replacement) + arc_cost(problem, replacement, next)
        - arc_cost(problem, previous, current)
        - arc_cost(problem, current, next)
}

impl LocalSearchOperator for InterSwapOperator {
    fn generate_moves<C>(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        (r1, r2): (RouteIdx, RouteIdx),
        mut consumer: C,
    ) where
        C: FnMut(Self),
    {
        if r1 == r2 {
            return;
        }

        let first_route = solution.route(r1);
        let second_route = solution.route(r2);
        let first_capacity = first_route.vehicle(problem).capacity();
        let second_capacity = second_route.vehicle(problem).capacity();

        for first in 0..first_route.len() {
            let x = first_route.stop(first);

            for second in 0..second_route.len() {
                let y = second_route.stop(second);

                let (x_demand, y_demand) = (problem.demand(x), problem.demand(y));
                let first_fits = fits_after_exchange(
                    first_route.total_load(),
                    x_demand,
                    y_demand,
                    first_capacity,
                );
                let second_fits = fits_after_exchange(
                    second_route.total_load(),
                    y_demand,
                    x_demand,
                    second_capacity,
                );
                if !first_fits || !second_fits {
                    continue;
                }

                consumer(InterSwapOperator::new(InterSwapOperatorParams {
                    first_route_id: r1,
                    second_route_id: r2,
                    first,
                    second,
                }));
            }
        }
    }

    fn delta(&self, solution: &WorkingSolution) -> Cost {
        let problem = solution.problem();
        let first_route = solution.route(self.params.first_route_id);
        let second_route = solution.route(self.params.second_route_id);

        let x = first_route.stop(self.params.first);
        let y = second_route.stop(self.params.second);

        replacement_delta(problem, first_route, self.params.first, y)
            + replacement_delta(problem, second_route, self.params.second, x)
    }

    fn is_valid(&self, solution: &WorkingSolution) -> bool {
        let problem = solution.problem();
        let (first_stops, second_stops) = self.candidate_stops(solution);

        evaluate_route(
            problem,
            solution.route(self.params.first_route_id).vehicle_id(),
            &first_stops,
        )
        .is_ok()
            && evaluate_route(
                problem,
                solution.route(self.params.second_route_id).vehicle_id(),
                &second_stops,
            )
            .is_ok()
    }

    fn apply(&self, solution: &mut WorkingSolution) -> Result<(), Violation> {
        let (first_stops, second_stops) = self.candidate_stops(solution);

        solution.replace_route_pair(
            (self.params.first_route_id, first_stops),
            (self.params.second_route_id, second_stops),
        )
    }

    fn updated_routes(&self) -> Vec<RouteIdx> {
        vec![self.params.first_route_id, self.params.second_route_id]
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
                TestStop::at(0.0, 0.01).priority(2),
                TestStop::at(0.02, 0.0),
                TestStop::at(0.0, 0.02).priority(1),
                TestStop::at(0.02, 0.01).priority(4),
                TestStop::at(0.01, 0.0),
            ],
            &[10, 10],
        ));
        let solution =
            test_utils::create_test_working_solution(problem, &[&[1, 2], &[3, 4, 5]]);
        let mut count = 0;

        InterSwapOperator::generate_moves(
            solution.problem(),
            &solution,
            (RouteIdx::new(0), RouteIdx::new(1)),
            |op| {
                count += 1;
                let mut applied = solution.clone();
                op.apply(&mut applied).unwrap();

                assert_eq!(
                    applied.objective() - solution.objective(),
                    op.delta(&solution),
                    "{op:?}"
                );
            },
        );

        assert_eq!(count, 6);
    }

    #[test]
    fn test_swap_exchanges_stops() {
        let problem = Arc::new(test_utils::create_problem(
            &[TestStop::at(0.0, 0.01), TestStop::at(0.02, 0.0)],
            &[10, 10],
        ));
        let mut solution = test_utils::create_test_working_solution(problem, &[&[1], &[2]]);

        InterSwapOperator::new(InterSwapOperatorParams {
            first_route_id: RouteIdx::new(0),
            second_route_id: RouteIdx::new(1),
            first: 0,
            second: 0,
        })
        .apply(&mut solution)
        .unwrap();

        assert_eq!(solution.route(RouteIdx::new(0)).stops(), &[NodeIdx::new(2)]);
        assert_eq!(solution.route(RouteIdx::new(1)).stops(), &[NodeIdx::new(1)]);
    }
}

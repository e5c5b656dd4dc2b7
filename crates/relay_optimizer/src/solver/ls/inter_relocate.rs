use crate::{
    problem::{node::NodeIdx, vehicle_routing_problem::VehicleRoutingProblem},
    solver::{
        constraints::{
            capacity_constraint::fits_after_exchange, route_evaluation::evaluate_route,
            violation::Violation,
        },
        ls::r#move::LocalSearchOperator,
        score::{Cost, arc_cost},
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

/// **Inter-Route Relocate**
///
/// Moves the stop at `from` in `from_route_id` to position `to` in `to_route_id`.
///
/// ```text
/// BEFORE:
///    R1: ... (A) -> [X] -> (C) ...
///    R2: ... (P) -> (N) ...
///
/// AFTER:
///    R1: ... (A) -> (C) ...
///    R2: ... (P) -> [X] -> (N) ...
/// ```
#[derive(Debug)]
pub struct InterRelocateOperator {
    params: InterRelocateParams,
}

#[derive(Debug)]
pub struct InterRelocateParams {
    pub from_route_id: RouteIdx,
    pub to_route_id: RouteIdx,
    pub from: usize,
    pub to: usize,
}

impl InterRelocateOperator {
    pub fn new(params: InterRelocateParams) -> Self {
        debug_assert_ne!(params.from_route_id, params.to_route_id);
        Self { params }
    }

    fn candidate_stops(&self, solution: &WorkingSolution) -> (Vec<NodeIdx>, Vec<NodeIdx>) {
        let mut from_stops = solution.route(self.params.from_route_id).stops().to_vec();
        let mut to_stops = solution.route(self.params.to_route_id).stops().to_vec();

        let node = from_stops.remove(self.params.from);
        to_stops.insert(self.params.to, node);

        (from_stops, to_stops)
    }

    fn generate_directed<C>(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        from_route_id: RouteIdx,
        to_route_id: RouteIdx,
        consumer: &mut C,
    ) where
        C: FnMut(Self),
    {
        let from_route = solution.route(from_route_id);
        let to_route = solution.route(to_route_id);
        let capacity = to_route.vehicle(problem).capacity();

        for from in 0..from_route.len() {
            let demand = problem.demand(from_route.stop(from));
            if !fits_after_exchange(to_route.total_load(), 0, demand, capacity) {
                continue;
            }

            for to in 0..=to_route.len() {
                consumer(InterRelocateOperator::new(InterRelocateParams {
                    from_route_id,
                    to_route_id,
                    from,
                    to,
                }));
            }
        }
    }
}

impl LocalSearchOperator for InterRelocateOperator {
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

        Self::generate_directed(problem, solution, r1, r2, &mut consumer);
        Self::generate_directed(problem, solution, r2, r1, &mut consumer);
    }

    fn delta(&self, solution: &WorkingSolution) -> Cost {
        let problem = solution.problem();
        let from_route = solution.route(self.params.from_route_id);
        let to_route = solution.route(self.params.to_route_id);

        let a = from_route.previous_node(self.params.from);
        let x = from_route.stop(self.params.from);
        let c = from_route.next_node(self.params.from);

        let p = to_route.previous_node(self.params.to);
        let n = to_route.node_or_depot(self.params.to);

        let removal = arc_cost(problem, a, c) - arc_cost(problem, a, x) - arc_cost(problem, x, c);
        let insertion =
            arc_cost(problem, p, x) + arc_cost(problem, x, n) - arc_cost(problem, p, n);

        removal + insertion
    }

    fn is_valid(&self, solution: &WorkingSolution) -> bool {
        let problem = solution.problem();
        let (from_stops, to_stops) = self.candidate_stops(solution);

        evaluate_route(
            problem,
            solution.route(self.params.to_route_id).vehicle_id(),
            &to_stops,
        )
        .is_ok()
            && evaluate_route(
                problem,
                solution.route(self.params.from_route_id).vehicle_id(),
                &from_stops,
            )
            .is_ok()
    }

    fn apply(&self, solution: &mut WorkingSolution) -> Result<(), Violation> {
        let (from_stops, to_stops) = self.candidate_stops(solution);

        solution.replace_route_pair(
            (self.params.from_route_id, from_stops),
            (self.params.to_route_id, to_stops),
        )
    }

    fn updated_routes(&self) -> Vec<RouteIdx> {
        vec![self.params.from_route_id, self.params.to_route_id]
    }
}

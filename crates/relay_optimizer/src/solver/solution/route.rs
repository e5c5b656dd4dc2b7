use crate::{
    problem::{
        node::{Amount, DEPOT, NodeIdx},
        time_window::Minutes,
        vehicle::{Vehicle, VehicleIdx},
        vehicle_routing_problem::VehicleRoutingProblem,
    },
    solver::{
        constraints::{
            route_evaluation::{RouteEvaluation, evaluate_route},
            violation::Violation,
        },
        score::Cost,
    },
};

/// Ordered stops served by one vehicle. The depot legs at both ends are implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingSolutionRoute {
    vehicle_id: VehicleIdx,
    stops: Vec<NodeIdx>,
    evaluation: RouteEvaluation,
}

impl WorkingSolutionRoute {
    pub fn empty(problem: &VehicleRoutingProblem, vehicle_id: VehicleIdx) -> Self {
        WorkingSolutionRoute {
            vehicle_id,
            stops: Vec::new(),
            evaluation: RouteEvaluation::empty(problem.vehicle(vehicle_id).shift().start()),
        }
    }

    pub fn vehicle_id(&self) -> VehicleIdx {
        self.vehicle_id
    }

    pub fn vehicle<'a>(&self, problem: &'a VehicleRoutingProblem) -> &'a Vehicle {
        problem.vehicle(self.vehicle_id)
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stops(&self) -> &[NodeIdx] {
        &self.stops
    }

    pub fn stop(&self, position: usize) -> NodeIdx {
        self.stops[position]
    }

    /// Node visited before `position`, the depot for the first stop.
    #[inline]
    pub fn previous_node(&self, position: usize) -> NodeIdx {
        if position == 0 {
            DEPOT
        } else {
            self.stops[position - 1]
        }
    }

    /// Node at `position`, the depot once past the last stop.
    #[inline]
    pub fn node_or_depot(&self, position: usize) -> NodeIdx {
        self.stops.get(position).copied().unwrap_or(DEPOT)
    }

    #[inline]
    pub fn next_node(&self, position: usize) -> NodeIdx {
        self.node_or_depot(position + 1)
    }

    pub fn evaluation(&self) -> &RouteEvaluation {
        &self.evaluation
    }

    /// Departure from the node before `position`, the route start for the first stop.
    pub fn previous_departure(&self, position: usize) -> Minutes {
        if position == 0 {
            self.evaluation.start
        } else {
            self.evaluation.departures[position - 1]
        }
    }

    pub fn departure(&self, position: usize) -> Minutes {
        self.evaluation.departures[position]
    }

    pub fn start(&self) -> Minutes {
        self.evaluation.start
    }

    pub fn end(&self) -> Minutes {
        self.evaluation.end
    }

    pub fn total_load(&self) -> Amount {
        self.evaluation.total_load()
    }

    pub fn distance(&self) -> Cost {
        self.evaluation.distance
    }

    pub fn penalty(&self) -> Cost {
        self.evaluation.penalty
    }

    pub fn cost(&self) -> Cost {
        self.evaluation.cost()
    }

    /// Full visiting order, depot legs included.
    pub fn node_sequence(&self) -> Vec<NodeIdx> {
        std::iter::once(DEPOT)
            .chain(self.stops.iter().copied())
            .chain(std::iter::once(DEPOT))
            .collect()
    }

    /// Replaces the stop sequence, leaving the route untouched when `stops` is infeasible.
    pub fn replace_stops(
        &mut self,
        problem: &VehicleRoutingProblem,
        stops: Vec<NodeIdx>,
    ) -> Result<(), Violation> {
        self.evaluation = evaluate_route(problem, self.vehicle_id, &stops)?;
        self.stops = stops;

        Ok(())
    }

    pub fn insert(
        &mut self,
        problem: &VehicleRoutingProblem,
        position: usize,
        node_id: NodeIdx,
    ) -> Result<(), Violation> {
        let mut stops = self.stops.clone();
        stops.insert(position, node_id);
        self.replace_stops(problem, stops)
    }
}

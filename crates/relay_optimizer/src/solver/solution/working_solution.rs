use std::{fmt, sync::Arc};

use serde::Serialize;

use crate::{
    problem::{
        node::NodeIdx,
        vehicle::{Vehicle, VehicleIdx},
        vehicle_routing_problem::VehicleRoutingProblem,
    },
    solver::{
        constraints::violation::Violation,
        insertion::ServiceInsertion,
        score::Cost,
        solution::{route::WorkingSolutionRoute, route_id::RouteIdx},
    },
    utils::enumerate_idx::EnumerateIdx,
};

/// Why a stop could not be placed on any route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnassignedReason {
    /// Demand above the capacity of every vehicle.
    ExceedsCapacity,
    /// No vehicle can reach the stop inside its window, even with an empty route.
    UnreachableTimeWindow,
    /// Reachable on its own, but every route is too full or too tight.
    NoFeasiblePosition,
}

impl fmt::Display for UnassignedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnassignedReason::ExceedsCapacity => {
                write!(f, "demand exceeds the capacity of every vehicle")
            }
            UnassignedReason::UnreachableTimeWindow => {
                write!(f, "no vehicle can reach it within its time window")
            }
            UnassignedReason::NoFeasiblePosition => {
                write!(f, "no route has a feasible position for it")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnassignedStop {
    pub node: NodeIdx,
    pub reason: UnassignedReason,
}

/// Routes (one per vehicle, `RouteIdx` mirrors `VehicleIdx`) plus the stops left out.
#[derive(Clone)]
pub struct WorkingSolution {
    problem: Arc<VehicleRoutingProblem>,
    routes: Vec<WorkingSolutionRoute>,
    unassigned: Vec<UnassignedStop>,
}

impl WorkingSolution {
    pub fn new(problem: Arc<VehicleRoutingProblem>) -> Self {
        let routes = problem
            .vehicles()
            .iter()
            .enumerate_idx()
            .map(|(vehicle_id, _): (VehicleIdx, &Vehicle)| {
                WorkingSolutionRoute::empty(&problem, vehicle_id)
            })
            .collect();

        WorkingSolution {
            problem,
            routes,
            unassigned: Vec::new(),
        }
    }

    pub fn problem(&self) -> &VehicleRoutingProblem {
        &self.problem
    }

    pub fn routes(&self) -> &[WorkingSolutionRoute] {
        &self.routes
    }

    pub fn route(&self, route_id: RouteIdx) -> &WorkingSolutionRoute {
        &self.routes[route_id]
    }

    pub fn route_ids(&self) -> impl Iterator<Item = RouteIdx> + use<> {
        (0..self.routes.len()).map(RouteIdx::new)
    }

    pub fn non_empty_routes_iter(&self) -> impl Iterator<Item = &WorkingSolutionRoute> {
        self.routes.iter().filter(|route| !route.is_empty())
    }

    pub fn unassigned(&self) -> &[UnassignedStop] {
        &self.unassigned
    }

    pub fn mark_unassigned(&mut self, node: NodeIdx, reason: UnassignedReason) {
        self.unassigned.push(UnassignedStop { node, reason });
    }

    pub fn num_assigned(&self) -> usize {
        self.routes.iter().map(|route| route.len()).sum()
    }

    pub fn total_distance(&self) -> Cost {
        self.routes.iter().map(|route| route.distance()).sum()
    }

    pub fn total_penalty(&self) -> Cost {
        self.routes.iter().map(|route| route.penalty()).sum()
    }

    /// Total distance plus total priority penalty.
    pub fn objective(&self) -> Cost {
        self.routes.iter().map(|route| route.cost()).sum()
    }

    pub fn insert(&mut self, insertion: &ServiceInsertion) -> Result<(), Violation> {
        let route = &mut self.routes[insertion.route_id];
        route.insert(&self.problem, insertion.position, insertion.node)
    }

    pub fn replace_route(
        &mut self,
        route_id: RouteIdx,
        stops: Vec<NodeIdx>,
    ) -> Result<(), Violation> {
        self.routes[route_id].replace_stops(&self.problem, stops)
    }

    /// Replaces two routes at once. Neither changes unless both new sequences are feasible.
    pub fn replace_route_pair(
        &mut self,
        (r1, s1): (RouteIdx, Vec<NodeIdx>),
        (r2, s2): (RouteIdx, Vec<NodeIdx>),
    ) -> Result<(), Violation> {
        let mut first = self.routes[r1].clone();
        let mut second = self.routes[r2].clone();

        first.replace_stops(&self.problem, s1)?;
        second.replace_stops(&self.problem, s2)?;

        self.routes[r1] = first;
        self.routes[r2] = second;

        Ok(())
    }

    /// Puts back routes cloned before a change.
    pub fn restore_routes(&mut self, routes: Vec<(RouteIdx, WorkingSolutionRoute)>) {
        for (route_id, route) in routes {
            self.routes[route_id] = route;
        }
    }

    /// Whether every stop appears exactly once across the routes and the unassigned list.
    pub fn is_partition(&self) -> bool {
        let mut seen = vec![0usize; self.problem.nodes().len()];

        let assigned = self.routes.iter().flat_map(|route| route.stops().iter().copied());
        let unassigned = self.unassigned.iter().map(|stop| stop.node);

        for node in assigned.chain(unassigned) {
            match seen.get_mut(node.get()) {
                Some(count) => *count += 1,
                None => return false,
            }
        }

        seen[0] == 0 && seen[1..].iter().all(|&count| count == 1)
    }
}

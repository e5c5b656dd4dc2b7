use serde::Serialize;

use crate::{
    problem::{
        node::{Amount, DEPOT, NodeIdx},
        time_window::Minutes,
        vehicle::VehicleIdx,
        vehicle_routing_problem::VehicleRoutingProblem,
    },
    solver::{
        constraints::{
            capacity_constraint::capacity_used,
            priority_constraint::route_penalty,
            time_window_constraint::{compute_return, compute_visit, depot_departure},
            transport_cost_constraint::route_distance,
            violation::Violation,
        },
        score::Cost,
    },
};

/// Cached schedule, loads and cost of a feasible route, indexed like its stops.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteEvaluation {
    pub arrivals: Vec<Minutes>,
    pub waiting: Vec<Minutes>,
    pub departures: Vec<Minutes>,
    pub loads: Vec<Amount>,
    pub start: Minutes,
    pub end: Minutes,
    pub distance: Cost,
    pub penalty: Cost,
}

impl RouteEvaluation {
    pub fn empty(start: Minutes) -> Self {
        RouteEvaluation {
            start,
            end: start,
            ..RouteEvaluation::default()
        }
    }

    pub fn cost(&self) -> Cost {
        self.distance + self.penalty
    }

    pub fn total_load(&self) -> Amount {
        self.loads.last().copied().unwrap_or(0)
    }
}

/// Evaluates `stops` end to end for `vehicle_id`, failing on the first broken constraint.
pub fn evaluate_route(
    problem: &VehicleRoutingProblem,
    vehicle_id: VehicleIdx,
    stops: &[NodeIdx],
) -> Result<RouteEvaluation, Violation> {
    let start = depot_departure(problem, vehicle_id, stops.first().copied());
    if stops.is_empty() {
        return Ok(RouteEvaluation::empty(start));
    }

    let loads = capacity_used(problem, vehicle_id, stops)?;

    let mut arrivals = Vec::with_capacity(stops.len());
    let mut waiting = Vec::with_capacity(stops.len());
    let mut departures = Vec::with_capacity(stops.len());

    let mut previous = DEPOT;
    let mut departure = start;
    for &node in stops {
        let visit = compute_visit(problem, node, departure + problem.travel_time(previous, node))?;

        arrivals.push(visit.arrival);
        waiting.push(visit.waiting);
        departures.push(visit.departure);

        previous = node;
        departure = visit.departure;
    }

    let end = compute_return(problem, vehicle_id, previous, departure)?;

    Ok(RouteEvaluation {
        arrivals,
        waiting,
        departures,
        loads,
        start,
        end,
        distance: route_distance(problem, stops),
        penalty: route_penalty(problem, stops),
    })
}

use serde::Serialize;
use tracing::instrument;

use crate::{
    error::OptimizerError,
    problem::{
        node::{DEPOT, NodeIdx},
        time_window::Minutes,
        vehicle::VehicleIdx,
        vehicle_routing_problem::VehicleRoutingProblem,
    },
    solver::{
        constraints::{
            time_window_constraint::{compute_return, compute_visit, depot_departure},
            violation::Violation,
        },
        score::Cost,
        solution::{route::WorkingSolutionRoute, working_solution::WorkingSolution},
    },
    utils::time::format_minutes,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub node: NodeIdx,
    pub label: String,
    pub arrival: Minutes,
    pub departure: Minutes,
}

/// Timed route sheet of one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleItinerary {
    pub vehicle_id: VehicleIdx,
    pub vehicle: String,
    pub driver: String,
    pub depot: String,
    pub departure: Minutes,
    pub stops: Vec<ScheduleEntry>,
    pub return_arrival: Minutes,
    pub distance: Cost,
    pub penalty: Cost,
}

impl VehicleItinerary {
    /// `"<depot> (Start)"`, `"<stop> (Arr HH:MM)"`..., `"<depot> (Return HH:MM)"`.
    pub fn labels(&self) -> Vec<String> {
        std::iter::once(format!("{} (Start)", self.depot))
            .chain(
                self.stops.iter().map(|entry| {
                    format!("{} (Arr {})", entry.label, format_minutes(entry.arrival))
                }),
            )
            .chain(std::iter::once(format!(
                "{} (Return {})",
                self.depot,
                format_minutes(self.return_arrival)
            )))
            .collect()
    }

    /// `(label, minutes)` pairs from the depot departure to the return.
    pub fn stop_arrivals(&self) -> Vec<(String, Minutes)> {
        std::iter::once((self.depot.clone(), self.departure))
            .chain(
                self.stops
                    .iter()
                    .map(|entry| (entry.label.clone(), entry.arrival)),
            )
            .chain(std::iter::once((self.depot.clone(), self.return_arrival)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// Replays every route from the depot without trusting the cached evaluation.
#[instrument(skip_all, level = "debug")]
pub fn extract_itineraries(
    problem: &VehicleRoutingProblem,
    solution: &WorkingSolution,
) -> Result<Vec<VehicleItinerary>, OptimizerError> {
    solution
        .routes()
        .iter()
        .map(|route| extract_itinerary(problem, route))
        .collect()
}

fn extract_itinerary(
    problem: &VehicleRoutingProblem,
    route: &WorkingSolutionRoute,
) -> Result<VehicleItinerary, OptimizerError> {
    let vehicle_id = route.vehicle_id();
    let vehicle = problem.vehicle(vehicle_id);
    let to_error = |violation: Violation| violation.into_error(problem, vehicle_id);

    let departure = depot_departure(problem, vehicle_id, route.stops().first().copied());
    let mut stops = Vec::with_capacity(route.len());
    let mut previous = DEPOT;
    let mut previous_departure = departure;

    for &node in route.stops() {
        let visit = compute_visit(
            problem,
            node,
            previous_departure + problem.travel_time(previous, node),
        )
        .map_err(to_error)?;

        stops.push(ScheduleEntry {
            node,
            label: problem.node(node).label().to_owned(),
            arrival: visit.arrival,
            departure: visit.departure,
        });

        previous = node;
        previous_departure = visit.departure;
    }

    let return_arrival = if route.is_empty() {
        departure
    } else {
        compute_return(problem, vehicle_id, previous, previous_departure).map_err(to_error)?
    };

    Ok(VehicleItinerary {
        vehicle_id,
        vehicle: vehicle.external_id().to_owned(),
        driver: vehicle.shift().driver_id().to_owned(),
        depot: problem.depot().label().to_owned(),
        departure,
        stops,
        return_arrival,
        distance: route.distance(),
        penalty: route.penalty(),
    })
}

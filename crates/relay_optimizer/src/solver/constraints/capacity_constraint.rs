use crate::{
    problem::{
        node::{Amount, NodeIdx},
        vehicle::VehicleIdx,
        vehicle_routing_problem::VehicleRoutingProblem,
    },
    solver::constraints::violation::Violation,
};

/// Running load after each stop of `stops`, failing on the first prefix over capacity.
pub fn capacity_used(
    problem: &VehicleRoutingProblem,
    vehicle_id: VehicleIdx,
    stops: &[NodeIdx],
) -> Result<Vec<Amount>, Violation> {
    let mut load = 0;

    stops
        .iter()
        .map(|&node| {
            load = add_load(problem, vehicle_id, load, problem.demand(node))?;
            Ok(load)
        })
        .collect()
}

/// `load + demand`, if it fits the vehicle. An overflowing sum reports `Amount::MAX`.
pub fn add_load(
    problem: &VehicleRoutingProblem,
    vehicle_id: VehicleIdx,
    load: Amount,
    demand: Amount,
) -> Result<Amount, Violation> {
    let capacity = problem.vehicle(vehicle_id).capacity();

    match load.checked_add(demand) {
        Some(total) if total <= capacity => Ok(total),
        total => Err(Violation::Capacity {
            load: total.unwrap_or(Amount::MAX),
            capacity,
        }),
    }
}

/// Whether swapping `removed` for `added` keeps a route loaded with `load` within `capacity`.
pub fn fits_after_exchange(
    load: Amount,
    removed: Amount,
    added: Amount,
    capacity: Amount,
) -> bool {
    load.checked_sub(removed)
        .and_then(|remaining| remaining.checked_add(added))
        .is_some_and(|total| total <= capacity)
}

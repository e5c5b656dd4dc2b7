use std::fmt;

use serde::Serialize;

use crate::{
    error::OptimizerError,
    problem::{
        node::{Amount, DEPOT, NodeIdx},
        time_window::Minutes,
        vehicle::VehicleIdx,
        vehicle_routing_problem::VehicleRoutingProblem,
    },
    utils::time::format_minutes,
};

/// Hard constraint broken by a candidate route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Violation {
    Capacity {
        load: Amount,
        capacity: Amount,
    },
    TimeWindow {
        node: NodeIdx,
        arrival: Minutes,
        latest: Minutes,
    },
    WaitingExceeded {
        node: NodeIdx,
        waiting: Minutes,
        max_waiting: Minutes,
    },
    /// Return to the depot after the driver's shift or the end of the day.
    Shift {
        arrival: Minutes,
        latest: Minutes,
    },
}

impl Violation {
    pub fn is_capacity(&self) -> bool {
        matches!(self, Violation::Capacity { .. })
    }

    /// Errors raised when a finalized route fails its replay.
    pub fn into_error(
        self,
        problem: &VehicleRoutingProblem,
        vehicle_id: VehicleIdx,
    ) -> OptimizerError {
        let vehicle = problem.vehicle(vehicle_id).external_id().to_owned();

        match self {
            Violation::TimeWindow {
                node,
                arrival,
                latest,
            } => OptimizerError::TimeWindowViolation {
                vehicle,
                stop: problem.node(node).label().to_owned(),
                arrival,
                latest,
            },
            Violation::WaitingExceeded {
                node, max_waiting, ..
            } => {
                let window_start = problem.node(node).time_window().start();
                OptimizerError::TimeWindowViolation {
                    vehicle,
                    stop: problem.node(node).label().to_owned(),
                    arrival: window_start,
                    latest: window_start + max_waiting,
                }
            }
            Violation::Shift { arrival, latest } => OptimizerError::TimeWindowViolation {
                vehicle,
                stop: problem.node(DEPOT).label().to_owned(),
                arrival,
                latest,
            },
            Violation::Capacity { load, capacity } => OptimizerError::InvalidInput(format!(
                "vehicle '{vehicle}' carries {load} over its capacity of {capacity}"
            )),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Capacity { load, capacity } => {
                write!(f, "load {load} exceeds capacity {capacity}")
            }
            Violation::TimeWindow {
                node,
                arrival,
                latest,
            } => write!(
                f,
                "arrival {} at node {node} is after {}",
                format_minutes(*arrival),
                format_minutes(*latest)
            ),
            Violation::WaitingExceeded {
                node,
                waiting,
                max_waiting,
            } => write!(
                f,
                "waiting {waiting} min at node {node} exceeds {max_waiting} min"
            ),
            Violation::Shift { arrival, latest } => write!(
                f,
                "return to depot at {} is after {}",
                format_minutes(*arrival),
                format_minutes(*latest)
            ),
        }
    }
}

use std::cmp::Ordering;

use serde::Serialize;

use crate::{
    problem::{node::NodeIdx, vehicle_routing_problem::VehicleRoutingProblem},
    solver::constraints::{
        priority_constraint::priority_penalty, transport_cost_constraint::arc_distance,
        violation::Violation,
    },
};

/// Objective units: meters of travel plus priority penalties.
pub type Cost = i64;

/// Contribution of the arc `from -> to` to the objective.
#[inline(always)]
pub fn arc_cost(problem: &VehicleRoutingProblem, from: NodeIdx, to: NodeIdx) -> Cost {
    arc_distance(problem, from, to) + priority_penalty(problem, from, to)
}

/// Outcome of evaluating a change against the constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CostDelta {
    Feasible(Cost),
    Infeasible(Violation),
}

impl CostDelta {
    pub fn is_feasible(&self) -> bool {
        matches!(self, CostDelta::Feasible(_))
    }

    pub fn cost(&self) -> Option<Cost> {
        match self {
            CostDelta::Feasible(cost) => Some(*cost),
            CostDelta::Infeasible(_) => None,
        }
    }

    pub fn violation(&self) -> Option<Violation> {
        match self {
            CostDelta::Feasible(_) => None,
            CostDelta::Infeasible(violation) => Some(*violation),
        }
    }

    /// Feasible deltas order by cost and always come before infeasible ones.
    pub fn compare(&self, other: &CostDelta) -> Ordering {
        match (self.cost(), other.cost()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl From<Result<Cost, Violation>> for CostDelta {
    fn from(result: Result<Cost, Violation>) -> Self {
        match result {
            Ok(cost) => CostDelta::Feasible(cost),
            Err(violation) => CostDelta::Infeasible(violation),
        }
    }
}

use crate::{
    problem::vehicle_routing_problem::VehicleRoutingProblem,
    solver::{
        constraints::violation::Violation,
        ls::{
            inter_relocate::InterRelocateOperator, inter_swap::InterSwapOperator,
            relocate::RelocateOperator, two_opt::TwoOptOperator,
        },
        score::Cost,
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

pub trait LocalSearchOperator: Sized {
    /// Feeds every candidate move for the route pair `(r1, r2)`, `r1 <= r2`, to `consumer`.
    fn generate_moves<C>(
        problem: &VehicleRoutingProblem,
        solution: &WorkingSolution,
        pair: (RouteIdx, RouteIdx),
        consumer: C,
    ) where
        C: FnMut(Self);

    /// Objective change (distance plus priority penalty) if the move is applied.
    fn delta(&self, solution: &WorkingSolution) -> Cost;

    /// Re-evaluates the changed routes end to end.
    fn is_valid(&self, solution: &WorkingSolution) -> bool;

    fn apply(&self, solution: &mut WorkingSolution) -> Result<(), Violation>;

    fn updated_routes(&self) -> Vec<RouteIdx>;
}

#[derive(Debug)]
pub enum LocalSearchMove {
    /// Moves a stop to another position of the same route.
    Relocate(RelocateOperator),
    /// Moves a stop to another route.
    InterRelocate(InterRelocateOperator),
    /// Exchanges two stops between two routes.
    InterSwap(InterSwapOperator),
    /// Reverses a segment of a route.
    TwoOpt(TwoOptOperator),
}

impl LocalSearchMove {
    pub fn operator_name(&self) -> &'static str {
        match self {
            LocalSearchMove::Relocate(_) => "relocate",
            LocalSearchMove::InterRelocate(_) => "inter_relocate",
            LocalSearchMove::InterSwap(_) => "inter_swap",
            LocalSearchMove::TwoOpt(_) => "two_opt",
        }
    }

    pub fn delta(&self, solution: &WorkingSolution) -> Cost {
        match self {
            LocalSearchMove::Relocate(op) => op.delta(solution),
            LocalSearchMove::InterRelocate(op) => op.delta(solution),
            LocalSearchMove::InterSwap(op) => op.delta(solution),
            LocalSearchMove::TwoOpt(op) => op.delta(solution),
        }
    }

    pub fn is_valid(&self, solution: &WorkingSolution) -> bool {
        match self {
            LocalSearchMove::Relocate(op) => op.is_valid(solution),
            LocalSearchMove::InterRelocate(op) => op.is_valid(solution),
            LocalSearchMove::InterSwap(op) => op.is_valid(solution),
            LocalSearchMove::TwoOpt(op) => op.is_valid(solution),
        }
    }

    pub fn apply(&self, solution: &mut WorkingSolution) -> Result<(), Violation> {
        match self {
            LocalSearchMove::Relocate(op) => op.apply(solution),
            LocalSearchMove::InterRelocate(op) => op.apply(solution),
            LocalSearchMove::InterSwap(op) => op.apply(solution),
            LocalSearchMove::TwoOpt(op) => op.apply(solution),
        }
    }

    pub fn updated_routes(&self) -> Vec<RouteIdx> {
        match self {
            LocalSearchMove::Relocate(op) => op.updated_routes(),
            LocalSearchMove::InterRelocate(op) => op.updated_routes(),
            LocalSearchMove::InterSwap(op) => op.updated_routes(),
            LocalSearchMove::TwoOpt(op) => op.updated_routes(),
        }
    }
}

use crate::{
    problem::node::NodeIdx,
    solver::{
        constraints::compute_insertion_score::insertion_cost,
        score::{Cost, CostDelta},
        solution::{
            route::WorkingSolutionRoute, route_id::RouteIdx, working_solution::WorkingSolution,
        },
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceInsertion {
    pub route_id: RouteIdx,
    pub node: NodeIdx,
    pub position: usize,
}

/// Feasible insertion with its objective delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateInsertion {
    pub insertion: ServiceInsertion,
    pub cost: Cost,
}

impl CandidateInsertion {
    /// Orders by cost, then route, position and stop.
    pub fn key(&self) -> (Cost, RouteIdx, usize, NodeIdx) {
        (
            self.cost,
            self.insertion.route_id,
            self.insertion.position,
            self.insertion.node,
        )
    }
}

pub fn for_each_route_insertion(
    route_id: RouteIdx,
    route: &WorkingSolutionRoute,
    node: NodeIdx,
    mut f: impl FnMut(ServiceInsertion),
) {
    for position in 0..=route.len() {
        f(ServiceInsertion {
            route_id,
            node,
            position,
        });
    }
}

/// Cheapest feasible position for `node` in `route`, earliest position on ties.
pub fn best_route_insertion(
    solution: &WorkingSolution,
    route_id: RouteIdx,
    node: NodeIdx,
) -> Option<CandidateInsertion> {
    let problem = solution.problem();
    let route = solution.route(route_id);
    let mut best: Option<CandidateInsertion> = None;

    for_each_route_insertion(route_id, route, node, |insertion| {
        if let CostDelta::Feasible(cost) = insertion_cost(problem, route, insertion.position, node)
            && best.is_none_or(|best| cost < best.cost)
        {
            best = Some(CandidateInsertion { insertion, cost });
        }
    });

    best
}

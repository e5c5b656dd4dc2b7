use crate::{
    error::OptimizerError,
    problem::{
        node::{DEPOT, NodeIdx},
        time_window::{MINUTES_PER_DAY, Minutes},
        vehicle::VehicleIdx,
        vehicle_routing_problem::VehicleRoutingProblem,
    },
    solver::constraints::violation::Violation,
};

/// Timing of a single stop visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    /// Service start, never before the window opens.
    pub arrival: Minutes,
    pub waiting: Minutes,
    pub departure: Minutes,
}

/// Visits `node` when the vehicle can reach it at `earliest_arrival`.
#[inline]
pub fn compute_visit(
    problem: &VehicleRoutingProblem,
    node_id: NodeIdx,
    earliest_arrival: Minutes,
) -> Result<Visit, Violation> {
    let node = problem.node(node_id);
    let time_window = node.time_window();

    let arrival = time_window.service_start(earliest_arrival);
    let latest = time_window.end().min(MINUTES_PER_DAY);
    if arrival > latest {
        return Err(Violation::TimeWindow {
            node: node_id,
            arrival,
            latest,
        });
    }

    let waiting = time_window.waiting_duration(earliest_arrival);
    if let Some(max_waiting) = problem.max_waiting()
        && waiting > max_waiting
    {
        return Err(Violation::WaitingExceeded {
            node: node_id,
            waiting,
            max_waiting,
        });
    }

    Ok(Visit {
        arrival,
        waiting,
        departure: arrival + node.service_duration(),
    })
}

/// Depot departure of a route whose first stop is `first`.
///
/// Routes leave at the shift start. With a waiting cap the departure moves later
/// so the vehicle reaches the first stop as its window opens, never past
/// the end of the shift.
#[inline]
pub fn depot_departure(
    problem: &VehicleRoutingProblem,
    vehicle_id: VehicleIdx,
    first: Option<NodeIdx>,
) -> Minutes {
    let shift = problem.vehicle(vehicle_id).shift();

    match (problem.max_waiting(), first) {
        (Some(_), Some(node)) => {
            let slack_start =
                problem.node(node).time_window().start() - problem.travel_time(DEPOT, node);
            slack_start.min(shift.end()).max(shift.start())
        }
        _ => shift.start(),
    }
}

/// Arrival back at the depot after leaving `last` at `departure`.
#[inline]
pub fn compute_return(
    problem: &VehicleRoutingProblem,
    vehicle_id: VehicleIdx,
    last: NodeIdx,
    departure: Minutes,
) -> Result<Minutes, Violation> {
    let arrival = departure + problem.travel_time(last, DEPOT);
    let latest = problem
        .vehicle(vehicle_id)
        .shift()
        .end()
        .min(MINUTES_PER_DAY);

    if arrival > latest {
        Err(Violation::Shift { arrival, latest })
    } else {
        Ok(arrival)
    }
}

/// Arrival at `stops[position]`, or at the depot when `position == stops.len()`,
/// propagated from the route's depot departure.
pub fn arrival_at(
    problem: &VehicleRoutingProblem,
    vehicle_id: VehicleIdx,
    stops: &[NodeIdx],
    position: usize,
) -> Result<Minutes, OptimizerError> {
    if position > stops.len() {
        return Err(OptimizerError::InvalidInput(format!(
            "position {position} is past the end of a {} stop route",
            stops.len()
        )));
    }

    let mut previous = DEPOT;
    let mut departure = depot_departure(problem, vehicle_id, stops.first().copied());

    for &node in &stops[..position] {
        let visit = compute_visit(problem, node, departure + problem.travel_time(previous, node))
            .map_err(|violation| violation.into_error(problem, vehicle_id))?;
        previous = node;
        departure = visit.departure;
    }

    if position == stops.len() {
        return compute_return(problem, vehicle_id, previous, departure)
            .map_err(|violation| violation.into_error(problem, vehicle_id));
    }

    let node = stops[position];
    compute_visit(problem, node, departure + problem.travel_time(previous, node))
        .map(|visit| visit.arrival)
        .map_err(|violation| violation.into_error(problem, vehicle_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, TestStop};

    #[test]
    fn test_arrival_waits_for_window() {
        let problem = test_utils::create_problem(
            &[TestStop::at(0.0, 0.01).window(30, 100).service(5)],
            &[10],
        );
        let vehicle = VehicleIdx::new(0);
        let stops = [NodeIdx::new(1)];

        assert_eq!(arrival_at(&problem, vehicle, &stops, 0), Ok(30));
        assert_eq!(arrival_at(&problem, vehicle, &stops, 1), Ok(37));
    }

    #[test]
    fn test_late_arrival_is_a_time_window_violation() {
        let problem = test_utils::create_problem(&[TestStop::at(0.0, 0.01).window(0, 1)], &[10]);

        let error = arrival_at(&problem, VehicleIdx::new(0), &[NodeIdx::new(1)], 0).unwrap_err();

        assert!(matches!(
            error,
            OptimizerError::TimeWindowViolation {
                arrival: 2,
                latest: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_waiting_cap() {
        let problem = test_utils::create_problem_with(
            &[TestStop::at(0.0, 0.01).window(60, 100)],
            &[10],
            |builder| {
                builder.set_max_waiting(Some(30));
            },
        );

        assert_eq!(
            compute_visit(&problem, NodeIdx::new(1), 2),
            Err(Violation::WaitingExceeded {
                node: NodeIdx::new(1),
                waiting: 58,
                max_waiting: 30
            })
        );
        assert_eq!(
            compute_visit(&problem, NodeIdx::new(1), 40),
            Ok(Visit {
                arrival: 60,
                waiting: 20,
                departure: 60
            })
        );
    }

    #[test]
    fn test_inverted_window_cannot_be_served() {
        let problem =
            test_utils::create_problem(&[TestStop::at(0.0, 0.01).window(600, 540)], &[10]);

        assert_eq!(
            compute_visit(&problem, NodeIdx::new(1), 2),
            Err(Violation::TimeWindow {
                node: NodeIdx::new(1),
                arrival: 600,
                latest: 540
            })
        );
        assert!(matches!(
            arrival_at(&problem, VehicleIdx::new(0), &[NodeIdx::new(1)], 0),
            Err(OptimizerError::TimeWindowViolation {
                arrival: 600,
                latest: 540,
                ..
            })
        ));
    }

    #[test]
    fn test_waiting_cap_delays_depot_departure() {
        let problem = test_utils::create_problem_with(
            &[TestStop::at(0.0, 0.01).window(600, 660)],
            &[10],
            |builder| {
                builder.set_max_waiting(Some(30));
            },
        );
        let vehicle = VehicleIdx::new(0);
        let stops = [NodeIdx::new(1)];

        assert_eq!(depot_departure(&problem, vehicle, Some(NodeIdx::new(1))), 598);
        assert_eq!(depot_departure(&problem, vehicle, None), 0);
        assert_eq!(arrival_at(&problem, vehicle, &stops, 0), Ok(600));
        assert_eq!(arrival_at(&problem, vehicle, &stops, 1), Ok(602));
    }

    #[test]
    fn test_departure_stays_at_shift_start_without_waiting_cap() {
        let problem = test_utils::create_problem_with_shifts(
            &[TestStop::at(0.0, 0.01).window(600, 660)],
            &[(10, 480, 1020)],
        );

        assert_eq!(
            depot_departure(&problem, VehicleIdx::new(0), Some(NodeIdx::new(1))),
            480
        );
    }

    #[test]
    fn test_delayed_departure_is_bounded_by_shift() {
        let problem = test_utils::build(
            &[
                TestStop::at(0.0, 0.01).window(1200, 1300),
                TestStop::at(0.0, 0.01).window(0, 100),
            ],
            &[(10, 480, 900)],
            |builder| {
                builder.set_max_waiting(Some(30));
            },
        );
        let vehicle = VehicleIdx::new(0);

        assert_eq!(depot_departure(&problem, vehicle, Some(NodeIdx::new(1))), 900);
        assert_eq!(depot_departure(&problem, vehicle, Some(NodeIdx::new(2))), 480);
    }

    #[test]
    fn test_return_bounded_by_shift_end() {
        let problem = test_utils::create_problem_with_shifts(
            &[TestStop::at(0.0, 0.01)],
            &[(10, 0, 3)],
        );

        assert_eq!(
            compute_return(&problem, VehicleIdx::new(0), NodeIdx::new(1), 2),
            Err(Violation::Shift {
                arrival: 4,
                latest: 3
            })
        );
        assert_eq!(
            compute_return(&problem, VehicleIdx::new(0), NodeIdx::new(1), 1),
            Ok(3)
        );
    }
}

use std::{fs::File, path::PathBuf};

use jiff::SignedDuration;
use relay_optimizer::{
    OptimizationResult, OptimizeParams, OptimizerError,
    json::types::JsonOptimizationRequest,
    problem::records::{ShiftRecord, StopRecord, TimeValue, VehicleRecord},
    solver::{
        construction::first_solution_strategy::FirstSolutionStrategy,
        solution::working_solution::UnassignedReason, solver_params::Threads,
    },
};
use serde_json::json;

const STRATEGIES: [FirstSolutionStrategy; 3] = [
    FirstSolutionStrategy::PathCheapestArc,
    FirstSolutionStrategy::GlobalCheapestArc,
    FirstSolutionStrategy::LocalCheapestArc,
];

fn fixture_path(fixture: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(fixture)
}

fn load_request(fixture: &str) -> JsonOptimizationRequest {
    let file = File::open(fixture_path(fixture)).unwrap();
    serde_json::from_reader(file).unwrap()
}

fn run_fixture(fixture: &str) -> OptimizationResult {
    let request = load_request(fixture);
    let mut params = OptimizeParams::default();
    request.apply_settings(&mut params);

    request.optimize(&params).unwrap()
}

fn params(strategy: FirstSolutionStrategy) -> OptimizeParams {
    let mut params = OptimizeParams::default();
    params.solver.first_solution_strategy = strategy;
    params.solver.time_limit = SignedDuration::from_secs(10);
    params.solver.threads = Threads::Multi(2);
    params
}

fn one_van() -> (Vec<VehicleRecord>, Vec<ShiftRecord>) {
    (
        vec![VehicleRecord::new("Van", 10.0)],
        vec![ShiftRecord::new("D1", "00:00", "24:00")],
    )
}

fn request_stop<'a>(request: &'a JsonOptimizationRequest, label: &str) -> &'a StopRecord {
    request
        .stops
        .iter()
        .find(|stop| stop.trimmed_name() == Some(label))
        .unwrap()
}

fn labels(result: &OptimizationResult, vehicle: usize) -> Vec<&str> {
    result.routes[vehicle]
        .iter()
        .map(|(label, _)| label.as_str())
        .collect()
}

#[test]
fn test_single_stop_round_trip() {
    let result = run_fixture("single_stop.json");

    assert_eq!(
        result.routes,
        vec![vec![
            ("CW8".to_owned(), 0),
            ("Corner Shop".to_owned(), 2),
            ("CW8".to_owned(), 4),
        ]]
    );
    assert_eq!(result.total_distance, 2 * 1111);
    assert_eq!(result.total_penalty, 0);
    assert_eq!(result.objective, 2 * 1111);
    assert!(result.unassigned_stops.is_empty());
    assert_eq!(
        result.itineraries[0].labels(),
        vec![
            "CW8 (Start)".to_owned(),
            "Corner Shop (Arr 00:02)".to_owned(),
            "CW8 (Return 00:04)".to_owned(),
        ]
    );
}

#[test]
fn test_urgent_stop_served_first() {
    let stops = vec![
        StopRecord::new("CW8", 0.0, 0.0),
        StopRecord::new("Routine", 0.0, 0.01).with_priority(1.0),
        StopRecord::new("Urgent", 0.0, 0.01).with_priority(5.0),
    ];
    let (vehicles, shifts) = one_van();

    for strategy in STRATEGIES {
        let result = relay_optimizer::optimize(&stops, &vehicles, &shifts, &params(strategy))
            .unwrap();

        assert_eq!(
            labels(&result, 0),
            vec!["CW8", "Urgent", "Routine", "CW8"],
            "{strategy}"
        );
        assert_eq!(result.total_penalty, 0);
    }
}

#[test]
fn test_oversized_stop_is_reported() {
    let stops = vec![
        StopRecord::new("CW8", 0.0, 0.0),
        StopRecord::new("A", 0.0, 0.01).with_demand(2.0),
        StopRecord::new("Too Big", 0.0, 0.02).with_demand(25.0),
        StopRecord::new("B", 0.01, 0.0).with_demand(3.0),
    ];
    let (vehicles, shifts) = one_van();

    let result = relay_optimizer::optimize(
        &stops,
        &vehicles,
        &shifts,
        &params(FirstSolutionStrategy::GlobalCheapestArc),
    )
    .unwrap();

    assert_eq!(result.unassigned_stops, vec!["Too Big".to_owned()]);
    assert_eq!(result.unassigned[0].reason, UnassignedReason::ExceedsCapacity);
    assert_eq!(result.routes[0].len(), 4);
    assert_eq!(
        result.unassignable_errors(),
        vec![OptimizerError::UnassignableStop {
            stop: "Too Big".to_owned(),
            reason: UnassignedReason::ExceedsCapacity.to_string(),
        }]
    );
}

#[test]
fn test_unreachable_window_only_drops_that_stop() {
    let stops = vec![
        StopRecord::new("CW8", 0.0, 0.0),
        StopRecord::new("Near", 0.0, 0.01),
        StopRecord::new("Far", 0.0, 0.5).with_window("00:00", "00:10"),
    ];
    let (vehicles, shifts) = one_van();

    for strategy in STRATEGIES {
        let result = relay_optimizer::optimize(&stops, &vehicles, &shifts, &params(strategy))
            .unwrap();

        assert_eq!(result.unassigned_stops, vec!["Far".to_owned()]);
        assert_eq!(
            result.unassigned[0].reason,
            UnassignedReason::UnreachableTimeWindow
        );
        assert_eq!(labels(&result, 0), vec!["CW8", "Near", "CW8"]);
        assert!(matches!(
            result.unassignable_errors()[0],
            OptimizerError::UnassignableStop { .. }
        ));
    }
}

#[test]
fn test_inverted_window_is_never_served() {
    let stops = vec![
        StopRecord::new("CW8", 0.0, 0.0),
        StopRecord::new("Near", 0.0, 0.01),
        StopRecord::new("Inverted", 0.0, 0.02).with_window("10:00", "09:00"),
    ];
    let (vehicles, shifts) = one_van();

    for strategy in STRATEGIES {
        let result = relay_optimizer::optimize(&stops, &vehicles, &shifts, &params(strategy))
            .unwrap();

        assert_eq!(result.unassigned_stops, vec!["Inverted".to_owned()], "{strategy}");
        assert_eq!(
            result.unassigned[0].reason,
            UnassignedReason::UnreachableTimeWindow
        );
        assert_eq!(labels(&result, 0), vec!["CW8", "Near", "CW8"]);
    }
}

#[test]
fn test_waiting_cap_delays_departure() {
    let stops = vec![
        StopRecord::new("CW8", 0.0, 0.0),
        StopRecord::new("A", 0.0, 0.01).with_window("10:00", "11:00"),
    ];
    let vehicles = vec![VehicleRecord::new("Van", 10.0)];
    let shifts = vec![ShiftRecord::new("D1", "08:00", "17:00")];

    for strategy in STRATEGIES {
        let mut params = params(strategy);
        params.solver.max_waiting = Some(30);

        let result = relay_optimizer::optimize(&stops, &vehicles, &shifts, &params).unwrap();

        assert_eq!(
            result.routes,
            vec![vec![
                ("CW8".to_owned(), 9 * 60 + 58),
                ("A".to_owned(), 10 * 60),
                ("CW8".to_owned(), 10 * 60 + 2),
            ]],
            "{strategy}"
        );
    }

    let result = relay_optimizer::optimize(
        &stops,
        &vehicles,
        &shifts,
        &params(FirstSolutionStrategy::PathCheapestArc),
    )
    .unwrap();
    assert_eq!(result.routes[0][0], ("CW8".to_owned(), 8 * 60));
}

#[test]
fn test_huge_demands_stay_within_capacity() {
    let stops = vec![
        StopRecord::new("CW8", 0.0, 0.0),
        StopRecord::new("A", 0.0, 0.01).with_demand(1e19),
        StopRecord::new("B", 0.0, 0.02).with_demand(1e19),
    ];
    let vehicles = vec![VehicleRecord::new("Van", 1.8e19)];
    let shifts = vec![ShiftRecord::new("D1", "00:00", "24:00")];

    for strategy in STRATEGIES {
        let result = relay_optimizer::optimize(&stops, &vehicles, &shifts, &params(strategy))
            .unwrap();

        assert_eq!(result.routes[0].len(), 3, "{strategy}");
        assert_eq!(result.unassigned.len(), 1);
        assert_eq!(
            result.unassigned[0].reason,
            UnassignedReason::NoFeasiblePosition
        );
    }

    let oversized = vec![VehicleRecord::new("Van", 1e20)];
    let result = relay_optimizer::optimize(
        &stops,
        &oversized,
        &shifts,
        &params(FirstSolutionStrategy::PathCheapestArc),
    );
    assert!(matches!(result, Err(OptimizerError::InvalidInput(_))));
}

#[test]
fn test_nothing_placeable_is_an_error() {
    let stops = vec![
        StopRecord::new("CW8", 0.0, 0.0),
        StopRecord::new("Far", 0.0, 0.5).with_window("00:00", "00:10"),
    ];
    let (vehicles, shifts) = one_van();

    let result = relay_optimizer::optimize(
        &stops,
        &vehicles,
        &shifts,
        &params(FirstSolutionStrategy::PathCheapestArc),
    );

    assert_eq!(
        result.err(),
        Some(OptimizerError::NoFeasibleSolution { stops: 1 })
    );
}

#[test]
fn test_depot_only_input_gives_empty_routes() {
    let stops = vec![StopRecord::new("CW8", 0.0, 0.0)];
    let (vehicles, shifts) = one_van();

    let result =
        relay_optimizer::optimize(&stops, &vehicles, &shifts, &OptimizeParams::default()).unwrap();

    assert_eq!(labels(&result, 0), vec!["CW8", "CW8"]);
    assert_eq!(result.objective, 0);
}

#[test]
fn test_input_errors() {
    let (vehicles, shifts) = one_van();

    let result = relay_optimizer::optimize(
        &[StopRecord::new("Elsewhere", 0.0, 0.0)],
        &vehicles,
        &shifts,
        &OptimizeParams::default(),
    );
    assert_eq!(
        result.err(),
        Some(OptimizerError::DepotNotFound {
            key: "CW8".to_owned(),
            matches: 0
        })
    );

    let stops = vec![
        StopRecord::new("CW8", 0.0, 0.0),
        StopRecord::new("A", 0.0, 0.01).with_window("8h", "17:00"),
    ];
    let result = relay_optimizer::optimize(&stops, &vehicles, &shifts, &OptimizeParams::default());
    assert_eq!(
        result.err(),
        Some(OptimizerError::InvalidTimeFormat {
            table: "stops",
            row: 1,
            field: "start_time",
            value: "8h".to_owned(),
        })
    );

    let mut params = OptimizeParams::default();
    params.speed_kmh = 0.0;
    let result = relay_optimizer::optimize(&stops[..1], &vehicles, &shifts, &params);
    assert!(matches!(result, Err(OptimizerError::InvalidInput(_))));
}

#[test]
fn test_missing_column_in_request() {
    let request: JsonOptimizationRequest = serde_json::from_value(json!({
        "stops": [
            { "name": "CW8", "latitude": 0.0, "longitude": 0.0, "demand": 0,
              "service_time": 0, "start_time": null, "end_time": null, "priority": 0 },
        ],
        "vehicles": [{ "type": "Van" }],
        "shifts": [{ "id": "D1", "start_time": "08:00", "end_time": "17:00" }],
    }))
    .unwrap();

    let result = request.optimize(&OptimizeParams::default());

    assert_eq!(
        result.err(),
        Some(OptimizerError::MissingField {
            table: "vehicles",
            field: "capacity"
        })
    );
}

#[test]
fn test_morning_round_respects_every_constraint() {
    let request = load_request("morning_round.json");
    let mut params = OptimizeParams::default();
    request.apply_settings(&mut params);

    let result = request.optimize(&params).unwrap();

    let mut unassigned = result.unassigned_stops.clone();
    unassigned.sort();
    assert_eq!(
        unassigned,
        vec![
            "Inverted Hours".to_owned(),
            "Late Night".to_owned(),
            "Pallet Drop".to_owned()
        ]
    );
    let inverted = result
        .unassigned
        .iter()
        .find(|report| report.stop == "Inverted Hours")
        .unwrap();
    assert_eq!(inverted.reason, UnassignedReason::UnreachableTimeWindow);

    let served: usize = result.itineraries.iter().map(|itinerary| itinerary.stops.len()).sum();
    assert_eq!(served + result.unassigned_stops.len(), 9);

    let capacities = [12, 15];
    let shift_ends = [16 * 60, 17 * 60];
    for (index, itinerary) in result.itineraries.iter().enumerate() {
        let load: u64 = itinerary
            .stops
            .iter()
            .map(|entry| request_stop(&request, &entry.label).to_stop(0).unwrap().demand())
            .sum();
        assert!(load <= capacities[index], "{} overloaded", itinerary.vehicle);
        assert!(itinerary.return_arrival <= shift_ends[index]);

        let mut previous_departure = itinerary.departure;
        for entry in &itinerary.stops {
            let window = *request_stop(&request, &entry.label)
                .to_stop(0)
                .unwrap()
                .time_window();
            assert!(entry.arrival >= previous_departure);
            assert!(
                window.start() <= entry.arrival && entry.arrival <= window.end(),
                "{} served at {} outside {:?}",
                entry.label,
                entry.arrival,
                window
            );
            previous_departure = entry.departure;
        }
    }

    assert!(result.objective <= result.statistics.initial_objective);
    assert_eq!(result.objective, result.total_distance + result.total_penalty);
}

#[test]
fn test_identical_inputs_give_identical_routes() {
    let request = load_request("morning_round.json");

    for strategy in STRATEGIES {
        let first = request.optimize(&params(strategy)).unwrap();
        let second = request.optimize(&params(strategy)).unwrap();

        assert_eq!(first.routes, second.routes, "{strategy}");
        assert_eq!(first.objective, second.objective);
    }
}

#[test]
fn test_numeric_time_cells() {
    let stops = vec![
        StopRecord::new("CW8", 0.0, 0.0),
        StopRecord::new("A", 0.0, 0.01)
            .with_window(TimeValue::Minutes(60.0), TimeValue::Minutes(120.0)),
    ];
    let (vehicles, shifts) = one_van();

    let result =
        relay_optimizer::optimize(&stops, &vehicles, &shifts, &OptimizeParams::default()).unwrap();

    assert_eq!(result.routes[0][1], ("A".to_owned(), 60));
    assert_eq!(result.itineraries[0].stops[0].departure, 60);
}

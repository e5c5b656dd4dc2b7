use std::sync::Arc;

use crate::{
    problem::{
        kmh::Kmh,
        location::Location,
        node::{Amount, Node, NodeIdx, Priority, StopBuilder},
        time_window::{Minutes, TimeWindow},
        vehicle::{Vehicle, VehicleShift},
        vehicle_routing_problem::{VehicleRoutingProblem, VehicleRoutingProblemBuilder},
    },
    solver::{
        insertion::ServiceInsertion,
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

/// Compact stop description, depot sits at (0, 0).
#[derive(Debug, Clone, Copy)]
pub struct TestStop {
    lat: f64,
    lon: f64,
    demand: Amount,
    service: Minutes,
    window: Option<(Minutes, Minutes)>,
    priority: Priority,
}

impl TestStop {
    pub fn at(lat: f64, lon: f64) -> Self {
        TestStop {
            lat,
            lon,
            demand: 0,
            service: 0,
            window: None,
            priority: 0,
        }
    }

    pub fn demand(mut self, demand: Amount) -> Self {
        self.demand = demand;
        self
    }

    pub fn service(mut self, minutes: Minutes) -> Self {
        self.service = minutes;
        self
    }

    pub fn window(mut self, start: Minutes, end: Minutes) -> Self {
        self.window = Some((start, end));
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    fn build(&self, index: usize) -> Node {
        let mut builder = StopBuilder::new(
            format!("S{}", index + 1),
            Location::from_lat_lon(self.lat, self.lon),
        );
        builder
            .set_demand(self.demand)
            .set_service_duration(self.service)
            .set_priority(self.priority);

        if let Some((start, end)) = self.window {
            builder.set_time_window(TimeWindow::new(start, end));
        }

        builder.build()
    }
}

pub fn create_problem(stops: &[TestStop], capacities: &[Amount]) -> VehicleRoutingProblem {
    create_problem_with(stops, capacities, |_| {})
}

/// Full-day shifts, 30 km/h, `configure` runs last.
pub fn create_problem_with(
    stops: &[TestStop],
    capacities: &[Amount],
    configure: impl FnOnce(&mut VehicleRoutingProblemBuilder),
) -> VehicleRoutingProblem {
    let vehicles = capacities
        .iter()
        .map(|&capacity| (capacity, 0, 1440))
        .collect::<Vec<_>>();

    build(stops, &vehicles, configure)
}

/// Vehicles as `(capacity, shift_start, shift_end)`.
pub fn create_problem_with_shifts(
    stops: &[TestStop],
    vehicles: &[(Amount, Minutes, Minutes)],
) -> VehicleRoutingProblem {
    build(stops, vehicles, |_| {})
}

/// Vehicles as `(capacity, shift_start, shift_end)`, `configure` runs last.
pub fn build(
    stops: &[TestStop],
    vehicles: &[(Amount, Minutes, Minutes)],
    configure: impl FnOnce(&mut VehicleRoutingProblemBuilder),
) -> VehicleRoutingProblem {
    let mut builder = VehicleRoutingProblemBuilder::default();

    builder
        .set_depot(Node::depot(
            "Depot".to_owned(),
            Location::from_lat_lon(0.0, 0.0),
        ))
        .set_stops(
            stops
                .iter()
                .enumerate()
                .map(|(index, stop)| stop.build(index))
                .collect(),
        )
        .set_vehicles(
            vehicles
                .iter()
                .enumerate()
                .map(|(index, &(capacity, start, end))| {
                    Vehicle::new(
                        format!("V{}", index + 1),
                        capacity,
                        VehicleShift::new(format!("D{}", index + 1), start, end),
                    )
                })
                .collect(),
        )
        .set_speed(Kmh::new(30.0).unwrap());

    configure(&mut builder);

    builder.build().unwrap()
}

/// `rows * cols` stops north-east of the depot with mixed demands and priorities.
pub fn create_stop_grid(rows: usize, cols: usize) -> Vec<TestStop> {
    (0..rows)
        .flat_map(|y| {
            (0..cols).map(move |x| {
                TestStop::at(0.005 * (y + 1) as f64, 0.005 * (x + 1) as f64)
                    .demand(1 + ((x + y) % 3) as Amount)
                    .priority(((x * 7 + y) % 3) as Priority)
                    .service(2)
            })
        })
        .collect()
}

/// Stops per route, by node index.
pub fn create_test_working_solution(
    problem: Arc<VehicleRoutingProblem>,
    routes: &[&[usize]],
) -> WorkingSolution {
    let mut solution = WorkingSolution::new(problem);

    for (route_id, stops) in routes.iter().enumerate() {
        for (position, &node) in stops.iter().enumerate() {
            solution
                .insert(&ServiceInsertion {
                    route_id: RouteIdx::new(route_id),
                    node: NodeIdx::new(node),
                    position,
                })
                .unwrap();
        }
    }

    solution
}

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use jiff::SignedDuration;
use relay_optimizer::{
    OptimizeParams, optimize,
    problem::{
        kmh::Kmh,
        location::Location,
        records::{ShiftRecord, StopRecord, VehicleRecord},
        travel_matrices::TravelMatrices,
    },
    solver::{
        construction::first_solution_strategy::FirstSolutionStrategy, solver_params::Threads,
    },
};

const GRID_STEP: f64 = 0.005;

fn stop_grid(rows: usize, cols: usize) -> Vec<StopRecord> {
    let mut stops = vec![StopRecord::new("CW8", 0.0, 0.0)];

    for y in 0..rows {
        for x in 0..cols {
            let index = y * cols + x;
            stops.push(
                StopRecord::new(
                    format!("S{index}"),
                    (y as f64 + 1.0) * GRID_STEP,
                    (x as f64 - cols as f64 / 2.0) * GRID_STEP,
                )
                .with_demand((index % 3 + 1) as f64)
                .with_service_time(5.0)
                .with_priority((index % 4) as f64),
            );
        }
    }

    stops
}

fn fleet(vehicles: usize) -> (Vec<VehicleRecord>, Vec<ShiftRecord>) {
    (
        (0..vehicles)
            .map(|index| VehicleRecord::new(format!("Van {index}"), 30.0))
            .collect(),
        (0..vehicles)
            .map(|index| ShiftRecord::new(format!("D{index}"), "07:00", "19:00"))
            .collect(),
    )
}

fn travel_matrices_benchmark(c: &mut Criterion) {
    let locations = stop_grid(20, 20)
        .iter()
        .filter_map(|stop| {
            Some(Location::from_lat_lon(
                *stop.latitude.value()?,
                *stop.longitude.value()?,
            ))
        })
        .collect::<Vec<_>>();
    let speed = Kmh::new(30.0).unwrap();

    c.bench_function("travel matrices 401 locations", |b| {
        b.iter(|| TravelMatrices::from_locations(black_box(&locations), speed).unwrap())
    });
}

fn optimize_benchmark(c: &mut Criterion) {
    let stops = stop_grid(8, 10);
    let (vehicles, shifts) = fleet(6);

    for strategy in [
        FirstSolutionStrategy::PathCheapestArc,
        FirstSolutionStrategy::GlobalCheapestArc,
        FirstSolutionStrategy::LocalCheapestArc,
    ] {
        let mut params = OptimizeParams::default();
        params.solver.first_solution_strategy = strategy;
        params.solver.time_limit = SignedDuration::from_secs(5);
        params.solver.threads = Threads::Auto;

        c.bench_function(&format!("optimize 80 stops ({strategy})"), |b| {
            b.iter(|| optimize(black_box(&stops), &vehicles, &shifts, &params).unwrap())
        });
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = travel_matrices_benchmark, optimize_benchmark
}
criterion_main!(benches);

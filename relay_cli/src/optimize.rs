use std::{fs::File, io::BufReader, path::PathBuf};

use clap::Args;
use relay_optimizer::{
    OptimizeParams,
    json::types::JsonOptimizationRequest,
    problem::time_window::Minutes,
    solver::{
        construction::first_solution_strategy::FirstSolutionStrategy, solver_params::Threads,
    },
};
use tracing::{info, warn};

use crate::{parsers, report};

#[derive(Args)]
pub struct OptimizeArgs {
    /// The request file: stops, vehicles and shifts
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Time budget for the search (e.g., "30s", "5m", "PT1M")
    #[arg(short, long, value_parser = parsers::parse_duration)]
    timeout: Option<jiff::SignedDuration>,

    /// First solution strategy (path-cheapest-arc, global-cheapest-arc, local-cheapest-arc)
    #[arg(short, long)]
    strategy: Option<FirstSolutionStrategy>,

    /// "auto" or a number of worker threads
    #[arg(long, value_parser = parsers::parse_threads)]
    threads: Option<Threads>,

    /// Average vehicle speed in km/h
    #[arg(long)]
    speed: Option<f64>,

    /// Name of the depot stop
    #[arg(long)]
    depot: Option<String>,

    /// Longest a vehicle may wait at a stop, in minutes
    #[arg(long)]
    max_waiting: Option<Minutes>,

    #[arg(long, short = 'n')]
    iterations: Option<usize>,

    /// Writes the full result as JSON
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,
}

impl OptimizeArgs {
    fn apply(&self, params: &mut OptimizeParams) {
        if let Some(timeout) = self.timeout {
            params.solver.time_limit = timeout;
        }

        if let Some(strategy) = self.strategy {
            params.solver.first_solution_strategy = strategy;
        }

        if let Some(threads) = &self.threads {
            params.solver.threads = threads.clone();
        }

        if let Some(speed) = self.speed {
            params.speed_kmh = speed;
        }

        if let Some(depot) = &self.depot {
            params.depot_key = depot.clone();
        }

        if let Some(max_waiting) = self.max_waiting {
            params.solver.max_waiting = Some(max_waiting);
        }

        if let Some(iterations) = self.iterations {
            params.solver.max_iterations = Some(iterations);
        }
    }
}

pub fn run(args: OptimizeArgs) -> anyhow::Result<()> {
    let file = File::open(&args.input)?;
    let request: JsonOptimizationRequest = serde_json::from_reader(BufReader::new(file))?;

    let mut params = OptimizeParams::default();
    request.apply_settings(&mut params);
    args.apply(&mut params);

    let result = request.optimize(&params)?;

    for error in result.unassignable_errors() {
        warn!("{error}");
    }

    report::print_route_sheets(&result);

    info!(
        "Finished: routes = {}, distance = {} m, penalty = {}, unassigned = {}",
        result
            .itineraries
            .iter()
            .filter(|itinerary| !itinerary.is_empty())
            .count(),
        result.total_distance,
        result.total_penalty,
        result.unassigned_stops.len(),
    );

    if let Some(out) = args.out {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(out, serde_json::to_string_pretty(&result)?)?;
    }

    Ok(())
}

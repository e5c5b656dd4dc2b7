use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    error::OptimizerError,
    problem::{
        kmh::Kmh,
        records::{ShiftRecord, StopRecord, VehicleRecord},
        time_window::Minutes,
        vehicle_routing_problem::{DEFAULT_SPEED_KMH, VehicleRoutingProblemBuilder},
    },
    solver::{
        schedule::VehicleItinerary,
        score::Cost,
        solution::working_solution::UnassignedReason,
        solver::{Solver, SolverOutcome},
        solver_params::SolverParams,
        statistics::SearchStatistics,
    },
};

pub const DEFAULT_DEPOT_KEY: &str = "CW8";

#[derive(Debug, Clone)]
pub struct OptimizeParams {
    /// Name of the stop record that is the depot.
    pub depot_key: String,
    pub speed_kmh: f64,
    pub solver: SolverParams,
}

impl Default for OptimizeParams {
    fn default() -> Self {
        OptimizeParams {
            depot_key: DEFAULT_DEPOT_KEY.to_owned(),
            speed_kmh: DEFAULT_SPEED_KMH,
            solver: SolverParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnassignedStopReport {
    pub stop: String,
    pub reason: UnassignedReason,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    /// Per vehicle: the depot departure, each stop arrival and the return, as `(label, minutes)`.
    pub routes: Vec<Vec<(String, Minutes)>>,
    pub itineraries: Vec<VehicleItinerary>,
    pub unassigned_stops: Vec<String>,
    pub unassigned: Vec<UnassignedStopReport>,
    pub objective: Cost,
    pub total_distance: Cost,
    pub total_penalty: Cost,
    pub statistics: SearchStatistics,
}

impl OptimizationResult {
    /// One `UnassignableStop` per stop left out of every route.
    pub fn unassignable_errors(&self) -> Vec<OptimizerError> {
        self.unassigned
            .iter()
            .map(|report| OptimizerError::UnassignableStop {
                stop: report.stop.clone(),
                reason: report.reason.to_string(),
            })
            .collect()
    }
}

/// Builds the problem from raw records and solves it.
#[instrument(skip_all, level = "debug")]
pub fn optimize(
    stops: &[StopRecord],
    vehicles: &[VehicleRecord],
    shifts: &[ShiftRecord],
    params: &OptimizeParams,
) -> Result<OptimizationResult, OptimizerError> {
    let mut builder =
        VehicleRoutingProblemBuilder::from_records(stops, vehicles, shifts, &params.depot_key)?;
    builder
        .set_speed(Kmh::new(params.speed_kmh)?)
        .set_max_waiting(params.solver.max_waiting);
    let problem = builder.build()?;

    info!(
        stops = problem.num_stops(),
        vehicles = problem.vehicles().len(),
        strategy = %params.solver.first_solution_strategy,
        "Optimizing routes"
    );

    let solver = Solver::new(problem, params.solver.clone());
    let SolverOutcome {
        solution,
        itineraries,
        statistics,
    } = solver.solve()?;

    let unassigned = solution
        .unassigned()
        .iter()
        .map(|stop| UnassignedStopReport {
            stop: solver.problem().node(stop.node).label().to_owned(),
            reason: stop.reason,
        })
        .collect::<Vec<_>>();

    Ok(OptimizationResult {
        routes: itineraries
            .iter()
            .map(VehicleItinerary::stop_arrivals)
            .collect(),
        unassigned_stops: unassigned.iter().map(|report| report.stop.clone()).collect(),
        unassigned,
        objective: solution.objective(),
        total_distance: solution.total_distance(),
        total_penalty: solution.total_penalty(),
        itineraries,
        statistics,
    })
}

use jiff::SignedDuration;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    error::OptimizerError,
    problem::{
        records::{ShiftRecord, StopRecord, VehicleRecord},
        time_window::Minutes,
    },
    solver::{
        construction::first_solution_strategy::FirstSolutionStrategy,
        optimize::{OptimizationResult, OptimizeParams, optimize},
    },
};

/// A full optimization request: the three input tables plus optional settings.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "OptimizationRequest")]
pub struct JsonOptimizationRequest {
    /// Name of the depot stop, `CW8` when omitted.
    pub depot: Option<String>,
    pub speed_kmh: Option<f64>,
    pub search_strategy: Option<FirstSolutionStrategy>,
    pub time_limit: Option<SignedDuration>,
    pub max_iterations: Option<usize>,
    pub max_waiting: Option<Minutes>,

    pub stops: Vec<StopRecord>,
    pub vehicles: Vec<VehicleRecord>,
    #[serde(alias = "drivers")]
    pub shifts: Vec<ShiftRecord>,
}

impl JsonOptimizationRequest {
    /// Overrides `params` with every setting present in the request.
    pub fn apply_settings(&self, params: &mut OptimizeParams) {
        if let Some(depot) = &self.depot {
            params.depot_key = depot.clone();
        }

        if let Some(speed_kmh) = self.speed_kmh {
            params.speed_kmh = speed_kmh;
        }

        if let Some(strategy) = self.search_strategy {
            params.solver.first_solution_strategy = strategy;
        }

        if let Some(time_limit) = self.time_limit {
            params.solver.time_limit = time_limit;
        }

        if let Some(max_iterations) = self.max_iterations {
            params.solver.max_iterations = Some(max_iterations);
        }

        if let Some(max_waiting) = self.max_waiting {
            params.solver.max_waiting = Some(max_waiting);
        }
    }

    pub fn optimize(&self, params: &OptimizeParams) -> Result<OptimizationResult, OptimizerError> {
        optimize(&self.stops, &self.vehicles, &self.shifts, params)
    }
}

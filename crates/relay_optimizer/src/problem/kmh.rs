use serde::{Deserialize, Serialize};

use crate::{
    error::OptimizerError,
    problem::{time_window::Minutes, travel_matrices::Distance},
};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Kmh(f64);

impl Kmh {
    pub fn new(value: f64) -> Result<Self, OptimizerError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(OptimizerError::InvalidInput(format!(
                "speed factor must be a positive number of km/h, got {value}"
            )));
        }

        Ok(Kmh(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Whole minutes needed to cover `distance` meters, truncated.
    pub fn travel_time(&self, distance: Distance) -> Minutes {
        ((distance as f64 / 1000.0) / self.0 * 60.0) as Minutes
    }
}

pub fn travel_time_minutes(
    distance_meters: Distance,
    speed_kmh: f64,
) -> Result<Minutes, OptimizerError> {
    Ok(Kmh::new(speed_kmh)?.travel_time(distance_meters))
}

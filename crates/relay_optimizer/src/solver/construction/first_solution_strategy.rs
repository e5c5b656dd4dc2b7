use std::{fmt::Display, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::OptimizerError;

/// Candidate ordering used to build the first solution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FirstSolutionStrategy {
    /// Extends each vehicle's path with the cheapest feasible next stop.
    #[default]
    PathCheapestArc,
    /// Repeatedly commits the cheapest (stop, vehicle, position) over all pending stops.
    GlobalCheapestArc,
    /// Places stops in input order, each at its own cheapest position.
    LocalCheapestArc,
}

impl Display for FirstSolutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PathCheapestArc => write!(f, "PATH_CHEAPEST_ARC"),
            Self::GlobalCheapestArc => write!(f, "GLOBAL_CHEAPEST_ARC"),
            Self::LocalCheapestArc => write!(f, "LOCAL_CHEAPEST_ARC"),
        }
    }
}

impl FromStr for FirstSolutionStrategy {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "PATH_CHEAPEST_ARC" => Ok(Self::PathCheapestArc),
            "GLOBAL_CHEAPEST_ARC" => Ok(Self::GlobalCheapestArc),
            "LOCAL_CHEAPEST_ARC" => Ok(Self::LocalCheapestArc),
            _ => Err(OptimizerError::InvalidInput(format!(
                "unknown search strategy '{s}'"
            ))),
        }
    }
}

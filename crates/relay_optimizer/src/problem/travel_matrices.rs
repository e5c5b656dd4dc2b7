use rayon::prelude::*;
use tracing::instrument;

use crate::{
    error::OptimizerError,
    problem::{kmh::Kmh, location::Location, node::NodeIdx, time_window::Minutes},
};

/// Meters.
pub type Distance = u64;

/// Dense row-major distance and travel-time matrices over every node, depot included.
#[derive(Debug, Clone)]
pub struct TravelMatrices {
    distances: Vec<Distance>,
    times: Vec<Minutes>,
    num_locations: usize,
}

impl TravelMatrices {
    #[instrument(skip_all, level = "debug")]
    pub fn from_locations(locations: &[Location], speed: Kmh) -> Result<Self, OptimizerError> {
        if locations.is_empty() {
            return Err(OptimizerError::InvalidInput(
                "cannot build a travel matrix without locations".to_owned(),
            ));
        }

        let num_locations = locations.len();

        let distances: Vec<Distance> = (0..num_locations)
            .into_par_iter()
            .flat_map_iter(|i| {
                (0..num_locations).map(move |j| {
                    if i == j {
                        return 0;
                    }

                    // (i, j) and (j, i) must agree bit for bit.
                    let (a, b) = (i.min(j), i.max(j));
                    locations[a].haversine_distance(&locations[b]) as Distance
                })
            })
            .collect();

        let times = distances
            .par_iter()
            .map(|&distance| speed.travel_time(distance))
            .collect();

        Ok(TravelMatrices {
            distances,
            times,
            num_locations,
        })
    }

    #[inline(always)]
    fn get_index(&self, from: NodeIdx, to: NodeIdx) -> usize {
        from.get() * self.num_locations + to.get()
    }

    #[inline(always)]
    pub fn travel_distance(&self, from: NodeIdx, to: NodeIdx) -> Distance {
        self.distances[self.get_index(from, to)]
    }

    #[inline(always)]
    pub fn travel_time(&self, from: NodeIdx, to: NodeIdx) -> Minutes {
        self.times[self.get_index(from, to)]
    }

    pub fn num_locations(&self) -> usize {
        self.num_locations
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.num_locations).all(|i| {
            (i + 1..self.num_locations).all(|j| {
                let (a, b) = (NodeIdx::new(i), NodeIdx::new(j));
                self.travel_distance(a, b) == self.travel_distance(b, a)
            })
        })
    }
}

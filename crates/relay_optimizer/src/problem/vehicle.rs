use serde::Serialize;

use crate::{
    define_index_newtype,
    problem::{
        node::Amount,
        time_window::{MINUTES_PER_DAY, Minutes},
    },
};

define_index_newtype!(VehicleIdx, Vehicle);

#[derive(Serialize, Debug, Clone)]
pub struct Vehicle {
    external_id: String,
    capacity: Amount,
    shift: VehicleShift,
}

impl Vehicle {
    pub fn new(external_id: impl Into<String>, capacity: Amount, shift: VehicleShift) -> Self {
        Vehicle {
            external_id: external_id.into(),
            capacity,
            shift,
        }
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn capacity(&self) -> Amount {
        self.capacity
    }

    pub fn shift(&self) -> &VehicleShift {
        &self.shift
    }
}

/// Driver working hours, paired with the vehicle at the same position.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct VehicleShift {
    driver_id: String,
    start: Minutes,
    end: Minutes,
}

impl VehicleShift {
    pub fn new(driver_id: impl Into<String>, start: Minutes, end: Minutes) -> Self {
        VehicleShift {
            driver_id: driver_id.into(),
            start,
            end,
        }
    }

    pub fn full_day(driver_id: impl Into<String>) -> Self {
        VehicleShift::new(driver_id, 0, MINUTES_PER_DAY)
    }

    pub fn driver_id(&self) -> &str {
        &self.driver_id
    }

    /// Departure from the depot.
    pub fn start(&self) -> Minutes {
        self.start
    }

    /// Latest return to the depot.
    pub fn end(&self) -> Minutes {
        self.end
    }
}

use serde::Serialize;

use crate::{
    define_index_newtype,
    problem::{location::Location, time_window::TimeWindow},
};

define_index_newtype!(NodeIdx, Node);

/// Index 0 is always the depot, stops follow in input order.
pub const DEPOT: NodeIdx = NodeIdx::new(0);

pub type Amount = u64;
pub type Priority = i64;

#[derive(Debug, Clone, Serialize)]
pub struct Node {
    label: String,
    location: Location,
    demand: Amount,
    service_duration: i64,
    time_window: TimeWindow,
    priority: Priority,
}

impl Node {
    pub fn depot(label: String, location: Location) -> Self {
        Node {
            label,
            location,
            demand: 0,
            service_duration: 0,
            time_window: TimeWindow::full_day(),
            priority: 0,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn demand(&self) -> Amount {
        self.demand
    }

    pub fn service_duration(&self) -> i64 {
        self.service_duration
    }

    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }
}

pub struct StopBuilder {
    label: String,
    location: Location,
    demand: Option<Amount>,
    service_duration: Option<i64>,
    time_window: Option<TimeWindow>,
    priority: Option<Priority>,
}

impl StopBuilder {
    pub fn new(label: impl Into<String>, location: Location) -> Self {
        StopBuilder {
            label: label.into(),
            location,
            demand: None,
            service_duration: None,
            time_window: None,
            priority: None,
        }
    }

    pub fn set_demand(&mut self, demand: Amount) -> &mut StopBuilder {
        self.demand = Some(demand);
        self
    }

    pub fn set_service_duration(&mut self, minutes: i64) -> &mut StopBuilder {
        self.service_duration = Some(minutes);
        self
    }

    pub fn set_time_window(&mut self, time_window: TimeWindow) -> &mut StopBuilder {
        self.time_window = Some(time_window);
        self
    }

    pub fn set_priority(&mut self, priority: Priority) -> &mut StopBuilder {
        self.priority = Some(priority);
        self
    }

    pub fn build(self) -> Node {
        Node {
            label: self.label,
            location: self.location,
            demand: self.demand.unwrap_or(0),
            service_duration: self.service_duration.unwrap_or(0),
            time_window: self.time_window.unwrap_or(TimeWindow::new(
                0,
                crate::problem::time_window::DEFAULT_STOP_END,
            )),
            priority: self.priority.unwrap_or(0),
        }
    }
}

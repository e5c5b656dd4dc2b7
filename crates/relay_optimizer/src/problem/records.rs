use std::{borrow::Cow, fmt};

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    error::OptimizerError,
    problem::{
        location::Location,
        node::{Amount, Node, Priority, StopBuilder},
        time_window::{DEFAULT_STOP_END, MINUTES_PER_DAY, Minutes, TimeWindow, parse_time_of_day},
        vehicle::{Vehicle, VehicleShift},
    },
};

pub const STOPS_TABLE: &str = "stops";
pub const VEHICLES_TABLE: &str = "vehicles";
pub const SHIFTS_TABLE: &str = "shifts";

/// A tabular cell: the column can be missing from the record, present but empty, or filled.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<T> {
    Absent,
    Blank,
    Value(T),
}

impl<T> Default for Cell<T> {
    fn default() -> Self {
        Cell::Absent
    }
}

impl<T> From<T> for Cell<T> {
    fn from(value: T) -> Self {
        Cell::Value(value)
    }
}

impl<T> Cell<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Cell::Absent)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Cell::Value(value) => Some(value),
            Cell::Absent | Cell::Blank => None,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Cell<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Cell::Value(value),
            None => Cell::Blank,
        })
    }
}

impl<T: Serialize> Serialize for Cell<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value().serialize(serializer)
    }
}

impl<T: JsonSchema> JsonSchema for Cell<T> {
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> Cow<'static, str> {
        Option::<T>::schema_name()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        Option::<T>::json_schema(generator)
    }
}

/// Time cells come either as text (`"08:30"`) or as a number of minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TimeValue {
    Minutes(f64),
    Text(String),
}

impl TimeValue {
    pub fn to_minutes(&self) -> Option<Minutes> {
        match self {
            TimeValue::Minutes(value) => crate::problem::time_window::parse_minutes(*value),
            TimeValue::Text(text) => parse_time_of_day(text),
        }
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeValue::Minutes(value) => write!(f, "{value}"),
            TimeValue::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<&str> for TimeValue {
    fn from(value: &str) -> Self {
        TimeValue::Text(value.to_owned())
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StopRecord {
    #[serde(alias = "Warehouse Name")]
    pub name: Cell<String>,
    pub latitude: Cell<f64>,
    pub longitude: Cell<f64>,
    pub demand: Cell<f64>,
    pub service_time: Cell<f64>,
    pub start_time: Cell<TimeValue>,
    pub end_time: Cell<TimeValue>,
    pub priority: Cell<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VehicleRecord {
    #[serde(rename = "type")]
    pub vehicle_type: Cell<String>,
    pub capacity: Cell<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ShiftRecord {
    #[serde(alias = "driver_id")]
    pub id: Cell<String>,
    pub start_time: Cell<TimeValue>,
    pub end_time: Cell<TimeValue>,
}

impl StopRecord {
    /// A record with every column present, optional ones left blank.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        StopRecord {
            name: Cell::Value(name.into()),
            latitude: Cell::Value(latitude),
            longitude: Cell::Value(longitude),
            demand: Cell::Blank,
            service_time: Cell::Blank,
            start_time: Cell::Blank,
            end_time: Cell::Blank,
            priority: Cell::Blank,
        }
    }

    pub fn with_demand(mut self, demand: f64) -> Self {
        self.demand = Cell::Value(demand);
        self
    }

    pub fn with_service_time(mut self, minutes: f64) -> Self {
        self.service_time = Cell::Value(minutes);
        self
    }

    pub fn with_window(mut self, start: impl Into<TimeValue>, end: impl Into<TimeValue>) -> Self {
        self.start_time = Cell::Value(start.into());
        self.end_time = Cell::Value(end.into());
        self
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = Cell::Value(priority);
        self
    }

    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("name", self.name.is_absent()),
            ("latitude", self.latitude.is_absent()),
            ("longitude", self.longitude.is_absent()),
            ("demand", self.demand.is_absent()),
            ("service_time", self.service_time.is_absent()),
            ("start_time", self.start_time.is_absent()),
            ("end_time", self.end_time.is_absent()),
            ("priority", self.priority.is_absent()),
        ]
        .into_iter()
        .find_map(|(field, absent)| absent.then_some(field))
    }

    pub fn trimmed_name(&self) -> Option<&str> {
        self.name.value().map(|name| name.trim())
    }

    fn label(&self, row: usize) -> String {
        match self.trimmed_name() {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => format!("stop-{row}"),
        }
    }

    fn location(&self, row: usize) -> Result<Location, OptimizerError> {
        let (Some(&lat), Some(&lon)) = (self.latitude.value(), self.longitude.value()) else {
            return Err(OptimizerError::InvalidInput(format!(
                "{STOPS_TABLE} row {row} has no coordinates"
            )));
        };

        let location = Location::from_lat_lon(lat, lon);
        if !location.is_valid() {
            return Err(OptimizerError::InvalidInput(format!(
                "{STOPS_TABLE} row {row} has invalid coordinates ({lat}, {lon})"
            )));
        }

        Ok(location)
    }

    pub fn to_depot(&self, row: usize) -> Result<Node, OptimizerError> {
        Ok(Node::depot(self.label(row), self.location(row)?))
    }

    pub fn to_stop(&self, row: usize) -> Result<Node, OptimizerError> {
        let demand = amount(&self.demand, STOPS_TABLE, "demand", row)?;
        let service_time = non_negative(&self.service_time, STOPS_TABLE, "service_time", row)?;
        let priority = finite(&self.priority, STOPS_TABLE, "priority", row)?;
        let start = time_of_day(&self.start_time, STOPS_TABLE, "start_time", row)?;
        let end = time_of_day(&self.end_time, STOPS_TABLE, "end_time", row)?;

        let mut builder = StopBuilder::new(self.label(row), self.location(row)?);
        builder
            .set_demand(demand)
            .set_service_duration(service_time.unwrap_or(0.0) as Minutes)
            .set_priority(priority.unwrap_or(0.0) as Priority)
            .set_time_window(TimeWindow::new(
                start.unwrap_or(0),
                end.unwrap_or(DEFAULT_STOP_END),
            ));

        Ok(builder.build())
    }
}

impl VehicleRecord {
    pub fn new(vehicle_type: impl Into<String>, capacity: f64) -> Self {
        VehicleRecord {
            vehicle_type: Cell::Value(vehicle_type.into()),
            capacity: Cell::Value(capacity),
        }
    }

    pub fn missing_field(&self) -> Option<&'static str> {
        if self.vehicle_type.is_absent() {
            Some("type")
        } else if self.capacity.is_absent() {
            Some("capacity")
        } else {
            None
        }
    }

    pub fn to_vehicle(&self, row: usize, shift: VehicleShift) -> Result<Vehicle, OptimizerError> {
        let capacity = amount(&self.capacity, VEHICLES_TABLE, "capacity", row)?;
        let external_id = match self.vehicle_type.value().map(|name| name.trim()) {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => format!("vehicle-{row}"),
        };

        Ok(Vehicle::new(external_id, capacity, shift))
    }
}

impl ShiftRecord {
    pub fn new(
        id: impl Into<String>,
        start: impl Into<TimeValue>,
        end: impl Into<TimeValue>,
    ) -> Self {
        ShiftRecord {
            id: Cell::Value(id.into()),
            start_time: Cell::Value(start.into()),
            end_time: Cell::Value(end.into()),
        }
    }

    pub fn missing_field(&self) -> Option<&'static str> {
        if self.id.is_absent() {
            Some("id")
        } else if self.start_time.is_absent() {
            Some("start_time")
        } else if self.end_time.is_absent() {
            Some("end_time")
        } else {
            None
        }
    }

    pub fn to_shift(&self, row: usize) -> Result<VehicleShift, OptimizerError> {
        let start = time_of_day(&self.start_time, SHIFTS_TABLE, "start_time", row)?.unwrap_or(0);
        let end = time_of_day(&self.end_time, SHIFTS_TABLE, "end_time", row)?
            .unwrap_or(MINUTES_PER_DAY);

        if start > end {
            return Err(OptimizerError::InvalidInput(format!(
                "{SHIFTS_TABLE} row {row} starts after it ends"
            )));
        }

        let driver_id = match self.id.value().map(|id| id.trim()) {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => format!("driver-{row}"),
        };

        Ok(VehicleShift::new(driver_id, start, end))
    }
}

fn finite(
    cell: &Cell<f64>,
    table: &'static str,
    field: &'static str,
    row: usize,
) -> Result<Option<f64>, OptimizerError> {
    match cell.value() {
        Some(value) if !value.is_finite() => Err(OptimizerError::InvalidInput(format!(
            "{table} row {row}: '{field}' must be a finite number"
        ))),
        value => Ok(value.copied()),
    }
}

fn non_negative(
    cell: &Cell<f64>,
    table: &'static str,
    field: &'static str,
    row: usize,
) -> Result<Option<f64>, OptimizerError> {
    match finite(cell, table, field, row)? {
        Some(value) if value < 0.0 => Err(OptimizerError::InvalidInput(format!(
            "{table} row {row}: '{field}' must not be negative, got {value}"
        ))),
        value => Ok(value),
    }
}

/// Whole units of a load cell, blank as 0. Fractions are truncated.
fn amount(
    cell: &Cell<f64>,
    table: &'static str,
    field: &'static str,
    row: usize,
) -> Result<Amount, OptimizerError> {
    match non_negative(cell, table, field, row)? {
        Some(value) if value >= Amount::MAX as f64 => Err(OptimizerError::InvalidInput(format!(
            "{table} row {row}: '{field}' is too large, got {value}"
        ))),
        value => Ok(value.unwrap_or(0.0) as Amount),
    }
}

fn time_of_day(
    cell: &Cell<TimeValue>,
    table: &'static str,
    field: &'static str,
    row: usize,
) -> Result<Option<Minutes>, OptimizerError> {
    let Some(value) = cell.value() else {
        return Ok(None);
    };

    // Spreadsheet exports leave empty strings where a cell was cleared.
    if matches!(value, TimeValue::Text(text) if text.trim().is_empty()) {
        return Ok(None);
    }

    value
        .to_minutes()
        .map(Some)
        .ok_or_else(|| OptimizerError::InvalidTimeFormat {
            table,
            row,
            field,
            value: value.to_string(),
        })
}

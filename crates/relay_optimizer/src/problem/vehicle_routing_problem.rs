use tracing::{debug, instrument};

use crate::{
    error::OptimizerError,
    problem::{
        kmh::Kmh,
        location::Location,
        node::{Amount, DEPOT, Node, NodeIdx, Priority},
        records::{ShiftRecord, StopRecord, VehicleRecord},
        time_window::Minutes,
        travel_matrices::{Distance, TravelMatrices},
        vehicle::{Vehicle, VehicleIdx},
    },
    utils::enumerate_idx::EnumerateIdx,
};

pub const DEFAULT_SPEED_KMH: f64 = 30.0;

/// Immutable problem instance shared by every phase of a run.
///
/// `nodes[0]` is the depot, `nodes[1..]` are the stops in input order.
#[derive(Debug)]
pub struct VehicleRoutingProblem {
    nodes: Vec<Node>,
    vehicles: Vec<Vehicle>,
    travel_matrices: TravelMatrices,
    max_waiting: Option<Minutes>,
    max_capacity: Amount,
}

impl VehicleRoutingProblem {
    /// Normalizes raw records, pairing `shifts[i]` with `vehicles[i]`.
    pub fn from_records(
        stops: &[StopRecord],
        vehicles: &[VehicleRecord],
        shifts: &[ShiftRecord],
        depot_key: &str,
        speed: Kmh,
    ) -> Result<Self, OptimizerError> {
        let mut builder =
            VehicleRoutingProblemBuilder::from_records(stops, vehicles, shifts, depot_key)?;
        builder.set_speed(speed);
        builder.build()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, node_id: NodeIdx) -> &Node {
        &self.nodes[node_id]
    }

    pub fn depot(&self) -> &Node {
        &self.nodes[DEPOT]
    }

    pub fn stops_iter(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        (1..self.nodes.len()).map(NodeIdx::new)
    }

    pub fn num_stops(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle(&self, vehicle_id: VehicleIdx) -> &Vehicle {
        &self.vehicles[vehicle_id]
    }

    #[inline(always)]
    pub fn travel_distance(&self, from: NodeIdx, to: NodeIdx) -> Distance {
        self.travel_matrices.travel_distance(from, to)
    }

    #[inline(always)]
    pub fn travel_time(&self, from: NodeIdx, to: NodeIdx) -> Minutes {
        self.travel_matrices.travel_time(from, to)
    }

    #[inline(always)]
    pub fn demand(&self, node_id: NodeIdx) -> Amount {
        self.nodes[node_id].demand()
    }

    #[inline(always)]
    pub fn priority(&self, node_id: NodeIdx) -> Priority {
        self.nodes[node_id].priority()
    }

    pub fn max_waiting(&self) -> Option<Minutes> {
        self.max_waiting
    }

    /// Largest capacity in the fleet, 0 without vehicles.
    pub fn max_capacity(&self) -> Amount {
        self.max_capacity
    }
}

#[derive(Default)]
pub struct VehicleRoutingProblemBuilder {
    depot: Option<Node>,
    stops: Option<Vec<Node>>,
    vehicles: Option<Vec<Vehicle>>,
    speed: Option<Kmh>,
    max_waiting: Option<Minutes>,
}

impl VehicleRoutingProblemBuilder {
    /// Validates the records in three passes: column presence on every table,
    /// then the depot lookup, then the cell values row by row.
    #[instrument(skip_all, level = "debug")]
    pub fn from_records(
        stops: &[StopRecord],
        vehicles: &[VehicleRecord],
        shifts: &[ShiftRecord],
        depot_key: &str,
    ) -> Result<VehicleRoutingProblemBuilder, OptimizerError> {
        let missing = stops
            .iter()
            .find_map(|record| record.missing_field().map(|field| ("stops", field)))
            .or_else(|| {
                vehicles
                    .iter()
                    .find_map(|record| record.missing_field().map(|field| ("vehicles", field)))
            })
            .or_else(|| {
                shifts
                    .iter()
                    .find_map(|record| record.missing_field().map(|field| ("shifts", field)))
            });

        if let Some((table, field)) = missing {
            return Err(OptimizerError::MissingField { table, field });
        }

        let depot_key = depot_key.trim();
        let depot_rows: Vec<usize> = stops
            .iter()
            .enumerate()
            .filter(|(_, record)| record.trimmed_name() == Some(depot_key))
            .map(|(row, _)| row)
            .collect();

        let [depot_row] = depot_rows[..] else {
            return Err(OptimizerError::DepotNotFound {
                key: depot_key.to_owned(),
                matches: depot_rows.len(),
            });
        };

        let depot = stops[depot_row].to_depot(depot_row)?;
        let nodes = stops
            .iter()
            .enumerate()
            .filter(|&(row, _)| row != depot_row)
            .map(|(row, record)| record.to_stop(row))
            .collect::<Result<Vec<_>, _>>()?;

        if shifts.len() != vehicles.len() {
            return Err(OptimizerError::InvalidInput(format!(
                "{} shifts were given for {} vehicles",
                shifts.len(),
                vehicles.len()
            )));
        }

        let fleet = vehicles
            .iter()
            .zip(shifts)
            .enumerate()
            .map(|(row, (vehicle, shift))| vehicle.to_vehicle(row, shift.to_shift(row)?))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            depot = depot.label(),
            stops = nodes.len(),
            vehicles = fleet.len(),
            "Normalized records"
        );

        let mut builder = VehicleRoutingProblemBuilder::default();
        builder.set_depot(depot).set_stops(nodes).set_vehicles(fleet);

        Ok(builder)
    }

    pub fn set_depot(&mut self, depot: Node) -> &mut VehicleRoutingProblemBuilder {
        self.depot = Some(depot);
        self
    }

    pub fn set_stops(&mut self, stops: Vec<Node>) -> &mut VehicleRoutingProblemBuilder {
        self.stops = Some(stops);
        self
    }

    pub fn set_vehicles(&mut self, vehicles: Vec<Vehicle>) -> &mut VehicleRoutingProblemBuilder {
        self.vehicles = Some(vehicles);
        self
    }

    pub fn set_speed(&mut self, speed: Kmh) -> &mut VehicleRoutingProblemBuilder {
        self.speed = Some(speed);
        self
    }

    pub fn set_max_waiting(
        &mut self,
        max_waiting: Option<Minutes>,
    ) -> &mut VehicleRoutingProblemBuilder {
        self.max_waiting = max_waiting;
        self
    }

    pub fn build(self) -> Result<VehicleRoutingProblem, OptimizerError> {
        let depot = self
            .depot
            .ok_or_else(|| OptimizerError::InvalidInput("a depot is required".to_owned()))?;

        let mut nodes = Vec::with_capacity(1 + self.stops.as_ref().map_or(0, Vec::len));
        nodes.push(depot);
        nodes.extend(self.stops.unwrap_or_default());

        let invalid: Option<(NodeIdx, &Node)> = nodes
            .iter()
            .enumerate_idx()
            .find(|(_, node)| !node.location().is_valid());

        if let Some((node_id, node)) = invalid {
            return Err(OptimizerError::InvalidInput(format!(
                "node {node_id} ('{}') has invalid coordinates",
                node.label()
            )));
        }

        if let Some(max_waiting) = self.max_waiting
            && max_waiting < 0
        {
            return Err(OptimizerError::InvalidInput(format!(
                "maximum waiting must not be negative, got {max_waiting}"
            )));
        }

        let speed = match self.speed {
            Some(speed) => speed,
            None => Kmh::new(DEFAULT_SPEED_KMH)?,
        };

        let locations: Vec<Location> = nodes.iter().map(|node| *node.location()).collect();
        let travel_matrices = TravelMatrices::from_locations(&locations, speed)?;

        let vehicles = self.vehicles.unwrap_or_default();
        let max_capacity = vehicles
            .iter()
            .map(|vehicle| vehicle.capacity())
            .max()
            .unwrap_or(0);

        Ok(VehicleRoutingProblem {
            nodes,
            vehicles,
            travel_matrices,
            max_waiting: self.max_waiting,
            max_capacity,
        })
    }
}

//! Topology and capacity rules for racks, ports and connection paths.
//!
//! Everything here is a pure function of the snapshot passed in: nothing is
//! cached between calls and nothing is logged. The store takes a fresh
//! snapshot inside its write lock and calls back into this module right
//! before committing.

mod devices;
pub mod eligibility;
mod error;
pub mod path;
pub mod ports;
pub mod rack;
pub mod references;

#[cfg(test)]
pub(crate) mod fixtures;

use std::collections::BTreeSet;

use crate::models::{CanonicalConnection, Connection, ConnectionRequest, Device, Location, Rack};

pub use error::TopologyError;
pub use ports::PortOccupancy;
pub use rack::{RackUnit, UnitRange};
pub use references::{DeviceReference, LocationDependents};

/// Read-only view over one consistent snapshot of the inventory
#[derive(Debug, Clone, Copy)]
pub struct Topology<'a> {
    locations: &'a [Location],
    racks: &'a [Rack],
    devices: &'a [Device],
    connections: &'a [Connection],
}

impl<'a> Topology<'a> {
    pub fn new(devices: &'a [Device], connections: &'a [Connection]) -> Self {
        Self {
            locations: &[],
            racks: &[],
            devices,
            connections,
        }
    }

    pub fn with_racks(self, racks: &'a [Rack]) -> Self {
        Self { racks, ..self }
    }

    pub fn with_locations(self, locations: &'a [Location]) -> Self {
        Self { locations, ..self }
    }

    pub fn device(&self, id: i64) -> Option<&'a Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn rack(&self, id: i64) -> Option<&'a Rack> {
        self.racks.iter().find(|r| r.id == id)
    }

    pub fn location(&self, id: i64) -> Option<&'a Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn validate_rack_placement(
        &self,
        rack: &Rack,
        row: i64,
        units: i64,
        excluding_device_id: Option<i64>,
    ) -> Result<UnitRange, TopologyError> {
        rack::validate_placement(rack, self.devices, row, units, excluding_device_id)
    }

    pub fn rack_occupancy_map(&self, rack: &Rack) -> Vec<RackUnit> {
        rack::occupancy_map(rack, self.devices)
    }

    /// Check a new or edited rack. An edited rack is also checked against the
    /// devices already placed in it.
    pub fn validate_rack(&self, rack: &Rack) -> Result<(), TopologyError> {
        rack::validate_rack(rack)?;
        if self.location(rack.location_id).is_none() {
            return Err(TopologyError::referential(format!(
                "location {} does not exist",
                rack.location_id
            )));
        }
        rack::validate_rack_resize(rack, rack.total_units, self.devices)
    }

    pub fn port_occupancy(&self, device: &Device) -> Result<PortOccupancy, TopologyError> {
        ports::port_occupancy(device, self.connections, self.devices)
    }

    pub fn eligible_pcs(&self, excluding_connection_id: Option<i64>) -> BTreeSet<i64> {
        eligibility::eligible_pcs(self.devices, self.connections, excluding_connection_id)
    }

    pub fn validate_connection(
        &self,
        request: &ConnectionRequest,
        excluding_connection_id: Option<i64>,
    ) -> Result<CanonicalConnection, TopologyError> {
        path::validate_connection(request, self.devices, self.connections, excluding_connection_id)
    }

    pub fn referenced_by(&self, device_id: i64) -> Vec<DeviceReference> {
        references::referenced_by(device_id, self.connections)
    }

    pub fn location_dependents(&self, location_id: i64) -> LocationDependents {
        references::location_dependents(location_id, self.racks, self.devices)
    }

    pub fn devices_in_rack(&self, rack_id: i64) -> Vec<i64> {
        rack::devices_in_rack(rack_id, self.devices)
    }
}

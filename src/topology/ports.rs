//! Port occupancy for switches and patch panels, derived from the full
//! connection set on every call.

use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;

use crate::models::{Connection, Device, DeviceKind};

use super::TopologyError;

/// Largest port count a switch or patch panel may declare
pub const MAX_PORTS: i64 = 1024;

/// Peer description used when a connection's PC cannot be resolved
pub const UNKNOWN_PC: &str = "Unknown PC";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PortState {
    Free,
    Connected {
        connection_id: i64,
        /// Name of the PC at the far end of the path
        peer: String,
        is_up: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortStatus {
    pub port: String,
    #[serde(flatten)]
    pub state: PortState,
}

/// Occupancy of every port on one ported device
#[derive(Debug, Clone, Serialize)]
pub struct PortOccupancy {
    pub device_id: i64,
    pub device_name: String,
    pub kind: DeviceKind,
    pub total_ports: i64,
    pub occupied: i64,
    pub free: i64,
    pub ports: Vec<PortStatus>,
}

#[cfg(test)]
impl PortOccupancy {
    pub fn state(&self, port: &str) -> Option<&PortState> {
        self.ports.iter().find(|p| p.port == port).map(|p| &p.state)
    }
}

/// One connection's claim on a port of a switch or patch panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortClaim<'a> {
    pub connection_id: i64,
    pub pc_id: i64,
    pub port: &'a str,
    pub is_up: bool,
}

/// Every claim the connections make on `device`. PCs have none.
pub fn claims<'a>(device: &Device, connections: &'a [Connection]) -> Vec<PortClaim<'a>> {
    let id = device.id;
    match device.kind() {
        DeviceKind::Switch => connections
            .iter()
            .filter(|c| c.switch_id == id)
            .map(|c| PortClaim {
                connection_id: c.id,
                pc_id: c.pc_id,
                port: c.switch_port.as_str(),
                is_up: c.is_switch_port_up,
            })
            .collect(),
        DeviceKind::PatchPanel => connections
            .iter()
            .flat_map(|c| {
                c.hops
                    .iter()
                    .filter(move |h| h.patch_panel_id == id)
                    .map(move |h| PortClaim {
                        connection_id: c.id,
                        pc_id: c.pc_id,
                        port: h.patch_panel_port.as_str(),
                        is_up: h.is_port_up,
                    })
            })
            .collect(),
        DeviceKind::Pc => Vec::new(),
    }
}

fn require_ports(device: &Device) -> Result<i64, TopologyError> {
    device.total_ports().ok_or_else(|| {
        TopologyError::referential(format!(
            "{} '{}' has no switch or patch panel ports",
            device.kind(),
            device.name
        ))
    })
}

/// Trimmed port label, with numeric labels written as plain integers so
/// "01", "+1" and "1" name the same port.
pub fn canonical_port(label: &str) -> Cow<'_, str> {
    let label = label.trim();
    match label.parse::<i64>() {
        Ok(n) if n.to_string() != label => Cow::Owned(n.to_string()),
        _ => Cow::Borrowed(label),
    }
}

/// Whether `label` is one of the always-listed labels `"1"..="total_ports"`
fn is_numbered_port(label: &str, total_ports: i64) -> bool {
    label
        .parse::<i64>()
        .map_or(false, |n| (1..=total_ports).contains(&n) && n.to_string() == label)
}

/// Port-by-port occupancy of `device`.
///
/// Ports `"1"..="total_ports"` are always listed; labels in use that are not
/// in that range (e.g. "Gi0/1") follow in sorted order. The free count is
/// `total_ports` minus the number of distinct occupied labels.
pub fn port_occupancy(
    device: &Device,
    connections: &[Connection],
    devices: &[Device],
) -> Result<PortOccupancy, TopologyError> {
    let total_ports = require_ports(device)?;
    let listed = total_ports.min(MAX_PORTS);

    let mut in_use: HashMap<Cow<'_, str>, PortClaim<'_>> = HashMap::new();
    for claim in claims(device, connections) {
        in_use.entry(canonical_port(claim.port)).or_insert(claim);
    }

    let state_of = |label: &str| match in_use.get(label) {
        Some(claim) => PortState::Connected {
            connection_id: claim.connection_id,
            peer: devices
                .iter()
                .find(|d| d.id == claim.pc_id)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| UNKNOWN_PC.to_string()),
            is_up: claim.is_up,
        },
        None => PortState::Free,
    };

    let mut ports: Vec<PortStatus> = (1..=listed)
        .map(|n| {
            let port = n.to_string();
            let state = state_of(&port);
            PortStatus { port, state }
        })
        .collect();

    let mut extra: Vec<&str> = in_use
        .keys()
        .map(|label| &**label)
        .filter(|label| !is_numbered_port(label, listed))
        .collect();
    extra.sort_unstable();
    ports.extend(extra.into_iter().map(|label| PortStatus {
        port: label.to_string(),
        state: state_of(label),
    }));

    let occupied = in_use.len() as i64;
    Ok(PortOccupancy {
        device_id: device.id,
        device_name: device.name.clone(),
        kind: device.kind(),
        total_ports,
        occupied,
        free: (total_ports - occupied).max(0),
        ports,
    })
}

/// Check that `port` on `device` exists and is not claimed by any connection
/// other than `excluding_connection_id`. Returns the canonical label.
pub fn validate_port(
    device: &Device,
    port: &str,
    connections: &[Connection],
    excluding_connection_id: Option<i64>,
) -> Result<String, TopologyError> {
    let total_ports = require_ports(device)?;
    let label = canonical_port(port);
    if label.is_empty() {
        return Err(TopologyError::structural(format!(
            "a port is required on {} '{}'",
            device.kind(),
            device.name
        )));
    }

    if let Ok(n) = label.parse::<i64>() {
        if !(1..=total_ports).contains(&n) {
            return Err(TopologyError::OutOfRange {
                subject: format!("port on {} '{}'", device.kind(), device.name),
                value: n,
                min: 1,
                max: Some(total_ports),
            });
        }
    }

    let conflict = claims(device, connections)
        .into_iter()
        .find(|c| canonical_port(c.port) == label && Some(c.connection_id) != excluding_connection_id);

    match conflict {
        Some(claim) => Err(TopologyError::PortConflict {
            device_id: device.id,
            device_name: device.name.clone(),
            port: label.to_string(),
            connection_id: claim.connection_id,
        }),
        None => Ok(label.into_owned()),
    }
}

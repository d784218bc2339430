//! Reverse lookups used to block deletes of things still in use.

use serde::Serialize;

use crate::models::{Connection, Device, Rack};

/// How a connection uses a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ReferenceRole {
    Pc,
    Switch { port: String },
    Hop { sequence: i64, port: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceReference {
    pub connection_id: i64,
    #[serde(flatten)]
    pub role: ReferenceRole,
}

/// Every connection that names `device_id` as its PC, its switch or one of its hops
pub fn referenced_by(device_id: i64, connections: &[Connection]) -> Vec<DeviceReference> {
    let mut refs = Vec::new();
    for conn in connections {
        if conn.pc_id == device_id {
            refs.push(DeviceReference {
                connection_id: conn.id,
                role: ReferenceRole::Pc,
            });
        }
        if conn.switch_id == device_id {
            refs.push(DeviceReference {
                connection_id: conn.id,
                role: ReferenceRole::Switch {
                    port: conn.switch_port.clone(),
                },
            });
        }
        refs.extend(conn.hops.iter().filter(|h| h.patch_panel_id == device_id).map(|h| DeviceReference {
            connection_id: conn.id,
            role: ReferenceRole::Hop {
                sequence: h.sequence,
                port: h.patch_panel_port.clone(),
            },
        }));
    }
    refs
}

/// Racks and devices that belong to a location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocationDependents {
    pub racks: Vec<i64>,
    pub devices: Vec<i64>,
}

impl LocationDependents {
    pub fn is_empty(&self) -> bool {
        self.racks.is_empty() && self.devices.is_empty()
    }
}

pub fn location_dependents(location_id: i64, racks: &[Rack], devices: &[Device]) -> LocationDependents {
    LocationDependents {
        racks: racks.iter().filter(|r| r.location_id == location_id).map(|r| r.id).collect(),
        devices: devices
            .iter()
            .filter(|d| d.location_id == Some(location_id))
            .map(|d| d.id)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RackOrientation;
    use crate::topology::fixtures::*;

    #[test]
    fn test_referenced_by_every_role() {
        let connections = vec![
            connection(100, 1, 10, "Gi0/1", vec![hop(0, 20, "3")]),
            connection(101, 2, 10, "Gi0/2", vec![hop(0, 21, "1"), hop(1, 20, "4")]),
        ];

        assert_eq!(
            referenced_by(1, &connections),
            vec![DeviceReference {
                connection_id: 100,
                role: ReferenceRole::Pc,
            }]
        );
        assert_eq!(referenced_by(10, &connections).len(), 2);
        assert_eq!(
            referenced_by(20, &connections),
            vec![
                DeviceReference {
                    connection_id: 100,
                    role: ReferenceRole::Hop {
                        sequence: 0,
                        port: "3".into(),
                    },
                },
                DeviceReference {
                    connection_id: 101,
                    role: ReferenceRole::Hop {
                        sequence: 1,
                        port: "4".into(),
                    },
                },
            ]
        );
        assert!(referenced_by(99, &connections).is_empty());
    }

    #[test]
    fn test_location_dependents() {
        let racks = vec![rack(1, "R1", 42, RackOrientation::BottomUp)];
        let mut sw = switch(10, "SW1", 24);
        sw.location_id = Some(2);
        let devices = vec![pc(1, "PC1", false), sw];

        let first = location_dependents(1, &racks, &devices);
        assert_eq!(first.racks, vec![1]);
        assert!(first.devices.is_empty());
        assert!(!first.is_empty());

        assert_eq!(location_dependents(2, &racks, &devices).devices, vec![10]);
        assert!(location_dependents(3, &racks, &devices).is_empty());
    }
}

use crate::models::{Device, DeviceVariant, PcType};

use super::{ports, ports::MAX_PORTS, Topology, TopologyError};

impl<'a> Topology<'a> {
    /// Check a new or edited device and return it in canonical form.
    ///
    /// Workstation PCs lose any rack placement; every other placement must
    /// fit its rack without overlapping another device. When editing, pass
    /// the device's own id as `excluding_device_id`: its current placement
    /// is ignored and the edit may not strand existing connections.
    pub fn validate_device(&self, device: &Device, excluding_device_id: Option<i64>) -> Result<Device, TopologyError> {
        let mut device = device.clone();
        device.name = device.name.trim().to_string();
        if device.name.is_empty() {
            return Err(TopologyError::structural(format!("{} name is required", device.kind())));
        }

        if let Some(total_ports) = device.total_ports() {
            if !(1..=MAX_PORTS).contains(&total_ports) {
                return Err(TopologyError::OutOfRange {
                    subject: format!("total_ports for {} '{}'", device.kind(), device.name),
                    value: total_ports,
                    min: 1,
                    max: Some(MAX_PORTS),
                });
            }
        }

        if let Some(location_id) = device.location_id {
            if self.location(location_id).is_none() {
                return Err(TopologyError::referential(format!("location {} does not exist", location_id)));
            }
        }

        if let DeviceVariant::Pc(pc) = &device.variant {
            if pc.pc_type != PcType::Server {
                device.placement = None;
            }
        }

        if let Some(placement) = device.placement {
            let rack = self
                .rack(placement.rack_id)
                .ok_or_else(|| TopologyError::referential(format!("rack {} does not exist", placement.rack_id)))?;
            self.validate_rack_placement(
                rack,
                placement.row_in_rack,
                placement.units_occupied,
                excluding_device_id,
            )?;
        }

        if let Some(previous) = excluding_device_id.and_then(|id| self.device(id)) {
            self.check_device_edit(previous, &device)?;
        }

        Ok(device)
    }

    /// Reject edits that would invalidate connections already using the device
    fn check_device_edit(&self, previous: &Device, updated: &Device) -> Result<(), TopologyError> {
        if previous.kind() != updated.kind() {
            if let Some(reference) = self.referenced_by(previous.id).first() {
                return Err(TopologyError::referential(format!(
                    "{} '{}' cannot become a {} while connection {} uses it",
                    previous.kind(),
                    previous.name,
                    updated.kind(),
                    reference.connection_id
                )));
            }
            return Ok(());
        }

        if let Some(total_ports) = updated.total_ports() {
            let highest_used = ports::claims(previous, self.connections)
                .iter()
                .filter_map(|claim| claim.port.parse::<i64>().ok())
                .max();
            if let Some(highest) = highest_used.filter(|h| *h > total_ports) {
                return Err(TopologyError::OutOfRange {
                    subject: format!(
                        "total_ports for {} '{}' (port {} is connected)",
                        updated.kind(),
                        updated.name,
                        highest
                    ),
                    value: total_ports,
                    min: highest,
                    max: Some(MAX_PORTS),
                });
            }
        }

        if let Some(pc) = updated.as_pc() {
            if !pc.multi_port {
                let mut uses = self.connections.iter().filter(|c| c.pc_id == updated.id);
                if let (Some(_), Some(second)) = (uses.next(), uses.next()) {
                    return Err(TopologyError::IneligiblePc {
                        pc_id: updated.id,
                        pc_name: updated.name.clone(),
                        connection_id: second.id,
                    });
                }
            }
        }

        Ok(())
    }
}

//! Connection path assembly and validation.
//!
//! Rules run in a fixed order and the first violation is returned:
//! required fields, hop structure, referenced devices, PC eligibility,
//! switch port, then each hop's patch panel port.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::models::{CanonicalConnection, Connection, ConnectionRequest, Device, DeviceKind, Hop, HopRequest};

use super::{eligibility, ports, TopologyError};

/// A hop after the structural checks, before devices are looked up
struct HopDraft<'r> {
    location_id: i64,
    patch_panel_id: i64,
    port: &'r str,
    source: &'r HopRequest,
}

fn find_device<'d>(devices: &'d [Device], id: i64, expected: DeviceKind, role: &str) -> Result<&'d Device, TopologyError> {
    let device = devices
        .iter()
        .find(|d| d.id == id)
        .ok_or_else(|| TopologyError::referential(format!("{} {} does not exist", role, id)))?;

    if device.kind() != expected {
        return Err(TopologyError::referential(format!(
            "{} {} ('{}') is a {}, expected a {}",
            role,
            id,
            device.name,
            device.kind(),
            expected
        )));
    }
    Ok(device)
}

fn check_hops(request: &ConnectionRequest) -> Result<Vec<HopDraft<'_>>, TopologyError> {
    let mut drafts = Vec::with_capacity(request.hops.len());
    let mut seen: HashSet<(i64, Cow<'_, str>)> = HashSet::new();

    for (position, hop) in request.hops.iter().enumerate() {
        let position = position as i64;
        if let Some(sequence) = hop.sequence {
            if sequence != position {
                return Err(TopologyError::structural(format!(
                    "hop at position {} declares sequence {}; hops must be numbered 0..{} without gaps",
                    position,
                    sequence,
                    request.hops.len()
                )));
            }
        }

        let location_id = hop
            .location_id
            .ok_or_else(|| TopologyError::structural(format!("hop {} is missing a location", position)))?;
        let patch_panel_id = hop
            .patch_panel_id
            .ok_or_else(|| TopologyError::structural(format!("hop {} is missing a patch panel", position)))?;
        let port = hop
            .patch_panel_port
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| TopologyError::structural(format!("hop {} is missing a patch panel port", position)))?;

        if !seen.insert((patch_panel_id, ports::canonical_port(port))) {
            return Err(TopologyError::structural(format!(
                "patch panel {} port {} is used by more than one hop",
                patch_panel_id, port
            )));
        }

        drafts.push(HopDraft {
            location_id,
            patch_panel_id,
            port,
            source: hop,
        });
    }
    Ok(drafts)
}

/// Validate a proposed connection against the current device and connection
/// sets and return its canonical form.
///
/// For an update, pass the connection's own id as `excluding_connection_id`
/// so its current port claims and PC assignment do not count against it.
pub fn validate_connection(
    request: &ConnectionRequest,
    devices: &[Device],
    connections: &[Connection],
    excluding_connection_id: Option<i64>,
) -> Result<CanonicalConnection, TopologyError> {
    let pc_id = request
        .pc_id
        .ok_or_else(|| TopologyError::structural("pc_id is required"))?;
    let switch_id = request
        .switch_id
        .ok_or_else(|| TopologyError::structural("switch_id is required"))?;
    let switch_port = request
        .switch_port
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| TopologyError::structural("switch_port is required"))?;

    let hop_drafts = check_hops(request)?;

    let pc = find_device(devices, pc_id, DeviceKind::Pc, "PC")?;
    let switch = find_device(devices, switch_id, DeviceKind::Switch, "switch")?;
    let mut patch_panels = Vec::with_capacity(hop_drafts.len());
    for (position, draft) in hop_drafts.iter().enumerate() {
        if draft.patch_panel_id == pc_id || draft.patch_panel_id == switch_id {
            return Err(TopologyError::referential(format!(
                "hop {} references device {}, which is an endpoint of this connection",
                position, draft.patch_panel_id
            )));
        }
        patch_panels.push(find_device(devices, draft.patch_panel_id, DeviceKind::PatchPanel, "patch panel")?);
    }

    eligibility::check_pc_eligible(pc, connections, excluding_connection_id)?;

    let switch_port = ports::validate_port(switch, switch_port, connections, excluding_connection_id)?;

    let mut hops = Vec::with_capacity(hop_drafts.len());
    for (position, (draft, panel)) in hop_drafts.iter().zip(patch_panels).enumerate() {
        let port = ports::validate_port(panel, draft.port, connections, excluding_connection_id)?;
        hops.push(Hop {
            sequence: position as i64,
            location_id: draft.location_id,
            patch_panel_id: draft.patch_panel_id,
            patch_panel_port: port,
            is_port_up: draft.source.is_port_up,
            cable: draft.source.cable.clone(),
        });
    }

    Ok(CanonicalConnection {
        pc_id,
        switch_id,
        switch_port,
        is_switch_port_up: request.is_switch_port_up,
        cable: request.cable.clone(),
        hops,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::fixtures::*;

    fn inventory() -> Vec<Device> {
        vec![
            pc(1, "PC1", false),
            pc(2, "PC2", false),
            pc(3, "SRV1", true),
            switch(10, "SW1", 24),
            patch_panel(20, "PP1", 24),
            patch_panel(21, "PP2", 24),
            patch_panel(22, "PP3", 24),
        ]
    }

    #[test]
    fn test_switch_port_conflict_scenario() {
        let devices = inventory();
        let c1 = validate_connection(&request(1, 10, "Gi0/1", vec![]), &devices, &[], None)
            .unwrap()
            .into_connection(100);
        let existing = vec![c1];

        let err = validate_connection(&request(2, 10, "Gi0/1", vec![]), &devices, &existing, None).unwrap_err();
        assert_eq!(
            err,
            TopologyError::PortConflict {
                device_id: 10,
                device_name: "SW1".into(),
                port: "Gi0/1".into(),
                connection_id: 100,
            }
        );

        let c2 = validate_connection(&request(2, 10, "Gi0/2", vec![]), &devices, &existing, None).unwrap();
        assert_eq!(c2.switch_port, "Gi0/2");
    }

    #[test]
    fn test_single_port_pc_scenario() {
        let devices = inventory();
        let existing = vec![connection(100, 1, 10, "Gi0/1", vec![])];

        let err = validate_connection(&request(1, 10, "Gi0/5", vec![]), &devices, &existing, None).unwrap_err();
        assert_eq!(err.kind(), "ineligible_pc");

        let edited = validate_connection(&request(1, 10, "Gi0/9", vec![]), &devices, &existing, Some(100)).unwrap();
        assert_eq!(edited.pc_id, 1);
        assert_eq!(edited.switch_port, "Gi0/9");
    }

    #[test]
    fn test_revalidating_unchanged_connection_succeeds() {
        let devices = inventory();
        let existing = vec![
            connection(100, 3, 10, "1", vec![hop(0, 20, "1"), hop(1, 21, "7")]),
            connection(101, 3, 10, "2", vec![hop(0, 20, "2")]),
        ];
        for conn in &existing {
            let canonical = validate_connection(&ConnectionRequest::from(conn), &devices, &existing, Some(conn.id)).unwrap();
            assert_eq!(&canonical.into_connection(conn.id), conn);
        }
    }

    #[test]
    fn test_explicit_and_implicit_indices_canonicalize_identically() {
        let devices = inventory();
        let implicit = request(1, 10, "1", vec![hop_request(20, "1"), hop_request(21, "1"), hop_request(22, "1")]);
        let mut explicit = implicit.clone();
        for (i, hop) in explicit.hops.iter_mut().enumerate() {
            hop.sequence = Some(i as i64);
        }

        let a = validate_connection(&implicit, &devices, &[], None).unwrap();
        let b = validate_connection(&explicit, &devices, &[], None).unwrap();
        assert_eq!(a.hops, b.hops);
        let order: Vec<(i64, i64)> = a.hops.iter().map(|h| (h.sequence, h.patch_panel_id)).collect();
        assert_eq!(order, vec![(0, 20), (1, 21), (2, 22)]);
    }

    #[test]
    fn test_hop_gap_rejected() {
        let devices = inventory();
        let mut req = request(1, 10, "1", vec![hop_request(20, "1"), hop_request(21, "1")]);
        req.hops[0].sequence = Some(0);
        req.hops[1].sequence = Some(2);
        assert_eq!(validate_connection(&req, &devices, &[], None).unwrap_err().kind(), "structural");
    }

    #[test]
    fn test_missing_fields_rejected() {
        let devices = inventory();

        let mut no_pc = request(1, 10, "1", vec![]);
        no_pc.pc_id = None;
        let mut blank_port = request(1, 10, "1", vec![]);
        blank_port.switch_port = Some("   ".into());
        let mut hop_without_location = request(1, 10, "1", vec![hop_request(20, "1")]);
        hop_without_location.hops[0].location_id = None;
        let mut hop_without_port = request(1, 10, "1", vec![hop_request(20, "1")]);
        hop_without_port.hops[0].patch_panel_port = None;

        for req in [no_pc, blank_port, hop_without_location, hop_without_port] {
            assert_eq!(validate_connection(&req, &devices, &[], None).unwrap_err().kind(), "structural");
        }
    }

    #[test]
    fn test_duplicate_hop_port_in_one_request_rejected() {
        let devices = inventory();
        let req = request(1, 10, "1", vec![hop_request(20, "3"), hop_request(20, " 3 ")]);
        assert_eq!(validate_connection(&req, &devices, &[], None).unwrap_err().kind(), "structural");

        let req = request(1, 10, "1", vec![hop_request(20, "3"), hop_request(20, "03")]);
        assert_eq!(validate_connection(&req, &devices, &[], None).unwrap_err().kind(), "structural");
    }

    #[test]
    fn test_zero_padded_switch_port_is_same_port() {
        let devices = inventory();
        let existing = vec![connection(100, 1, 10, "1", vec![])];

        match validate_connection(&request(2, 10, "01", vec![]), &devices, &existing, None).unwrap_err() {
            TopologyError::PortConflict { port, connection_id, .. } => {
                assert_eq!(port, "1");
                assert_eq!(connection_id, 100);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let canonical = validate_connection(&request(2, 10, "+02", vec![hop_request(20, " 007 ")]), &devices, &existing, None)
            .unwrap();
        assert_eq!(canonical.switch_port, "2");
        assert_eq!(canonical.hops[0].patch_panel_port, "7");
    }

    #[test]
    fn test_referential_errors() {
        let devices = inventory();
        let cases = [
            request(99, 10, "1", vec![]),
            request(10, 10, "1", vec![]),
            request(1, 20, "1", vec![]),
            request(1, 10, "1", vec![hop_request(98, "1")]),
            request(1, 10, "1", vec![hop_request(10, "1")]),
            request(1, 10, "1", vec![hop_request(1, "1")]),
        ];
        for req in cases {
            assert_eq!(validate_connection(&req, &devices, &[], None).unwrap_err().kind(), "referential");
        }
    }

    #[test]
    fn test_hop_port_conflict_with_other_connection() {
        let devices = inventory();
        let existing = vec![connection(100, 3, 10, "1", vec![hop(0, 21, "5")])];

        let req = request(1, 10, "2", vec![hop_request(20, "5"), hop_request(21, "5")]);
        match validate_connection(&req, &devices, &existing, None).unwrap_err() {
            TopologyError::PortConflict { device_id, connection_id, .. } => {
                assert_eq!(device_id, 21);
                assert_eq!(connection_id, 100);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // Moving the existing connection's own hop around is not a conflict
        let own = request(3, 10, "1", vec![hop_request(20, "1"), hop_request(21, "5")]);
        assert!(validate_connection(&own, &devices, &existing, Some(100)).is_ok());
    }

    #[test]
    fn test_first_violation_wins() {
        let devices = inventory();
        let existing = vec![connection(100, 1, 10, "1", vec![])];
        // Ineligible PC and occupied switch port: eligibility is checked first
        let err = validate_connection(&request(1, 10, "1", vec![]), &devices, &existing, None).unwrap_err();
        assert_eq!(err.kind(), "ineligible_pc");
    }

    #[test]
    fn test_out_of_range_switch_port() {
        let devices = inventory();
        let err = validate_connection(&request(1, 10, "25", vec![]), &devices, &[], None).unwrap_err();
        assert_eq!(err.kind(), "out_of_range");
    }
}

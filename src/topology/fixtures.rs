//! Builders for topology unit tests.

use crate::models::*;

pub fn location(id: i64, name: &str) -> Location {
    Location {
        id,
        name: name.to_string(),
        door_number: None,
        description: None,
    }
}

pub fn rack(id: i64, name: &str, total_units: i64, orientation: RackOrientation) -> Rack {
    Rack {
        id,
        name: name.to_string(),
        location_id: 1,
        location_name: None,
        description: None,
        total_units,
        orientation,
    }
}

fn device(id: i64, name: &str, variant: DeviceVariant) -> Device {
    Device {
        id,
        name: name.to_string(),
        location_id: None,
        description: None,
        placement: None,
        variant,
    }
}

pub fn pc(id: i64, name: &str, multi_port: bool) -> Device {
    device(
        id,
        name,
        DeviceVariant::Pc(PcDetails {
            multi_port,
            ..Default::default()
        }),
    )
}

pub fn server(id: i64, name: &str) -> Device {
    device(
        id,
        name,
        DeviceVariant::Pc(PcDetails {
            multi_port: true,
            pc_type: PcType::Server,
            ..Default::default()
        }),
    )
}

pub fn switch(id: i64, name: &str, total_ports: i64) -> Device {
    device(
        id,
        name,
        DeviceVariant::Switch(SwitchDetails {
            total_ports,
            ip_address: None,
            model: None,
            usage: None,
            source_port: None,
        }),
    )
}

pub fn patch_panel(id: i64, name: &str, total_ports: i64) -> Device {
    device(id, name, DeviceVariant::PatchPanel(PatchPanelDetails { total_ports }))
}

pub fn placed(mut device: Device, rack_id: i64, row_in_rack: i64, units_occupied: i64) -> Device {
    device.placement = Some(RackPlacement {
        rack_id,
        row_in_rack,
        units_occupied,
    });
    device
}

pub fn hop(sequence: i64, patch_panel_id: i64, port: &str) -> Hop {
    Hop {
        sequence,
        location_id: 1,
        patch_panel_id,
        patch_panel_port: port.to_string(),
        is_port_up: true,
        cable: CableInfo::default(),
    }
}

pub fn connection(id: i64, pc_id: i64, switch_id: i64, port: &str, hops: Vec<Hop>) -> Connection {
    Connection {
        id,
        pc_id,
        switch_id,
        switch_port: port.to_string(),
        is_switch_port_up: true,
        cable: CableInfo::default(),
        hops,
    }
}

pub fn hop_request(patch_panel_id: i64, port: &str) -> HopRequest {
    HopRequest {
        sequence: None,
        location_id: Some(1),
        patch_panel_id: Some(patch_panel_id),
        patch_panel_port: Some(port.to_string()),
        is_port_up: true,
        cable: CableInfo::default(),
    }
}

pub fn request(pc_id: i64, switch_id: i64, port: &str, hops: Vec<HopRequest>) -> ConnectionRequest {
    ConnectionRequest {
        pc_id: Some(pc_id),
        switch_id: Some(switch_id),
        switch_port: Some(port.to_string()),
        is_switch_port_up: true,
        cable: CableInfo::default(),
        hops,
    }
}

use anyhow::Result;
use sqlx::{Row, sqlite::SqliteRow};

use crate::models::*;

/// Filter empty strings to None when the DB stores '' instead of NULL
pub fn none_if_empty(opt: Option<String>) -> Option<String> {
    opt.filter(|s| !s.is_empty())
}

/// Map a SQLite row to a Location struct
pub fn map_location_row(row: &SqliteRow) -> Location {
    Location {
        id: row.get("id"),
        name: row.get("name"),
        door_number: none_if_empty(row.get("door_number")),
        description: none_if_empty(row.get("description")),
    }
}

/// Map a SQLite row to a Rack struct
pub fn map_rack_row(row: &SqliteRow) -> Result<Rack> {
    Ok(Rack {
        id: row.get("id"),
        name: row.get("name"),
        location_id: row.get("location_id"),
        location_name: none_if_empty(row.try_get("location_name").unwrap_or_default()),
        description: none_if_empty(row.get("description")),
        total_units: row.get("total_units"),
        orientation: row.get::<String, _>("orientation").parse()?,
    })
}

/// Map a SQLite row to a Device, picking the variant from the `kind` column
pub fn map_device_row(row: &SqliteRow) -> Result<Device> {
    let kind: DeviceKind = row.get::<String, _>("kind").parse()?;

    let variant = match kind {
        DeviceKind::Pc => DeviceVariant::Pc(PcDetails {
            multi_port: row.get("multi_port"),
            pc_type: row
                .get::<Option<String>, _>("pc_type")
                .map(|t| t.parse())
                .transpose()?
                .unwrap_or_default(),
            ip_address: none_if_empty(row.get("ip_address")),
            username: none_if_empty(row.get("username")),
            in_domain: row.get("in_domain"),
            operating_system: none_if_empty(row.get("operating_system")),
            model: none_if_empty(row.get("model")),
            office: none_if_empty(row.get("office")),
            usage: none_if_empty(row.get("usage")),
        }),
        DeviceKind::Switch => DeviceVariant::Switch(SwitchDetails {
            total_ports: row.get::<Option<i64>, _>("total_ports").unwrap_or_default(),
            ip_address: none_if_empty(row.get("ip_address")),
            model: none_if_empty(row.get("model")),
            usage: none_if_empty(row.get("usage")),
            source_port: none_if_empty(row.get("source_port")),
        }),
        DeviceKind::PatchPanel => DeviceVariant::PatchPanel(PatchPanelDetails {
            total_ports: row.get::<Option<i64>, _>("total_ports").unwrap_or_default(),
        }),
    };

    let placement = match (
        row.get::<Option<i64>, _>("rack_id"),
        row.get::<Option<i64>, _>("row_in_rack"),
    ) {
        (Some(rack_id), Some(row_in_rack)) => Some(RackPlacement {
            rack_id,
            row_in_rack,
            units_occupied: row.get::<Option<i64>, _>("units_occupied").unwrap_or(1),
        }),
        _ => None,
    };

    Ok(Device {
        id: row.get("id"),
        name: row.get("name"),
        location_id: row.get("location_id"),
        description: none_if_empty(row.get("description")),
        placement,
        variant,
    })
}

/// Map a SQLite row to a Hop struct
pub fn map_hop_row(row: &SqliteRow) -> Hop {
    Hop {
        sequence: row.get("sequence"),
        location_id: row.get("location_id"),
        patch_panel_id: row.get("patch_panel_id"),
        patch_panel_port: row.get("patch_panel_port"),
        is_port_up: row.get("is_port_up"),
        cable: map_cable(row),
    }
}

/// Map a SQLite row to a Connection without its hops
pub fn map_connection_row(row: &SqliteRow) -> Connection {
    Connection {
        id: row.get("id"),
        pc_id: row.get("pc_id"),
        switch_id: row.get("switch_id"),
        switch_port: row.get("switch_port"),
        is_switch_port_up: row.get("is_switch_port_up"),
        cable: map_cable(row),
        hops: Vec::new(),
    }
}

fn map_cable(row: &SqliteRow) -> CableInfo {
    CableInfo {
        cable_color: none_if_empty(row.get("cable_color")),
        cable_label: none_if_empty(row.get("cable_label")),
    }
}

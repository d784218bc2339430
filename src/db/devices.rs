use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;

use super::row_helpers::map_device_row;

const SELECT_DEVICE: &str = r#"
    SELECT id, kind, name, location_id, description,
           rack_id, row_in_rack, units_occupied, total_ports,
           multi_port, pc_type, ip_address, username, in_domain,
           operating_system, model, office, usage, source_port
    FROM devices
"#;

/// Variant fields flattened into the shared `devices` columns
#[derive(Default)]
struct VariantColumns<'a> {
    total_ports: Option<i64>,
    multi_port: bool,
    pc_type: Option<&'static str>,
    ip_address: Option<&'a str>,
    username: Option<&'a str>,
    in_domain: bool,
    operating_system: Option<&'a str>,
    model: Option<&'a str>,
    office: Option<&'a str>,
    usage: Option<&'a str>,
    source_port: Option<&'a str>,
}

impl<'a> From<&'a DeviceVariant> for VariantColumns<'a> {
    fn from(variant: &'a DeviceVariant) -> Self {
        match variant {
            DeviceVariant::Pc(pc) => Self {
                multi_port: pc.multi_port,
                pc_type: Some(pc.pc_type.as_str()),
                ip_address: pc.ip_address.as_deref(),
                username: pc.username.as_deref(),
                in_domain: pc.in_domain,
                operating_system: pc.operating_system.as_deref(),
                model: pc.model.as_deref(),
                office: pc.office.as_deref(),
                usage: pc.usage.as_deref(),
                ..Default::default()
            },
            DeviceVariant::Switch(sw) => Self {
                total_ports: Some(sw.total_ports),
                ip_address: sw.ip_address.as_deref(),
                model: sw.model.as_deref(),
                usage: sw.usage.as_deref(),
                source_port: sw.source_port.as_deref(),
                ..Default::default()
            },
            DeviceVariant::PatchPanel(pp) => Self {
                total_ports: Some(pp.total_ports),
                ..Default::default()
            },
        }
    }
}

/// Device database operations. Callers validate placement and port changes first.
pub struct DeviceRepo;

impl DeviceRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Device>> {
        let rows = sqlx::query(&format!("{} ORDER BY kind, name", SELECT_DEVICE))
            .fetch_all(pool)
            .await?;
        rows.iter().map(map_device_row).collect()
    }

    pub async fn list_by_kind(pool: &Pool<Sqlite>, kind: DeviceKind) -> Result<Vec<Device>> {
        let rows = sqlx::query(&format!("{} WHERE kind = ? ORDER BY name", SELECT_DEVICE))
            .bind(kind.as_str())
            .fetch_all(pool)
            .await?;
        rows.iter().map(map_device_row).collect()
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Device>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_DEVICE))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        row.as_ref().map(map_device_row).transpose()
    }

    pub async fn create(pool: &Pool<Sqlite>, device: &Device) -> Result<Device> {
        let now = Utc::now();
        let cols = VariantColumns::from(&device.variant);
        let result = sqlx::query(
            r#"
            INSERT INTO devices (kind, name, location_id, description,
                                 rack_id, row_in_rack, units_occupied, total_ports,
                                 multi_port, pc_type, ip_address, username, in_domain,
                                 operating_system, model, office, usage, source_port,
                                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(device.kind().as_str())
        .bind(&device.name)
        .bind(device.location_id)
        .bind(&device.description)
        .bind(device.placement.map(|p| p.rack_id))
        .bind(device.placement.map(|p| p.row_in_rack))
        .bind(device.placement.map(|p| p.units_occupied))
        .bind(cols.total_ports)
        .bind(cols.multi_port)
        .bind(cols.pc_type)
        .bind(cols.ip_address)
        .bind(cols.username)
        .bind(cols.in_domain)
        .bind(cols.operating_system)
        .bind(cols.model)
        .bind(cols.office)
        .bind(cols.usage)
        .bind(cols.source_port)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Self::get(pool, result.last_insert_rowid())
            .await?
            .context("Device not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, device: &Device) -> Result<Device> {
        let now = Utc::now();
        let cols = VariantColumns::from(&device.variant);
        let result = sqlx::query(
            r#"
            UPDATE devices SET kind = ?, name = ?, location_id = ?, description = ?,
                               rack_id = ?, row_in_rack = ?, units_occupied = ?, total_ports = ?,
                               multi_port = ?, pc_type = ?, ip_address = ?, username = ?, in_domain = ?,
                               operating_system = ?, model = ?, office = ?, usage = ?, source_port = ?,
                               updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(device.kind().as_str())
        .bind(&device.name)
        .bind(device.location_id)
        .bind(&device.description)
        .bind(device.placement.map(|p| p.rack_id))
        .bind(device.placement.map(|p| p.row_in_rack))
        .bind(device.placement.map(|p| p.units_occupied))
        .bind(cols.total_ports)
        .bind(cols.multi_port)
        .bind(cols.pc_type)
        .bind(cols.ip_address)
        .bind(cols.username)
        .bind(cols.in_domain)
        .bind(cols.operating_system)
        .bind(cols.model)
        .bind(cols.office)
        .bind(cols.usage)
        .bind(cols.source_port)
        .bind(now)
        .bind(device.id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Device", &device.id.to_string()).into());
        }

        Self::get(pool, device.id)
            .await?
            .context("Device not found after update")
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM devices WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Device", &id.to_string()).into());
        }
        Ok(())
    }
}

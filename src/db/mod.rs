mod connections;
mod devices;
mod locations;
mod racks;
pub(crate) mod row_helpers;

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::*;
use crate::topology::{DeviceReference, PortOccupancy, RackUnit, Topology, TopologyError};

use connections::ConnectionRepo;
use devices::DeviceRepo;
use locations::LocationRepo;
use racks::RackRepo;

/// Typed error for "resource not found", downcast by the API layer
/// in the API error handler instead of fragile string matching.
#[derive(Debug)]
pub struct NotFoundError {
    pub resource: String,
    pub id: String,
}

impl NotFoundError {
    pub fn new(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not found: {}", self.resource, self.id)
    }
}

impl std::error::Error for NotFoundError {}

/// Typed error for writes that clash with existing data: duplicate names
/// and deletes of things still in use.
#[derive(Debug)]
pub struct ConflictError {
    pub message: String,
}

impl ConflictError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConflictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConflictError {}

/// Everything the topology rules need, read in one go
#[derive(Debug, Default)]
pub struct Snapshot {
    pub locations: Vec<Location>,
    pub racks: Vec<Rack>,
    pub devices: Vec<Device>,
    pub connections: Vec<Connection>,
}

impl Snapshot {
    pub fn topology(&self) -> Topology<'_> {
        Topology::new(&self.devices, &self.connections)
            .with_racks(&self.racks)
            .with_locations(&self.locations)
    }
}

fn rejected(action: &str, err: TopologyError) -> anyhow::Error {
    tracing::debug!(kind = err.kind(), "Rejected {}: {}", action, err);
    err.into()
}

/// Store handles all database operations, delegating to per-entity repo modules.
///
/// Every write that can break a rack or port invariant holds `write_lock`
/// from the moment it reads its snapshot until its commit, so the check
/// always runs against the data it is about to change.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
    write_lock: Arc<Mutex<()>>,
}

impl Store {
    /// Create a new database store with a specific pool size
    pub async fn with_pool_size(db_path: &str, max_connections: u32) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        Self::from_pool(pool).await
    }

    /// Single-connection in-memory store for tests
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: Pool<Sqlite>) -> Result<Self> {
        let store = Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        };
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Read the full inventory
    pub async fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            locations: LocationRepo::list(&self.pool).await?,
            racks: RackRepo::list(&self.pool).await?,
            devices: DeviceRepo::list(&self.pool).await?,
            connections: ConnectionRepo::list(&self.pool).await?,
        })
    }

    // ========== Location Operations ==========

    pub async fn list_locations(&self) -> Result<Vec<Location>> {
        LocationRepo::list(&self.pool).await
    }

    pub async fn get_location(&self, id: i64) -> Result<Option<Location>> {
        LocationRepo::get(&self.pool, id).await
    }

    async fn ensure_location_name_free(&self, name: &str, excluding_id: Option<i64>) -> Result<()> {
        if LocationRepo::find_by_name(&self.pool, name.trim(), excluding_id).await?.is_some() {
            return Err(ConflictError::new(format!("location '{}' already exists", name.trim())).into());
        }
        Ok(())
    }

    pub async fn create_location(&self, req: &CreateLocationRequest) -> Result<Location> {
        let _guard = self.write_lock.lock().await;
        self.ensure_location_name_free(&req.name, None).await?;

        let location = LocationRepo::create(&self.pool, req).await?;
        tracing::info!("Created location {} ('{}')", location.id, location.name);
        Ok(location)
    }

    pub async fn update_location(&self, id: i64, req: &CreateLocationRequest) -> Result<Location> {
        let _guard = self.write_lock.lock().await;
        self.ensure_location_name_free(&req.name, Some(id)).await?;

        let location = LocationRepo::update(&self.pool, id, req).await?;
        tracing::info!("Updated location {} ('{}')", location.id, location.name);
        Ok(location)
    }

    /// Delete a location that no rack or device belongs to
    pub async fn delete_location(&self, id: i64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.snapshot().await?;
        let topology = snapshot.topology();
        let location = topology
            .location(id)
            .ok_or_else(|| NotFoundError::new("Location", &id.to_string()))?;

        let dependents = topology.location_dependents(id);
        if !dependents.is_empty() {
            return Err(ConflictError::new(format!(
                "location '{}' still holds {} rack(s) and {} device(s)",
                location.name,
                dependents.racks.len(),
                dependents.devices.len()
            ))
            .into());
        }

        LocationRepo::delete(&self.pool, id).await?;
        tracing::info!("Deleted location {}", id);
        Ok(())
    }

    // ========== Rack Operations ==========

    pub async fn list_racks(&self, location_id: Option<i64>) -> Result<Vec<Rack>> {
        match location_id {
            Some(location_id) => RackRepo::list_by_location(&self.pool, location_id).await,
            None => RackRepo::list(&self.pool).await,
        }
    }

    pub async fn get_rack(&self, id: i64) -> Result<Option<Rack>> {
        RackRepo::get(&self.pool, id).await
    }

    /// Validate a rack against the snapshot: dimensions, location, devices
    /// already placed in it and name clashes within its location.
    fn check_rack(snapshot: &Snapshot, rack: &Rack) -> Result<()> {
        snapshot
            .topology()
            .validate_rack(rack)
            .map_err(|e| rejected("rack", e))?;

        let clash = snapshot.racks.iter().any(|r| {
            r.id != rack.id && r.location_id == rack.location_id && r.name.eq_ignore_ascii_case(rack.name.trim())
        });
        if clash {
            return Err(ConflictError::new(format!(
                "rack '{}' already exists in this location",
                rack.name.trim()
            ))
            .into());
        }
        Ok(())
    }

    pub async fn create_rack(&self, req: &CreateRackRequest) -> Result<Rack> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.snapshot().await?;
        let rack = req.clone().into_rack(0);
        Self::check_rack(&snapshot, &rack)?;

        let rack = RackRepo::create(&self.pool, &rack).await?;
        tracing::info!("Created rack {} ('{}', {}U)", rack.id, rack.name, rack.total_units);
        Ok(rack)
    }

    pub async fn update_rack(&self, id: i64, req: &CreateRackRequest) -> Result<Rack> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.snapshot().await?;
        if snapshot.topology().rack(id).is_none() {
            return Err(NotFoundError::new("Rack", &id.to_string()).into());
        }
        let rack = req.clone().into_rack(id);
        Self::check_rack(&snapshot, &rack)?;

        let rack = RackRepo::update(&self.pool, &rack).await?;
        tracing::info!("Updated rack {} ('{}', {}U)", rack.id, rack.name, rack.total_units);
        Ok(rack)
    }

    /// Delete a rack with no devices placed in it
    pub async fn delete_rack(&self, id: i64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.snapshot().await?;
        let topology = snapshot.topology();
        let rack = topology
            .rack(id)
            .ok_or_else(|| NotFoundError::new("Rack", &id.to_string()))?;

        let placed = topology.devices_in_rack(id);
        if !placed.is_empty() {
            return Err(ConflictError::new(format!(
                "rack '{}' still holds {} device(s)",
                rack.name,
                placed.len()
            ))
            .into());
        }

        RackRepo::delete(&self.pool, id).await?;
        tracing::info!("Deleted rack {}", id);
        Ok(())
    }

    /// Unit-by-unit occupancy of a rack in display order
    pub async fn rack_units(&self, id: i64) -> Result<Vec<RackUnit>> {
        let snapshot = self.snapshot().await?;
        let topology = snapshot.topology();
        let rack = topology
            .rack(id)
            .ok_or_else(|| NotFoundError::new("Rack", &id.to_string()))?;
        Ok(topology.rack_occupancy_map(rack))
    }

    // ========== Device Operations ==========

    pub async fn list_devices(&self, kind: Option<DeviceKind>) -> Result<Vec<Device>> {
        match kind {
            Some(kind) => DeviceRepo::list_by_kind(&self.pool, kind).await,
            None => DeviceRepo::list(&self.pool).await,
        }
    }

    pub async fn get_device(&self, id: i64) -> Result<Option<Device>> {
        DeviceRepo::get(&self.pool, id).await
    }

    pub async fn create_device(&self, req: &CreateDeviceRequest) -> Result<Device> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.snapshot().await?;
        let device = snapshot
            .topology()
            .validate_device(&req.clone().into_device(0), None)
            .map_err(|e| rejected("device", e))?;

        let device = DeviceRepo::create(&self.pool, &device).await?;
        tracing::info!("Created {} {} ('{}')", device.kind(), device.id, device.name);
        Ok(device)
    }

    pub async fn update_device(&self, id: i64, req: &CreateDeviceRequest) -> Result<Device> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.snapshot().await?;
        let topology = snapshot.topology();
        if topology.device(id).is_none() {
            return Err(NotFoundError::new("Device", &id.to_string()).into());
        }
        let device = topology
            .validate_device(&req.clone().into_device(id), Some(id))
            .map_err(|e| rejected("device", e))?;

        let device = DeviceRepo::update(&self.pool, &device).await?;
        tracing::info!("Updated {} {} ('{}')", device.kind(), device.id, device.name);
        Ok(device)
    }

    /// Delete a device that no connection uses
    pub async fn delete_device(&self, id: i64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.snapshot().await?;
        let topology = snapshot.topology();
        let device = topology
            .device(id)
            .ok_or_else(|| NotFoundError::new("Device", &id.to_string()))?;

        let refs = topology.referenced_by(id);
        if let Some(first) = refs.first() {
            return Err(ConflictError::new(format!(
                "{} '{}' is used by {} connection path(s), including connection {}",
                device.kind(),
                device.name,
                refs.len(),
                first.connection_id
            ))
            .into());
        }

        DeviceRepo::delete(&self.pool, id).await?;
        tracing::info!("Deleted device {}", id);
        Ok(())
    }

    /// Port-by-port occupancy of a switch or patch panel
    pub async fn device_ports(&self, id: i64) -> Result<PortOccupancy> {
        let snapshot = self.snapshot().await?;
        let topology = snapshot.topology();
        let device = topology
            .device(id)
            .ok_or_else(|| NotFoundError::new("Device", &id.to_string()))?;
        Ok(topology.port_occupancy(device)?)
    }

    pub async fn device_references(&self, id: i64) -> Result<Vec<DeviceReference>> {
        let snapshot = self.snapshot().await?;
        let topology = snapshot.topology();
        if topology.device(id).is_none() {
            return Err(NotFoundError::new("Device", &id.to_string()).into());
        }
        Ok(topology.referenced_by(id))
    }

    /// PCs that may be picked for a new connection, or for the connection
    /// `excluding_connection_id` when editing it
    pub async fn available_pcs(&self, excluding_connection_id: Option<i64>) -> Result<Vec<Device>> {
        let snapshot = self.snapshot().await?;
        let eligible = snapshot.topology().eligible_pcs(excluding_connection_id);
        Ok(snapshot
            .devices
            .into_iter()
            .filter(|d| eligible.contains(&d.id))
            .collect())
    }

    // ========== Connection Operations ==========

    pub async fn list_connections(&self) -> Result<Vec<Connection>> {
        ConnectionRepo::list(&self.pool).await
    }

    pub async fn get_connection(&self, id: i64) -> Result<Option<Connection>> {
        ConnectionRepo::get(&self.pool, id).await
    }

    /// Dry-run validation, nothing is written
    pub async fn validate_connection(
        &self,
        req: &ConnectionRequest,
        excluding_connection_id: Option<i64>,
    ) -> Result<CanonicalConnection> {
        let snapshot = self.snapshot().await?;
        if let Some(id) = excluding_connection_id {
            if !snapshot.connections.iter().any(|c| c.id == id) {
                return Err(NotFoundError::new("Connection", &id.to_string()).into());
            }
        }
        snapshot
            .topology()
            .validate_connection(req, excluding_connection_id)
            .map_err(|e| rejected("connection", e))
    }

    pub async fn create_connection(&self, req: &ConnectionRequest) -> Result<Connection> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.snapshot().await?;
        let canonical = snapshot
            .topology()
            .validate_connection(req, None)
            .map_err(|e| rejected("connection", e))?;

        let conn = ConnectionRepo::create(&self.pool, &canonical).await?;
        tracing::info!(
            "Created connection {}: PC {} -> switch {} port {} via {} hop(s)",
            conn.id,
            conn.pc_id,
            conn.switch_id,
            conn.switch_port,
            conn.hops.len()
        );
        Ok(conn)
    }

    pub async fn update_connection(&self, id: i64, req: &ConnectionRequest) -> Result<Connection> {
        let _guard = self.write_lock.lock().await;
        let snapshot = self.snapshot().await?;
        if !snapshot.connections.iter().any(|c| c.id == id) {
            return Err(NotFoundError::new("Connection", &id.to_string()).into());
        }
        let canonical = snapshot
            .topology()
            .validate_connection(req, Some(id))
            .map_err(|e| rejected("connection", e))?;

        let conn = ConnectionRepo::update(&self.pool, id, &canonical).await?;
        tracing::info!(
            "Updated connection {}: PC {} -> switch {} port {} via {} hop(s)",
            conn.id,
            conn.pc_id,
            conn.switch_id,
            conn.switch_port,
            conn.hops.len()
        );
        Ok(conn)
    }

    pub async fn delete_connection(&self, id: i64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        ConnectionRepo::delete(&self.pool, id).await?;
        tracing::info!("Deleted connection {}", id);
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

/// Colour/label of the physical cable leading into a segment of the path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CableInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cable_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cable_label: Option<String>,
}

/// Hop is one patch-panel traversal, ordered from the PC side to the switch side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    pub sequence: i64,
    /// Location the patch panel was picked from; kept for display only
    pub location_id: i64,
    pub patch_panel_id: i64,
    pub patch_panel_port: String,
    pub is_port_up: bool,
    #[serde(flatten)]
    pub cable: CableInfo,
}

/// Connection is a cable path from a PC through zero or more patch panels to a switch port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: i64,
    pub pc_id: i64,
    pub switch_id: i64,
    pub switch_port: String,
    pub is_switch_port_up: bool,
    #[serde(flatten)]
    pub cable: CableInfo,
    pub hops: Vec<Hop>,
}

/// A validated connection path with hops re-indexed 0..n-1, ready to persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalConnection {
    pub pc_id: i64,
    pub switch_id: i64,
    pub switch_port: String,
    pub is_switch_port_up: bool,
    #[serde(flatten)]
    pub cable: CableInfo,
    pub hops: Vec<Hop>,
}

impl CanonicalConnection {
    pub fn into_connection(self, id: i64) -> Connection {
        Connection {
            id,
            pc_id: self.pc_id,
            switch_id: self.switch_id,
            switch_port: self.switch_port,
            is_switch_port_up: self.is_switch_port_up,
            cable: self.cable,
            hops: self.hops,
        }
    }
}

fn default_true() -> bool {
    true
}

/// HopRequest is a hop as submitted by a client. Every field is optional so
/// that missing values surface as structured validation errors.
#[derive(Debug, Clone, Deserialize)]
pub struct HopRequest {
    #[serde(default)]
    pub sequence: Option<i64>,
    /// Only used by clients to filter patch panels; never re-checked
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub patch_panel_id: Option<i64>,
    #[serde(default)]
    pub patch_panel_port: Option<String>,
    #[serde(default = "default_true")]
    pub is_port_up: bool,
    #[serde(flatten)]
    pub cable: CableInfo,
}

/// ConnectionRequest for creating/updating/validating connections
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionRequest {
    #[serde(default)]
    pub pc_id: Option<i64>,
    #[serde(default)]
    pub switch_id: Option<i64>,
    #[serde(default)]
    pub switch_port: Option<String>,
    #[serde(default = "default_true")]
    pub is_switch_port_up: bool,
    #[serde(flatten)]
    pub cable: CableInfo,
    #[serde(default)]
    pub hops: Vec<HopRequest>,
}

impl From<&Connection> for ConnectionRequest {
    fn from(conn: &Connection) -> Self {
        Self {
            pc_id: Some(conn.pc_id),
            switch_id: Some(conn.switch_id),
            switch_port: Some(conn.switch_port.clone()),
            is_switch_port_up: conn.is_switch_port_up,
            cable: conn.cable.clone(),
            hops: conn
                .hops
                .iter()
                .map(|hop| HopRequest {
                    sequence: Some(hop.sequence),
                    location_id: Some(hop.location_id),
                    patch_panel_id: Some(hop.patch_panel_id),
                    patch_panel_port: Some(hop.patch_panel_port.clone()),
                    is_port_up: hop.is_port_up,
                    cable: hop.cable.clone(),
                })
                .collect(),
        }
    }
}

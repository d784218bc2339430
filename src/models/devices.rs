use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical device kind values, as stored in the `devices.kind` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Pc,
    Switch,
    PatchPanel,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Pc => "pc",
            DeviceKind::Switch => "switch",
            DeviceKind::PatchPanel => "patch_panel",
        }
    }

    /// Human-readable label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            DeviceKind::Pc => "PC",
            DeviceKind::Switch => "Switch",
            DeviceKind::PatchPanel => "Patch Panel",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DeviceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pc" => Ok(DeviceKind::Pc),
            "switch" => Ok(DeviceKind::Switch),
            "patch_panel" => Ok(DeviceKind::PatchPanel),
            other => Err(anyhow::anyhow!("unknown device kind: {}", other)),
        }
    }
}

/// Where a device sits in a rack: starting unit plus height in units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackPlacement {
    pub rack_id: i64,
    pub row_in_rack: i64,
    #[serde(default = "default_units_occupied")]
    pub units_occupied: i64,
}

fn default_units_occupied() -> i64 {
    1
}

impl RackPlacement {
    /// Highest unit number covered by this placement (inclusive)
    pub fn top_unit(&self) -> i64 {
        self.row_in_rack.saturating_add(self.units_occupied).saturating_sub(1)
    }
}

/// PC role. Only servers take up rack space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PcType {
    #[default]
    Workstation,
    Server,
}

impl PcType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PcType::Workstation => "Workstation",
            PcType::Server => "Server",
        }
    }
}

impl FromStr for PcType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Workstation" => Ok(PcType::Workstation),
            "Server" => Ok(PcType::Server),
            other => Err(anyhow::anyhow!("unknown PC type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcDetails {
    /// Single-port PCs may originate at most one connection
    #[serde(default)]
    pub multi_port: bool,
    #[serde(default, rename = "type")]
    pub pc_type: PcType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub in_domain: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchDetails {
    pub total_ports: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Uplink port on the switch itself, e.g. "Eth0/1"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchPanelDetails {
    pub total_ports: i64,
}

/// Variant-specific device data, tagged by `kind` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceVariant {
    Pc(PcDetails),
    Switch(SwitchDetails),
    PatchPanel(PatchPanelDetails),
}

impl DeviceVariant {
    pub fn kind(&self) -> DeviceKind {
        match self {
            DeviceVariant::Pc(_) => DeviceKind::Pc,
            DeviceVariant::Switch(_) => DeviceKind::Switch,
            DeviceVariant::PatchPanel(_) => DeviceKind::PatchPanel,
        }
    }
}

/// Device is a PC, switch or patch panel that may be placed in a rack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<RackPlacement>,
    #[serde(flatten)]
    pub variant: DeviceVariant,
}

impl Device {
    pub fn kind(&self) -> DeviceKind {
        self.variant.kind()
    }

    pub fn as_pc(&self) -> Option<&PcDetails> {
        match &self.variant {
            DeviceVariant::Pc(pc) => Some(pc),
            _ => None,
        }
    }

    /// Port count for switches and patch panels; PCs have no numbered ports.
    pub fn total_ports(&self) -> Option<i64> {
        match &self.variant {
            DeviceVariant::Switch(sw) => Some(sw.total_ports),
            DeviceVariant::PatchPanel(pp) => Some(pp.total_ports),
            DeviceVariant::Pc(_) => None,
        }
    }

    /// The rack units this device actually takes up. Workstation PCs never
    /// occupy rack space even if a stale placement is recorded.
    pub fn rack_slot(&self) -> Option<&RackPlacement> {
        match &self.variant {
            DeviceVariant::Pc(pc) if pc.pc_type != PcType::Server => None,
            _ => self.placement.as_ref(),
        }
    }
}

/// CreateDeviceRequest for creating/updating devices of any kind
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeviceRequest {
    pub name: String,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub placement: Option<RackPlacement>,
    #[serde(flatten)]
    pub variant: DeviceVariant,
}

impl CreateDeviceRequest {
    pub fn into_device(self, id: i64) -> Device {
        Device {
            id,
            name: self.name,
            location_id: self.location_id,
            description: self.description,
            placement: self.placement,
            variant: self.variant,
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which end of the rack unit 1 sits at. Only affects display order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RackOrientation {
    #[default]
    BottomUp,
    TopDown,
}

impl RackOrientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            RackOrientation::BottomUp => "bottom-up",
            RackOrientation::TopDown => "top-down",
        }
    }
}

impl fmt::Display for RackOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RackOrientation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bottom-up" => Ok(RackOrientation::BottomUp),
            "top-down" => Ok(RackOrientation::TopDown),
            other => Err(anyhow::anyhow!("unknown rack orientation: {}", other)),
        }
    }
}

/// Rack is a vertical frame of numbered units at a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rack {
    pub id: i64,
    pub name: String,
    pub location_id: i64,
    // Enriched via JOIN (not stored)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_units: i64,
    pub orientation: RackOrientation,
}

/// CreateRackRequest for creating/updating racks
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRackRequest {
    pub name: String,
    pub location_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_total_units")]
    pub total_units: i64,
    #[serde(default)]
    pub orientation: RackOrientation,
}

fn default_total_units() -> i64 {
    42
}

impl CreateRackRequest {
    pub fn into_rack(self, id: i64) -> Rack {
        Rack {
            id,
            name: self.name,
            location_id: self.location_id,
            location_name: None,
            description: self.description,
            total_units: self.total_units,
            orientation: self.orientation,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Location is a room or site that racks and rack-less devices belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub door_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// CreateLocationRequest for creating/updating locations
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLocationRequest {
    pub name: String,
    #[serde(default)]
    pub door_number: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

use thiserror::Error;

/// A violated topology or capacity rule. Every variant is recoverable by
/// resubmitting corrected input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// Rack unit, port number or size outside its valid bounds
    #[error("{subject} {value} is out of range ({})", describe_bounds(.min, .max))]
    OutOfRange {
        subject: String,
        value: i64,
        min: i64,
        max: Option<i64>,
    },

    #[error("rack {rack_id} units {start}-{end} are already occupied by device(s) {}", join_ids(.conflicting))]
    OverlapConflict {
        rack_id: i64,
        start: i64,
        end: i64,
        conflicting: Vec<i64>,
    },

    #[error("port {port} on {device_name} is already in use by connection {connection_id}")]
    PortConflict {
        device_id: i64,
        device_name: String,
        port: String,
        connection_id: i64,
    },

    #[error("PC '{pc_name}' is a single-port device and is already connected (connection {connection_id})")]
    IneligiblePc {
        pc_id: i64,
        pc_name: String,
        connection_id: i64,
    },

    /// Missing or wrongly-typed referenced entity
    #[error("{0}")]
    Referential(String),

    /// Malformed input: blank required fields, hop gaps or duplicates
    #[error("{0}")]
    Structural(String),
}

impl TopologyError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            TopologyError::OutOfRange { .. } => "out_of_range",
            TopologyError::OverlapConflict { .. } => "overlap_conflict",
            TopologyError::PortConflict { .. } => "port_conflict",
            TopologyError::IneligiblePc { .. } => "ineligible_pc",
            TopologyError::Referential(_) => "referential",
            TopologyError::Structural(_) => "structural",
        }
    }

    pub(crate) fn structural(msg: impl Into<String>) -> Self {
        TopologyError::Structural(msg.into())
    }

    pub(crate) fn referential(msg: impl Into<String>) -> Self {
        TopologyError::Referential(msg.into())
    }
}

fn describe_bounds(min: &i64, max: &Option<i64>) -> String {
    match max {
        Some(max) => format!("expected {}..={}", min, max),
        None => format!("expected at least {}", min),
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(TopologyError::structural("x").kind(), "structural");
        assert_eq!(TopologyError::referential("x").kind(), "referential");
        let err = TopologyError::OverlapConflict {
            rack_id: 1,
            start: 11,
            end: 11,
            conflicting: vec![3, 7],
        };
        assert_eq!(err.kind(), "overlap_conflict");
        assert_eq!(
            err.to_string(),
            "rack 1 units 11-11 are already occupied by device(s) 3, 7"
        );
    }

    #[test]
    fn test_out_of_range_message() {
        let bounded = TopologyError::OutOfRange {
            subject: "row_in_rack".into(),
            value: 0,
            min: 1,
            max: Some(42),
        };
        assert_eq!(bounded.to_string(), "row_in_rack 0 is out of range (expected 1..=42)");

        let open = TopologyError::OutOfRange {
            subject: "total_ports".into(),
            value: 0,
            min: 1,
            max: None,
        };
        assert_eq!(open.to_string(), "total_ports 0 is out of range (expected at least 1)");
    }
}

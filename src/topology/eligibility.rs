//! Which PCs may originate a new connection.

use std::collections::BTreeSet;

use crate::models::{Connection, Device};

use super::TopologyError;

/// Ids of the PCs in `devices` that can take another connection.
///
/// A PC is eligible if it is multi-port or not yet the PC of any connection.
/// `excluding_connection_id` is dropped from the connection set first, so the
/// PC of the connection being edited stays selectable.
pub fn eligible_pcs(
    devices: &[Device],
    connections: &[Connection],
    excluding_connection_id: Option<i64>,
) -> BTreeSet<i64> {
    let connected: BTreeSet<i64> = connections
        .iter()
        .filter(|c| Some(c.id) != excluding_connection_id)
        .map(|c| c.pc_id)
        .collect();

    devices
        .iter()
        .filter_map(|d| d.as_pc().map(|pc| (d.id, pc.multi_port)))
        .filter(|(id, multi_port)| *multi_port || !connected.contains(id))
        .map(|(id, _)| id)
        .collect()
}

/// Commit-time check of the single-port rule for one PC
pub fn check_pc_eligible(
    pc: &Device,
    connections: &[Connection],
    excluding_connection_id: Option<i64>,
) -> Result<(), TopologyError> {
    let Some(details) = pc.as_pc() else {
        return Err(TopologyError::referential(format!(
            "device {} ('{}') is a {}, not a PC",
            pc.id,
            pc.name,
            pc.kind()
        )));
    };
    if details.multi_port {
        return Ok(());
    }

    let existing = connections
        .iter()
        .find(|c| c.pc_id == pc.id && Some(c.id) != excluding_connection_id);

    match existing {
        Some(conn) => Err(TopologyError::IneligiblePc {
            pc_id: pc.id,
            pc_name: pc.name.clone(),
            connection_id: conn.id,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::fixtures::*;

    #[test]
    fn test_connected_single_port_pc_excluded() {
        let devices = vec![pc(1, "PC1", false), pc(2, "PC2", false), switch(10, "SW1", 24)];
        let connections = vec![connection(100, 1, 10, "1", vec![])];

        let eligible = eligible_pcs(&devices, &connections, None);
        assert_eq!(eligible.into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_multi_port_pc_always_eligible() {
        let devices = vec![pc(1, "SRV", true)];
        let connections = vec![
            connection(100, 1, 10, "1", vec![]),
            connection(101, 1, 10, "2", vec![]),
        ];
        assert!(eligible_pcs(&devices, &connections, None).contains(&1));
        assert!(check_pc_eligible(&devices[0], &connections, None).is_ok());
    }

    #[test]
    fn test_editing_connection_keeps_its_pc() {
        let devices = vec![pc(1, "PC1", false)];
        let connections = vec![connection(100, 1, 10, "1", vec![])];

        assert!(eligible_pcs(&devices, &connections, Some(100)).contains(&1));
        assert!(!eligible_pcs(&devices, &connections, Some(999)).contains(&1));
    }

    #[test]
    fn test_check_pc_eligible() {
        let pc1 = pc(1, "PC1", false);
        let connections = vec![connection(100, 1, 10, "1", vec![])];

        assert_eq!(
            check_pc_eligible(&pc1, &connections, None),
            Err(TopologyError::IneligiblePc {
                pc_id: 1,
                pc_name: "PC1".into(),
                connection_id: 100,
            })
        );
        assert!(check_pc_eligible(&pc1, &connections, Some(100)).is_ok());
        assert_eq!(
            check_pc_eligible(&switch(10, "SW1", 24), &connections, None)
                .unwrap_err()
                .kind(),
            "referential"
        );
    }
}

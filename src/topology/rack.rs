//! Rack slot allocation.
//!
//! Overlap is always computed on absolute unit numbers; orientation only
//! changes the order in which [`occupancy_map`] lists units.

use serde::Serialize;

use crate::models::{Device, Rack, RackOrientation, RackPlacement};

use super::TopologyError;

/// Largest rack the inventory accepts
pub const MAX_RACK_UNITS: i64 = 50;

/// Closed interval of rack units `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnitRange {
    pub start: i64,
    pub end: i64,
}

impl UnitRange {
    pub fn new(row: i64, units: i64) -> Self {
        Self {
            start: row,
            end: row.saturating_add(units).saturating_sub(1),
        }
    }

    pub fn overlaps(&self, other: &UnitRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl From<&RackPlacement> for UnitRange {
    fn from(p: &RackPlacement) -> Self {
        UnitRange {
            start: p.row_in_rack,
            end: p.top_unit(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UnitSlot {
    Free,
    Occupied { device_id: i64, is_start_unit: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RackUnit {
    pub unit: i64,
    #[serde(flatten)]
    pub slot: UnitSlot,
}

/// Devices that take up space in `rack`, with their unit ranges
fn occupants<'a>(rack: &Rack, devices: &'a [Device]) -> impl Iterator<Item = (&'a Device, UnitRange)> {
    let rack_id = rack.id;
    devices.iter().filter_map(move |d| {
        d.rack_slot()
            .filter(|p| p.rack_id == rack_id)
            .map(|p| (d, UnitRange::from(p)))
    })
}

/// Check that a device of `units` height can start at `row` in `rack`.
///
/// `excluding_device_id` skips the device being edited so it does not
/// collide with its own current placement.
pub fn validate_placement(
    rack: &Rack,
    devices: &[Device],
    row: i64,
    units: i64,
    excluding_device_id: Option<i64>,
) -> Result<UnitRange, TopologyError> {
    if units < 1 {
        return Err(TopologyError::OutOfRange {
            subject: "units_occupied".into(),
            value: units,
            min: 1,
            max: Some(rack.total_units),
        });
    }
    if row < 1 || row > rack.total_units {
        return Err(TopologyError::OutOfRange {
            subject: format!("row_in_rack for rack '{}'", rack.name),
            value: row,
            min: 1,
            max: Some(rack.total_units),
        });
    }

    let room = rack.total_units - row + 1;
    if units > room {
        return Err(TopologyError::OutOfRange {
            subject: format!("units_occupied at row {} in rack '{}'", row, rack.name),
            value: units,
            min: 1,
            max: Some(room),
        });
    }

    let proposed = UnitRange::new(row, units);

    let mut conflicting: Vec<i64> = occupants(rack, devices)
        .filter(|(d, _)| Some(d.id) != excluding_device_id)
        .filter(|(_, range)| range.overlaps(&proposed))
        .map(|(d, _)| d.id)
        .collect();

    if !conflicting.is_empty() {
        conflicting.sort_unstable();
        conflicting.dedup();
        return Err(TopologyError::OverlapConflict {
            rack_id: rack.id,
            start: proposed.start,
            end: proposed.end,
            conflicting,
        });
    }

    Ok(proposed)
}

/// Unit-by-unit view of `rack`, in display order.
///
/// Bottom-up racks list the highest unit first (unit 1 at the bottom);
/// top-down racks list unit 1 first. Units beyond the rack are ignored and,
/// should stored data ever overlap, the first device listed keeps the unit.
pub fn occupancy_map(rack: &Rack, devices: &[Device]) -> Vec<RackUnit> {
    let total = rack.total_units.max(0);
    let mut slots = vec![UnitSlot::Free; total as usize];

    for (device, range) in occupants(rack, devices) {
        for unit in range.start.max(1)..=range.end.min(total) {
            let slot = &mut slots[(unit - 1) as usize];
            if *slot == UnitSlot::Free {
                *slot = UnitSlot::Occupied {
                    device_id: device.id,
                    is_start_unit: unit == range.start,
                };
            }
        }
    }

    let mut units: Vec<RackUnit> = slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| RackUnit {
            unit: i as i64 + 1,
            slot,
        })
        .collect();

    if rack.orientation == RackOrientation::BottomUp {
        units.reverse();
    }
    units
}

/// Check a rack's own dimensions
pub fn validate_rack(rack: &Rack) -> Result<(), TopologyError> {
    if rack.name.trim().is_empty() {
        return Err(TopologyError::structural("rack name is required"));
    }
    if !(1..=MAX_RACK_UNITS).contains(&rack.total_units) {
        return Err(TopologyError::OutOfRange {
            subject: "total_units".into(),
            value: rack.total_units,
            min: 1,
            max: Some(MAX_RACK_UNITS),
        });
    }
    Ok(())
}

/// Check that `rack` can change to `new_total_units` without cutting off
/// any device currently placed in it.
pub fn validate_rack_resize(rack: &Rack, new_total_units: i64, devices: &[Device]) -> Result<(), TopologyError> {
    let highest = occupants(rack, devices).max_by_key(|(_, range)| range.end);

    if let Some((device, range)) = highest {
        if range.end > new_total_units {
            return Err(TopologyError::OutOfRange {
                subject: format!(
                    "total_units for rack '{}' ({} '{}' reaches unit {})",
                    rack.name,
                    device.kind(),
                    device.name,
                    range.end
                ),
                value: new_total_units,
                min: range.end,
                max: Some(MAX_RACK_UNITS),
            });
        }
    }

    validate_rack(&Rack {
        total_units: new_total_units,
        ..rack.clone()
    })
}

/// Ids of every device with a recorded placement in `rack_id`, regardless
/// of whether it currently takes up space.
pub fn devices_in_rack(rack_id: i64, devices: &[Device]) -> Vec<i64> {
    devices
        .iter()
        .filter(|d| d.placement.map(|p| p.rack_id) == Some(rack_id))
        .map(|d| d.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::fixtures::*;

    fn r1() -> Rack {
        rack(1, "R1", 42, RackOrientation::BottomUp)
    }

    #[test]
    fn test_overlap_is_closed_interval() {
        let a = UnitRange::new(10, 2);
        assert!(a.overlaps(&UnitRange::new(11, 1)));
        assert!(a.overlaps(&UnitRange::new(8, 3)));
        assert!(!a.overlaps(&UnitRange::new(12, 1)));
        assert!(!a.overlaps(&UnitRange::new(8, 2)));
    }

    #[test]
    fn test_scenario_switch_then_patch_panel() {
        let rack = r1();
        let mut devices = Vec::new();

        let range = validate_placement(&rack, &devices, 10, 2, None).unwrap();
        assert_eq!(range, UnitRange { start: 10, end: 11 });
        devices.push(placed(switch(1, "SW1", 24), 1, 10, 2));

        let err = validate_placement(&rack, &devices, 11, 1, None).unwrap_err();
        assert_eq!(
            err,
            TopologyError::OverlapConflict {
                rack_id: 1,
                start: 11,
                end: 11,
                conflicting: vec![1],
            }
        );
    }

    #[test]
    fn test_adjacent_placement_allowed() {
        let rack = r1();
        let devices = vec![placed(switch(1, "SW1", 24), 1, 10, 2)];
        assert!(validate_placement(&rack, &devices, 12, 1, None).is_ok());
        assert!(validate_placement(&rack, &devices, 9, 1, None).is_ok());
    }

    #[test]
    fn test_reports_every_conflicting_device() {
        let rack = r1();
        let devices = vec![
            placed(patch_panel(7, "PP2", 24), 1, 5, 1),
            placed(switch(3, "SW1", 24), 1, 3, 1),
            placed(patch_panel(9, "PP9", 24), 1, 20, 1),
        ];
        match validate_placement(&rack, &devices, 2, 4, None).unwrap_err() {
            TopologyError::OverlapConflict { conflicting, .. } => assert_eq!(conflicting, vec![3, 7]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_rejected() {
        let rack = r1();
        let kinds = [
            validate_placement(&rack, &[], 0, 1, None),
            validate_placement(&rack, &[], 1, 0, None),
            validate_placement(&rack, &[], 43, 1, None),
            validate_placement(&rack, &[], 41, 3, None),
        ];
        for result in kinds {
            assert_eq!(result.unwrap_err().kind(), "out_of_range");
        }
        assert!(validate_placement(&rack, &[], 41, 2, None).is_ok());
    }

    #[test]
    fn test_oversized_device_rejected_without_overflow() {
        let rack = r1();
        assert_eq!(
            validate_placement(&rack, &[], 2, i64::MAX, None),
            Err(TopologyError::OutOfRange {
                subject: "units_occupied at row 2 in rack 'R1'".into(),
                value: i64::MAX,
                min: 1,
                max: Some(41),
            })
        );

        let stored = vec![placed(switch(1, "SW1", 24), 1, 2, i64::MAX)];
        assert_eq!(occupancy_map(&rack, &stored).len(), 42);
        assert_eq!(validate_rack_resize(&rack, 42, &stored).unwrap_err().kind(), "out_of_range");
    }

    #[test]
    fn test_excluding_self_allows_resizing_in_place() {
        let rack = r1();
        let devices = vec![placed(switch(1, "SW1", 24), 1, 10, 2)];
        assert!(validate_placement(&rack, &devices, 10, 3, Some(1)).is_ok());
        assert!(validate_placement(&rack, &devices, 10, 3, Some(2)).is_err());
    }

    #[test]
    fn test_other_racks_and_workstations_ignored() {
        let rack = r1();
        let mut workstation = pc(4, "WS1", false);
        workstation.placement = Some(RackPlacement {
            rack_id: 1,
            row_in_rack: 10,
            units_occupied: 1,
        });
        let devices = vec![placed(switch(1, "SW1", 24), 2, 10, 2), workstation];
        assert!(validate_placement(&rack, &devices, 10, 1, None).is_ok());
    }

    #[test]
    fn test_server_pc_occupies_units() {
        let rack = r1();
        let devices = vec![placed(server(5, "SRV1"), 1, 1, 4)];
        assert!(validate_placement(&rack, &devices, 4, 1, None).is_err());
        assert!(validate_placement(&rack, &devices, 5, 1, None).is_ok());
    }

    #[test]
    fn test_occupancy_map_bottom_up() {
        let rack = rack(1, "R", 4, RackOrientation::BottomUp);
        let devices = vec![placed(switch(1, "SW1", 24), 1, 2, 2)];
        let map = occupancy_map(&rack, &devices);

        let units: Vec<i64> = map.iter().map(|u| u.unit).collect();
        assert_eq!(units, vec![4, 3, 2, 1]);
        assert_eq!(map[0].slot, UnitSlot::Free);
        assert_eq!(
            map[1].slot,
            UnitSlot::Occupied {
                device_id: 1,
                is_start_unit: false
            }
        );
        assert_eq!(
            map[2].slot,
            UnitSlot::Occupied {
                device_id: 1,
                is_start_unit: true
            }
        );
        assert_eq!(map[3].slot, UnitSlot::Free);
    }

    #[test]
    fn test_occupancy_map_top_down_same_occupancy() {
        let devices = vec![placed(switch(1, "SW1", 24), 1, 2, 2)];
        let bottom_up = occupancy_map(&rack(1, "R", 4, RackOrientation::BottomUp), &devices);
        let mut top_down = occupancy_map(&rack(1, "R", 4, RackOrientation::TopDown), &devices);

        assert_eq!(top_down.first().map(|u| u.unit), Some(1));
        top_down.reverse();
        assert_eq!(top_down, bottom_up);
    }

    #[test]
    fn test_occupancy_map_clips_to_rack() {
        let rack = rack(1, "R", 3, RackOrientation::TopDown);
        let devices = vec![placed(switch(1, "SW1", 24), 1, 3, 4)];
        let map = occupancy_map(&rack, &devices);
        assert_eq!(map.len(), 3);
        assert_eq!(
            map[2].slot,
            UnitSlot::Occupied {
                device_id: 1,
                is_start_unit: true
            }
        );
    }

    #[test]
    fn test_rack_size_bounds() {
        assert!(validate_rack(&rack(1, "R", 42, RackOrientation::BottomUp)).is_ok());
        assert!(validate_rack(&rack(1, "R", 0, RackOrientation::BottomUp)).is_err());
        assert!(validate_rack(&rack(1, "R", 51, RackOrientation::BottomUp)).is_err());
        assert_eq!(
            validate_rack(&rack(1, " ", 42, RackOrientation::BottomUp)).unwrap_err().kind(),
            "structural"
        );
    }

    #[test]
    fn test_resize_checks_whole_interval() {
        let rack = r1();
        let devices = vec![placed(switch(1, "SW1", 24), 1, 10, 4)];

        assert!(validate_rack_resize(&rack, 13, &devices).is_ok());
        match validate_rack_resize(&rack, 12, &devices).unwrap_err() {
            TopologyError::OutOfRange { value, min, .. } => {
                assert_eq!(value, 12);
                assert_eq!(min, 13);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(validate_rack_resize(&rack, 60, &devices).is_err());
    }

    #[test]
    fn test_devices_in_rack_includes_stale_workstation_placement() {
        let mut workstation = pc(4, "WS1", false);
        workstation.placement = Some(RackPlacement {
            rack_id: 1,
            row_in_rack: 10,
            units_occupied: 1,
        });
        let devices = vec![placed(switch(1, "SW1", 24), 1, 1, 1), workstation, switch(2, "SW2", 8)];
        assert_eq!(devices_in_rack(1, &devices), vec![1, 4]);
    }
}

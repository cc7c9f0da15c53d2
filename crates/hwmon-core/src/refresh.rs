//! Pre-order tree refresh
//!
//! Whole-computer refresh visits every hardware node, parent before
//! children, so sensor reads taken afterwards are never older than their
//! owning hardware's update. The node set is closed (hardware only;
//! sensors refresh through their owner), so a plain recursive walk is
//! enough - no visitor dispatch.

use std::sync::Arc;

use crate::node::{HardwareNode, SensorNode};

/// Update every node in the given trees, parents before children.
pub fn refresh_tree(roots: &[Arc<dyn HardwareNode>]) {
    for hardware in roots {
        refresh_node(hardware);
    }
}

/// Update one hardware node, then its sub-hardware recursively.
pub fn refresh_node(hardware: &Arc<dyn HardwareNode>) {
    hardware.update();
    for sub in hardware.sub_hardware() {
        refresh_node(&sub);
    }
}

/// Refresh a sensor by updating its owning hardware node.
///
/// Sensors carry no update of their own: a reading is only accurate
/// immediately after the owning hardware's update. An orphaned sensor
/// (owner already gone) is a no-op.
pub fn refresh_sensor(sensor: &Arc<dyn SensorNode>) {
    if let Some(owner) = sensor.owner() {
        owner.update();
    } else {
        log::warn!("refresh_sensor: sensor {:?} has no owner", sensor.identifier());
    }
}

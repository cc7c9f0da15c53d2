//! Node traits for the hardware object graph
//!
//! Nodes are trait objects shared behind `Arc`: every accessor that hands
//! a node out clones the `Arc`, so a node stays alive for as long as any
//! holder keeps it, independent of the tree it came from. A sensor holds a
//! weak back-reference to its owner to keep the graph acyclic.

use std::sync::Arc;

use crate::kind::{HardwareKind, SensorKind};

/// One hardware device (or sub-device) in the tree
pub trait HardwareNode: Send + Sync {
    /// Human-readable device name ("AMD Ryzen 9 7950X")
    fn name(&self) -> String;

    /// Stable path-style identifier ("/cpu/0")
    fn identifier(&self) -> String;

    fn kind(&self) -> HardwareKind;

    /// Nested devices one level down
    fn sub_hardware(&self) -> Vec<Arc<dyn HardwareNode>>;

    /// Sensors attached directly to this device (not to sub-hardware)
    fn sensors(&self) -> Vec<Arc<dyn SensorNode>>;

    /// Re-poll live readings for this node's own sensors.
    ///
    /// Does not descend into sub-hardware; whole-tree refresh is
    /// [`crate::refresh_tree`]'s job.
    fn update(&self);
}

/// One sensor reading source on a hardware node
pub trait SensorNode: Send + Sync {
    fn name(&self) -> String;

    /// Stable path-style identifier ("/cpu/0/temperature/0")
    fn identifier(&self) -> String;

    fn kind(&self) -> SensorKind;

    /// Current reading, if the owning hardware has been updated since the
    /// sensor appeared. `None` means "no reading yet", not zero.
    fn value(&self) -> Option<f32>;

    /// Minimum reading observed so far
    fn min(&self) -> Option<f32>;

    /// Maximum reading observed so far
    fn max(&self) -> Option<f32>;

    /// The hardware node this sensor belongs to.
    ///
    /// `None` when the owner is already gone; callers degrade to an
    /// invalid-handle result rather than failing.
    fn owner(&self) -> Option<Arc<dyn HardwareNode>>;
}

//! Hardware monitoring object model
//!
//! This crate defines the backend-agnostic object graph for hardware
//! monitoring: a computer enumerates hardware nodes, hardware nodes carry
//! sub-hardware and sensors, and sensors expose optional live readings.
//! The actual enumeration and polling backend lives behind the [`Provider`]
//! seam and is supplied by the host; this crate never talks to hardware
//! itself.
//!
//! # Reading model
//!
//! A sensor's value, minimum, and maximum are each `Option<f32>`: a sensor
//! that has not been polled yet simply has no reading. Absence is carried
//! as a real `Option` through the entire model; wire formats that cannot
//! express optionality (the flattened snapshot in `hwmon-bridge`) substitute
//! their own sentinel at the boundary, not here.
//!
//! # Refresh model
//!
//! Readings are only as fresh as the owning hardware node's last
//! [`HardwareNode::update`]. [`refresh_tree`] performs the pre-order walk
//! (parent before children) used for whole-computer refresh; a sensor is
//! refreshed by updating its owning hardware node, never on its own.
//!
//! # Example
//!
//! ```rust
//! use hwmon_core::{refresh_tree, ComputerOptions, Provider, ProviderFactory};
//! # #[cfg(feature = "mock")]
//! # fn main() -> Result<(), hwmon_core::ProviderError> {
//! use hwmon_core::mock::MockFactory;
//!
//! let options = ComputerOptions { cpu: true, ..Default::default() };
//! let provider = MockFactory::default().open(&options)?;
//!
//! let roots = provider.hardware();
//! refresh_tree(&roots);
//! for hw in &roots {
//!     for sensor in hw.sensors() {
//!         println!("{}: {:?}", sensor.name(), sensor.value());
//!     }
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "mock"))]
//! # fn main() {}
//! ```

pub mod error;
pub mod kind;
pub mod node;
pub mod options;
pub mod provider;
pub mod refresh;

// Deterministic in-memory provider for tests and host integration testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export main types
pub use error::ProviderError;
pub use kind::{HardwareKind, SensorKind};
pub use node::{HardwareNode, SensorNode};
pub use options::ComputerOptions;
pub use provider::{Provider, ProviderFactory};
pub use refresh::{refresh_node, refresh_sensor, refresh_tree};

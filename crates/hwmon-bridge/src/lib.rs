//! hwmon C ABI boundary layer
//!
//! Exposes the `hwmon-core` object graph (computer → hardware →
//! sub-hardware → sensors) to foreign callers across a C calling
//! convention. Callers hold opaque tokens and explicitly free every
//! resource they are handed; misuse (stale, forged, or wrongly-typed
//! tokens) degrades to documented sentinel results instead of faulting.
//!
//! # Memory Ownership Rules
//!
//! - `hwmon_computer_open` registers a computer; `hwmon_computer_free`
//!   closes the provider and retires the token
//! - Every accessor returns freshly issued tokens and freshly allocated
//!   buffers; nothing is cached or deduplicated
//! - Strings are freed with `hwmon_string_free` (no-op on the null
//!   sentinel); handle arrays with `hwmon_hardware_array_free` /
//!   `hwmon_sensor_array_free` (the token block only - the handles inside
//!   must each be freed on their own); snapshots with `hwmon_snapshot_free`
//!   (recursive)
//! - Freeing a handle retires the token, not the node: other handles to
//!   the same or related nodes stay valid
//!
//! # Host setup
//!
//! The host installs a monitoring backend before the C surface is used:
//!
//! ```rust
//! use hwmon_bridge::install_provider_factory;
//! use hwmon_core::mock::MockFactory;
//!
//! install_provider_factory(MockFactory::default());
//! ```

// Import logging macros
#[macro_use]
extern crate log;

pub mod ffi;
pub mod handle;
pub mod registry;
pub mod snapshot;

/// Initialize the logger for the bridge.
/// This should be called once at startup, typically from FFI.
///
/// The log level can be controlled via the RUST_LOG environment variable:
/// - RUST_LOG=hwmon_bridge=debug
/// - RUST_LOG=hwmon_bridge=trace
pub fn init_logger() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let _ = env_logger::try_init();
        info!("hwmon bridge initialized");
    });
}

// Re-export the host-facing surface
pub use registry::{clear_provider_factory, install_provider_factory, RegistryError};

// Re-export FFI types for C consumers
pub use ffi::{
    ComputerHandleC, ComputerOptionsC, ComputerResultC, HardwareArrayC, HardwareHandleC,
    OptionalValueC, SensorArrayC, SensorHandleC,
};
pub use snapshot::{HardwareRecordArrayC, HardwareRecordC, SensorRecordArrayC, SensorRecordC};

#[cfg(test)]
pub(crate) mod test_support {
    use parking_lot::Mutex;

    /// Serializes tests that touch the process-scoped factory slot.
    pub(crate) static FFI_LOCK: Mutex<()> = Mutex::new(());
}

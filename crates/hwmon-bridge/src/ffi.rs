//! C-compatible entry points for the hwmon bridge
//!
//! Exposes the computer/hardware/sensor tree through a C ABI for foreign
//! hosts. Every fallible condition inside an entry point is converted to a
//! degraded sentinel return before it can cross the boundary: an empty
//! (still freeable) array, the null string sentinel, kind code `-1`, an
//! absent [`OptionalValueC`], the zero handle, or a no-op.
//!
//! # Memory Ownership Rules
//!
//! - `hwmon_computer_open` allocates; `hwmon_computer_free` closes the
//!   provider and retires the token
//! - Returned strings are owned by the caller; free with
//!   `hwmon_string_free`
//! - Returned handle arrays are owned by the caller; freeing the array
//!   releases the token block only, the handles inside are freed
//!   individually

use std::os::raw::c_char;

use hwmon_core::{refresh_sensor, refresh_tree, ComputerOptions};
use hwmon_ffi_common::{free_cstring, free_raw_parts, string_into_raw, vec_into_raw};

use crate::handle::{RawToken, NULL_TOKEN};
use crate::registry;

/// Degraded kind code for invalid handles; never a valid kind.
const KIND_INVALID: i32 = -1;

// ============================================================================
// ABI types
// ============================================================================

/// Token for an open computer
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputerHandleC(pub RawToken);

/// Token for a hardware node
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareHandleC(pub RawToken);

/// Token for a sensor node
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorHandleC(pub RawToken);

/// Enumeration toggles, one per subsystem
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputerOptionsC {
    pub battery: bool,
    pub controller: bool,
    pub cpu: bool,
    pub gpu: bool,
    pub memory: bool,
    pub motherboard: bool,
    pub network: bool,
    pub psu: bool,
    pub storage: bool,
}

impl From<ComputerOptionsC> for ComputerOptions {
    fn from(o: ComputerOptionsC) -> Self {
        Self {
            battery: o.battery,
            controller: o.controller,
            cpu: o.cpu,
            gpu: o.gpu,
            memory: o.memory,
            motherboard: o.motherboard,
            network: o.network,
            psu: o.psu,
            storage: o.storage,
        }
    }
}

/// Payload of [`ComputerResultC`]; only the side selected by `is_ok` is
/// initialized.
#[repr(C)]
#[derive(Clone, Copy)]
pub union ComputerResultPayloadC {
    pub handle: ComputerHandleC,
    pub error: *mut c_char,
}

/// Tagged result envelope for the one fallible entry point.
///
/// `is_ok` selects the live payload member; reading the other is
/// undefined. The error member is an owned string freed with
/// `hwmon_string_free`.
#[repr(C)]
pub struct ComputerResultC {
    pub is_ok: bool,
    pub payload: ComputerResultPayloadC,
}

impl ComputerResultC {
    fn ok(token: RawToken) -> Self {
        Self {
            is_ok: true,
            payload: ComputerResultPayloadC {
                handle: ComputerHandleC(token),
            },
        }
    }

    fn error(msg: &str) -> Self {
        Self {
            is_ok: false,
            payload: ComputerResultPayloadC {
                error: string_into_raw(Some(msg)),
            },
        }
    }
}

/// Caller-owned array of hardware tokens
#[repr(C)]
pub struct HardwareArrayC {
    pub len: usize,
    pub data: *mut HardwareHandleC,
}

/// Caller-owned array of sensor tokens
#[repr(C)]
pub struct SensorArrayC {
    pub len: usize,
    pub data: *mut SensorHandleC,
}

/// Optional numeric reading. `present == false` means "no reading yet";
/// `value` is NaN in that case and must not be interpreted.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OptionalValueC {
    pub present: bool,
    pub value: f32,
}

impl From<Option<f32>> for OptionalValueC {
    fn from(v: Option<f32>) -> Self {
        match v {
            Some(value) => Self {
                present: true,
                value,
            },
            None => Self {
                present: false,
                value: f32::NAN,
            },
        }
    }
}

// ============================================================================
// Computer Lifecycle
// ============================================================================

#[no_mangle]
pub extern "C" fn hwmon_computer_open(options: ComputerOptionsC) -> ComputerResultC {
    crate::init_logger();
    match registry::open_computer(options.into()) {
        Ok(token) => ComputerResultC::ok(token),
        Err(e) => {
            warn!("hwmon_computer_open failed: {e}");
            ComputerResultC::error(&e.to_string())
        }
    }
}

#[no_mangle]
pub extern "C" fn hwmon_computer_free(handle: ComputerHandleC) {
    if let Err(e) = registry::close_computer(handle.0) {
        warn!("hwmon_computer_free: {e}");
    }
}

#[no_mangle]
pub extern "C" fn hwmon_computer_set_options(handle: ComputerHandleC, options: ComputerOptionsC) {
    let options: ComputerOptions = options.into();
    let applied = registry::with_computer(handle.0, |state| {
        state.provider.apply_options(&options);
        state.options = options;
    });
    if let Err(e) = applied {
        warn!("hwmon_computer_set_options: {e}");
    }
}

/// Pre-order refresh of the whole tree: each hardware node before its
/// sub-hardware. Sensor reads taken afterwards are no older than this call.
#[no_mangle]
pub extern "C" fn hwmon_computer_update(handle: ComputerHandleC) {
    let updated = registry::with_computer(handle.0, |state| {
        refresh_tree(&state.provider.hardware());
    });
    if let Err(e) = updated {
        warn!("hwmon_computer_update: {e}");
    }
}

// ============================================================================
// Tree Accessors
// ============================================================================

/// Top-level hardware of a computer, as freshly issued handles.
///
/// Invalid handle degrades to an empty (still freeable) array.
#[no_mangle]
pub extern "C" fn hwmon_computer_hardware(handle: ComputerHandleC) -> HardwareArrayC {
    let nodes = match registry::with_computer(handle.0, |state| state.provider.hardware()) {
        Ok(nodes) => nodes,
        Err(e) => {
            warn!("hwmon_computer_hardware: {e}");
            Vec::new()
        }
    };
    let tokens: Vec<HardwareHandleC> = nodes
        .into_iter()
        .map(|node| HardwareHandleC(registry::insert_hardware(node)))
        .collect();
    let (data, len) = vec_into_raw(tokens);
    HardwareArrayC { len, data }
}

/// Nested hardware one level down, as freshly issued handles.
#[no_mangle]
pub extern "C" fn hwmon_hardware_sub_hardware(handle: HardwareHandleC) -> HardwareArrayC {
    let children = match registry::hardware_node(handle.0) {
        Ok(node) => node.sub_hardware(),
        Err(e) => {
            warn!("hwmon_hardware_sub_hardware: {e}");
            Vec::new()
        }
    };
    let tokens: Vec<HardwareHandleC> = children
        .into_iter()
        .map(|node| HardwareHandleC(registry::insert_hardware(node)))
        .collect();
    let (data, len) = vec_into_raw(tokens);
    HardwareArrayC { len, data }
}

/// Sensors attached directly to a hardware node, as freshly issued handles.
#[no_mangle]
pub extern "C" fn hwmon_hardware_sensors(handle: HardwareHandleC) -> SensorArrayC {
    let sensors = match registry::hardware_node(handle.0) {
        Ok(node) => node.sensors(),
        Err(e) => {
            warn!("hwmon_hardware_sensors: {e}");
            Vec::new()
        }
    };
    let tokens: Vec<SensorHandleC> = sensors
        .into_iter()
        .map(|node| SensorHandleC(registry::insert_sensor(node)))
        .collect();
    let (data, len) = vec_into_raw(tokens);
    SensorArrayC { len, data }
}

// ============================================================================
// Hardware Accessors
// ============================================================================

#[no_mangle]
pub extern "C" fn hwmon_hardware_name(handle: HardwareHandleC) -> *mut c_char {
    match registry::hardware_node(handle.0) {
        Ok(node) => string_into_raw(Some(node.name().as_str())),
        Err(e) => {
            warn!("hwmon_hardware_name: {e}");
            string_into_raw(None)
        }
    }
}

#[no_mangle]
pub extern "C" fn hwmon_hardware_identifier(handle: HardwareHandleC) -> *mut c_char {
    match registry::hardware_node(handle.0) {
        Ok(node) => string_into_raw(Some(node.identifier().as_str())),
        Err(e) => {
            warn!("hwmon_hardware_identifier: {e}");
            string_into_raw(None)
        }
    }
}

#[no_mangle]
pub extern "C" fn hwmon_hardware_kind(handle: HardwareHandleC) -> i32 {
    match registry::hardware_node(handle.0) {
        Ok(node) => node.kind().code(),
        Err(e) => {
            warn!("hwmon_hardware_kind: {e}");
            KIND_INVALID
        }
    }
}

/// Refresh this node's own sensors only; the recursive walk belongs to
/// `hwmon_computer_update`.
#[no_mangle]
pub extern "C" fn hwmon_hardware_update(handle: HardwareHandleC) {
    match registry::hardware_node(handle.0) {
        Ok(node) => node.update(),
        Err(e) => warn!("hwmon_hardware_update: {e}"),
    }
}

#[no_mangle]
pub extern "C" fn hwmon_hardware_free(handle: HardwareHandleC) {
    if let Err(e) = registry::free_hardware(handle.0) {
        warn!("hwmon_hardware_free: {e}");
    }
}

// ============================================================================
// Sensor Accessors
// ============================================================================

/// Fresh handle to the owning hardware node, or the zero handle if the
/// owner is gone.
#[no_mangle]
pub extern "C" fn hwmon_sensor_hardware(handle: SensorHandleC) -> HardwareHandleC {
    match registry::sensor_node(handle.0) {
        Ok(node) => match node.owner() {
            Some(owner) => HardwareHandleC(registry::insert_hardware(owner)),
            None => {
                warn!("hwmon_sensor_hardware: sensor {:#x} has no owner", handle.0);
                HardwareHandleC(NULL_TOKEN)
            }
        },
        Err(e) => {
            warn!("hwmon_sensor_hardware: {e}");
            HardwareHandleC(NULL_TOKEN)
        }
    }
}

#[no_mangle]
pub extern "C" fn hwmon_sensor_name(handle: SensorHandleC) -> *mut c_char {
    match registry::sensor_node(handle.0) {
        Ok(node) => string_into_raw(Some(node.name().as_str())),
        Err(e) => {
            warn!("hwmon_sensor_name: {e}");
            string_into_raw(None)
        }
    }
}

#[no_mangle]
pub extern "C" fn hwmon_sensor_identifier(handle: SensorHandleC) -> *mut c_char {
    match registry::sensor_node(handle.0) {
        Ok(node) => string_into_raw(Some(node.identifier().as_str())),
        Err(e) => {
            warn!("hwmon_sensor_identifier: {e}");
            string_into_raw(None)
        }
    }
}

#[no_mangle]
pub extern "C" fn hwmon_sensor_kind(handle: SensorHandleC) -> i32 {
    match registry::sensor_node(handle.0) {
        Ok(node) => node.kind().code(),
        Err(e) => {
            warn!("hwmon_sensor_kind: {e}");
            KIND_INVALID
        }
    }
}

#[no_mangle]
pub extern "C" fn hwmon_sensor_value(handle: SensorHandleC) -> OptionalValueC {
    match registry::sensor_node(handle.0) {
        Ok(node) => node.value().into(),
        Err(e) => {
            warn!("hwmon_sensor_value: {e}");
            None.into()
        }
    }
}

#[no_mangle]
pub extern "C" fn hwmon_sensor_min(handle: SensorHandleC) -> OptionalValueC {
    match registry::sensor_node(handle.0) {
        Ok(node) => node.min().into(),
        Err(e) => {
            warn!("hwmon_sensor_min: {e}");
            None.into()
        }
    }
}

#[no_mangle]
pub extern "C" fn hwmon_sensor_max(handle: SensorHandleC) -> OptionalValueC {
    match registry::sensor_node(handle.0) {
        Ok(node) => node.max().into(),
        Err(e) => {
            warn!("hwmon_sensor_max: {e}");
            None.into()
        }
    }
}

/// A sensor refreshes through its owning hardware node; there is no
/// sensor-granular poll.
#[no_mangle]
pub extern "C" fn hwmon_sensor_update(handle: SensorHandleC) {
    match registry::sensor_node(handle.0) {
        Ok(node) => refresh_sensor(&node),
        Err(e) => warn!("hwmon_sensor_update: {e}"),
    }
}

#[no_mangle]
pub extern "C" fn hwmon_sensor_free(handle: SensorHandleC) {
    if let Err(e) = registry::free_sensor(handle.0) {
        warn!("hwmon_sensor_free: {e}");
    }
}

// ============================================================================
// Memory Management
// ============================================================================

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn hwmon_string_free(s: *mut c_char) {
    unsafe { free_cstring(s) };
}

/// Releases the token block only. The handles inside remain live and must
/// be freed individually with `hwmon_hardware_free`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn hwmon_hardware_array_free(array: HardwareArrayC) {
    unsafe { free_raw_parts(array.data, array.len) };
}

/// Releases the token block only; see `hwmon_hardware_array_free`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn hwmon_sensor_array_free(array: SensorArrayC) {
    unsafe { free_raw_parts(array.data, array.len) };
}

// ============================================================================
// Utilities
// ============================================================================

#[no_mangle]
pub extern "C" fn hwmon_init_logger() {
    crate::init_logger();
}

#[no_mangle]
pub extern "C" fn hwmon_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::install_provider_factory;
    use crate::test_support::FFI_LOCK;
    use hwmon_core::mock::MockFactory;
    use hwmon_core::HardwareKind;
    use std::ffi::CStr;

    fn open(options: ComputerOptionsC) -> ComputerHandleC {
        let _guard = FFI_LOCK.lock();
        install_provider_factory(MockFactory::default());
        let result = hwmon_computer_open(options);
        assert!(result.is_ok);
        unsafe { result.payload.handle }
    }

    fn cpu_only() -> ComputerOptionsC {
        ComputerOptionsC {
            cpu: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_open_failure_returns_error_envelope() {
        let _guard = FFI_LOCK.lock();
        install_provider_factory(MockFactory::failing("subsystem denied"));
        let result = hwmon_computer_open(ComputerOptionsC::default());
        assert!(!result.is_ok);
        let error = unsafe { result.payload.error };
        assert!(!error.is_null());
        let msg = unsafe { CStr::from_ptr(error) }.to_str().unwrap();
        assert!(msg.contains("subsystem denied"));
        hwmon_string_free(error);
        install_provider_factory(MockFactory::default());
    }

    #[test]
    fn test_all_false_options_yield_empty_freeable_array() {
        let computer = open(ComputerOptionsC::default());

        let array = hwmon_computer_hardware(computer);
        assert_eq!(array.len, 0);
        assert!(!array.data.is_null());
        hwmon_hardware_array_free(array);

        hwmon_computer_free(computer);
    }

    #[test]
    fn test_cpu_only_tree_walk() {
        let computer = open(cpu_only());

        let hardware = hwmon_computer_hardware(computer);
        assert_eq!(hardware.len, 1);
        let hw = unsafe { *hardware.data };
        assert_eq!(hwmon_hardware_kind(hw), HardwareKind::Cpu.code());

        let name = hwmon_hardware_name(hw);
        assert!(!name.is_null());
        assert_eq!(
            unsafe { CStr::from_ptr(name) }.to_str().unwrap(),
            "Mock CPU"
        );
        hwmon_string_free(name);

        let identifier = hwmon_hardware_identifier(hw);
        assert_eq!(
            unsafe { CStr::from_ptr(identifier) }.to_str().unwrap(),
            "/cpu/0"
        );
        hwmon_string_free(identifier);

        // Sensors are safe to read before any update; values are absent.
        let sensors = hwmon_hardware_sensors(hw);
        assert!(sensors.len > 0);
        let sensor_tokens =
            unsafe { std::slice::from_raw_parts(sensors.data, sensors.len) }.to_vec();
        for sensor in &sensor_tokens {
            let value = hwmon_sensor_value(*sensor);
            assert!(!value.present);
            assert!(value.value.is_nan());
        }

        for sensor in &sensor_tokens {
            hwmon_sensor_free(*sensor);
        }
        hwmon_sensor_array_free(sensors);
        hwmon_hardware_free(hw);
        hwmon_hardware_array_free(hardware);
        hwmon_computer_free(computer);
    }

    #[test]
    fn test_update_then_values_present() {
        let computer = open(cpu_only());
        hwmon_computer_update(computer);

        let hardware = hwmon_computer_hardware(computer);
        let hw = unsafe { *hardware.data };
        let sensors = hwmon_hardware_sensors(hw);
        let sensor_tokens =
            unsafe { std::slice::from_raw_parts(sensors.data, sensors.len) }.to_vec();

        for sensor in &sensor_tokens {
            let value = hwmon_sensor_value(*sensor);
            assert!(value.present);
            assert!(value.value.is_finite());
            let min = hwmon_sensor_min(*sensor);
            let max = hwmon_sensor_max(*sensor);
            assert!(min.present && max.present);
            assert!(min.value <= value.value && value.value <= max.value);
            assert!(hwmon_sensor_kind(*sensor) >= 0);
        }

        for sensor in &sensor_tokens {
            hwmon_sensor_free(*sensor);
        }
        hwmon_sensor_array_free(sensors);
        hwmon_hardware_free(hw);
        hwmon_hardware_array_free(hardware);
        hwmon_computer_free(computer);
    }

    #[test]
    fn test_sensor_update_refreshes_owner() {
        let computer = open(cpu_only());
        let hardware = hwmon_computer_hardware(computer);
        let hw = unsafe { *hardware.data };
        let sensors = hwmon_hardware_sensors(hw);
        let sensor = unsafe { *sensors.data };

        assert!(!hwmon_sensor_value(sensor).present);
        hwmon_sensor_update(sensor);
        assert!(hwmon_sensor_value(sensor).present);

        // The owning-hardware handle from the sensor side is freshly issued.
        let owner = hwmon_sensor_hardware(sensor);
        assert_ne!(owner.0, NULL_TOKEN);
        assert_ne!(owner.0, hw.0);
        assert_eq!(hwmon_hardware_kind(owner), HardwareKind::Cpu.code());
        hwmon_hardware_free(owner);

        hwmon_sensor_free(sensor);
        hwmon_sensor_array_free(sensors);
        hwmon_hardware_free(hw);
        hwmon_hardware_array_free(hardware);
        hwmon_computer_free(computer);
    }

    #[test]
    fn test_sub_hardware_walk() {
        let computer = open(ComputerOptionsC {
            motherboard: true,
            ..Default::default()
        });
        let hardware = hwmon_computer_hardware(computer);
        assert_eq!(hardware.len, 1);
        let board = unsafe { *hardware.data };

        let subs = hwmon_hardware_sub_hardware(board);
        assert_eq!(subs.len, 1);
        let super_io = unsafe { *subs.data };
        assert_eq!(hwmon_hardware_kind(super_io), HardwareKind::SuperIo.code());

        hwmon_hardware_free(super_io);
        hwmon_hardware_array_free(subs);
        hwmon_hardware_free(board);
        hwmon_hardware_array_free(hardware);
        hwmon_computer_free(computer);
    }

    #[test]
    fn test_set_options_reconfigures_live() {
        let computer = open(cpu_only());

        hwmon_computer_set_options(
            computer,
            ComputerOptionsC {
                storage: true,
                ..Default::default()
            },
        );
        let hardware = hwmon_computer_hardware(computer);
        assert_eq!(hardware.len, 1);
        let hw = unsafe { *hardware.data };
        assert_eq!(hwmon_hardware_kind(hw), HardwareKind::Storage.code());

        hwmon_hardware_free(hw);
        hwmon_hardware_array_free(hardware);
        hwmon_computer_free(computer);
    }

    #[test]
    fn test_never_issued_token_degrades_everywhere() {
        let computer = ComputerHandleC(NULL_TOKEN);
        let hw = HardwareHandleC(NULL_TOKEN);
        let sensor = SensorHandleC(NULL_TOKEN);

        let array = hwmon_computer_hardware(computer);
        assert_eq!(array.len, 0);
        hwmon_hardware_array_free(array);

        let subs = hwmon_hardware_sub_hardware(hw);
        assert_eq!(subs.len, 0);
        hwmon_hardware_array_free(subs);

        let sensors = hwmon_hardware_sensors(hw);
        assert_eq!(sensors.len, 0);
        hwmon_sensor_array_free(sensors);

        assert!(hwmon_hardware_name(hw).is_null());
        assert!(hwmon_hardware_identifier(hw).is_null());
        assert_eq!(hwmon_hardware_kind(hw), KIND_INVALID);

        assert!(hwmon_sensor_name(sensor).is_null());
        assert!(hwmon_sensor_identifier(sensor).is_null());
        assert_eq!(hwmon_sensor_kind(sensor), KIND_INVALID);
        let value = hwmon_sensor_value(sensor);
        assert!(!value.present && value.value.is_nan());
        assert!(!hwmon_sensor_min(sensor).present);
        assert!(!hwmon_sensor_max(sensor).present);
        assert_eq!(hwmon_sensor_hardware(sensor).0, NULL_TOKEN);

        // Lifecycle misuse is a logged no-op, never a fault.
        hwmon_computer_update(computer);
        hwmon_hardware_update(hw);
        hwmon_sensor_update(sensor);
        hwmon_hardware_free(hw);
        hwmon_sensor_free(sensor);
        hwmon_computer_free(computer);
        hwmon_string_free(std::ptr::null_mut());
    }

    #[test]
    fn test_handles_are_fresh_on_every_call() {
        let computer = open(cpu_only());

        let first = hwmon_computer_hardware(computer);
        let second = hwmon_computer_hardware(computer);
        let a = unsafe { *first.data };
        let b = unsafe { *second.data };
        assert_ne!(a.0, b.0);

        // Both resolve to the same logical node.
        assert_eq!(hwmon_hardware_kind(a), hwmon_hardware_kind(b));

        // Freeing one does not invalidate the other.
        hwmon_hardware_free(a);
        assert_eq!(hwmon_hardware_kind(b), HardwareKind::Cpu.code());

        hwmon_hardware_free(b);
        hwmon_hardware_array_free(first);
        hwmon_hardware_array_free(second);
        hwmon_computer_free(computer);
    }

    #[test]
    fn test_hardware_handle_survives_computer_free() {
        let computer = open(cpu_only());
        let hardware = hwmon_computer_hardware(computer);
        let hw = unsafe { *hardware.data };
        hwmon_hardware_array_free(hardware);

        hwmon_computer_free(computer);

        // The root is gone; the separately issued handle still answers.
        assert_eq!(hwmon_hardware_kind(hw), HardwareKind::Cpu.code());
        let name = hwmon_hardware_name(hw);
        assert!(!name.is_null());
        hwmon_string_free(name);
        hwmon_hardware_free(hw);

        // Double free of the computer is a logged no-op.
        hwmon_computer_free(computer);
    }

    #[test]
    fn test_wrong_kind_token_is_rejected() {
        let computer = open(cpu_only());

        // A computer token is not a hardware token.
        let as_hardware = HardwareHandleC(computer.0);
        assert_eq!(hwmon_hardware_kind(as_hardware), KIND_INVALID);
        hwmon_hardware_free(as_hardware);

        // The misuse above must not have consumed the computer.
        let array = hwmon_computer_hardware(computer);
        assert_eq!(array.len, 1);
        let hw = unsafe { *array.data };
        hwmon_hardware_free(hw);
        hwmon_hardware_array_free(array);
        hwmon_computer_free(computer);
    }

    #[test]
    fn test_version_is_static_null_terminated() {
        let version = hwmon_version();
        assert!(!version.is_null());
        let s = unsafe { CStr::from_ptr(version) }.to_str().unwrap();
        assert_eq!(s, env!("CARGO_PKG_VERSION"));
    }
}

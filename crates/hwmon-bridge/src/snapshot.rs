//! Flattened one-call snapshot of the hardware tree
//!
//! Legacy wire variant: instead of walking the tree handle by handle, the
//! caller takes the whole hierarchy in a single call as nested
//! self-describing records and frees it with a single recursive free.
//!
//! The record encoding cannot express an absent reading, so `value`,
//! `min`, and `max` substitute NaN for "no reading yet". This is a
//! deliberate lossy convention of this variant only; everywhere else the
//! bridge carries real optionality ([`crate::ffi::OptionalValueC`]).
//!
//! # Memory Ownership Rules
//!
//! - The returned array and everything reachable from it (names, sensor
//!   arrays, child hardware arrays) is owned by the caller
//! - `hwmon_snapshot_free` walks the structure depth-first and frees every
//!   nested owned value exactly once; each nested value is owned by
//!   exactly one position in the tree

use std::os::raw::c_char;
use std::sync::Arc;

use hwmon_core::HardwareNode;
use hwmon_ffi_common::{free_cstring, string_into_raw, vec_into_raw};

use crate::ffi::ComputerHandleC;
use crate::registry;

/// Flat sensor record. NaN in `value`/`min`/`max` means "no reading yet".
#[repr(C)]
pub struct SensorRecordC {
    pub name: *mut c_char,
    pub kind: i32,
    pub value: f32,
    pub min: f32,
    pub max: f32,
}

/// Caller-owned array of sensor records
#[repr(C)]
pub struct SensorRecordArrayC {
    pub len: usize,
    pub data: *mut SensorRecordC,
}

/// Flat hardware record with nested children and sensors
#[repr(C)]
pub struct HardwareRecordC {
    pub name: *mut c_char,
    pub kind: i32,
    pub children: HardwareRecordArrayC,
    pub sensors: SensorRecordArrayC,
}

/// Caller-owned array of hardware records
#[repr(C)]
pub struct HardwareRecordArrayC {
    pub len: usize,
    pub data: *mut HardwareRecordC,
}

fn nan_sentinel(value: Option<f32>) -> f32 {
    value.unwrap_or(f32::NAN)
}

/// Pre-order materialization: the node itself, then its children, then its
/// own sensors - matching the walk order of the handle-based accessors.
fn encode_hardware(node: &Arc<dyn HardwareNode>) -> HardwareRecordC {
    let children: Vec<HardwareRecordC> = node
        .sub_hardware()
        .iter()
        .map(encode_hardware)
        .collect();

    let sensors: Vec<SensorRecordC> = node
        .sensors()
        .iter()
        .map(|sensor| SensorRecordC {
            name: string_into_raw(Some(sensor.name().as_str())),
            kind: sensor.kind().code(),
            value: nan_sentinel(sensor.value()),
            min: nan_sentinel(sensor.min()),
            max: nan_sentinel(sensor.max()),
        })
        .collect();

    let (children_data, children_len) = vec_into_raw(children);
    let (sensors_data, sensors_len) = vec_into_raw(sensors);

    HardwareRecordC {
        name: string_into_raw(Some(node.name().as_str())),
        kind: node.kind().code(),
        children: HardwareRecordArrayC {
            len: children_len,
            data: children_data,
        },
        sensors: SensorRecordArrayC {
            len: sensors_len,
            data: sensors_data,
        },
    }
}

unsafe fn free_sensor_array(array: SensorRecordArrayC) {
    if array.data.is_null() {
        return;
    }
    let records = std::slice::from_raw_parts_mut(array.data, array.len);
    for record in records.iter() {
        free_cstring(record.name);
    }
    let _ = Box::from_raw(std::ptr::slice_from_raw_parts_mut(array.data, array.len));
}

unsafe fn free_hardware_array(array: HardwareRecordArrayC) {
    if array.data.is_null() {
        return;
    }
    let records = std::slice::from_raw_parts_mut(array.data, array.len);
    for record in records.iter_mut() {
        free_cstring(record.name);
        free_sensor_array(SensorRecordArrayC {
            len: record.sensors.len,
            data: record.sensors.data,
        });
        free_hardware_array(HardwareRecordArrayC {
            len: record.children.len,
            data: record.children.data,
        });
    }
    let _ = Box::from_raw(std::ptr::slice_from_raw_parts_mut(array.data, array.len));
}

// ============================================================================
// Entry points
// ============================================================================

/// Full recursive snapshot of a computer's tree in one call.
///
/// Readings are whatever the last update produced; this call does not
/// refresh. Invalid handle degrades to an empty (still freeable) array.
#[no_mangle]
pub extern "C" fn hwmon_computer_snapshot(handle: ComputerHandleC) -> HardwareRecordArrayC {
    let nodes = match registry::with_computer(handle.0, |state| state.provider.hardware()) {
        Ok(nodes) => nodes,
        Err(e) => {
            warn!("hwmon_computer_snapshot: {e}");
            Vec::new()
        }
    };
    let records: Vec<HardwareRecordC> = nodes.iter().map(encode_hardware).collect();
    let (data, len) = vec_into_raw(records);
    HardwareRecordArrayC { len, data }
}

/// Depth-first recursive free of a snapshot.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn hwmon_snapshot_free(array: HardwareRecordArrayC) {
    unsafe { free_hardware_array(array) };
}

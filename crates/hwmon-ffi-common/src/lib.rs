//! Common FFI utilities for hwmon C-compatible interfaces.
//!
//! Shared building blocks for the C ABI exposed by `hwmon-bridge`: owned
//! null-terminated strings and owned contiguous arrays whose deallocation
//! responsibility transfers to the caller exactly once.
//!
//! # Memory Ownership
//!
//! - Functions returning `*mut c_char` transfer ownership to the caller
//! - Callers must use the corresponding `free_*` function to deallocate
//! - The null pointer is the string sentinel for "absent or empty"; freeing
//!   it is a guaranteed no-op
//! - Arrays are real allocations even at length 0, so a length-0 array is
//!   freed exactly like any other (never a null/no-op special case)

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

/// Convert a string to an owned, null-terminated C string for the caller.
///
/// Absent (`None`) and empty input both yield the null-pointer sentinel.
/// Interior null bytes fall back to the empty `CString` rather than
/// failing; names from monitoring backends never legitimately contain
/// them.
///
/// # Example
/// ```
/// use hwmon_ffi_common::string_into_raw;
///
/// let ptr = string_into_raw(Some("GPU Core"));
/// assert!(!ptr.is_null());
/// // ptr is now owned by the caller, free with free_cstring
/// # unsafe { hwmon_ffi_common::free_cstring(ptr) };
///
/// assert!(string_into_raw(None).is_null());
/// assert!(string_into_raw(Some("")).is_null());
/// ```
pub fn string_into_raw(s: Option<&str>) -> *mut c_char {
    match s {
        None => ptr::null_mut(),
        Some("") => ptr::null_mut(),
        Some(s) => CString::new(s).unwrap_or_default().into_raw(),
    }
}

/// Safely free a C string pointer.
///
/// No-op on the null sentinel.
///
/// # Safety
/// The pointer must have been allocated by `CString::into_raw()` or be null.
#[inline]
pub unsafe fn free_cstring(ptr: *mut c_char) {
    if !ptr.is_null() {
        let _ = CString::from_raw(ptr);
    }
}

/// Move a vector into a caller-owned `(pointer, length)` pair.
///
/// Always performs a real boxed-slice allocation, including for empty
/// input: a length-0 array is still an independently freeable value, not a
/// null pointer. Free with [`free_raw_parts`].
#[inline]
pub fn vec_into_raw<T>(vec: Vec<T>) -> (*mut T, usize) {
    let len = vec.len();
    let ptr = Box::into_raw(vec.into_boxed_slice()) as *mut T;
    (ptr, len)
}

/// Reclaim a `(pointer, length)` pair produced by [`vec_into_raw`],
/// dropping every element.
///
/// No-op on a null pointer (a zeroed struct from the caller side).
///
/// # Safety
/// The pair must come from [`vec_into_raw`] and must not be freed twice.
#[inline]
pub unsafe fn free_raw_parts<T>(ptr: *mut T, len: usize) {
    if !ptr.is_null() {
        let _ = Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len));
    }
}

/// Borrow a `(pointer, length)` pair as a slice without taking ownership.
///
/// Returns the empty slice for a null pointer.
///
/// # Safety
/// The pair must describe `len` valid, initialized `T`s.
#[inline]
pub unsafe fn slice_from_raw<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, len)
    }
}

/// Safely convert a C string pointer to a Rust string reference.
///
/// # Safety
/// `ptr` must be null or point to a valid null-terminated string.
pub unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Result<&'a str, &'static str> {
    if ptr.is_null() {
        return Err("null pointer");
    }
    CStr::from_ptr(ptr).to_str().map_err(|_| "invalid UTF-8")
}

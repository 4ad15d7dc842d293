//! FFI safety wrappers: converts exported records into Rust types.

use std::ffi::{CStr, c_char};

use super::abi::FfiTeamLib;

/// Safely converts a C string pointer to a Rust `String`.
///
/// Returns `None` if the pointer is null or the string is not UTF-8.
///
/// # Safety
/// A non-null `ptr` must point to a null-terminated string that stays
/// valid for the duration of the call.
pub unsafe fn c_str_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .ok()
        .map(|s| s.to_string())
}

/// Validates a resolved record pointer and reads its display name.
///
/// # Safety
/// A non-null `record` must point to a live `FfiTeamLib`.
pub unsafe fn read_record<'a>(record: *const FfiTeamLib) -> Result<(&'a FfiTeamLib, String), &'static str> {
    let Some(record) = (unsafe { record.as_ref() }) else {
        return Err("descriptor symbol resolved to null");
    };
    let name = unsafe { c_str_to_string(record.name) }.ok_or("descriptor has no valid name")?;
    Ok((record, name))
}

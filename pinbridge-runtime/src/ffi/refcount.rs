//! Reference counting - C API over the global handle registry
//!
//! The foreign side calls `pinbridge_decref` exactly once for every handle a
//! wrapper returned to it, and `pinbridge_incref` when it duplicates one.

use super::abort_on_violation;
use crate::registry::Handle;

/// Add an outstanding reference to an already-registered handle
///
/// # Aborts
/// On a null or unregistered handle
#[no_mangle]
pub extern "C" fn pinbridge_incref(handle: Handle) {
    abort_on_violation(|| {
        crate::registry().retain(handle.identity());
    })
}

/// Drop one outstanding reference; unpins the object at zero
///
/// # Aborts
/// On a null or unregistered handle (double release, or a value
/// that was never wrapped)
#[no_mangle]
pub extern "C" fn pinbridge_decref(handle: Handle) {
    abort_on_violation(|| crate::registry().release(handle.identity()))
}

/// Current refcount of a handle (for debugging/testing)
///
/// Returns 0 for null or unregistered handles.
#[no_mangle]
pub extern "C" fn pinbridge_refcount(handle: Handle) -> u32 {
    if handle.is_null() {
        return 0;
    }
    abort_on_violation(|| crate::registry().ref_count(handle.identity()).unwrap_or(0))
}

/// Registry-issued id of a handle
///
/// Returns 0 for null or unregistered handles; live ids are always negative.
#[no_mangle]
pub extern "C" fn pinbridge_handle_id(handle: Handle) -> i64 {
    if handle.is_null() {
        return 0;
    }
    abort_on_violation(|| {
        crate::registry()
            .handle_id(handle.identity())
            .map(|id| id.get())
            .unwrap_or(0)
    })
}

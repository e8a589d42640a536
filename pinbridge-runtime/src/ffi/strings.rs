//! By-value translation of strings and the error convention
//!
//! Strings cross as NUL-terminated C strings. Errors cross as a nullable
//! owned message: null means success. Everything returned to the foreign side
//! is released with `pinbridge_free_string`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::sync::Arc;

use thiserror::Error;

/// Host-side error value.
///
/// Shared rather than boxed: error-typed fields and variables are read by
/// cloning, the same as every other by-value crossing.
pub type HostError = Arc<dyn std::error::Error + Send + Sync>;

/// Error message handed back in from the foreign side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ForeignError {
    pub message: String,
}

/// Host error carrying `message`
pub fn host_error(message: impl Into<String>) -> HostError {
    Arc::new(ForeignError {
        message: message.into(),
    })
}

/// Copy an incoming C string into a host `String`
///
/// # Safety
/// `raw` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call. Null reads as the empty string.
pub unsafe fn string_from_raw(raw: *const c_char) -> String {
    if raw.is_null() {
        return String::new();
    }
    CStr::from_ptr(raw).to_string_lossy().into_owned()
}

/// Hand a host string to the foreign side
///
/// Interior NUL bytes cannot cross a C string boundary and are dropped.
pub fn string_into_raw(value: String) -> *mut c_char {
    let c_string = match CString::new(value) {
        Ok(c_string) => c_string,
        Err(err) => {
            let mut bytes = err.into_vec();
            bytes.retain(|&b| b != 0);
            // No NUL bytes remain
            CString::new(bytes).unwrap_or_default()
        }
    };
    c_string.into_raw()
}

/// Translate the host error convention: `None` -> null, `Some` -> message
pub fn error_into_raw(error: Option<HostError>) -> *mut c_char {
    match error {
        None => ptr::null_mut(),
        Some(error) => string_into_raw(error.to_string()),
    }
}

/// Translate an incoming error value back into the host convention
///
/// # Safety
/// Same contract as [`string_from_raw`].
pub unsafe fn error_from_raw(raw: *const c_char) -> Option<HostError> {
    if raw.is_null() {
        return None;
    }
    Some(host_error(string_from_raw(raw)))
}

/// Free a string or error message returned by a wrapper
#[no_mangle]
pub extern "C" fn pinbridge_free_string(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            drop(CString::from_raw(s));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_crossing() {
        let raw = string_into_raw("héllo".to_string());
        let back = unsafe { string_from_raw(raw) };
        assert_eq!(back, "héllo");
        pinbridge_free_string(raw);
    }

    #[test]
    fn test_interior_nul_dropped() {
        let raw = string_into_raw("a\0b".to_string());
        assert_eq!(unsafe { string_from_raw(raw) }, "ab");
        pinbridge_free_string(raw);
    }

    #[test]
    fn test_null_reads_empty() {
        assert_eq!(unsafe { string_from_raw(ptr::null()) }, "");
        pinbridge_free_string(ptr::null_mut());
    }

    #[test]
    fn test_error_convention() {
        assert!(error_into_raw(None).is_null());

        let raw = error_into_raw(Some(host_error("disk on fire")));
        assert!(!raw.is_null());
        let back = unsafe { error_from_raw(raw) }.map(|e| e.to_string());
        assert_eq!(back.as_deref(), Some("disk on fire"));
        pinbridge_free_string(raw);

        assert!(unsafe { error_from_raw(ptr::null()) }.is_none());
    }

    #[test]
    fn test_error_value_is_shared_on_clone() {
        let stored: Option<HostError> = Some(host_error("unexpected EOF"));
        let copy = stored.clone();

        let raw = error_into_raw(copy);
        assert_eq!(unsafe { string_from_raw(raw) }, "unexpected EOF");
        pinbridge_free_string(raw);

        // The stored value is untouched by the crossing
        assert_eq!(stored.map(|e| e.to_string()).as_deref(), Some("unexpected EOF"));
    }
}

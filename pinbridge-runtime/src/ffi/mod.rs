//! C FFI - Stable ABI for the foreign runtime and generated wrappers
//!
//! Design: thin `extern "C"` shims over the global registry:
//! 1. Reference counting on handles (incref, decref)
//! 2. Introspection (refcount, handle id)
//! 3. String and error translation for by-value crossings
//!
//! A protocol violation inside any entry point aborts the process. Unwinding
//! into foreign frames is never allowed.

mod refcount;
mod strings;

pub use refcount::{pinbridge_decref, pinbridge_handle_id, pinbridge_incref, pinbridge_refcount};
pub use strings::{
    error_from_raw, error_into_raw, host_error, pinbridge_free_string, string_from_raw,
    string_into_raw, ForeignError, HostError,
};

use std::panic::{self, UnwindSafe};

/// Run `f`, aborting instead of unwinding out of an `extern "C"` frame.
#[inline]
pub(crate) fn abort_on_violation<R>(f: impl FnOnce() -> R + UnwindSafe) -> R {
    match panic::catch_unwind(f) {
        Ok(value) => value,
        Err(_) => std::process::abort(),
    }
}

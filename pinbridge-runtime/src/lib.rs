//! pinbridge runtime - keeps host objects alive while a foreign runtime holds them
//!
//! This crate is linked into generated binding libraries. It owns the one
//! piece of shared mutable state in the bridge, the handle registry, and the
//! stable C entry points the foreign side uses to manage handle lifetimes.

pub mod ffi;
pub mod logging;
pub mod registry;

pub use ffi::{host_error, ForeignError, HostError};
pub use registry::{
    host_ref, protocol_violation, EntryInfo, Handle, HandleId, HandleRegistry, HostObject,
    HostRef, Identity, RegistryStats,
};

use once_cell::sync::OnceCell;

static REGISTRY: OnceCell<HandleRegistry> = OnceCell::new();

/// Explicit initialization step. Idempotent.
pub fn init() -> &'static HandleRegistry {
    REGISTRY.get_or_init(|| {
        logging::init();
        logging::log_runtime_init();
        HandleRegistry::new()
    })
}

/// The process-wide registry.
///
/// Using it before [`init`] is a protocol violation.
pub fn registry() -> &'static HandleRegistry {
    match REGISTRY.get() {
        Some(registry) => registry,
        None => protocol_violation(format_args!(
            "handle registry used before pinbridge_runtime::init"
        )),
    }
}

/// Drop every remaining entry, reporting the ones still live.
///
/// Returns the number of leaked handles.
pub fn cleanup() -> usize {
    let Some(registry) = REGISTRY.get() else {
        return 0;
    };
    let leaked = registry.drain();
    logging::log_leaked_handles(&leaked);
    logging::log_runtime_shutdown(leaked.len());
    leaked.len()
}

/// Runtime initialization
#[no_mangle]
pub extern "C" fn pinbridge_runtime_init() {
    init();
}

/// Runtime cleanup
#[no_mangle]
pub extern "C" fn pinbridge_runtime_cleanup() {
    cleanup();
}

//! Handle registry - pins host objects referenced from the foreign side
//!
//! Design: one mutex guards the entry map, the id sequence and the counters.
//! Every operation mutates, so there is no read path that skips the lock.
//!
//! An entry owns a clone of the object's `Arc`. That clone is the retaining
//! reference: while the entry exists the object stays alive, so its address
//! cannot be reused by another object and the identity key stays unambiguous.
//! Once the last handle is released the clone is dropped and the address may
//! be recycled; a later `acquire` of whatever lives there gets a fresh id.

use std::any::Any;
use std::collections::HashMap;
use std::ffi::c_void;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::logging::{log_acquire, log_protocol_violation, log_release};


/// Shared host object as seen by generated wrappers.
pub type HostRef<T> = Arc<RwLock<T>>;

/// Type-erased host object held by a registry entry.
pub type HostObject = Arc<dyn Any + Send + Sync>;

/// Allocate a host object.
pub fn host_ref<T>(value: T) -> HostRef<T> {
    Arc::new(RwLock::new(value))
}

/// Address of a host object, used as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(usize);

impl Identity {
    #[inline]
    pub fn of(object: &HostObject) -> Self {
        Self(Arc::as_ptr(object) as *const () as usize)
    }

    #[inline]
    pub fn of_ref<T>(value: &HostRef<T>) -> Self {
        Self(Arc::as_ptr(value) as *const () as usize)
    }

    #[inline]
    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    #[inline]
    pub const fn addr(self) -> usize {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Opaque pointer-sized value handed to the foreign side.
///
/// Carries the identity address. The foreign side never dereferences it; it
/// only passes it back to `pinbridge_decref` or to another wrapper.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(*const c_void);

// Safety: the pointer is never dereferenced, only compared and looked up
unsafe impl Send for Handle {}
unsafe impl Sync for Handle {}

impl Handle {
    #[inline]
    pub const fn null() -> Self {
        Self(std::ptr::null())
    }

    #[inline]
    pub fn from_identity(identity: Identity) -> Self {
        Self(identity.addr() as *const c_void)
    }

    #[inline]
    pub fn identity(self) -> Identity {
        Identity(self.0 as usize)
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self.0.is_null()
    }

    #[inline]
    pub fn as_ptr(self) -> *const c_void {
        self.0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:p})", self.0)
    }
}

/// Registry-issued handle number.
///
/// Host-issued ids are negative and count down from [`HandleId::FIRST`]; the
/// non-negative range belongs to the foreign runtime, so the two never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(i64);

impl HandleId {
    /// Arbitrary starting point, kept clear of small sentinel values.
    pub const FIRST: HandleId = HandleId(-24);

    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_host_issued(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Live registry entry. Exists iff `ref_count >= 1`.
struct HandleEntry {
    handle_id: HandleId,
    ref_count: u32,
    object: HostObject,
}

/// Point-in-time view of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    pub identity: Identity,
    pub handle_id: HandleId,
    pub ref_count: u32,
}

/// Registry counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub live: usize,
    pub acquires: u64,
    pub releases: u64,
    pub peak_live: usize,
}

struct RegistryState {
    next: i64,
    entries: HashMap<Identity, HandleEntry>,
    stats: RegistryStats,
}

impl RegistryState {
    fn allocate_id(&mut self) -> HandleId {
        let id = HandleId(self.next);
        self.next = match self.next.checked_sub(1) {
            Some(next) => next,
            None => protocol_violation(format_args!("handle id sequence exhausted")),
        };
        id
    }

    fn entry_infos(&self) -> Vec<EntryInfo> {
        let mut infos: Vec<EntryInfo> = self
            .entries
            .iter()
            .map(|(identity, entry)| EntryInfo {
                identity: *identity,
                handle_id: entry.handle_id,
                ref_count: entry.ref_count,
            })
            .collect();
        infos.sort_by(|a, b| b.handle_id.cmp(&a.handle_id));
        infos
    }

    fn record_live(&mut self) {
        self.stats.live = self.entries.len();
        self.stats.peak_live = self.stats.peak_live.max(self.stats.live);
    }
}

/// Concurrency-safe identity -> (refcount, handle id) table.
pub struct HandleRegistry {
    state: Mutex<RegistryState>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                next: HandleId::FIRST.get(),
                entries: HashMap::with_capacity(64),
                stats: RegistryStats::default(),
            }),
        }
    }

    /// Register one more outstanding reference to `object`.
    ///
    /// The first call for an identity allocates a fresh id and keeps `object`
    /// as the retaining reference; later calls bump the count and return the
    /// same id.
    pub fn acquire(&self, object: HostObject) -> HandleId {
        let identity = Identity::of(&object);
        let mut state = self.state.lock();

        let (handle_id, ref_count) = if let Some(entry) = state.entries.get_mut(&identity) {
            entry.ref_count = bump(entry.ref_count, identity);
            (entry.handle_id, entry.ref_count)
        } else {
            let handle_id = state.allocate_id();
            state.entries.insert(
                identity,
                HandleEntry {
                    handle_id,
                    ref_count: 1,
                    object,
                },
            );
            (handle_id, 1)
        };
        state.stats.acquires += 1;
        state.record_live();
        drop(state);

        log_acquire(identity, handle_id, ref_count);
        handle_id
    }

    /// Acquire `value` and return the handle for it.
    pub fn wrap<T: Send + Sync + 'static>(&self, value: HostRef<T>) -> Handle {
        let handle = Handle::from_identity(Identity::of_ref(&value));
        self.acquire(value);
        handle
    }

    /// Bump the count of an identity that is already registered.
    ///
    /// Used when the foreign side duplicates a handle it already owns.
    pub fn retain(&self, identity: Identity) -> HandleId {
        let mut state = self.state.lock();
        let (handle_id, ref_count) = match state.entries.get_mut(&identity) {
            Some(entry) => {
                entry.ref_count = bump(entry.ref_count, identity);
                (entry.handle_id, entry.ref_count)
            }
            None => protocol_violation(format_args!("retain of untracked object {identity}")),
        };
        state.stats.acquires += 1;
        drop(state);

        log_acquire(identity, handle_id, ref_count);
        handle_id
    }

    /// Drop one outstanding reference; the entry goes away at zero.
    ///
    /// Releasing an identity with no entry means generated code and registry
    /// disagree. That is fatal.
    pub fn release(&self, identity: Identity) {
        let mut state = self.state.lock();
        let (handle_id, remaining) = match state.entries.get_mut(&identity) {
            Some(entry) => {
                entry.ref_count -= 1;
                (entry.handle_id, entry.ref_count)
            }
            None => protocol_violation(format_args!("release of untracked object {identity}")),
        };
        let retained = if remaining == 0 {
            state.entries.remove(&identity).map(|entry| entry.object)
        } else {
            None
        };
        state.stats.releases += 1;
        state.record_live();
        drop(state);

        // The host object may be freed here; never under the lock.
        drop(retained);
        log_release(identity, handle_id, remaining);
    }

    /// Turn a handle back into the host object it names.
    pub fn resolve<T: Send + Sync + 'static>(&self, handle: Handle) -> HostRef<T> {
        let object = match self.lookup(handle.identity()) {
            Some(object) => object,
            None => protocol_violation(format_args!("{handle:?} is not registered")),
        };
        match object.downcast::<RwLock<T>>() {
            Ok(value) => value,
            Err(_) => protocol_violation(format_args!(
                "{handle:?} does not refer to a {}",
                std::any::type_name::<T>()
            )),
        }
    }

    /// Acquire a type-erased object (unnamed interface values).
    pub fn wrap_object(&self, object: HostObject) -> Handle {
        let handle = Handle::from_identity(Identity::of(&object));
        self.acquire(object);
        handle
    }

    /// Resolve without a type check.
    pub fn resolve_object(&self, handle: Handle) -> HostObject {
        match self.lookup(handle.identity()) {
            Some(object) => object,
            None => protocol_violation(format_args!("{handle:?} is not registered")),
        }
    }

    pub fn lookup(&self, identity: Identity) -> Option<HostObject> {
        self.state
            .lock()
            .entries
            .get(&identity)
            .map(|entry| Arc::clone(&entry.object))
    }

    pub fn ref_count(&self, identity: Identity) -> Option<u32> {
        self.state.lock().entries.get(&identity).map(|entry| entry.ref_count)
    }

    pub fn handle_id(&self, identity: Identity) -> Option<HandleId> {
        self.state.lock().entries.get(&identity).map(|entry| entry.handle_id)
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> RegistryStats {
        self.state.lock().stats
    }

    /// Entries ordered by handle id, most recent last.
    pub fn snapshot(&self) -> Vec<EntryInfo> {
        self.state.lock().entry_infos()
    }

    /// Remove every entry regardless of count. Returns what was still live.
    pub fn drain(&self) -> Vec<EntryInfo> {
        let (live, drained) = {
            let mut state = self.state.lock();
            let live = state.entry_infos();
            let drained: Vec<HandleEntry> = state.entries.drain().map(|(_, entry)| entry).collect();
            state.record_live();
            (live, drained)
        };
        // Objects may be freed here, outside the lock
        drop(drained);
        live
    }
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("stats", &self.stats())
            .finish()
    }
}

#[inline]
fn bump(count: u32, identity: Identity) -> u32 {
    match count.checked_add(1) {
        Some(count) => count,
        None => protocol_violation(format_args!("refcount overflow for {identity}")),
    }
}

/// Report a desynchronization between generated code and the registry.
///
/// Never returns. The C entry points turn the panic into an abort.
#[cold]
#[inline(never)]
#[track_caller]
pub fn protocol_violation(detail: fmt::Arguments<'_>) -> ! {
    let message = format!("pinbridge: protocol violation: {detail}");
    log_protocol_violation(&message);
    panic!("{message}");
}

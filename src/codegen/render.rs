//! Type and conversion rendering for one decision
//!
//! Every place a value crosses goes through `lower` (foreign -> host) or
//! `raise` (host -> foreign). Keeping both here is what makes a field getter
//! and its setter, or a parameter and a result of the same type, agree.

use crate::analysis::{Decision, Repr};
use crate::core::{TypeDescriptor, TypePath};

#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    /// Catalog package name, as it appears in type paths
    package: &'a str,
    /// Crate path the package's items live under
    host_crate: &'a str,
}

impl<'a> Renderer<'a> {
    pub fn new(package: &'a str, host_crate: &'a str) -> Self {
        Self {
            package,
            host_crate,
        }
    }

    /// Path of a catalog item: `shapes::Scale`
    pub fn host_item(&self, name: &str) -> String {
        format!("{}::{}", self.host_crate, super::naming::host_ident(name))
    }

    /// Path of a named host type
    pub fn host_path(&self, path: &TypePath) -> String {
        match &path.package {
            Some(pkg) if pkg == self.package => self.host_item(&path.name),
            Some(_) | None => path.rust_path(),
        }
    }

    /// ABI type of an incoming value
    pub fn param_type(&self, decision: &Decision) -> String {
        match (decision.repr, &decision.descriptor) {
            (Repr::Value, TypeDescriptor::Primitive { kind, .. }) if kind.is_string() => {
                "*const c_char".to_string()
            }
            (Repr::Value, TypeDescriptor::Primitive { kind, .. }) => kind.rust_scalar().to_string(),
            (Repr::Error, _) => "*const c_char".to_string(),
            (Repr::Handle, _) => "Handle".to_string(),
            (Repr::Value, other) => unreachable_decision(other),
        }
    }

    /// ABI type of an outgoing value
    pub fn result_type(&self, decision: &Decision) -> String {
        match (decision.repr, &decision.descriptor) {
            (Repr::Value, TypeDescriptor::Primitive { kind, .. }) if kind.is_string() => {
                "*mut c_char".to_string()
            }
            (Repr::Value, TypeDescriptor::Primitive { kind, .. }) => kind.rust_scalar().to_string(),
            (Repr::Error, _) => "*mut c_char".to_string(),
            (Repr::Handle, _) => "Handle".to_string(),
            (Repr::Value, other) => unreachable_decision(other),
        }
    }

    /// Expression turning incoming `ident` into its host form, if it needs one
    pub fn lower(&self, ident: &str, decision: &Decision) -> Option<String> {
        match (decision.repr, &decision.descriptor) {
            (Repr::Value, TypeDescriptor::Primitive { kind, .. }) if kind.is_string() => {
                Some(format!("unsafe {{ ffi::string_from_raw({}) }}", ident))
            }
            (Repr::Value, _) => None,
            (Repr::Error, _) => Some(format!("unsafe {{ ffi::error_from_raw({}) }}", ident)),
            // A named interface path must be a sized host type, e.g.
            // `type Reader = Box<dyn Read + Send + Sync>`
            (Repr::Handle, descriptor) => Some(match descriptor.handle_target() {
                Some(path) => format!("registry().resolve::<{}>({})", self.host_path(path), ident),
                None => format!("registry().resolve_object({})", ident),
            }),
        }
    }

    /// Expression turning host value `expr` into what the foreign side receives
    ///
    /// For handles this is where `acquire` happens.
    pub fn raise(&self, expr: &str, decision: &Decision) -> String {
        match (decision.repr, &decision.descriptor) {
            (Repr::Value, TypeDescriptor::Primitive { kind, .. }) if kind.is_string() => {
                format!("ffi::string_into_raw({})", expr)
            }
            (Repr::Value, _) => expr.to_string(),
            (Repr::Error, _) => format!("ffi::error_into_raw({})", expr),
            (Repr::Handle, descriptor) => match descriptor.handle_target() {
                Some(_) => format!("registry().wrap({})", expr),
                None => format!("registry().wrap_object({})", expr),
            },
        }
    }
}

// WrapTable never pairs Repr::Value with a non-primitive descriptor.
fn unreachable_decision(descriptor: &TypeDescriptor) -> ! {
    unreachable!("by-value decision for non-primitive {}", descriptor)
}

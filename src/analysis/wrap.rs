//! Wrap decision - pass-by-value vs opaque handle
//!
//! The rule is structural. Basic kinds and the predeclared `error` convention
//! cross by value; anything struct-backed and every other interface crosses
//! as a handle. Every other shape is rejected so that a new kind of type
//! forces an explicit decision instead of silently taking a default path.

use std::collections::HashMap;
use std::fmt;

use crate::core::{TypeDescriptor, TypeShape};

/// Representation of a value at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repr {
    /// Passed through unchanged (strings are copied)
    Value,
    /// Host error convention, translated to null / owned message
    Error,
    /// Opaque handle backed by a registry entry
    Handle,
}

impl Repr {
    /// Whether crossing this representation talks to the handle registry
    pub fn touches_registry(self) -> bool {
        match self {
            Self::Handle => true,
            Self::Value | Self::Error => false,
        }
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value => write!(f, "value"),
            Self::Error => write!(f, "error"),
            Self::Handle => write!(f, "handle"),
        }
    }
}

/// A descriptor the rule set has no answer for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unclassifiable {
    pub descriptor: TypeDescriptor,
}

impl fmt::Display for Unclassifiable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor)
    }
}

/// Classify a value crossing as parameter, result, field or variable.
pub fn classify(descriptor: &TypeDescriptor) -> Result<Repr, Unclassifiable> {
    match descriptor {
        TypeDescriptor::Primitive { .. } => Ok(Repr::Value),
        TypeDescriptor::Interface {
            is_error_convention: true,
            ..
        } => Ok(Repr::Error),
        TypeDescriptor::Interface {
            is_error_convention: false,
            ..
        } => Ok(Repr::Handle),
        TypeDescriptor::NamedStruct { .. } => Ok(Repr::Handle),
        TypeDescriptor::Other { .. } => Err(Unclassifiable {
            descriptor: descriptor.clone(),
        }),
    }
}

/// Constants are always by value and never reach the registry.
pub fn classify_constant(descriptor: &TypeDescriptor) -> Result<Repr, Unclassifiable> {
    match descriptor {
        TypeDescriptor::Primitive { .. } => Ok(Repr::Value),
        TypeDescriptor::NamedStruct { .. }
        | TypeDescriptor::Interface { .. }
        | TypeDescriptor::Other { .. } => Err(Unclassifiable {
            descriptor: descriptor.clone(),
        }),
    }
}

/// Classification outcome for one shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub descriptor: TypeDescriptor,
    pub repr: Repr,
}

/// Memoized decisions for one generation run.
///
/// Every site that names the same structural type gets the same answer, so a
/// getter and its setter (or a parameter and a result of the same type) can
/// never disagree.
#[derive(Debug, Default)]
pub struct WrapTable {
    decisions: HashMap<TypeDescriptor, Result<Repr, Unclassifiable>>,
}

impl WrapTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decide(&mut self, shape: &TypeShape) -> Result<Decision, Unclassifiable> {
        let descriptor = TypeDescriptor::of(shape);
        let repr = self
            .decisions
            .entry(descriptor.clone())
            .or_insert_with_key(classify)
            .clone()?;
        Ok(Decision { descriptor, repr })
    }

    /// Constants bypass the memo: their rule is narrower than the general one.
    pub fn decide_constant(&self, shape: &TypeShape) -> Result<Decision, Unclassifiable> {
        let descriptor = TypeDescriptor::of(shape);
        let repr = classify_constant(&descriptor)?;
        Ok(Decision { descriptor, repr })
    }

    /// Number of distinct structural types seen
    pub fn distinct(&self) -> usize {
        self.decisions.len()
    }
}

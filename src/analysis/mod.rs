//! Boundary analysis
//!
//! Decides, for every type that crosses the boundary, how it is represented.

pub mod wrap;

pub use wrap::{classify, classify_constant, Decision, Repr, Unclassifiable, WrapTable};

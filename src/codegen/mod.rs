//! Wrapper generation
//!
//! Walks a catalog and prints the Rust source of the binding library: one
//! exported `extern "C"` wrapper per binding unit.

pub mod emitter;
pub mod naming;
pub mod printer;
pub mod render;

pub use emitter::{generate, BindingEmitter, Generated};
pub use naming::SymbolScheme;
pub use printer::Printer;
pub use render::Renderer;

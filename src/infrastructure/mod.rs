// Core infrastructure modules
pub mod logging;

// Re-exports
pub use logging::*;

//! Frontend components
//!
//! User-facing configuration for a generation run.

pub mod config;

pub use config::{BindConfig, ErrorConfig, OutputConfig, CONFIG_FILE};

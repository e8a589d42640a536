//! pinbridge - generates handle-based bindings that expose a host package
//! to a foreign runtime
//!
//! The generated wrappers link against `pinbridge-runtime`, whose handle
//! registry keeps host objects alive while the foreign side holds them.
//!
//! Generation reports through `tracing`. A driver installs a subscriber with
//! [`init_logging`], or one of the presets: [`init_dev_logging`] for a verbose
//! stderr trace, [`init_file_logging`] for rotating JSON files. Keep the
//! returned guard alive until the run ends.

// Core modules
pub mod core;
pub mod analysis;
pub mod codegen;
pub mod errors;
pub mod frontend;
pub mod infrastructure;

// Re-export commonly used items
pub use crate::core::{BindingUnit, Catalog, TypeDescriptor, TypeShape};
pub use analysis::{classify, Decision, Repr, WrapTable};
pub use codegen::{generate, Generated};
pub use errors::{BindError, ErrorCollector, ErrorList};
pub use frontend::BindConfig;
pub use infrastructure::{
    init_dev_logging, init_file_logging, init_logging, LogConfig, LogFormat, LogOutput,
};

use std::path::Path;

/// Load a catalog and generate its bindings, using `pinbridge.toml` when
/// one is found above the catalog.
pub fn generate_from_path(catalog_path: &Path) -> Result<String, ErrorList> {
    let catalog = Catalog::load(catalog_path).map_err(|e| ErrorList::from(vec![e]))?;
    let config = catalog_path
        .parent()
        .and_then(BindConfig::discover_from)
        .unwrap_or_default();
    generate(&catalog, &config).into_result()
}

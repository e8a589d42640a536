use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::BindError;

/// File name looked up by [`BindConfig::discover`]
pub const CONFIG_FILE: &str = "pinbridge.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindConfig {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub errors: ErrorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Prefix of every exported wrapper symbol
    #[serde(default = "default_prefix")]
    pub symbol_prefix: String,

    /// Crate path generated code uses to reach the runtime
    #[serde(default = "default_runtime_crate")]
    pub runtime_crate: String,

    /// Crate path of the host package; defaults to the catalog package name
    #[serde(default)]
    pub host_crate: Option<String>,

    /// Emit the exported init entry point
    #[serde(default = "default_true")]
    pub emit_init: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorConfig {
    #[serde(default = "default_100")]
    pub max_errors: usize,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            errors: ErrorConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            symbol_prefix: default_prefix(),
            runtime_crate: default_runtime_crate(),
            host_crate: None,
            emit_init: true,
        }
    }
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self { max_errors: 100 }
    }
}

fn default_prefix() -> String { "Bridge_".to_string() }
fn default_runtime_crate() -> String { "pinbridge_runtime".to_string() }
fn default_true() -> bool { true }
fn default_100() -> usize { 100 }

impl BindConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, BindError> {
        let content = fs::read_to_string(path)
            .map_err(|e| BindError::Config(format!("failed to read {}: {}", path.display(), e)))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self, BindError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| BindError::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Find `pinbridge.toml` in the current directory or its parents
    pub fn discover() -> Self {
        std::env::current_dir()
            .ok()
            .and_then(|dir| Self::discover_from(&dir))
            .unwrap_or_default()
    }

    /// Find `pinbridge.toml` starting at `start` and walking up
    pub fn discover_from(start: &Path) -> Option<Self> {
        let mut current: Option<PathBuf> = Some(start.to_path_buf());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return Some(config),
                    Err(err) => {
                        tracing::warn!(path = %config_path.display(), error = %err, "ignoring unreadable config");
                    }
                }
            }
            current = dir.parent().map(|p| p.to_path_buf());
        }

        None
    }

    fn validate(&self) -> Result<(), BindError> {
        let prefix = &self.output.symbol_prefix;
        let valid_ident = prefix
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_ident {
            return Err(BindError::Config(format!(
                "symbol_prefix '{}' is not a valid identifier prefix",
                prefix
            )));
        }
        if self.errors.max_errors == 0 {
            return Err(BindError::Config("max_errors must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Host crate path for a catalog package
    pub fn host_crate<'a>(&'a self, package: &'a str) -> &'a str {
        self.output.host_crate.as_deref().unwrap_or(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BindConfig::default();
        assert_eq!(config.output.symbol_prefix, "Bridge_");
        assert_eq!(config.output.runtime_crate, "pinbridge_runtime");
        assert!(config.output.emit_init);
        assert_eq!(config.errors.max_errors, 100);
        assert_eq!(config.host_crate("shapes"), "shapes");
    }

    #[test]
    fn test_parse_partial() {
        let config = BindConfig::parse(
            r#"
            [output]
            symbol_prefix = "GoPy_"
            host_crate = "shapes_host"
            "#,
        )
        .unwrap();
        assert_eq!(config.output.symbol_prefix, "GoPy_");
        assert_eq!(config.host_crate("shapes"), "shapes_host");
        assert_eq!(config.output.runtime_crate, "pinbridge_runtime");
    }

    #[test]
    fn test_rejects_bad_prefix() {
        let err = BindConfig::parse("[output]\nsymbol_prefix = \"9-bad\"\n").unwrap_err();
        assert!(matches!(err, BindError::Config(_)));
    }

    #[test]
    fn test_rejects_zero_max_errors() {
        assert!(BindConfig::parse("[errors]\nmax_errors = 0\n").is_err());
    }

    #[test]
    fn test_discover_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let mut file = fs::File::create(root.path().join(CONFIG_FILE)).unwrap();
        writeln!(file, "[output]\nsymbol_prefix = \"Found_\"").unwrap();

        let config = BindConfig::discover_from(&nested).unwrap();
        assert_eq!(config.output.symbol_prefix, "Found_");
    }
}

use std::fmt;
use thiserror::Error;

/// Generation-time error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("{decl}: cannot classify {site} of type {shape}")]
    Unclassifiable {
        decl: String,
        site: String,
        shape: String,
    },

    #[error("{decl}: constants must have a basic type, found {shape}")]
    UnclassifiableConstant { decl: String, shape: String },

    #[error("{decl}: exported symbol {symbol} already used by {previous}")]
    DuplicateSymbol {
        decl: String,
        symbol: String,
        previous: String,
    },

    #[error("failed to load catalog {path}: {reason}")]
    Catalog { path: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BindError {
    /// Declaration the error is attached to, if any
    pub fn decl(&self) -> Option<&str> {
        match self {
            Self::Unclassifiable { decl, .. }
            | Self::UnclassifiableConstant { decl, .. }
            | Self::DuplicateSymbol { decl, .. } => Some(decl),
            Self::Catalog { .. } | Self::Config(_) => None,
        }
    }
}

/// Every error from one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList(Vec<BindError>);

impl ErrorList {
    pub fn errors(&self) -> &[BindError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BindError> {
        self.0.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}

impl From<Vec<BindError>> for ErrorList {
    fn from(errors: Vec<BindError>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for ErrorList {
    type Item = BindError;
    type IntoIter = std::vec::IntoIter<BindError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Error collector for gathering every incompatibility in one pass
pub struct ErrorCollector {
    errors: Vec<BindError>,
    max_errors: usize,
    dropped: usize,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::with_max(100)
    }

    pub fn with_max(max_errors: usize) -> Self {
        Self {
            errors: Vec::new(),
            max_errors,
            dropped: 0,
        }
    }

    pub fn add(&mut self, error: BindError) {
        if self.errors.len() < self.max_errors {
            self.errors.push(error);
        } else {
            self.dropped += 1;
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Errors past `max_errors` that were counted but not kept
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn into_list(self) -> ErrorList {
        ErrorList(self.errors)
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

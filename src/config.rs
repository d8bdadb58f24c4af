//! Scan configuration and up-front parameter validation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors for invalid scan parameters.
///
/// These are the only fatal errors in the system: they are surfaced before
/// any file processing begins, and the scan is not started.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Scan root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("Scan root is not a directory: {0}")]
    RootNotADirectory(PathBuf),
}

/// Immutable input to a single scan invocation.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub root: PathBuf,
    /// `None` means unlimited. `Some(0)` limits the scan to the root's
    /// immediate children.
    pub max_depth: Option<usize>,
    pub include_hidden: bool,
}

impl ScanConfig {
    /// Build a validated configuration. Fails if the root is missing or not
    /// a directory; either way no traversal has happened yet.
    pub fn new(
        root: impl Into<PathBuf>,
        max_depth: Option<usize>,
        include_hidden: bool,
    ) -> Result<Self, ConfigError> {
        let root = root.into();
        if !root.exists() {
            return Err(ConfigError::RootNotFound(root));
        }
        if !root.is_dir() {
            return Err(ConfigError::RootNotADirectory(root));
        }
        Ok(Self {
            root,
            max_depth,
            include_hidden,
        })
    }
}

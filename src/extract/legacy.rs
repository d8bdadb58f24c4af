//! Legacy `.doc` conversion behind a capability interface.

use std::path::Path;
use std::process::Command;

use super::ExtractError;

/// Converter for legacy binary word-processor documents.
///
/// Production shells out to `catdoc`; tests stub deterministic output. A
/// missing converter degrades the file to empty text, never aborts.
pub trait LegacyDocConverter: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool;

    fn convert(&self, path: &Path) -> Result<String, ExtractError>;
}

/// `catdoc`-based converter.
pub struct CatdocConverter;

impl CatdocConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CatdocConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl LegacyDocConverter for CatdocConverter {
    fn name(&self) -> &'static str {
        "catdoc"
    }

    fn is_available(&self) -> bool {
        which::which("catdoc").is_ok()
    }

    fn convert(&self, path: &Path) -> Result<String, ExtractError> {
        let output = Command::new("catdoc").arg(path).output();
        match output {
            Ok(out) if out.status.success() => {
                Ok(String::from_utf8_lossy(&out.stdout).to_string())
            }
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                Err(ExtractError::ToolFailed(format!(
                    "catdoc failed: {}",
                    stderr.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ExtractError::ToolNotFound(
                "catdoc (install catdoc)".to_string(),
            )),
            Err(e) => Err(ExtractError::Io(e)),
        }
    }
}

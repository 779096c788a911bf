/// Export configuration loaded once per session
use crate::error::ExportError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options controlling how registries are serialised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Object the namespaces hang off, e.g. `project` gives `project.images[0]`.
    pub namespace_prefix: Option<String>,
    /// Emit a comment line ahead of each non-empty section.
    pub section_comments: bool,
    /// Request antialiased map renders.
    pub antialias: bool,
    /// Show a terminal progress bar while images are materialised.
    pub show_progress: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            namespace_prefix: None,
            section_comments: true,
            antialias: true,
            show_progress: false,
        }
    }
}

impl ExportSettings {
    /// Parses settings from JSON text. Missing fields fall back to defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ExportError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

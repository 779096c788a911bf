/// Error types for the export finalisation phase.

/// Failure reported by a rendering collaborator.
pub type RenderError = Box<dyn std::error::Error + Send + Sync>;

/// Fatal errors raised while writing registries.
/// Missing source files and invalid colours never end up here.
#[derive(Debug)]
pub enum ExportError {
    IoError(std::io::Error),
    ImageError(image::ImageError),
    RenderError(RenderError),
    SettingsError(serde_json::Error),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::IoError(err)
    }
}

impl From<image::ImageError> for ExportError {
    fn from(err: image::ImageError) -> Self {
        ExportError::ImageError(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::SettingsError(err)
    }
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::IoError(e) => write!(f, "IO error: {}", e),
            ExportError::ImageError(e) => write!(f, "Image error: {}", e),
            ExportError::RenderError(e) => write!(f, "Render error: {}", e),
            ExportError::SettingsError(e) => write!(f, "Settings error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::IoError(e) => Some(e),
            ExportError::ImageError(e) => Some(e),
            ExportError::RenderError(e) => Some(e.as_ref()),
            ExportError::SettingsError(e) => Some(e),
        }
    }
}

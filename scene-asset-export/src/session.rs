/// Export session orchestrating interning and the final write phase
use crate::error::ExportError;
use crate::images::ImageRegistry;
use crate::jsons::JsonRegistry;
use crate::materials::MaterialRegistry;
use crate::render::{MapCanvas, RenderSession};
use crate::script::ScriptWriter;
use crate::settings::ExportSettings;
use crate::warnings::WarningSink;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;

/// Record counts written by `ExportSession::finish`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub images: usize,
    pub materials: usize,
    pub jsons: usize,
}

/// Owns the image, material and JSON registries of one export.
/// Geometry traversal interns through the accessors, then `finish` writes everything once.
#[derive(Debug, Clone, Default)]
pub struct ExportSession {
    settings: ExportSettings,
    images: ImageRegistry,
    materials: MaterialRegistry,
    jsons: JsonRegistry,
}

impl ExportSession {
    pub fn new(settings: ExportSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn images(&mut self) -> &mut ImageRegistry {
        &mut self.images
    }

    pub fn materials(&mut self) -> &mut MaterialRegistry {
        &mut self.materials
    }

    pub fn jsons(&mut self) -> &mut JsonRegistry {
        &mut self.jsons
    }

    /// Writes all registries to `out`.
    /// Materials are resolved first because texture materials may still add images;
    /// the image section is written only after that. Output order is images, materials, JSON.
    pub fn finish<W: Write, C: MapCanvas>(
        mut self,
        out: W,
        renderer: &mut RenderSession<C>,
        warnings: &mut dyn WarningSink,
    ) -> Result<ExportSummary, ExportError> {
        let direct_images = self.images.len();
        let resolved = self.materials.resolve(&mut self.images);
        log::debug!(
            "Resolved {} materials, {} images added by textures",
            resolved.len(),
            self.images.len() - direct_images
        );

        let mut writer = ScriptWriter::with_settings(out, &self.settings);
        let progress = progress_bar(&self.settings, self.images.len());

        let summary = ExportSummary {
            images: self
                .images
                .write(&mut writer, renderer, warnings, &progress)?,
            materials: resolved.write(&mut writer)?,
            jsons: self.jsons.write(&mut writer, warnings)?,
        };
        writer.flush()?;

        log::info!(
            "Exported {} images, {} materials, {} JSON documents",
            summary.images,
            summary.materials,
            summary.jsons
        );
        Ok(summary)
    }
}

/// Progress bar for image materialisation, hidden unless enabled in settings.
fn progress_bar(settings: &ExportSettings, len: usize) -> ProgressBar {
    if !settings.show_progress || len == 0 {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    match ProgressStyle::default_bar()
        .template("[{bar:40.green/blue}] {pos}/{len} images ({percent}%) {msg}")
    {
        Ok(style) => pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏")),
        Err(e) => log::debug!("Progress template rejected: {}", e),
    }
    pb
}

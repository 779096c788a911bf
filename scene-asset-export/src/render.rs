/// Off-screen map rendering and raster encoding for image records
use crate::error::{ExportError, RenderError};
use crate::extent::MapExtent;
use crate::settings::ExportSettings;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbImage, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Parameters for one off-screen render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob<'a> {
    pub width: u32,
    pub height: u32,
    pub extent: MapExtent,
    /// Destination CRS the layers are projected into.
    pub crs: &'a str,
    /// Layers to draw, bottom first.
    pub layer_ids: &'a [String],
    pub antialias: bool,
}

impl RenderJob<'_> {
    /// Map units covered by a single output pixel along the x axis.
    pub fn map_units_per_pixel(&self) -> f64 {
        self.extent.width() / f64::from(self.width.max(1))
    }
}

/// Map canvas collaborator that owns layers and draws them.
pub trait MapCanvas {
    /// Destination coordinate reference system identifier.
    fn destination_crs(&self) -> String;

    /// Ids of the layers shown on the canvas, bottom first.
    fn layer_ids(&self) -> Vec<String>;

    fn background_color(&self) -> Rgba<u8>;

    /// Extent currently displayed on screen.
    fn extent(&self) -> MapExtent;

    /// Size of the on-screen canvas in pixels.
    fn output_size(&self) -> (u32, u32);

    /// The already rendered on-screen buffer. It has no alpha channel.
    fn content_image(&mut self) -> Result<RgbImage, RenderError>;

    /// Draws the requested layers into `target`, which arrives pre-filled with the background.
    fn paint(&mut self, job: &RenderJob<'_>, target: &mut RgbaImage) -> Result<(), RenderError>;
}

/// Renderer state captured from the canvas on first use.
#[derive(Debug, Clone, PartialEq)]
struct RendererState {
    crs: String,
    layer_ids: Vec<String>,
    background: Rgba<u8>,
}

impl RendererState {
    fn capture<C: MapCanvas>(canvas: &C) -> Self {
        let state = Self {
            crs: canvas.destination_crs(),
            layer_ids: canvas.layer_ids(),
            background: canvas.background_color(),
        };
        log::debug!(
            "Initialised renderer: crs {}, {} layers",
            state.crs,
            state.layer_ids.len()
        );
        state
    }
}

/// Rendering session owned by the export.
/// Projection, layer set and background colour are captured lazily and reused
/// until `reset` is called. Calls must be sequential.
pub struct RenderSession<C: MapCanvas> {
    canvas: C,
    antialias: bool,
    state: Option<RendererState>,
    renders: usize,
}

impl<C: MapCanvas> RenderSession<C> {
    pub fn new(canvas: C) -> Self {
        Self {
            canvas,
            antialias: true,
            state: None,
            renders: 0,
        }
    }

    pub fn from_settings(canvas: C, settings: &ExportSettings) -> Self {
        Self::new(canvas).with_antialias(settings.antialias)
    }

    pub fn with_antialias(mut self, antialias: bool) -> Self {
        self.antialias = antialias;
        self
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// Drops the captured renderer state so the next render re-reads the canvas.
    pub fn reset(&mut self) {
        self.state = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Number of off-screen renders performed by this session.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Renders the map off-screen and returns it as a base64 PNG.
    /// `layer_filter` restricts drawing to the given layers, otherwise every canvas layer is drawn.
    pub fn rendered_image(
        &mut self,
        width: u32,
        height: u32,
        extent: MapExtent,
        transparent_background: bool,
        layer_filter: Option<&[String]>,
    ) -> Result<String, ExportError> {
        let state = self
            .state
            .get_or_insert_with(|| RendererState::capture(&self.canvas));

        let fill = if transparent_background {
            Rgba([0, 0, 0, 0])
        } else {
            state.background
        };
        let mut image = RgbaImage::from_pixel(width, height, fill);

        let job = RenderJob {
            width,
            height,
            extent,
            crs: &state.crs,
            layer_ids: layer_filter.unwrap_or(state.layer_ids.as_slice()),
            antialias: self.antialias,
        };
        self.canvas
            .paint(&job, &mut image)
            .map_err(ExportError::RenderError)?;
        self.renders += 1;

        encode_png(&DynamicImage::ImageRgba8(image))
    }

    /// Returns the canvas image as `(width, height, base64 PNG)`.
    /// An opaque request reuses the on-screen buffer. A transparent one needs a
    /// fresh render because that buffer has no alpha channel.
    pub fn canvas_image(
        &mut self,
        transparent_background: bool,
    ) -> Result<(u32, u32, String), ExportError> {
        let (width, height) = self.canvas.output_size();

        let data = if transparent_background {
            let extent = self.canvas.extent();
            self.rendered_image(width, height, extent, true, None)?
        } else {
            let content = self
                .canvas
                .content_image()
                .map_err(ExportError::RenderError)?;
            encode_png(&DynamicImage::ImageRgb8(content))?
        };

        Ok((width, height, data))
    }

    /// Saves the on-screen canvas buffer as a PNG file.
    pub fn save_canvas_image(&mut self, path: &Path) -> Result<(), ExportError> {
        let content = self
            .canvas
            .content_image()
            .map_err(ExportError::RenderError)?;
        content.save(path)?;
        log::info!("Saved canvas image: {}", path.display());
        Ok(())
    }
}

/// Encodes a raster as PNG and returns it base64 encoded.
pub fn encode_png(image: &DynamicImage) -> Result<String, ExportError> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageOutputFormat::Png)?;
    Ok(STANDARD.encode(buffer.into_inner()))
}

/// Base64 encodes raw file bytes.
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

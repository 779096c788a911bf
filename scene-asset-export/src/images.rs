/// Image registry with deferred raster materialisation
use crate::constants::{IMAGES_NAMESPACE, IMAGES_SECTION};
use crate::error::ExportError;
use crate::extent::MapExtent;
use crate::registry::Registry;
use crate::render::{MapCanvas, RenderSession, encode_bytes};
use crate::script::{ObjectLiteral, ScriptWriter};
use crate::warnings::WarningSink;
use indicatif::ProgressBar;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Image request recorded at intern time and materialised at write time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageDescriptor {
    /// Image file on disk, identified by its path string.
    File { path: String },
    /// The map canvas as currently displayed.
    Canvas { transparent_background: bool },
    /// Off-screen render of every canvas layer.
    Map {
        width: u32,
        height: u32,
        extent: MapExtent,
        transparent_background: bool,
    },
    /// Off-screen render of a single layer.
    Layer {
        layer_id: String,
        width: u32,
        height: u32,
        extent: MapExtent,
        transparent_background: bool,
    },
}

/// Deduplicated image requests, rendered lazily by `write`.
#[derive(Debug, Clone, Default)]
pub struct ImageRegistry {
    entries: Registry<ImageDescriptor>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, descriptor: ImageDescriptor) -> usize {
        self.entries.intern(descriptor)
    }

    pub fn intern_file(&mut self, path: impl Into<String>) -> usize {
        self.intern(ImageDescriptor::File { path: path.into() })
    }

    pub fn intern_canvas(&mut self, transparent_background: bool) -> usize {
        self.intern(ImageDescriptor::Canvas {
            transparent_background,
        })
    }

    pub fn intern_map(
        &mut self,
        width: u32,
        height: u32,
        extent: MapExtent,
        transparent_background: bool,
    ) -> usize {
        self.intern(ImageDescriptor::Map {
            width,
            height,
            extent,
            transparent_background,
        })
    }

    pub fn intern_layer(
        &mut self,
        layer_id: impl Into<String>,
        width: u32,
        height: u32,
        extent: MapExtent,
        transparent_background: bool,
    ) -> usize {
        self.intern(ImageDescriptor::Layer {
            layer_id: layer_id.into(),
            width,
            height,
            extent,
            transparent_background,
        })
    }

    pub fn get(&self, index: usize) -> Option<&ImageDescriptor> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Materialises every image in index order and writes one `images[i]` statement each.
    /// Consumes the registry so nothing can be interned after its records are written.
    /// Returns the number of records written.
    pub fn write<W: Write, C: MapCanvas>(
        self,
        out: &mut ScriptWriter<W>,
        renderer: &mut RenderSession<C>,
        warnings: &mut dyn WarningSink,
        progress: &ProgressBar,
    ) -> Result<usize, ExportError> {
        if self.entries.is_empty() {
            return Ok(0);
        }

        out.section(IMAGES_SECTION)?;
        progress.set_length(self.entries.len() as u64);
        progress.set_message("Rendering images");

        let count = self.entries.len();
        for (index, descriptor) in self.entries.into_items().into_iter().enumerate() {
            let record = materialize(&descriptor, renderer, warnings)?;
            out.assign(IMAGES_NAMESPACE, index, &record)?;
            progress.inc(1);
        }

        progress.finish_with_message("Images written");
        Ok(count)
    }
}

/// Builds the `{width, height, data}` record for one descriptor.
fn materialize<C: MapCanvas>(
    descriptor: &ImageDescriptor,
    renderer: &mut RenderSession<C>,
    warnings: &mut dyn WarningSink,
) -> Result<ObjectLiteral, ExportError> {
    let requested = match descriptor {
        ImageDescriptor::File { .. } => None,
        ImageDescriptor::Canvas { .. } => Some(renderer.canvas().output_size()),
        ImageDescriptor::Map { width, height, .. }
        | ImageDescriptor::Layer { width, height, .. } => Some((*width, *height)),
    };
    if let Some((width, height)) = requested.filter(|&(w, h)| w == 0 || h == 0) {
        warnings.warn(format!("Image has zero size: {}x{}", width, height));
        return Ok(ObjectLiteral::new().null("data"));
    }

    let (width, height, data) = match descriptor {
        ImageDescriptor::File { path } => match read_image_file(Path::new(path)) {
            Ok(loaded) => loaded,
            Err(message) => {
                warnings.warn(message);
                return Ok(ObjectLiteral::new().null("data"));
            }
        },
        ImageDescriptor::Canvas {
            transparent_background,
        } => renderer.canvas_image(*transparent_background)?,
        ImageDescriptor::Map {
            width,
            height,
            extent,
            transparent_background,
        } => {
            let data =
                renderer.rendered_image(*width, *height, *extent, *transparent_background, None)?;
            (*width, *height, data)
        }
        ImageDescriptor::Layer {
            layer_id,
            width,
            height,
            extent,
            transparent_background,
        } => {
            let data = renderer.rendered_image(
                *width,
                *height,
                *extent,
                *transparent_background,
                Some(std::slice::from_ref(layer_id)),
            )?;
            (*width, *height, data)
        }
    };

    Ok(ObjectLiteral::new()
        .int("width", width)
        .int("height", height)
        .string("data", &data))
}

/// Reads the dimensions and base64 bytes of an image file.
/// The error is the warning to report; the record degrades to null data.
fn read_image_file(path: &Path) -> Result<(u32, u32, String), String> {
    if !path.is_file() {
        return Err(format!("Image file not found: {}", path.display()));
    }

    let (width, height) = image::image_dimensions(path)
        .map_err(|e| format!("Image file could not be decoded: {}: {}", path.display(), e))?;
    let bytes = fs::read(path)
        .map_err(|e| format!("Image file could not be read: {}: {}", path.display(), e))?;

    Ok((width, height, encode_bytes(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_canvas::FakeCanvas;
    use crate::warnings::CollectedWarnings;
    use image::{Rgba, RgbaImage};

    fn write_all(
        registry: ImageRegistry,
    ) -> (String, CollectedWarnings, RenderSession<FakeCanvas>) {
        let mut out = ScriptWriter::new(Vec::new());
        let mut renderer = RenderSession::new(FakeCanvas::new());
        let mut warnings = CollectedWarnings::new();
        registry
            .write(&mut out, &mut renderer, &mut warnings, &ProgressBar::hidden())
            .expect("write images");
        let text = String::from_utf8(out.into_inner()).unwrap();
        (text, warnings, renderer)
    }

    fn statements(text: &str) -> Vec<&str> {
        text.lines().filter(|l| l.starts_with("images[")).collect()
    }

    #[test]
    fn equal_requests_collapse() {
        let extent = MapExtent::new(0.0, 0.0, 100.0, 100.0);
        let mut registry = ImageRegistry::new();

        assert_eq!(registry.intern_map(100, 100, extent, false), 0);
        assert_eq!(registry.intern_map(100, 100, extent, false), 0);
        assert_eq!(registry.intern_map(100, 100, extent, true), 1);
        assert_eq!(registry.intern_layer("roads", 100, 100, extent, false), 2);
        assert_eq!(registry.intern_canvas(false), 3);
        assert_eq!(registry.intern_file("a.png"), 4);
        assert_eq!(registry.intern_file("a.png"), 4);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn zero_size_request_degrades_to_null_without_rendering() {
        let extent = MapExtent::new(0.0, 0.0, 10.0, 10.0);
        let mut registry = ImageRegistry::new();
        registry.intern_map(0, 16, extent, false);
        registry.intern_layer("roads", 16, 0, extent, true);

        let (text, warnings, renderer) = write_all(registry);
        assert_eq!(
            statements(&text),
            vec!["images[0] = {data:null};", "images[1] = {data:null};"]
        );
        assert_eq!(
            warnings.messages(),
            ["Image has zero size: 0x16", "Image has zero size: 16x0"]
        );
        assert!(renderer.canvas().jobs.is_empty());
        assert_eq!(renderer.render_count(), 0);
    }

    #[test]
    fn zero_size_canvas_degrades_to_null() {
        let mut canvas = FakeCanvas::new();
        canvas.size = (0, 4);
        let mut renderer = RenderSession::new(canvas);
        let mut registry = ImageRegistry::new();
        registry.intern_canvas(false);

        let mut out = ScriptWriter::new(Vec::new());
        let mut warnings = CollectedWarnings::new();
        registry
            .write(&mut out, &mut renderer, &mut warnings, &ProgressBar::hidden())
            .expect("write images");

        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(statements(&text), vec!["images[0] = {data:null};"]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(renderer.canvas().content_requests, 0);
    }

    #[test]
    fn missing_file_degrades_to_null_with_one_warning() {
        let mut registry = ImageRegistry::new();
        registry.intern_file("does/not/exist.png");

        let (text, warnings, _) = write_all(registry);
        assert_eq!(statements(&text), vec!["images[0] = {data:null};"]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings.messages()[0].contains("does/not/exist.png"));
    }

    #[test]
    fn file_images_embed_raw_bytes() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("tex.png");
        RgbaImage::from_pixel(5, 3, Rgba([1, 2, 3, 255]))
            .save(&path)
            .expect("save png");
        let bytes = fs::read(&path).unwrap();

        let mut registry = ImageRegistry::new();
        registry.intern_file(path.to_string_lossy());

        let (text, warnings, _) = write_all(registry);
        let expected = format!(
            "images[0] = {{width:5,height:3,data:\"{}\"}};",
            encode_bytes(&bytes)
        );
        assert_eq!(statements(&text), vec![expected.as_str()]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn undecodable_file_is_treated_as_missing() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not an image").unwrap();

        let mut registry = ImageRegistry::new();
        registry.intern_file(path.to_string_lossy());

        let (text, warnings, _) = write_all(registry);
        assert_eq!(statements(&text), vec!["images[0] = {data:null};"]);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn renders_follow_descriptor_kind() {
        let extent = MapExtent::new(0.0, 0.0, 10.0, 10.0);
        let mut registry = ImageRegistry::new();
        registry.intern_map(16, 8, extent, false);
        registry.intern_layer("rivers", 4, 4, extent, true);
        registry.intern_canvas(false);

        let (text, warnings, renderer) = write_all(registry);
        let lines = statements(&text);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("images[0] = {width:16,height:8,data:\""));
        assert!(lines[1].starts_with("images[1] = {width:4,height:4,data:\""));
        assert!(lines[2].starts_with("images[2] = {width:8,height:4,data:\""));
        assert!(warnings.is_empty());

        let jobs = &renderer.canvas().jobs;
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].2, vec!["roads", "rivers"]);
        assert_eq!(jobs[1].2, vec!["rivers"]);
        assert_eq!(renderer.canvas().content_requests, 1);
    }

    #[test]
    fn empty_registry_writes_nothing() {
        let (text, warnings, _) = write_all(ImageRegistry::new());
        assert!(text.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn record_count_matches_entries() {
        let mut registry = ImageRegistry::new();
        for i in 0..4 {
            registry.intern_file(format!("missing_{}.png", i));
        }
        registry.intern_canvas(true);

        let mut out = ScriptWriter::new(Vec::new());
        let mut renderer = RenderSession::new(FakeCanvas::new());
        let mut warnings = CollectedWarnings::new();
        let written = registry
            .write(&mut out, &mut renderer, &mut warnings, &ProgressBar::hidden())
            .unwrap();

        assert_eq!(written, 5);
        assert_eq!(out.statements(), 5);
        assert_eq!(warnings.len(), 4);
    }
}

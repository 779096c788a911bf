/// Material registry and texture reference resolution
use crate::constants::{
    ERROR_COLOR, FAMILY_LINE_BASIC, FAMILY_MESH_LAMBERT, FAMILY_MESH_PHONG, HEX_COLOR_PREFIX,
    MATERIALS_NAMESPACE, MATERIALS_SECTION, MAX_TRANSPARENCY,
};
use crate::error::ExportError;
use crate::extent::MapExtent;
use crate::images::{ImageDescriptor, ImageRegistry};
use crate::registry::Registry;
use crate::script::{ObjectLiteral, ScriptWriter};
use std::io::Write;

/// Fine-grained material kinds requested by geometry builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    LambertSmooth,
    LambertFlat,
    WireframeOverlay,
    LineBasic,
    Sprite,
    CanvasTexture,
    MapTexture,
    LayerTexture,
    FileTexture,
}

/// Coarse material families the viewer instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialFamily {
    MeshLambert,
    MeshPhong,
    LineBasic,
}

impl MaterialFamily {
    /// Numeric code written to the `type` field.
    pub fn code(self) -> u8 {
        match self {
            MaterialFamily::MeshLambert => FAMILY_MESH_LAMBERT,
            MaterialFamily::MeshPhong => FAMILY_MESH_PHONG,
            MaterialFamily::LineBasic => FAMILY_LINE_BASIC,
        }
    }
}

impl MaterialKind {
    /// Maps a kind onto its output family. Sprites and textures always use the textured family.
    pub fn family(self) -> MaterialFamily {
        match self {
            MaterialKind::LambertSmooth
            | MaterialKind::LambertFlat
            | MaterialKind::WireframeOverlay => MaterialFamily::MeshLambert,
            MaterialKind::LineBasic => MaterialFamily::LineBasic,
            MaterialKind::Sprite
            | MaterialKind::CanvasTexture
            | MaterialKind::MapTexture
            | MaterialKind::LayerTexture
            | MaterialKind::FileTexture => MaterialFamily::MeshPhong,
        }
    }
}

/// Colour string in `0x` hex notation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexColor(String);

impl HexColor {
    /// Keeps any colour starting with `0x`; anything else becomes the sentinel error colour.
    /// Only the prefix is checked, the digits are passed through as given.
    pub fn parse(color: &str) -> Self {
        let valid = color.starts_with(HEX_COLOR_PREFIX);

        if valid {
            HexColor(color.to_string())
        } else {
            log::debug!("Invalid colour {:?}, using error colour", color);
            HexColor(ERROR_COLOR.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_error(&self) -> bool {
        self.0 == ERROR_COLOR
    }
}

/// Image a texture-backed material will reference once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TextureSource {
    Canvas {
        transparent_background: bool,
    },
    Map {
        width: u32,
        height: u32,
        extent: MapExtent,
        transparent_background: bool,
    },
    Layer {
        layer_id: String,
        width: u32,
        height: u32,
        extent: MapExtent,
        transparent_background: bool,
    },
    File {
        path: String,
        transparent_background: bool,
    },
}

impl TextureSource {
    pub fn transparent_background(&self) -> bool {
        match self {
            TextureSource::Canvas {
                transparent_background,
            }
            | TextureSource::Map {
                transparent_background,
                ..
            }
            | TextureSource::Layer {
                transparent_background,
                ..
            }
            | TextureSource::File {
                transparent_background,
                ..
            } => *transparent_background,
        }
    }

    /// Image request backing this texture.
    /// File textures key the image by path alone; the background flag stays on the material.
    pub fn image_descriptor(&self) -> ImageDescriptor {
        match self {
            TextureSource::Canvas {
                transparent_background,
            } => ImageDescriptor::Canvas {
                transparent_background: *transparent_background,
            },
            TextureSource::Map {
                width,
                height,
                extent,
                transparent_background,
            } => ImageDescriptor::Map {
                width: *width,
                height: *height,
                extent: *extent,
                transparent_background: *transparent_background,
            },
            TextureSource::Layer {
                layer_id,
                width,
                height,
                extent,
                transparent_background,
            } => ImageDescriptor::Layer {
                layer_id: layer_id.clone(),
                width: *width,
                height: *height,
                extent: *extent,
                transparent_background: *transparent_background,
            },
            TextureSource::File { path, .. } => ImageDescriptor::File { path: path.clone() },
        }
    }
}

/// Solid colour or texture a material is painted with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Surface {
    Color(HexColor),
    Texture(TextureSource),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialDescriptor {
    pub kind: MaterialKind,
    pub surface: Surface,
    /// Percentage in `0..=100`.
    pub transparency_percent: u8,
    pub double_sided: bool,
}

impl MaterialDescriptor {
    fn new(kind: MaterialKind, surface: Surface, transparency: u8, double_sided: bool) -> Self {
        Self {
            kind,
            surface,
            transparency_percent: transparency.min(MAX_TRANSPARENCY),
            double_sided,
        }
    }

    /// Opacity derived from the transparency, `None` when fully opaque.
    pub fn opacity(&self) -> Option<f64> {
        (self.transparency_percent > 0)
            .then(|| 1.0 - f64::from(self.transparency_percent) / 100.0)
    }
}

/// What a resolved material points at.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialReference {
    Color(HexColor),
    Image(usize),
}

/// Material with its texture resolved into an image handle, ready to serialise.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMaterial {
    pub family: MaterialFamily,
    pub reference: MaterialReference,
    pub opacity: Option<f64>,
    pub double_sided: bool,
    pub wireframe: bool,
    pub flat_shading: bool,
    pub transparent_background: bool,
}

impl ResolvedMaterial {
    /// Sparse `{type, c|i, o?, ds?, w?, flat?, t?}` record.
    pub fn to_literal(&self) -> ObjectLiteral {
        let literal = ObjectLiteral::new().int("type", self.family.code());
        let literal = match &self.reference {
            MaterialReference::Color(color) => literal.raw("c", color.as_str()),
            MaterialReference::Image(index) => literal.handle("i", *index),
        };
        let literal = match self.opacity {
            Some(opacity) => literal.number("o", opacity),
            None => literal,
        };

        literal
            .flag("ds", self.double_sided)
            .flag("w", self.wireframe)
            .flag("flat", self.flat_shading)
            .flag("t", self.transparent_background)
    }
}

/// Materials after texture resolution, in index order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedMaterials {
    entries: Vec<ResolvedMaterial>,
}

impl ResolvedMaterials {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ResolvedMaterial> {
        self.entries.get(index)
    }

    /// Writes one `materials[i]` statement per entry and returns the count.
    pub fn write<W: Write>(self, out: &mut ScriptWriter<W>) -> Result<usize, ExportError> {
        if self.entries.is_empty() {
            return Ok(0);
        }

        out.section(MATERIALS_SECTION)?;
        for (index, material) in self.entries.iter().enumerate() {
            out.assign(MATERIALS_NAMESPACE, index, &material.to_literal())?;
        }
        Ok(self.entries.len())
    }
}

/// Deduplicated material requests.
#[derive(Debug, Clone, Default)]
pub struct MaterialRegistry {
    entries: Registry<MaterialDescriptor>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, descriptor: MaterialDescriptor) -> usize {
        self.entries.intern(descriptor)
    }

    fn intern_color(
        &mut self,
        kind: MaterialKind,
        color: &str,
        transparency: u8,
        double_sided: bool,
    ) -> usize {
        let surface = Surface::Color(HexColor::parse(color));
        self.intern(MaterialDescriptor::new(kind, surface, transparency, double_sided))
    }

    fn intern_texture(
        &mut self,
        kind: MaterialKind,
        texture: TextureSource,
        transparency: u8,
        double_sided: bool,
    ) -> usize {
        let surface = Surface::Texture(texture);
        self.intern(MaterialDescriptor::new(kind, surface, transparency, double_sided))
    }

    pub fn lambert_smooth(&mut self, color: &str, transparency: u8, double_sided: bool) -> usize {
        self.intern_color(MaterialKind::LambertSmooth, color, transparency, double_sided)
    }

    /// Same as `lambert_smooth`.
    pub fn mesh_lambert(&mut self, color: &str, transparency: u8, double_sided: bool) -> usize {
        self.lambert_smooth(color, transparency, double_sided)
    }

    pub fn lambert_flat(&mut self, color: &str, transparency: u8, double_sided: bool) -> usize {
        self.intern_color(MaterialKind::LambertFlat, color, transparency, double_sided)
    }

    pub fn wireframe(&mut self, color: &str, transparency: u8) -> usize {
        self.intern_color(MaterialKind::WireframeOverlay, color, transparency, false)
    }

    pub fn line_basic(&mut self, color: &str, transparency: u8) -> usize {
        self.intern_color(MaterialKind::LineBasic, color, transparency, false)
    }

    /// Sprites always carry a transparent background and are single-sided.
    pub fn sprite(&mut self, path: impl Into<String>, transparency: u8) -> usize {
        let texture = TextureSource::File {
            path: path.into(),
            transparent_background: true,
        };
        self.intern_texture(MaterialKind::Sprite, texture, transparency, false)
    }

    pub fn canvas_texture(&mut self, transparency: u8, transparent_background: bool) -> usize {
        let texture = TextureSource::Canvas {
            transparent_background,
        };
        self.intern_texture(MaterialKind::CanvasTexture, texture, transparency, true)
    }

    pub fn map_texture(
        &mut self,
        width: u32,
        height: u32,
        extent: MapExtent,
        transparency: u8,
        transparent_background: bool,
    ) -> usize {
        let texture = TextureSource::Map {
            width,
            height,
            extent,
            transparent_background,
        };
        self.intern_texture(MaterialKind::MapTexture, texture, transparency, true)
    }

    pub fn layer_texture(
        &mut self,
        layer_id: impl Into<String>,
        width: u32,
        height: u32,
        extent: MapExtent,
        transparency: u8,
        transparent_background: bool,
    ) -> usize {
        let texture = TextureSource::Layer {
            layer_id: layer_id.into(),
            width,
            height,
            extent,
            transparent_background,
        };
        self.intern_texture(MaterialKind::LayerTexture, texture, transparency, true)
    }

    pub fn file_texture(
        &mut self,
        path: impl Into<String>,
        transparency: u8,
        transparent_background: bool,
        double_sided: bool,
    ) -> usize {
        let texture = TextureSource::File {
            path: path.into(),
            transparent_background,
        };
        self.intern_texture(MaterialKind::FileTexture, texture, transparency, double_sided)
    }

    pub fn get(&self, index: usize) -> Option<&MaterialDescriptor> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves texture references into image handles.
    /// This interns into `images`, so it must run before the image registry is written.
    pub fn resolve(self, images: &mut ImageRegistry) -> ResolvedMaterials {
        let entries = self
            .entries
            .into_items()
            .into_iter()
            .map(|material| {
                let (reference, transparent_background) = match &material.surface {
                    Surface::Color(color) => (MaterialReference::Color(color.clone()), false),
                    Surface::Texture(texture) => (
                        MaterialReference::Image(images.intern(texture.image_descriptor())),
                        texture.transparent_background(),
                    ),
                };

                ResolvedMaterial {
                    family: material.kind.family(),
                    reference,
                    opacity: material.opacity(),
                    double_sided: material.double_sided,
                    wireframe: material.kind == MaterialKind::WireframeOverlay,
                    flat_shading: material.kind == MaterialKind::LambertFlat,
                    transparent_background,
                }
            })
            .collect();

        ResolvedMaterials { entries }
    }

    /// Resolves and writes in one step. `images` may grow and must be written afterwards.
    pub fn write<W: Write>(
        self,
        out: &mut ScriptWriter<W>,
        images: &mut ImageRegistry,
    ) -> Result<usize, ExportError> {
        self.resolve(images).write(out)
    }
}

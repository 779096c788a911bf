//! Deduplicating asset registries serialised for a 3D scene viewer
pub mod constants;
pub mod error;
pub mod extent;
pub mod images;
pub mod jsons;
pub mod materials;
pub mod registry;
pub mod render;
pub mod script;
pub mod session;
pub mod settings;
pub mod warnings;

pub use error::{ExportError, RenderError};
pub use extent::MapExtent;
pub use images::{ImageDescriptor, ImageRegistry};
pub use jsons::JsonRegistry;
pub use materials::{
    MaterialDescriptor, MaterialFamily, MaterialKind, MaterialRegistry, ResolvedMaterials,
};
pub use registry::Registry;
pub use render::{MapCanvas, RenderJob, RenderSession};
pub use script::{ObjectLiteral, ScriptWriter};
pub use session::{ExportSession, ExportSummary};
pub use settings::ExportSettings;
pub use warnings::{CollectedWarnings, LogWarnings, WarningSink};

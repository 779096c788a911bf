/// Shared configuration for asset registry serialisation

/// Fallback colour substituted for colour strings without a hex prefix
pub const ERROR_COLOR: &str = "0";

/// Prefix every accepted colour string must start with
pub const HEX_COLOR_PREFIX: &str = "0x";

/// Output namespace holding image records
pub const IMAGES_NAMESPACE: &str = "images";

/// Output namespace holding material records
pub const MATERIALS_NAMESPACE: &str = "materials";

/// Output namespace holding embedded JSON documents
pub const JSONS_NAMESPACE: &str = "jsons";

/// Section headers written ahead of each non-empty namespace
pub const IMAGES_SECTION: &str = "Base64 encoded images";
pub const MATERIALS_SECTION: &str = "Materials";
pub const JSONS_SECTION: &str = "JSON data";

/// Material family codes understood by the scene viewer
pub const FAMILY_MESH_LAMBERT: u8 = 0;
pub const FAMILY_MESH_PHONG: u8 = 1;
pub const FAMILY_LINE_BASIC: u8 = 2;

/// Upper bound for transparency percentages
pub const MAX_TRANSPARENCY: u8 = 100;

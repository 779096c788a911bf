/// Geographic bounding rectangle used to key rendered images
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Map extent in destination CRS units.
/// Equality and hashing compare the exact bit patterns so extents can key interned descriptors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MapExtent {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl MapExtent {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Horizontal span in map units
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Vertical span in map units
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    fn bits(&self) -> [u64; 4] {
        [
            self.x_min.to_bits(),
            self.y_min.to_bits(),
            self.x_max.to_bits(),
            self.y_max.to_bits(),
        ]
    }
}

impl PartialEq for MapExtent {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for MapExtent {}

impl Hash for MapExtent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

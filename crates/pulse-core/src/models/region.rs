//! Region and settlement catalog entries

use serde::{Deserialize, Serialize};

use super::geo::{BoundingBox, Coordinate};

/// Area covered by a region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum RegionShape {
    Box { bounds: BoundingBox },
    Circle { center: Coordinate, radius_km: f64 },
}

/// A named administrative area (a parish).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    #[serde(flatten)]
    pub shape: RegionShape,
}

impl Region {
    pub fn with_bounds(name: impl Into<String>, bounds: BoundingBox) -> Self {
        Self {
            name: name.into(),
            shape: RegionShape::Box { bounds },
        }
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        match &self.shape {
            RegionShape::Box { bounds } => bounds.contains(point),
            RegionShape::Circle { center, radius_km } => center.distance_km(point) <= *radius_km,
        }
    }

    pub fn center(&self) -> Coordinate {
        match &self.shape {
            RegionShape::Box { bounds } => bounds.center(),
            RegionShape::Circle { center, .. } => *center,
        }
    }

    /// Bounding box used for framing the region in the viewport.
    pub fn bounds(&self) -> BoundingBox {
        match &self.shape {
            RegionShape::Box { bounds } => *bounds,
            RegionShape::Circle { center, radius_km } => BoundingBox::around(*center, *radius_km),
        }
    }
}

/// A named place shown only once the map is zoomed in far enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settlement {
    pub name: String,
    pub coordinate: Coordinate,
    pub min_zoom: f64,
}

impl Settlement {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, min_zoom: f64) -> Self {
        Self {
            name: name.into(),
            coordinate: Coordinate::new(latitude, longitude),
            min_zoom,
        }
    }
}

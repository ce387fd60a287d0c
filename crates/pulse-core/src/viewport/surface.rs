//! Map rendering seam.

use std::collections::BTreeMap;

use crate::models::{Coordinate, Marker, Urgency};

/// Point layers drawn on the base map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Markers,
    Labels,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointKind {
    Marker {
        category: String,
        urgency: Urgency,
        is_local: bool,
    },
    RegionLabel,
    SettlementLabel,
}

/// Something drawn at a coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub id: String,
    pub coordinate: Coordinate,
    pub label: String,
    pub kind: PointKind,
    pub size_px: u32,
    pub z_index: i32,
}

impl MapPoint {
    pub fn from_marker(marker: &Marker) -> Self {
        Self {
            id: marker.id.to_string(),
            coordinate: marker.coordinate,
            label: marker.title.clone(),
            kind: PointKind::Marker {
                category: marker.category.clone(),
                urgency: marker.urgency,
                is_local: marker.is_local,
            },
            size_px: marker.urgency.marker_size_px(),
            z_index: marker.urgency.z_index(),
        }
    }
}

/// Input events raised by the map.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Click(Coordinate),
    ZoomChanged(f64),
    Moved(Coordinate),
    LabelClicked(String),
}

/// Primitives the interactive map exposes.
pub trait MapSurface {
    fn set_center(&mut self, center: Coordinate, zoom: f64);
    fn clear_layer(&mut self, layer: Layer);
    fn add_point(&mut self, layer: Layer, point: MapPoint);
    fn remove_point(&mut self, layer: Layer, id: &str);
}

/// Surface that keeps what was drawn, for previews and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordedSurface {
    view: Option<(Coordinate, f64)>,
    layers: BTreeMap<Layer, Vec<MapPoint>>,
    clears: BTreeMap<Layer, usize>,
}

impl RecordedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn view(&self) -> Option<(Coordinate, f64)> {
        self.view
    }

    pub fn points(&self, layer: Layer) -> &[MapPoint] {
        self.layers.get(&layer).map_or(&[], Vec::as_slice)
    }

    /// How many times `layer` was cleared.
    pub fn clear_count(&self, layer: Layer) -> usize {
        self.clears.get(&layer).copied().unwrap_or(0)
    }
}

impl MapSurface for RecordedSurface {
    fn set_center(&mut self, center: Coordinate, zoom: f64) {
        self.view = Some((center, zoom));
    }

    fn clear_layer(&mut self, layer: Layer) {
        self.layers.remove(&layer);
        *self.clears.entry(layer).or_default() += 1;
    }

    fn add_point(&mut self, layer: Layer, point: MapPoint) {
        self.layers.entry(layer).or_default().push(point);
    }

    fn remove_point(&mut self, layer: Layer, id: &str) {
        if let Some(points) = self.layers.get_mut(&layer) {
            points.retain(|point| point.id != id);
        }
    }
}

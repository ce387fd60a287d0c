//! Map viewport state and rendering.
//!
//! [`ViewportController`] owns center, zoom and the active region. It turns
//! navigation intents (click, locate, region label, search) into state
//! changes and keeps a [`MapSurface`] in step with the marker store: the
//! marker layer is cleared and redrawn whenever the store's revision moves,
//! and the label layer is swapped as a whole whenever the label set changes.

mod labels;
mod search;
mod surface;

use std::f64::consts::PI;
use std::future::Future;

pub use labels::{labels_for_zoom, Label, LabelTier};
pub use search::{search_places, CandidateKind, SearchCandidate};
pub use surface::{Layer, MapEvent, MapPoint, MapSurface, PointKind, RecordedSurface};

use crate::config::{PulseConfig, ViewportSettings};
use crate::error::{ConfigError, LocationError};
use crate::models::{BoundingBox, Coordinate, Settlement};
use crate::resolver::RegionResolver;
use crate::store::MarkerStore;

const TILE_SIZE_PX: f64 = 256.0;

/// Device position source.
pub trait LocationProvider {
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;
}

/// Location provider answering with a fixed result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocation(pub Result<Coordinate, LocationError>);

impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    pub center: Coordinate,
    pub zoom: f64,
    pub active_region: Option<String>,
}

/// Request to open the submission form at a coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeRequest {
    pub coordinate: Coordinate,
    pub region: String,
}

/// What a call to [`ViewportController::render`] touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderReport {
    pub markers_redrawn: bool,
    pub labels_redrawn: bool,
    pub recentered: bool,
}

/// What is currently on the surface.
#[derive(Debug, Clone, Default)]
struct Rendered {
    revision: Option<u64>,
    labels: Option<Vec<String>>,
    view: Option<(Coordinate, f64)>,
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    settings: ViewportSettings,
    resolver: RegionResolver,
    settlements: Vec<Settlement>,
    state: ViewportState,
    rendered: Rendered,
}

impl ViewportController {
    pub fn new(config: &PulseConfig) -> Result<Self, ConfigError> {
        let resolver = RegionResolver::from_config(config)?;
        let settings = config.viewport.clone();
        let state = ViewportState {
            center: settings.default_center,
            zoom: settings.default_zoom,
            active_region: None,
        };
        Ok(Self {
            settings,
            resolver,
            settlements: config.settlements.clone(),
            state,
            rendered: Rendered::default(),
        })
    }

    pub const fn state(&self) -> &ViewportState {
        &self.state
    }

    pub const fn resolver(&self) -> &RegionResolver {
        &self.resolver
    }

    /// A click on the map opens the form at that point.
    pub fn click(&self, coordinate: Coordinate) -> ComposeRequest {
        ComposeRequest {
            coordinate,
            region: self.resolver.resolve(&coordinate).name.clone(),
        }
    }

    /// Center on the device position and open the form there.
    pub async fn locate<L: LocationProvider>(
        &mut self,
        locator: &L,
    ) -> Result<ComposeRequest, LocationError> {
        let position = locator.current_position().await?;
        if !position.is_valid() {
            return Err(LocationError::Unavailable);
        }
        self.set_view(position, self.settings.locate_zoom);
        Ok(self.click(position))
    }

    /// Make `name` the active region and frame its bounds.
    pub fn select_region(&mut self, name: &str) -> bool {
        let Some(region) = self.resolver.find(name) else {
            return false;
        };
        let zoom = self
            .fit_zoom(&region.bounds())
            .max(self.settings.region_detail_zoom);
        self.state = ViewportState {
            center: region.center(),
            zoom: self.clamp_zoom(zoom),
            active_region: Some(region.name.clone()),
        };
        true
    }

    pub fn search(&self, query: &str) -> Vec<SearchCandidate> {
        search_places(query, self.resolver.regions(), &self.settlements)
    }

    pub fn select_candidate(&mut self, candidate: &SearchCandidate) {
        match candidate.kind {
            CandidateKind::Region => {
                if !self.select_region(&candidate.name) {
                    self.set_view(candidate.coordinate, self.settings.region_detail_zoom);
                }
            }
            CandidateKind::Settlement => {
                self.set_view(candidate.coordinate, self.settings.focus_zoom);
            }
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.set_view(self.state.center, zoom);
    }

    pub fn pan(&mut self, center: Coordinate) {
        self.set_view(center, self.state.zoom);
    }

    /// Move the view. The active region is dropped when the view zooms out
    /// below the region detail level or strays too far from the region.
    pub fn set_view(&mut self, center: Coordinate, zoom: f64) {
        if !center.is_valid() || !zoom.is_finite() {
            return;
        }
        self.state.center = center;
        self.state.zoom = self.clamp_zoom(zoom);

        let keep = self.state.active_region.as_deref().is_some_and(|name| {
            self.state.zoom >= self.settings.region_detail_zoom
                && self.resolver.find(name).is_some_and(|region| {
                    region.center().distance_km(&center) <= self.settings.region_pan_clear_km
                })
        });
        if !keep {
            self.state.active_region = None;
        }
    }

    /// Apply a map event. Clicks and label clicks on nothing return `None`.
    pub fn handle_event(&mut self, event: MapEvent) -> Option<ComposeRequest> {
        match event {
            MapEvent::Click(coordinate) => return Some(self.click(coordinate)),
            MapEvent::ZoomChanged(zoom) => self.set_zoom(zoom),
            MapEvent::Moved(center) => self.pan(center),
            MapEvent::LabelClicked(name) => {
                if !self.select_region(&name) {
                    let settlement = self
                        .settlements
                        .iter()
                        .find(|settlement| settlement.name.eq_ignore_ascii_case(name.trim()))
                        .map(|settlement| settlement.coordinate);
                    if let Some(coordinate) = settlement {
                        self.set_view(coordinate, self.settings.focus_zoom);
                    }
                }
            }
        }
        None
    }

    pub fn label_tier(&self) -> LabelTier {
        LabelTier::for_zoom(self.state.zoom, self.settings.settlement_zoom_threshold)
    }

    pub fn labels(&self) -> Vec<Label> {
        labels_for_zoom(
            self.state.zoom,
            self.settings.settlement_zoom_threshold,
            self.resolver.regions(),
            &self.settlements,
        )
    }

    /// Bring `surface` in line with the current state and `store`.
    pub fn render<S: MapSurface>(&mut self, surface: &mut S, store: &MarkerStore) -> RenderReport {
        let mut report = RenderReport::default();

        let view = (self.state.center, self.state.zoom);
        if self.rendered.view != Some(view) {
            surface.set_center(view.0, view.1);
            self.rendered.view = Some(view);
            report.recentered = true;
        }

        if self.rendered.revision != Some(store.revision()) {
            surface.clear_layer(Layer::Markers);
            for marker in store.visible() {
                surface.add_point(Layer::Markers, MapPoint::from_marker(marker));
            }
            self.rendered.revision = Some(store.revision());
            report.markers_redrawn = true;
        }

        let labels = self.labels();
        let names = labels.iter().map(|label| label.name.clone()).collect::<Vec<_>>();
        if self.rendered.labels.as_ref() != Some(&names) {
            surface.clear_layer(Layer::Labels);
            for label in labels {
                surface.add_point(Layer::Labels, label_point(label));
            }
            self.rendered.labels = Some(names);
            report.labels_redrawn = true;
        }

        report
    }

    /// Zoom at which `bounds` fills the configured viewport.
    pub fn fit_zoom(&self, bounds: &BoundingBox) -> f64 {
        let zoom = fit_bounds_zoom(
            bounds,
            f64::from(self.settings.viewport_width_px),
            f64::from(self.settings.viewport_height_px),
        )
        .unwrap_or(self.settings.focus_zoom);
        self.clamp_zoom(zoom)
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.settings.min_zoom, self.settings.max_zoom)
    }
}

fn label_point(label: Label) -> MapPoint {
    let kind = match label.tier {
        LabelTier::Regions => PointKind::RegionLabel,
        LabelTier::Settlements => PointKind::SettlementLabel,
    };
    MapPoint {
        id: format!("label:{}", label.name),
        coordinate: label.coordinate,
        label: label.name,
        kind,
        size_px: 0,
        z_index: 0,
    }
}

/// Largest whole Web Mercator zoom at which `bounds` fits in the pixel size.
/// `None` for degenerate boxes.
fn fit_bounds_zoom(bounds: &BoundingBox, width_px: f64, height_px: f64) -> Option<f64> {
    let lng_span = bounds.east - bounds.west;
    let lat_span = mercator_y(bounds.north) - mercator_y(bounds.south);
    if !(lng_span > 0.0 && lat_span > 0.0) {
        return None;
    }
    let lng_zoom = (width_px * 360.0 / (lng_span * TILE_SIZE_PX)).log2();
    let lat_zoom = (height_px * 2.0 * PI / (lat_span * TILE_SIZE_PX)).log2();
    Some(lng_zoom.min(lat_zoom).floor())
}

fn mercator_y(latitude: f64) -> f64 {
    let radians = latitude.to_radians();
    (PI / 4.0 + radians / 2.0).tan().ln()
}

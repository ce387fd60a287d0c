//! Data models for Pulse

mod geo;
mod marker;
mod region;

pub use geo::{BoundingBox, Coordinate};
pub use marker::{
    derive_title, Identity, Marker, MarkerDraft, MarkerId, NewMarker, Urgency, LOCAL_ID_PREFIX,
    TITLE_MAX_CHARS,
};
pub use region::{Region, RegionShape, Settlement};

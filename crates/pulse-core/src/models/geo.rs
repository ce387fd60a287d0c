//! Coordinates and simple planar shapes

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_PER_DEGREE_LAT: f64 = 111.32;

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite and inside the latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance in kilometres (haversine).
    pub fn distance_km(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// An axis-aligned latitude/longitude box. Edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub const fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        (self.south..=self.north).contains(&point.latitude)
            && (self.west..=self.east).contains(&point.longitude)
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// True when the boxes share interior area (touching edges do not count).
    pub fn overlaps(&self, other: &Self) -> bool {
        self.south < other.north
            && other.south < self.north
            && self.west < other.east
            && other.west < self.east
    }

    pub fn is_well_formed(&self) -> bool {
        [self.south, self.west, self.north, self.east]
            .iter()
            .all(|value| value.is_finite())
            && self.south <= self.north
            && self.west <= self.east
    }

    /// Box enclosing a circle of `radius_km` around `center`.
    pub fn around(center: Coordinate, radius_km: f64) -> Self {
        let d_lat = radius_km / KM_PER_DEGREE_LAT;
        let cos_lat = center.latitude.to_radians().cos().abs().max(1e-6);
        let d_lng = radius_km / (KM_PER_DEGREE_LAT * cos_lat);
        Self::new(
            center.latitude - d_lat,
            center.longitude - d_lng,
            center.latitude + d_lat,
            center.longitude + d_lng,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_validity() {
        assert!(Coordinate::new(18.0, -76.8).is_valid());
        assert!(!Coordinate::new(f64::NAN, -76.8).is_valid());
        assert!(!Coordinate::new(18.0, f64::INFINITY).is_valid());
        assert!(!Coordinate::new(95.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -190.0).is_valid());
    }

    #[test]
    fn distance_between_kingston_and_montego_bay() {
        let kingston = Coordinate::new(17.9970, -76.7936);
        let montego_bay = Coordinate::new(18.4762, -77.8939);
        let distance = kingston.distance_km(&montego_bay);
        assert!((125.0..135.0).contains(&distance), "got {distance}");
    }

    #[test]
    fn box_edges_are_inclusive() {
        let bounds = BoundingBox::new(18.0, -76.9, 18.1, -76.7);
        assert!(bounds.contains(&Coordinate::new(18.0, -76.9)));
        assert!(bounds.contains(&Coordinate::new(18.1, -76.7)));
        assert!(!bounds.contains(&Coordinate::new(18.11, -76.8)));
    }

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = BoundingBox::new(18.0, -77.0, 18.1, -76.9);
        let b = BoundingBox::new(18.1, -77.0, 18.2, -76.9);
        let c = BoundingBox::new(18.05, -76.95, 18.15, -76.85);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn circle_box_contains_its_center() {
        let center = Coordinate::new(18.2, -77.5);
        let bounds = BoundingBox::around(center, 10.0);
        assert!(bounds.contains(&center));
        assert!(bounds.is_well_formed());
    }
}

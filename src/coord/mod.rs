use geo_types::{Coord, Point};

/// Trait for types that can provide a WGS84 latitude/longitude pair in degrees.
///
/// Implemented for `(f64, f64)` tuples, `geo_types::Point<f64>`, `geo_types::Coord<f64>`
/// and [`LatLon`]. Tuples and geo-types values follow the x/y convention, so the first
/// element (x) is the longitude and the second (y) is the latitude.
pub trait Coordinate {
    /// Returns the latitude (y) in degrees.
    fn lat(&self) -> f64;
    /// Returns the longitude (x) in degrees.
    fn lon(&self) -> f64;
}

impl Coordinate for (f64, f64) {
    fn lat(&self) -> f64 {
        self.1
    }
    fn lon(&self) -> f64 {
        self.0
    }
}

impl Coordinate for Point<f64> {
    fn lat(&self) -> f64 {
        self.y()
    }
    fn lon(&self) -> f64 {
        self.x()
    }
}

impl Coordinate for Coord<f64> {
    fn lat(&self) -> f64 {
        self.y
    }
    fn lon(&self) -> f64 {
        self.x
    }
}

/// A mutable latitude/longitude record owned by the caller.
///
/// Used as the output of [`crate::SpatialKeyConfig::decode_into`] so that hot loops can
/// reuse one record instead of building a new value per key.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl Coordinate for LatLon {
    fn lat(&self) -> f64 {
        self.lat
    }
    fn lon(&self) -> f64 {
        self.lon
    }
}

impl From<LatLon> for Point<f64> {
    fn from(value: LatLon) -> Self {
        Point::new(value.lon, value.lat)
    }
}

/// Returns true if the pair lies within `[-90, 90]` x `[-180, 180]`.
///
/// Encoding never checks this itself; callers feeding untrusted data should filter with it first.
pub fn is_in_bounds(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

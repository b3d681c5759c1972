use crate::coord::LatLon;
use crate::index::config::SpatialKeyConfig;

/// Decodes a key into the fixed-point center of its grid cell, as `(lat, lon)`.
///
/// Starts from the lower corner of the bounding box with a step of `max` (half the extent).
/// Every round reads the latitude bit then the longitude bit, adds the step to each
/// accumulator whose bit is set, then halves both steps. Once all rounds are consumed the
/// remaining step is half a cell, and adding it to both accumulators moves the result from the
/// cell's lower corner to its center.
///
/// Every intermediate value stays within `[min, max]`, so `i32` does not overflow.
pub fn decode_fixed(config: &SpatialKeyConfig, key: u64) -> (i32, i32) {
    let bounds = config.bounds();
    let mut lat_step = bounds.max_lat;
    let mut lon_step = bounds.max_lon;
    let mut lat = bounds.min_lat;
    let mut lon = bounds.min_lon;

    let mut mask = config.initial_bit_mask();
    for _ in 0..config.iterations() {
        if key & mask != 0 {
            lat += lat_step;
        }
        mask >>= 1;
        if key & mask != 0 {
            lon += lon_step;
        }
        mask >>= 1;

        lat_step >>= 1;
        lon_step >>= 1;
    }

    (lat + lat_step, lon + lon_step)
}

/// Decodes a key into the center of its grid cell in degrees, as `(lat, lon)`.
pub fn decode_key(config: &SpatialKeyConfig, key: u64) -> (f64, f64) {
    let (lat, lon) = decode_fixed(config, key);
    (config.to_degrees(lat), config.to_degrees(lon))
}

/// Decodes a key into a caller-owned [`LatLon`].
pub fn decode_key_into(config: &SpatialKeyConfig, key: u64, out: &mut LatLon) {
    let (lat, lon) = decode_fixed(config, key);
    out.lat = config.to_degrees(lat);
    out.lon = config.to_degrees(lon);
}

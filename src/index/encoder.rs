use crate::coord::Coordinate;
use crate::index::config::SpatialKeyConfig;
use rayon::prelude::*;

/// Midpoint of `[min, max]`, rounded toward negative infinity.
#[inline]
pub(crate) fn midpoint(min: i64, max: i64) -> i64 {
    (min + max).div_euclid(2)
}

/// Encodes fixed-point latitude and longitude into a spatial key.
///
/// Each of the `config.iterations()` rounds halves the live latitude and longitude ranges and
/// appends one latitude bit and one longitude bit, so the key reads
/// `lat0 lon0 lat1 lon1 ... lat(n-1) lon(n-1)` from its most significant used bit down to bit 0.
/// A bit is set when the coordinate is at or above the midpoint of its range.
///
/// Because the first rounds never depend on the total number of rounds, shifting a key right
/// by `2 * k` gives the key a configuration with `k` fewer iterations would produce.
///
/// Range arithmetic is done in `i64`; `min + max` exceeds `i32` in the upper longitude quadrant.
pub fn encode_fixed(config: &SpatialKeyConfig, lat: i32, lon: i32) -> u64 {
    let bounds = config.bounds();
    let lat = i64::from(lat);
    let lon = i64::from(lon);
    let mut min_lat = i64::from(bounds.min_lat);
    let mut max_lat = i64::from(bounds.max_lat);
    let mut min_lon = i64::from(bounds.min_lon);
    let mut max_lon = i64::from(bounds.max_lon);

    let mut key = 0u64;
    for _ in 0..config.iterations() {
        let mid_lat = midpoint(min_lat, max_lat);
        let mid_lon = midpoint(min_lon, max_lon);

        key <<= 1;
        if lat >= mid_lat {
            key |= 1;
            min_lat = mid_lat;
        } else {
            max_lat = mid_lat;
        }

        key <<= 1;
        if lon >= mid_lon {
            key |= 1;
            min_lon = mid_lon;
        } else {
            max_lon = mid_lon;
        }
    }
    key
}

/// Encodes many coordinates in parallel.
///
/// Keys are returned in input order.
pub fn encode_batch<C>(config: &SpatialKeyConfig, coords: &[C]) -> Vec<u64>
where
    C: Coordinate + Sync,
{
    coords.par_iter().map(|c| config.encode_coord(c)).collect()
}

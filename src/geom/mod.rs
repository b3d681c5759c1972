mod parse;

pub use parse::{parse_geojson, parse_geometry, parse_wkt};

use geo_types::{Point, Polygon, Rect, coord};

/// Builds the lon/lat rectangle of a grid cell from its center and `(lat, lon)` size in degrees.
pub fn create_cell_rect(center: &Point<f64>, cell_size: (f64, f64)) -> Rect<f64> {
    let (lat_size, lon_size) = cell_size;
    let half_lat = lat_size / 2.0;
    let half_lon = lon_size / 2.0;

    Rect::new(
        coord! { x: center.x() - half_lon, y: center.y() - half_lat },
        coord! { x: center.x() + half_lon, y: center.y() + half_lat },
    )
}

pub fn create_cell_polygon(center: &Point<f64>, cell_size: (f64, f64)) -> Polygon<f64> {
    create_cell_rect(center, cell_size).to_polygon()
}

use crate::error::SpatialKeyError;
use geo_types::Geometry;
use geojson::GeoJson;
use std::str::FromStr;
use wkt::Wkt;

fn parse_error(e: impl ToString) -> SpatialKeyError {
    SpatialKeyError::GeometryParseError(e.to_string())
}

/// Parses a lon/lat geometry string, auto-detecting WKT or GeoJSON.
///
/// A leading `{` means GeoJSON, anything else is tried as WKT.
pub fn parse_geometry(s: &str) -> Result<Geometry<f64>, SpatialKeyError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(parse_error("Empty geometry"));
    }
    if trimmed.starts_with('{') {
        parse_geojson(trimmed)
    } else {
        parse_wkt(trimmed)
    }
}

/// Parses a GeoJSON geometry or feature. Feature collections are rejected.
pub fn parse_geojson(s: &str) -> Result<Geometry<f64>, SpatialKeyError> {
    let geojson: GeoJson = s.parse().map_err(|e: geojson::Error| parse_error(e))?;

    let geometry = match geojson {
        GeoJson::Geometry(geom) => geom,
        GeoJson::Feature(feat) => feat
            .geometry
            .ok_or_else(|| parse_error("Feature has no geometry"))?,
        GeoJson::FeatureCollection(_) => {
            return Err(parse_error(
                "FeatureCollection not supported, use individual geometries",
            ));
        }
    };
    Geometry::try_from(geometry).map_err(parse_error)
}

pub fn parse_wkt(s: &str) -> Result<Geometry<f64>, SpatialKeyError> {
    let wkt: Wkt<f64> = Wkt::from_str(s).map_err(parse_error)?;
    wkt.try_into()
        .map_err(|_| parse_error("Failed to convert WKT to geometry"))
}

//! # spatial-key-rs
//!
//! Interleaved bit keys for latitude/longitude pairs. Coordinates are converted to fixed-point
//! integers, the latitude and longitude ranges are halved alternately and each decision becomes
//! one bit of a `u64` key. Nearby points share key prefixes, and a key shifted right by two bits
//! is the key of the enclosing cell one level up.
//!
//! There are currently three main entry points.
//!
//! ### 1. `SpatialKeyConfig` - Encoding and Decoding
//!
//! ```
//! use spatial_key_rs::SpatialKeyConfig;
//!
//! # fn main() -> Result<(), spatial_key_rs::SpatialKeyError> {
//! let config = SpatialKeyConfig::from_precision(5)?;
//! let key = config.encode(52.5, 13.4);
//! let (lat, lon) = config.decode(key);
//! assert!((lat - 52.5).abs() < 0.0001);
//! assert!((lon - 13.4).abs() < 0.0001);
//! # Ok(())
//! # }
//! ```
//!
//! ### 2. `SpatialCell` - Single Cell Operations
//!
//! ```
//! use spatial_key_rs::{SpatialCell, SpatialKeyConfig};
//!
//! # fn main() -> Result<(), spatial_key_rs::SpatialKeyError> {
//! let config = SpatialKeyConfig::from_bits(40)?;
//! let cell = SpatialCell::from_wgs84(&(13.4, 52.5), &config);
//! println!("{}", cell.id);
//! let polygon = cell.to_polygon();
//!
//! let same = SpatialCell::from_cell_id(&cell.id)?;
//! assert_eq!(same.key, cell.key);
//! # Ok(())
//! # }
//! ```
//!
//! ### 3. `CsvToKeys` - CSV File Conversion
//!
//! Convert CSV files with geometry columns (WKT or GeoJSON) to key-indexed CSVs:
//!
//! ```no_run
//! use spatial_key_rs::{CsvKeyConfig, CsvToKeys, GeometryFormat, SpatialKeyConfig};
//!
//! # fn main() -> Result<(), spatial_key_rs::SpatialKeyError> {
//! let config = CsvKeyConfig::new("geometry", SpatialKeyConfig::from_bits(48)?)
//!     .exclude(vec!["Geo Point".into()])
//!     .with_cell_geometry(GeometryFormat::Wkt);
//!
//! "input.csv".to_key_csv("output.csv", &config)?;
//! # Ok(())
//! # }
//! ```
//!
//! Or use separate longitude and latitude columns:
//!
//! ```no_run
//! use spatial_key_rs::{CsvKeyConfig, SpatialKeyConfig, csv_to_key_csv};
//!
//! # fn main() -> Result<(), spatial_key_rs::SpatialKeyError> {
//! let config = CsvKeyConfig::from_coords("Longitude", "Latitude", SpatialKeyConfig::default());
//! let summary = csv_to_key_csv("bus_stops.csv", "output.csv", &config)?;
//! println!("{} rows, {} skipped", summary.rows, summary.skipped);
//! # Ok(())
//! # }
//! ```
//!

pub mod cell;
pub mod coord;
pub mod error;
pub mod geom;
pub mod index;
pub mod io;

pub use cell::{MAX_LINE_SAMPLES, SpatialCell};
pub use coord::{Coordinate, LatLon, is_in_bounds};
pub use error::SpatialKeyError;
pub use geom::{create_cell_polygon, create_cell_rect, parse_geometry};
pub use index::{
    DEFAULT_SCALE_FACTOR, FixedBounds, IDENTIFIER_VERSION, MAX_BITS, SpatialKeyConfig,
    SpatialKeyConfigBuilder, decode_cell_identifier, decode_fixed, decode_key, decode_key_into,
    encode_batch, encode_fixed, generate_cell_identifier, to_degrees, to_fixed,
};
pub use io::{
    CoordinateSource, CsvConversionSummary, CsvKeyConfig, CsvToKeys, GeometryFormat,
    SpatialCellsToArrow, SpatialCellsToGeoParquet, config_from_metadata, csv_to_key_csv,
    key_metadata, read_geoparquet_keys, write_geoparquet,
};

pub use geo_types;
pub use geoarrow_array;
pub use geoarrow_schema;
pub use geoparquet;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use geo_types::point;

    #[test]
    fn test_coarse_grid_origin() -> Result<(), SpatialKeyError> {
        let config = SpatialKeyConfig::from_bits(8)?;
        assert_eq!(config.iterations(), 4);

        let key = config.encode(0.0, 0.0);
        let (lat, lon) = config.decode(key);
        assert!(lat.abs() <= 90.0 / 16.0);
        assert!(lon.abs() <= 180.0 / 16.0);
        Ok(())
    }

    #[test]
    fn test_precision_workflow() -> Result<(), SpatialKeyError> {
        let config = SpatialKeyConfig::from_precision(3)?;
        let key = config.encode(52.5, 13.4);
        let (lat, lon) = config.decode(key);
        assert_abs_diff_eq!(lat, 52.5, epsilon = 0.0005);
        assert_abs_diff_eq!(lon, 13.4, epsilon = 0.0005);
        Ok(())
    }

    #[test]
    fn test_invalid_bit_depths() {
        assert!(matches!(
            SpatialKeyConfig::from_bits(65),
            Err(SpatialKeyError::BitDepthTooLarge(65))
        ));
        assert!(matches!(
            SpatialKeyConfig::from_bits(7),
            Err(SpatialKeyError::OddBitDepth(7))
        ));
        for bits in [0, 7, 65] {
            let err = SpatialKeyConfig::from_bits(bits).err();
            assert!(err.is_some_and(|e| e.is_configuration_error()));
        }
    }

    #[test]
    fn test_extreme_corners_stay_in_range() -> Result<(), SpatialKeyError> {
        let config = SpatialKeyConfig::default();
        let (lat_cell, lon_cell) = config.cell_size();

        let (lat, lon) = config.decode(config.encode(90.0, 180.0));
        assert!(90.0 - lat <= lat_cell + 1e-5);
        assert!(180.0 - lon <= lon_cell + 1e-5);

        let (lat, lon) = config.decode(config.encode(-90.0, -180.0));
        assert!(lat + 90.0 <= lat_cell + 1e-5);
        assert!(lon + 180.0 <= lon_cell + 1e-5);
        Ok(())
    }

    #[test]
    fn test_exact_precision_close_to_request() -> Result<(), SpatialKeyError> {
        let config = SpatialKeyConfig::from_precision(5)?;
        assert!(config.exact_precision().abs_diff(5) <= 1);
        Ok(())
    }

    #[test]
    fn test_cell_hierarchy() -> Result<(), SpatialKeyError> {
        let config = SpatialKeyConfig::from_bits(30)?;
        let cell = SpatialCell::from_wgs84(&point! { x: -0.1276, y: 51.5072 }, &config);

        let parent = cell.parent()?;
        assert_eq!(parent.bits(), 28);
        assert_eq!(parent.key, cell.key >> 2);
        assert!(parent.bounds().width() > cell.bounds().width());

        let (decoded_key, decoded_config) = decode_cell_identifier(&parent.id)?;
        assert_eq!(decoded_key, parent.key);
        assert_eq!(decoded_config.total_bits(), 28);
        Ok(())
    }

    #[test]
    fn test_batch_matches_single() -> Result<(), SpatialKeyError> {
        let config = SpatialKeyConfig::from_bits(52)?;
        let coords = vec![
            LatLon::new(40.7128, -74.0060),
            LatLon::new(-22.9068, -43.1729),
            LatLon::new(35.6762, 139.6503),
        ];

        let keys = encode_batch(&config, &coords);
        for (key, c) in keys.iter().zip(&coords) {
            assert_eq!(*key, config.encode(c.lat, c.lon));
        }
        Ok(())
    }
}

use crate::cell::SpatialCell;
use crate::coord::is_in_bounds;
use crate::error::SpatialKeyError;
use crate::geom::parse_geometry;
use crate::index::SpatialKeyConfig;
use geo::BoundingRect;
use geo_types::Geometry;
use log::{info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

/// Rows between progress log lines.
const PROGRESS_INTERVAL: u64 = 1_000_000;

enum SourceIndices {
    Geometry(usize),
    Coordinates { lon_idx: usize, lat_idx: usize },
}

/// Output format for cell polygon geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryFormat {
    /// Well-Known Text format (e.g., "POLYGON((...))")
    Wkt,
    /// GeoJSON format
    GeoJson,
}

/// Specifies how to extract location data from CSV rows.
#[derive(Debug, Clone)]
pub enum CoordinateSource {
    /// A single column containing WKT or GeoJSON geometry in lon/lat
    GeometryColumn(String),
    /// Separate longitude and latitude columns in degrees
    CoordinateColumns {
        lon_column: String,
        lat_column: String,
    },
}

/// Configuration for CSV to spatial key conversion.
#[derive(Debug, Clone)]
pub struct CsvKeyConfig {
    pub source: CoordinateSource,
    pub exclude_columns: Vec<String>,
    pub key_config: SpatialKeyConfig,
    pub include_cell_geometry: Option<GeometryFormat>,
}

impl CsvKeyConfig {
    /// Create config for a CSV with a geometry column (WKT or GeoJSON).
    ///
    /// # Example
    /// ```
    /// use spatial_key_rs::{CsvKeyConfig, SpatialKeyConfig};
    ///
    /// # fn main() -> Result<(), spatial_key_rs::SpatialKeyError> {
    /// let config = CsvKeyConfig::new("geometry", SpatialKeyConfig::from_precision(5)?);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(geometry_column: impl Into<String>, key_config: SpatialKeyConfig) -> Self {
        Self {
            source: CoordinateSource::GeometryColumn(geometry_column.into()),
            exclude_columns: Vec::new(),
            key_config,
            include_cell_geometry: None,
        }
    }

    /// Create config for a CSV with separate longitude/latitude columns.
    pub fn from_coords(
        lon_column: impl Into<String>,
        lat_column: impl Into<String>,
        key_config: SpatialKeyConfig,
    ) -> Self {
        Self {
            source: CoordinateSource::CoordinateColumns {
                lon_column: lon_column.into(),
                lat_column: lat_column.into(),
            },
            exclude_columns: Vec::new(),
            key_config,
            include_cell_geometry: None,
        }
    }

    pub fn exclude(mut self, columns: Vec<String>) -> Self {
        self.exclude_columns = columns;
        self
    }

    /// Include the cell rectangle in the output.
    pub fn with_cell_geometry(mut self, format: GeometryFormat) -> Self {
        self.include_cell_geometry = Some(format);
        self
    }
}

/// Counters reported by [`csv_to_key_csv`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvConversionSummary {
    /// Data rows read from the input
    pub rows: u64,
    /// Rows written to the output, one per cell
    pub cells: u64,
    /// Input rows dropped because their coordinates were outside the WGS84 range, or their
    /// line geometry was too long to sample at the configured bit depth
    pub skipped: u64,
}

pub trait CsvToKeys {
    fn to_key_csv(
        &self,
        output_path: impl AsRef<Path>,
        config: &CsvKeyConfig,
    ) -> Result<CsvConversionSummary, SpatialKeyError>;
}

impl<P: AsRef<Path>> CsvToKeys for P {
    fn to_key_csv(
        &self,
        output_path: impl AsRef<Path>,
        config: &CsvKeyConfig,
    ) -> Result<CsvConversionSummary, SpatialKeyError> {
        csv_to_key_csv(self, output_path, config)
    }
}

fn csv_error(e: impl ToString) -> SpatialKeyError {
    SpatialKeyError::CsvError(e.to_string())
}

fn geometry_in_bounds(geom: &Geometry<f64>) -> bool {
    match geom.bounding_rect() {
        Some(rect) => {
            is_in_bounds(rect.min().y, rect.min().x) && is_in_bounds(rect.max().y, rect.max().x)
        }
        None => true,
    }
}

fn polygon_to_string(cell: &SpatialCell, format: GeometryFormat) -> String {
    let polygon = cell.to_polygon();
    match format {
        GeometryFormat::Wkt => {
            use wkt::ToWkt;
            polygon.wkt_string()
        }
        GeometryFormat::GeoJson => geojson::Geometry::from(&polygon).to_string(),
    }
}

fn parse_degrees(value: Option<&str>, name: &str) -> Result<f64, SpatialKeyError> {
    let value = value
        .ok_or_else(|| csv_error(format!("Missing {} column", name)))?
        .trim();
    value
        .parse()
        .map_err(|_| csv_error(format!("Invalid {}: '{}'", name, value)))
}

/// Converts a CSV file with geometry or lon/lat columns to a CSV file with spatial keys.
///
/// The output starts with `spatial_key` and `cell_id`, optionally `cell_geometry`, followed by
/// every input column that is neither a source column nor excluded. A row can expand into
/// several output rows when its geometry covers several cells. Rows outside the WGS84 range, and
/// lines needing more than [`crate::MAX_LINE_SAMPLES`] samples, are skipped and counted.
///
/// Streams output to minimize memory usage for large files.
///
/// # Example
///
/// ```no_run
/// use spatial_key_rs::{csv_to_key_csv, CsvKeyConfig, GeometryFormat, SpatialKeyConfig};
///
/// # fn main() -> Result<(), spatial_key_rs::SpatialKeyError> {
/// let config = CsvKeyConfig::from_coords("Longitude", "Latitude", SpatialKeyConfig::from_bits(48)?)
///     .with_cell_geometry(GeometryFormat::Wkt);
///
/// let summary = csv_to_key_csv("stops.csv", "stops_keyed.csv", &config)?;
/// println!("{} rows, {} skipped", summary.rows, summary.skipped);
/// # Ok(())
/// # }
/// ```
pub fn csv_to_key_csv(
    csv_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &CsvKeyConfig,
) -> Result<CsvConversionSummary, SpatialKeyError> {
    let file = File::open(csv_path.as_ref()).map_err(csv_error)?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| csv_error(format!("Column '{}' not found", name)))
    };

    let (source_indices, mut exclude_indices) = match &config.source {
        CoordinateSource::GeometryColumn(col) => {
            let idx = position(col.as_str())?;
            (SourceIndices::Geometry(idx), HashSet::from([idx]))
        }
        CoordinateSource::CoordinateColumns {
            lon_column,
            lat_column,
        } => {
            let lon_idx = position(lon_column.as_str())?;
            let lat_idx = position(lat_column.as_str())?;
            (
                SourceIndices::Coordinates { lon_idx, lat_idx },
                HashSet::from([lon_idx, lat_idx]),
            )
        }
    };

    for col_name in &config.exclude_columns {
        if let Some(idx) = headers.iter().position(|h| h == col_name) {
            exclude_indices.insert(idx);
        }
    }

    let out_file =
        File::create(output_path).map_err(|e| SpatialKeyError::IoError(e.to_string()))?;
    let mut writer = csv::Writer::from_writer(out_file);

    let mut header_row: Vec<&str> = vec!["spatial_key", "cell_id"];
    if config.include_cell_geometry.is_some() {
        header_row.push("cell_geometry");
    }
    for (i, h) in headers.iter().enumerate() {
        if !exclude_indices.contains(&i) {
            header_row.push(h);
        }
    }
    writer.write_record(&header_row).map_err(csv_error)?;

    let key_config = &config.key_config;
    let mut summary = CsvConversionSummary::default();

    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        summary.rows += 1;
        if summary.rows % PROGRESS_INTERVAL == 0 {
            info!(
                "{} rows, {} cells ({} skipped)",
                summary.rows, summary.cells, summary.skipped
            );
        }

        let cells = match &source_indices {
            SourceIndices::Geometry(idx) => {
                let geom = parse_geometry(record.get(*idx).unwrap_or_default())?;
                if !geometry_in_bounds(&geom) {
                    warn!("row {}: geometry outside WGS84 range, skipped", summary.rows);
                    summary.skipped += 1;
                    continue;
                }
                match SpatialCell::from_geometry(geom, key_config) {
                    Ok(cells) => cells,
                    Err(
                        e @ (SpatialKeyError::TooManySamples(_)
                        | SpatialKeyError::NonFiniteCoordinate),
                    ) => {
                        warn!("row {}: {}, skipped", summary.rows, e);
                        summary.skipped += 1;
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }
            SourceIndices::Coordinates { lon_idx, lat_idx } => {
                let lon = parse_degrees(record.get(*lon_idx), "longitude")?;
                let lat = parse_degrees(record.get(*lat_idx), "latitude")?;
                if !is_in_bounds(lat, lon) {
                    warn!(
                        "row {}: ({}, {}) outside WGS84 range, skipped",
                        summary.rows, lat, lon
                    );
                    summary.skipped += 1;
                    continue;
                }
                vec![SpatialCell::from_wgs84(&(lon, lat), key_config)]
            }
        };

        for cell in cells {
            let mut row: Vec<String> = vec![cell.key.to_string(), cell.id.clone()];

            if let Some(format) = config.include_cell_geometry {
                row.push(polygon_to_string(&cell, format));
            }

            for (i, field) in record.iter().enumerate() {
                if !exclude_indices.contains(&i) {
                    row.push(field.to_string());
                }
            }
            writer.write_record(&row).map_err(csv_error)?;
            summary.cells += 1;
        }
    }

    writer.flush().map_err(csv_error)?;

    info!(
        "encoded {} rows into {} cells, skipped {}",
        summary.rows, summary.cells, summary.skipped
    );
    Ok(summary)
}

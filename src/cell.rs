use crate::coord::Coordinate;
use crate::error::SpatialKeyError;
use crate::geom::{create_cell_polygon, create_cell_rect};
use crate::index::{SpatialKeyConfig, decode_cell_identifier, generate_cell_identifier};
use crate::io::arrow::SpatialCellsToArrow;
use crate::io::parquet::SpatialCellsToGeoParquet;
use arrow_array::RecordBatch;
use geo::Centroid;
use geo_types::{Geometry, LineString, Point, Polygon, Rect};
use geoarrow_array::array::{PointArray, PolygonArray};
use log::debug;
use std::collections::HashSet;
use std::path::Path;

/// Upper bound on the number of points sampled along one line.
pub const MAX_LINE_SAMPLES: usize = 1 << 22;

/// One grid cell of the spatial key index.
///
/// A `SpatialCell` bundles a key with the configuration needed to make sense of it: its center
/// (the decoded coordinate), its size and a self-describing identifier.
///
/// # Example
///
/// ```
/// use spatial_key_rs::{SpatialCell, SpatialKeyConfig};
///
/// # fn main() -> Result<(), spatial_key_rs::SpatialKeyError> {
/// let config = SpatialKeyConfig::from_bits(32)?;
///
/// // (lon, lat)
/// let cell = SpatialCell::from_wgs84(&(13.4, 52.5), &config);
/// println!("Cell {} key {:#x}", cell.id, cell.key);
/// println!("Center: ({}, {})", cell.lat(), cell.lon());
///
/// let polygon = cell.to_polygon();
/// let parent = cell.parent()?;
/// assert_eq!(parent.key, cell.key >> 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialCell {
    /// Identifier carrying the key, bit depth and scale factor (Base64 URL-safe)
    pub id: String,
    /// The spatial key
    pub key: u64,
    /// Center of the cell, x is longitude and y is latitude
    pub center: Point<f64>,
    /// Configuration the key was produced with
    pub config: SpatialKeyConfig,
}

impl SpatialCell {
    /// Builds the cell for a key produced with `config`.
    pub fn from_key(key: u64, config: &SpatialKeyConfig) -> Self {
        let (lat, lon) = config.decode(key);
        Self {
            id: generate_cell_identifier(key, config),
            key,
            center: Point::new(lon, lat),
            config: *config,
        }
    }

    /// Create a SpatialCell from an identifier made by [`generate_cell_identifier`].
    pub fn from_cell_id(id: &str) -> Result<Self, SpatialKeyError> {
        let (key, config) = decode_cell_identifier(id)?;
        Ok(Self::from_key(key, &config))
    }

    /// Create the SpatialCell containing a WGS84 coordinate.
    ///
    /// Out of range coordinates are not rejected, see [`crate::is_in_bounds`].
    pub fn from_wgs84(coord: &impl Coordinate, config: &SpatialKeyConfig) -> Self {
        Self::from_key(config.encode_coord(coord), config)
    }

    /// Create SpatialCells along a lon/lat LineString.
    ///
    /// Samples each segment at half the smaller cell dimension, but never finer than one
    /// fixed-point unit (`1 / scale_factor` degrees), and returns the unique cells visited in the
    /// order they are first reached.
    ///
    /// # Errors
    ///
    /// - [`SpatialKeyError::NonFiniteCoordinate`] - a vertex is NaN or infinite
    /// - [`SpatialKeyError::TooManySamples`] - the line needs more than [`MAX_LINE_SAMPLES`]
    ///   samples at this configuration
    pub fn from_line_string(
        line: &LineString,
        config: &SpatialKeyConfig,
    ) -> Result<Vec<Self>, SpatialKeyError> {
        if line.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(SpatialKeyError::NonFiniteCoordinate);
        }

        let (lat_size, lon_size) = config.cell_size();
        let fixed_unit = 1.0 / f64::from(config.scale_factor());
        let step_size = (lat_size.min(lon_size) * 0.5).max(fixed_unit);

        let mut segment_steps = Vec::with_capacity(line.0.len().saturating_sub(1));
        let mut total_samples = 0usize;
        for window in line.0.windows(2) {
            let dx = window[1].x - window[0].x;
            let dy = window[1].y - window[0].y;
            let steps = ((dx * dx + dy * dy).sqrt() / step_size).ceil();
            if steps >= MAX_LINE_SAMPLES as f64 {
                return Err(SpatialKeyError::TooManySamples(MAX_LINE_SAMPLES));
            }
            let steps = steps as usize;
            total_samples += steps + 1;
            if total_samples > MAX_LINE_SAMPLES {
                return Err(SpatialKeyError::TooManySamples(MAX_LINE_SAMPLES));
            }
            segment_steps.push(steps);
        }

        let mut seen: HashSet<u64> = HashSet::new();
        let mut cells: Vec<SpatialCell> = Vec::new();

        for (window, steps) in line.0.windows(2).zip(segment_steps) {
            let start = &window[0];
            let end = &window[1];
            let dx = end.x - start.x;
            let dy = end.y - start.y;

            for i in 0..=steps {
                let t = if steps == 0 {
                    0.0
                } else {
                    i as f64 / steps as f64
                };
                let key = config.encode(start.y + t * dy, start.x + t * dx);

                if seen.insert(key) {
                    cells.push(Self::from_key(key, config));
                }
            }
        }

        if let [single] = line.0.as_slice() {
            cells.push(Self::from_wgs84(single, config));
        }

        debug!(
            "sampled {} vertices into {} cells at {} bits",
            line.0.len(),
            cells.len(),
            config.total_bits()
        );
        Ok(cells)
    }

    /// Create SpatialCells from a lon/lat `geo_types::Geometry`.
    ///
    /// Points and polygon centroids produce a single cell; lines and
    /// collections may produce many.
    pub fn from_geometry(
        geom: Geometry<f64>,
        config: &SpatialKeyConfig,
    ) -> Result<Vec<Self>, SpatialKeyError> {
        match geom {
            Geometry::Point(pt) => Ok(vec![Self::from_wgs84(&pt, config)]),
            Geometry::MultiPoint(mp) => Ok(mp
                .0
                .iter()
                .map(|pt| Self::from_wgs84(pt, config))
                .collect()),
            Geometry::LineString(line) => Self::from_line_string(&line, config),
            Geometry::MultiLineString(mls) => {
                let mut all_cells = Vec::new();
                for line in &mls.0 {
                    all_cells.extend(Self::from_line_string(line, config)?);
                }
                Ok(all_cells)
            }
            Geometry::Polygon(poly) => Ok(poly
                .centroid()
                .map(|centroid| Self::from_wgs84(&centroid, config))
                .into_iter()
                .collect()),
            Geometry::MultiPolygon(mp) => Ok(mp
                .0
                .iter()
                .filter_map(|poly| poly.centroid())
                .map(|centroid| Self::from_wgs84(&centroid, config))
                .collect()),
            Geometry::GeometryCollection(gc) => {
                let mut all_cells = Vec::new();
                for g in gc.0 {
                    all_cells.extend(Self::from_geometry(g, config)?);
                }
                Ok(all_cells)
            }
            _ => Err(SpatialKeyError::GeometryParseError(
                "Unsupported geometry type".to_string(),
            )),
        }
    }

    /// Returns the latitude of the cell center in degrees.
    pub fn lat(&self) -> f64 {
        self.center.y()
    }

    /// Returns the longitude of the cell center in degrees.
    pub fn lon(&self) -> f64 {
        self.center.x()
    }

    pub fn bits(&self) -> u8 {
        self.config.total_bits()
    }

    /// Returns the enclosing cell one level up, i.e. with one bit-pair fewer.
    ///
    /// # Errors
    ///
    /// [`SpatialKeyError::InvalidBitDepth`] if this cell only has a single bit-pair.
    pub fn parent(&self) -> Result<Self, SpatialKeyError> {
        let config = SpatialKeyConfig::with_scale_factor(
            self.config.total_bits() - 2,
            self.config.scale_factor(),
        )?;
        Ok(Self::from_key(self.key >> 2, &config))
    }

    /// Returns the lon/lat rectangle covered by this cell.
    pub fn bounds(&self) -> Rect<f64> {
        create_cell_rect(&self.center, self.config.cell_size())
    }

    /// Converts this cell to a rectangular polygon.
    ///
    /// Returns a `geo_types::Polygon` representing the cell boundary,
    /// suitable for spatial operations or GeoJSON export.
    pub fn to_polygon(&self) -> Polygon<f64> {
        create_cell_polygon(&self.center, self.config.cell_size())
    }

    /// Converts this cell's center to an Arrow PointArray.
    pub fn to_arrow_points(&self) -> PointArray {
        std::slice::from_ref(self).to_arrow_points()
    }

    /// Converts this cell to an Arrow PolygonArray.
    pub fn to_arrow_polygons(&self) -> PolygonArray {
        std::slice::from_ref(self).to_arrow_polygons()
    }

    /// Converts this cell to an Arrow RecordBatch with all attributes.
    pub fn to_record_batch(&self) -> Result<RecordBatch, SpatialKeyError> {
        std::slice::from_ref(self).to_record_batch()
    }

    /// Writes this cell to a GeoParquet file.
    pub fn to_geoparquet(&self, path: impl AsRef<Path>) -> Result<(), SpatialKeyError> {
        std::slice::from_ref(self).to_geoparquet(path)
    }
}

use crate::cell::SpatialCell;
use crate::error::SpatialKeyError;
use crate::index::SpatialKeyConfig;
use arrow_array::{Float64Array, RecordBatch, StringArray, UInt8Array, UInt64Array};
use arrow_schema::{DataType, Field, Schema};
use geoarrow_array::IntoArrow;
use geoarrow_array::array::{PointArray, PolygonArray};
use geoarrow_array::builder::{PointBuilder, PolygonBuilder};
use geoarrow_schema::{Crs, Dimension, Metadata, PointType, PolygonType};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Schema metadata entry holding the bit depth of the `key` column.
pub const BITS_METADATA_KEY: &str = "spatial_key:bits";
/// Schema metadata entry holding the fixed-point scale factor of the `key` column.
pub const SCALE_FACTOR_METADATA_KEY: &str = "spatial_key:scale_factor";

fn wgs84_metadata() -> Arc<Metadata> {
    let crs = Crs::from_authority_code("EPSG:4326".to_string());
    Arc::new(Metadata::new(crs, None))
}

/// The metadata entries needed to decode keys produced with `config`.
pub fn key_metadata(config: &SpatialKeyConfig) -> HashMap<String, String> {
    HashMap::from([
        (BITS_METADATA_KEY.to_string(), config.total_bits().to_string()),
        (
            SCALE_FACTOR_METADATA_KEY.to_string(),
            config.scale_factor().to_string(),
        ),
    ])
}

/// Rebuilds the configuration written by [`key_metadata`].
///
/// # Errors
///
/// [`SpatialKeyError::MissingKeyMetadata`] if an entry is absent or not a number, or any
/// configuration error for the stored values.
pub fn config_from_metadata(
    metadata: &HashMap<String, String>,
) -> Result<SpatialKeyConfig, SpatialKeyError> {
    fn entry<T: std::str::FromStr>(
        metadata: &HashMap<String, String>,
        key: &str,
    ) -> Result<T, SpatialKeyError> {
        metadata
            .get(key)
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| SpatialKeyError::MissingKeyMetadata(key.to_string()))
    }

    let bits: u8 = entry(metadata, BITS_METADATA_KEY)?;
    let scale_factor: u32 = entry(metadata, SCALE_FACTOR_METADATA_KEY)?;
    SpatialKeyConfig::with_scale_factor(bits, scale_factor)
}

/// The configuration every cell shares, `None` for no cells.
fn shared_config(cells: &[SpatialCell]) -> Result<Option<SpatialKeyConfig>, SpatialKeyError> {
    let Some(first) = cells.first() else {
        return Ok(None);
    };
    if cells.iter().any(|c| c.config != first.config) {
        return Err(SpatialKeyError::MixedConfigurations);
    }
    Ok(Some(first.config))
}

/// Trait for converting collections of [`SpatialCell`]s to Arrow arrays.
///
/// Implemented for `[SpatialCell]`, so it is also available on `Vec<SpatialCell>`.
pub trait SpatialCellsToArrow {
    /// The raw keys, in cell order.
    fn to_key_array(&self) -> UInt64Array;
    /// Converts cell centers to an Arrow PointArray.
    fn to_arrow_points(&self) -> PointArray;
    /// Converts cells to an Arrow PolygonArray of cell rectangles.
    fn to_arrow_polygons(&self) -> PolygonArray;
    /// Converts cells to a RecordBatch with id, key, bits, lat, lon, and geometry.
    ///
    /// The schema carries [`key_metadata`] so the `key` column can be decoded without the
    /// identifiers.
    ///
    /// # Errors
    ///
    /// [`SpatialKeyError::MixedConfigurations`] if the cells do not share one configuration.
    fn to_record_batch(&self) -> Result<RecordBatch, SpatialKeyError>;
}

impl SpatialCellsToArrow for [SpatialCell] {
    fn to_key_array(&self) -> UInt64Array {
        UInt64Array::from_iter_values(self.iter().map(|c| c.key))
    }

    fn to_arrow_points(&self) -> PointArray {
        let point_type = PointType::new(Dimension::XY, wgs84_metadata());
        let mut builder = PointBuilder::with_capacity(point_type, self.len());
        for cell in self {
            builder.push_point(Some(&cell.center));
        }
        builder.finish()
    }

    fn to_arrow_polygons(&self) -> PolygonArray {
        let polygon_type = PolygonType::new(Dimension::XY, wgs84_metadata());
        let rects: Vec<_> = self.par_iter().map(SpatialCell::to_polygon).collect();
        PolygonBuilder::from_polygons(&rects, polygon_type).finish()
    }

    fn to_record_batch(&self) -> Result<RecordBatch, SpatialKeyError> {
        let metadata = shared_config(self)?
            .map(|config| key_metadata(&config))
            .unwrap_or_default();

        let polygon_array = self.to_arrow_polygons();
        let geometry_field = polygon_array.extension_type().to_field("geometry", false);
        let schema = Schema::new_with_metadata(
            vec![
                Field::new("id", DataType::Utf8, false),
                Field::new("key", DataType::UInt64, false),
                Field::new("bits", DataType::UInt8, false),
                Field::new("lat", DataType::Float64, false),
                Field::new("lon", DataType::Float64, false),
                geometry_field,
            ],
            metadata,
        );

        let ids: StringArray = self.iter().map(|c| Some(c.id.as_str())).collect();
        let bits = UInt8Array::from_iter_values(self.iter().map(SpatialCell::bits));
        let lats = Float64Array::from_iter_values(self.iter().map(SpatialCell::lat));
        let lons = Float64Array::from_iter_values(self.iter().map(SpatialCell::lon));

        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(ids),
                Arc::new(self.to_key_array()),
                Arc::new(bits),
                Arc::new(lats),
                Arc::new(lons),
                Arc::new(polygon_array.into_arrow()),
            ],
        )
        .map_err(|e| SpatialKeyError::IoError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::Array;
    use geoarrow_array::GeoArrowArray;

    fn cells() -> Result<Vec<SpatialCell>, SpatialKeyError> {
        let config = SpatialKeyConfig::from_bits(32)?;
        Ok(vec![
            SpatialCell::from_wgs84(&(13.4, 52.5), &config),
            SpatialCell::from_wgs84(&(-0.1276, 51.5072), &config),
            SpatialCell::from_wgs84(&(151.2093, -33.8688), &config),
        ])
    }

    #[test]
    fn test_cells_to_arrow_arrays() -> Result<(), SpatialKeyError> {
        let cells = cells()?;
        assert_eq!(cells.to_arrow_points().len(), 3);
        assert_eq!(cells.to_arrow_polygons().len(), 3);

        let keys = cells.to_key_array();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys.value(1), cells[1].key);
        Ok(())
    }

    #[test]
    fn test_record_batch_columns() -> Result<(), SpatialKeyError> {
        let cells = cells()?;
        let batch = cells.to_record_batch()?;

        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.num_columns(), 6);

        let keys = batch
            .column_by_name("key")
            .and_then(|c| c.as_any().downcast_ref::<UInt64Array>())
            .ok_or_else(|| SpatialKeyError::IoError("missing key column".to_string()))?;
        assert_eq!(keys.value(0), cells[0].key);
        assert_eq!(keys.value(2), cells[2].key);
        Ok(())
    }

    #[test]
    fn test_record_batch_metadata_decodes_keys() -> Result<(), SpatialKeyError> {
        let config = SpatialKeyConfig::with_scale_factor(40, 1_000_000)?;
        let cells = vec![
            SpatialCell::from_wgs84(&(13.4, 52.5), &config),
            SpatialCell::from_wgs84(&(-77.0428, -12.0464), &config),
        ];
        let batch = cells.to_record_batch()?;

        let stored = config_from_metadata(batch.schema().metadata())?;
        assert_eq!(stored, config);
        let (lat, lon) = stored.decode(cells[1].key);
        assert_eq!((lat, lon), (cells[1].lat(), cells[1].lon()));
        Ok(())
    }

    #[test]
    fn test_record_batch_rejects_mixed_configurations() -> Result<(), SpatialKeyError> {
        let cells = vec![
            SpatialCell::from_wgs84(&(13.4, 52.5), &SpatialKeyConfig::from_bits(32)?),
            SpatialCell::from_wgs84(&(13.4, 52.5), &SpatialKeyConfig::from_bits(30)?),
        ];
        assert!(matches!(
            cells.to_record_batch(),
            Err(SpatialKeyError::MixedConfigurations)
        ));
        Ok(())
    }

    #[test]
    fn test_empty_record_batch_has_no_key_metadata() -> Result<(), SpatialKeyError> {
        let cells: Vec<SpatialCell> = Vec::new();
        let batch = cells.to_record_batch()?;
        assert_eq!(batch.num_rows(), 0);
        assert!(matches!(
            config_from_metadata(batch.schema().metadata()),
            Err(SpatialKeyError::MissingKeyMetadata(_))
        ));
        Ok(())
    }

    #[test]
    fn test_config_from_bad_metadata() {
        let mut metadata = HashMap::from([
            (BITS_METADATA_KEY.to_string(), "33".to_string()),
            (SCALE_FACTOR_METADATA_KEY.to_string(), "10000000".to_string()),
        ]);
        assert_eq!(
            config_from_metadata(&metadata),
            Err(SpatialKeyError::OddBitDepth(33))
        );

        metadata.insert(BITS_METADATA_KEY.to_string(), "lots".to_string());
        assert_eq!(
            config_from_metadata(&metadata),
            Err(SpatialKeyError::MissingKeyMetadata(BITS_METADATA_KEY.to_string()))
        );
    }

    #[test]
    fn test_single_cell_record_batch() -> Result<(), SpatialKeyError> {
        let cells = cells()?;
        let batch = cells[0].to_record_batch()?;
        assert_eq!(batch.num_rows(), 1);
        Ok(())
    }
}

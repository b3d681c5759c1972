pub mod arrow;
pub mod csv;
pub mod parquet;

pub use arrow::{
    BITS_METADATA_KEY, SCALE_FACTOR_METADATA_KEY, SpatialCellsToArrow, config_from_metadata,
    key_metadata,
};
pub use csv::{
    CoordinateSource, CsvConversionSummary, CsvKeyConfig, CsvToKeys, GeometryFormat,
    csv_to_key_csv,
};
pub use parquet::{SpatialCellsToGeoParquet, read_geoparquet_keys, write_geoparquet};

use crate::cell::SpatialCell;
use crate::error::SpatialKeyError;
use crate::index::SpatialKeyConfig;
use crate::io::arrow::{SpatialCellsToArrow, config_from_metadata};
use arrow_array::{Array, RecordBatch, UInt64Array};
use geoparquet::writer::{
    GeoParquetRecordBatchEncoder, GeoParquetWriterEncoding, GeoParquetWriterOptionsBuilder,
};
use log::debug;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::metadata::KeyValue;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

fn io_error(e: impl ToString) -> SpatialKeyError {
    SpatialKeyError::IoError(e.to_string())
}

/// Writes a batch with a GeoArrow geometry column to a GeoParquet file (WKB encoded).
///
/// Schema metadata of the batch, such as the key configuration written by
/// [`SpatialCellsToArrow::to_record_batch`], is copied into the file footer next to the `geo`
/// entry.
pub fn write_geoparquet(
    batch: &RecordBatch,
    path: impl AsRef<Path>,
) -> Result<(), SpatialKeyError> {
    let schema = batch.schema();
    let options = GeoParquetWriterOptionsBuilder::default()
        .set_encoding(GeoParquetWriterEncoding::WKB)
        .build();
    let mut encoder = GeoParquetRecordBatchEncoder::try_new(&schema, &options).map_err(io_error)?;

    let file = File::create(path.as_ref()).map_err(io_error)?;
    let mut writer =
        ArrowWriter::try_new(file, encoder.target_schema(), None).map_err(io_error)?;
    writer
        .write(&encoder.encode_record_batch(batch).map_err(io_error)?)
        .map_err(io_error)?;

    let mut entries: Vec<_> = schema.metadata().iter().collect();
    entries.sort();
    for (key, value) in entries {
        writer.append_key_value_metadata(KeyValue::new(key.clone(), value.clone()));
    }
    writer.append_key_value_metadata(encoder.into_keyvalue().map_err(io_error)?);
    writer.finish().map_err(io_error)?;

    debug!(
        "wrote {} rows ({} metadata entries) to {}",
        batch.num_rows(),
        schema.metadata().len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Reads the `key` column and the configuration needed to decode it back from a file written
/// by [`SpatialCellsToGeoParquet::to_geoparquet`].
///
/// # Errors
///
/// - [`SpatialKeyError::MissingKeyMetadata`] - the footer has no key configuration or the file
///   has no `UInt64` key column
/// - [`SpatialKeyError::IoError`] - the file cannot be read as Parquet
pub fn read_geoparquet_keys(
    path: impl AsRef<Path>,
) -> Result<(SpatialKeyConfig, Vec<u64>), SpatialKeyError> {
    let file = File::open(path.as_ref()).map_err(io_error)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(io_error)?;

    let footer: HashMap<String, String> = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|kv| kv.value.clone().map(|v| (kv.key.clone(), v)))
                .collect()
        })
        .unwrap_or_default();
    let config = config_from_metadata(&footer)?;

    let mut keys = Vec::new();
    for batch in builder.build().map_err(io_error)? {
        let batch = batch.map_err(io_error)?;
        let column = batch
            .column_by_name("key")
            .and_then(|c| c.as_any().downcast_ref::<UInt64Array>())
            .ok_or_else(|| SpatialKeyError::MissingKeyMetadata("key".to_string()))?;
        keys.extend(column.values().iter().copied());
    }

    debug!(
        "read {} keys at {} bits from {}",
        keys.len(),
        config.total_bits(),
        path.as_ref().display()
    );
    Ok((config, keys))
}

/// Trait for writing collections of [`SpatialCell`]s to GeoParquet.
///
/// Implemented for `[SpatialCell]`, so it is also available on `Vec<SpatialCell>`.
pub trait SpatialCellsToGeoParquet: SpatialCellsToArrow {
    fn to_geoparquet(&self, path: impl AsRef<Path>) -> Result<(), SpatialKeyError>;
}

impl SpatialCellsToGeoParquet for [SpatialCell] {
    fn to_geoparquet(&self, path: impl AsRef<Path>) -> Result<(), SpatialKeyError> {
        write_geoparquet(&self.to_record_batch()?, path)
    }
}

use crate::error::SpatialKeyError;
use crate::index::config::SpatialKeyConfig;
use crate::index::constants::IDENTIFIER_VERSION;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

const IDENTIFIER_LEN: usize = 15;

/// Generates a cell identifier from a spatial key and the configuration that produced it.
///
/// A bare key cannot be decoded without knowing its bit depth and scale factor; the identifier
/// carries both so it can be handed to another process on its own.
///
/// # Binary Format
///
/// | Offset | Size | Field        | Description                                   |
/// |--------|------|--------------|-----------------------------------------------|
/// | 0      | 1    | Version      | Identifier format version (currently 1)       |
/// | 1      | 1    | Bits         | Total bit depth of the key                    |
/// | 2      | 4    | Scale factor | Fixed-point scale factor as big-endian `u32`  |
/// | 6      | 8    | Key          | Spatial key as big-endian `u64`               |
/// | 14     | 1    | Checksum     | Wrapping sum of bytes 0-13                    |
///
/// The 15 bytes are encoded as URL-safe Base64 without padding.
///
/// # Example
/// ```
/// use spatial_key_rs::{SpatialKeyConfig, generate_cell_identifier, decode_cell_identifier};
///
/// # fn main() -> Result<(), spatial_key_rs::SpatialKeyError> {
/// let config = SpatialKeyConfig::from_bits(40)?;
/// let key = config.encode(52.5, 13.4);
/// let id = generate_cell_identifier(key, &config);
///
/// let (decoded_key, decoded_config) = decode_cell_identifier(&id)?;
/// assert_eq!(decoded_key, key);
/// assert_eq!(decoded_config, config);
/// # Ok(())
/// # }
/// ```
pub fn generate_cell_identifier(key: u64, config: &SpatialKeyConfig) -> String {
    let mut binary_data = Vec::with_capacity(IDENTIFIER_LEN);
    binary_data.push(IDENTIFIER_VERSION);
    binary_data.push(config.total_bits());
    binary_data.extend_from_slice(&config.scale_factor().to_be_bytes());
    binary_data.extend_from_slice(&key.to_be_bytes());

    let checksum: u8 = binary_data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    binary_data.push(checksum);

    URL_SAFE_NO_PAD.encode(&binary_data)
}

/// Decodes a cell identifier back into its key and configuration.
///
/// # Errors
///
/// - [`SpatialKeyError::Base64DecodeError`] - Invalid Base64 encoding
/// - [`SpatialKeyError::InvalidIdentifierLength`] - Decoded data is not 15 bytes
/// - [`SpatialKeyError::InvalidChecksum`] - Checksum validation failed
/// - [`SpatialKeyError::UnsupportedVersion`] - Version byte doesn't match current version
/// - any configuration error if the stored bit depth or scale factor is invalid
pub fn decode_cell_identifier(identifier: &str) -> Result<(u64, SpatialKeyConfig), SpatialKeyError> {
    let binary_data = URL_SAFE_NO_PAD
        .decode(identifier)
        .map_err(|_| SpatialKeyError::Base64DecodeError)?;

    if binary_data.len() != IDENTIFIER_LEN {
        return Err(SpatialKeyError::InvalidIdentifierLength);
    }

    let (data, checksum_bytes) = binary_data.split_at(IDENTIFIER_LEN - 1);
    let calculated_checksum: u8 = data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    if calculated_checksum != checksum_bytes[0] {
        return Err(SpatialKeyError::InvalidChecksum);
    }

    let version = data[0];
    if version != IDENTIFIER_VERSION {
        return Err(SpatialKeyError::UnsupportedVersion(version));
    }

    let bits = data[1];
    let factor_bytes: [u8; 4] = data[2..6]
        .try_into()
        .map_err(|_| SpatialKeyError::InvalidIdentifierLength)?;
    let key_bytes: [u8; 8] = data[6..14]
        .try_into()
        .map_err(|_| SpatialKeyError::InvalidIdentifierLength)?;

    let config = SpatialKeyConfig::with_scale_factor(bits, u32::from_be_bytes(factor_bytes))?;
    Ok((u64::from_be_bytes(key_bytes), config))
}

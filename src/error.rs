/// Error type for spatial-key-rs operations.
#[derive(Debug, PartialEq)]
pub enum SpatialKeyError {
    /// The requested bit depth is zero.
    InvalidBitDepth(u8),
    /// The requested bit depth does not fit into a 64 bit key.
    BitDepthTooLarge(u8),
    /// The requested bit depth is odd, latitude and longitude need the same number of bits.
    OddBitDepth(u8),
    /// The scale factor is zero or too large for the fixed-point bounds to fit an `i32`.
    InvalidScaleFactor(u32),
    /// The cell identifier has an invalid length.
    InvalidIdentifierLength,
    /// The cell identifier checksum validation failed.
    InvalidChecksum,
    /// The identifier version is not supported.
    UnsupportedVersion(u8),
    /// Failed to decode Base64 identifier.
    Base64DecodeError,
    /// File I/O or serialization error.
    IoError(String),
    /// CSV parsing or reading error.
    CsvError(String),
    /// Failed to parse geometry from string (GeoJSON or WKT).
    GeometryParseError(String),
    /// A geometry vertex is NaN or infinite.
    NonFiniteCoordinate,
    /// A line needs more samples than the given limit at the requested bit depth.
    TooManySamples(usize),
    /// An exported file lacks the key metadata, or carries an invalid value for it.
    MissingKeyMetadata(String),
    /// Cells with different configurations cannot share one key column.
    MixedConfigurations,
}

impl SpatialKeyError {
    /// Returns true for the errors raised while building a [`crate::SpatialKeyConfig`].
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SpatialKeyError::InvalidBitDepth(_)
                | SpatialKeyError::BitDepthTooLarge(_)
                | SpatialKeyError::OddBitDepth(_)
                | SpatialKeyError::InvalidScaleFactor(_)
        )
    }
}

impl std::fmt::Display for SpatialKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpatialKeyError::InvalidBitDepth(b) => write!(f, "Invalid bit depth: {}", b),
            SpatialKeyError::BitDepthTooLarge(b) => {
                write!(f, "Bit depth {} is too big and does not fit into 8 bytes", b)
            }
            SpatialKeyError::OddBitDepth(b) => write!(
                f,
                "Bit depth {} needs to be even to use the same amount for lat and lon",
                b
            ),
            SpatialKeyError::InvalidScaleFactor(s) => write!(f, "Invalid scale factor: {}", s),
            SpatialKeyError::InvalidIdentifierLength => write!(f, "Invalid identifier length"),
            SpatialKeyError::InvalidChecksum => write!(f, "Invalid checksum"),
            SpatialKeyError::UnsupportedVersion(v) => write!(f, "Unsupported version: {}", v),
            SpatialKeyError::Base64DecodeError => write!(f, "Base64 decode error"),
            SpatialKeyError::IoError(msg) => write!(f, "IO error: {}", msg),
            SpatialKeyError::CsvError(msg) => write!(f, "CSV error: {}", msg),
            SpatialKeyError::GeometryParseError(msg) => write!(f, "Geometry parse error: {}", msg),
            SpatialKeyError::NonFiniteCoordinate => write!(f, "Coordinate is not finite"),
            SpatialKeyError::TooManySamples(max) => {
                write!(f, "Line needs more than {} samples, use fewer bits", max)
            }
            SpatialKeyError::MissingKeyMetadata(key) => {
                write!(f, "Missing or invalid key metadata: {}", key)
            }
            SpatialKeyError::MixedConfigurations => {
                write!(f, "Cells were encoded with different configurations")
            }
        }
    }
}

impl std::error::Error for SpatialKeyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_grouped() {
        assert!(SpatialKeyError::OddBitDepth(7).is_configuration_error());
        assert!(SpatialKeyError::BitDepthTooLarge(65).is_configuration_error());
        assert!(SpatialKeyError::InvalidScaleFactor(0).is_configuration_error());
        assert!(!SpatialKeyError::InvalidChecksum.is_configuration_error());
    }

    #[test]
    fn test_display() {
        let msg = SpatialKeyError::OddBitDepth(7).to_string();
        assert!(msg.contains("7"));
        assert!(msg.contains("even"));
    }
}

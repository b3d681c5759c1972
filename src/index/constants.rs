/// Identifier version for encoding/decoding
pub const IDENTIFIER_VERSION: u8 = 1;

/// Default fixed-point scale factor, about 7 decimal places (sub-meter in latitude)
pub const DEFAULT_SCALE_FACTOR: u32 = 10_000_000;

/// Largest total bit depth, a key is a `u64`
pub const MAX_BITS: u8 = 64;

/// Extra bits added by `from_precision`, 4 per dimension to absorb rounding at cell edges
pub const PRECISION_PADDING_BITS: u8 = 8;

/// Latitude extent in degrees
pub const MAX_LAT: f64 = 90.0;

/// Longitude extent in degrees
pub const MAX_LON: f64 = 180.0;

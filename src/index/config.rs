use crate::coord::{Coordinate, LatLon};
use crate::error::SpatialKeyError;
use crate::index::constants::{
    DEFAULT_SCALE_FACTOR, MAX_BITS, MAX_LAT, MAX_LON, PRECISION_PADDING_BITS,
};
use crate::index::decoder::{decode_key, decode_key_into};
use crate::index::encoder::encode_fixed;
use crate::index::fixed::{to_degrees, to_fixed};
use log::debug;

/// Fixed-point images of the WGS84 bounding box under one scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBounds {
    pub min_lat: i32,
    pub max_lat: i32,
    pub min_lon: i32,
    pub max_lon: i32,
}

impl FixedBounds {
    /// Converts `±90` / `±180` with the given factor.
    ///
    /// Fails if the factor is zero or `180 * factor` overflows an `i32`.
    pub fn from_scale_factor(scale_factor: u32) -> Result<Self, SpatialKeyError> {
        if scale_factor == 0 || u64::from(scale_factor) * MAX_LON as u64 > i32::MAX as u64 {
            return Err(SpatialKeyError::InvalidScaleFactor(scale_factor));
        }

        Ok(Self {
            min_lat: to_fixed(-MAX_LAT, scale_factor),
            max_lat: to_fixed(MAX_LAT, scale_factor),
            min_lon: to_fixed(-MAX_LON, scale_factor),
            max_lon: to_fixed(MAX_LON, scale_factor),
        })
    }
}

/// Immutable precision configuration shared by the encoder and the decoder.
///
/// A key carries neither its bit depth nor its scale factor, so decoding with a different
/// configuration than the one used to encode returns a wrong coordinate without any error.
///
/// At the default scale factor a decoded coordinate is within half a cell of the input up to
/// 22 bits. Deeper grids add integer drift from truncating inputs and halving odd ranges, bounded
/// by `(total_bits + 2) / scale_factor` degrees on top of half a cell; from about 50 bits on the
/// drift is larger than the cell itself.
///
/// The scale factor is fixed at construction. There is no way to swap it afterwards, which keeps
/// the fixed-point bounds and the grid resolution derived together.
///
/// # Example
///
/// ```
/// use spatial_key_rs::SpatialKeyConfig;
///
/// # fn main() -> Result<(), spatial_key_rs::SpatialKeyError> {
/// let config = SpatialKeyConfig::from_precision(3)?;
/// let key = config.encode(52.5, 13.4);
/// let (lat, lon) = config.decode(key);
/// assert!((lat - 52.5).abs() < 0.0005);
/// assert!((lon - 13.4).abs() < 0.0005);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialKeyConfig {
    iterations: u8,
    initial_bit_mask: u64,
    scale_factor: u32,
    bounds: FixedBounds,
}

impl SpatialKeyConfig {
    pub fn builder() -> SpatialKeyConfigBuilder {
        SpatialKeyConfigBuilder::new()
    }

    /// Creates a configuration using `total_bits` for the key and the default scale factor.
    ///
    /// # Errors
    ///
    /// - [`SpatialKeyError::InvalidBitDepth`] - `total_bits` is zero
    /// - [`SpatialKeyError::BitDepthTooLarge`] - `total_bits` is above 64
    /// - [`SpatialKeyError::OddBitDepth`] - `total_bits` is odd
    pub fn from_bits(total_bits: u8) -> Result<Self, SpatialKeyError> {
        Self::with_scale_factor(total_bits, DEFAULT_SCALE_FACTOR)
    }

    /// Creates a configuration able to resolve roughly `digits` decimal places.
    ///
    /// The bit depth is `round(2 * log2(360 / 10^-digits))` plus 8 padding bits, capped at 64
    /// and rounded up to the next even number.
    pub fn from_precision(digits: u8) -> Result<Self, SpatialKeyError> {
        Self::from_bits(bits_for_precision(digits))
    }

    /// Creates a configuration with an explicit fixed-point scale factor.
    ///
    /// The factor only controls the integer resolution of the bounding box; the grid resolution
    /// is still set by `total_bits` alone.
    pub fn with_scale_factor(total_bits: u8, scale_factor: u32) -> Result<Self, SpatialKeyError> {
        if total_bits == 0 {
            return Err(SpatialKeyError::InvalidBitDepth(total_bits));
        }
        if total_bits > MAX_BITS {
            return Err(SpatialKeyError::BitDepthTooLarge(total_bits));
        }
        if total_bits & 1 == 1 {
            return Err(SpatialKeyError::OddBitDepth(total_bits));
        }

        let bounds = FixedBounds::from_scale_factor(scale_factor)?;
        debug!(
            "spatial key config: {} bits, scale factor {}",
            total_bits, scale_factor
        );

        Ok(Self {
            iterations: total_bits / 2,
            initial_bit_mask: 1u64 << (total_bits - 1),
            scale_factor,
            bounds,
        })
    }

    /// Number of subdivision rounds, one latitude and one longitude bit each.
    pub fn iterations(&self) -> u8 {
        self.iterations
    }

    /// Number of significant bits in a key.
    pub fn total_bits(&self) -> u8 {
        self.iterations * 2
    }

    /// The bit holding the first latitude decision.
    pub fn initial_bit_mask(&self) -> u64 {
        self.initial_bit_mask
    }

    pub fn scale_factor(&self) -> u32 {
        self.scale_factor
    }

    pub fn bounds(&self) -> &FixedBounds {
        &self.bounds
    }

    /// Approximate number of decimal places the current bit depth can resolve.
    ///
    /// Inverts the formula used by [`SpatialKeyConfig::from_precision`] without the padding,
    /// so expect it to be off by about one digit from the originally requested value.
    pub fn exact_precision(&self) -> u32 {
        let p = (2f64.powi(i32::from(self.iterations)) / (2.0 * MAX_LON)) as u64 + 1;
        (p as f64).log10() as u32
    }

    /// Size of one grid cell in degrees, as `(lat, lon)`.
    pub fn cell_size(&self) -> (f64, f64) {
        let cells = 2f64.powi(i32::from(self.iterations));
        (2.0 * MAX_LAT / cells, 2.0 * MAX_LON / cells)
    }

    #[inline]
    pub fn to_fixed(&self, degrees: f64) -> i32 {
        to_fixed(degrees, self.scale_factor)
    }

    #[inline]
    pub fn to_degrees(&self, fixed: i32) -> f64 {
        to_degrees(fixed, self.scale_factor)
    }

    /// Encodes latitude and longitude in degrees into a spatial key.
    ///
    /// Inputs outside `[-90, 90]` x `[-180, 180]` are not rejected; they produce a key that
    /// does not correspond to their location.
    #[inline]
    pub fn encode(&self, lat: f64, lon: f64) -> u64 {
        encode_fixed(self, self.to_fixed(lat), self.to_fixed(lon))
    }

    /// Encodes coordinates already scaled by [`SpatialKeyConfig::scale_factor`].
    #[inline]
    pub fn encode_fixed(&self, lat: i32, lon: i32) -> u64 {
        encode_fixed(self, lat, lon)
    }

    #[inline]
    pub fn encode_coord<C: Coordinate + ?Sized>(&self, coord: &C) -> u64 {
        self.encode(coord.lat(), coord.lon())
    }

    /// Decodes a key into the center of its grid cell, as `(lat, lon)`.
    #[inline]
    pub fn decode(&self, key: u64) -> (f64, f64) {
        decode_key(self, key)
    }

    /// Same as [`SpatialKeyConfig::decode`] but writes into a caller-owned record.
    #[inline]
    pub fn decode_into(&self, key: u64, out: &mut LatLon) {
        decode_key_into(self, key, out)
    }
}

impl Default for SpatialKeyConfig {
    /// 64 bits with the default scale factor.
    fn default() -> Self {
        let bounds = FixedBounds {
            min_lat: to_fixed(-MAX_LAT, DEFAULT_SCALE_FACTOR),
            max_lat: to_fixed(MAX_LAT, DEFAULT_SCALE_FACTOR),
            min_lon: to_fixed(-MAX_LON, DEFAULT_SCALE_FACTOR),
            max_lon: to_fixed(MAX_LON, DEFAULT_SCALE_FACTOR),
        };
        Self {
            iterations: MAX_BITS / 2,
            initial_bit_mask: 1u64 << (MAX_BITS - 1),
            scale_factor: DEFAULT_SCALE_FACTOR,
            bounds,
        }
    }
}

fn bits_for_precision(digits: u8) -> u8 {
    // 360 / 2^(bits / 2) = 10^-digits
    let x = 10f64.powi(-i32::from(digits));
    let bits = (2.0 * (2.0 * MAX_LON / x).log2()).round() + f64::from(PRECISION_PADDING_BITS);
    let bits = bits.min(f64::from(MAX_BITS)) as u8;
    bits + (bits & 1)
}

/// Builder for [`SpatialKeyConfig`].
///
/// An explicit bit depth takes priority over a precision request. Without either, 64 bits
/// are used.
#[derive(Debug, Default)]
pub struct SpatialKeyConfigBuilder {
    bits: Option<u8>,
    precision: Option<u8>,
    scale_factor: Option<u32>,
}

impl SpatialKeyConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bits(mut self, total_bits: u8) -> Self {
        self.bits = Some(total_bits);
        self
    }

    pub fn precision(mut self, digits: u8) -> Self {
        self.precision = Some(digits);
        self
    }

    pub fn scale_factor(mut self, scale_factor: u32) -> Self {
        self.scale_factor = Some(scale_factor);
        self
    }

    pub fn build(self) -> Result<SpatialKeyConfig, SpatialKeyError> {
        let bits = match (self.bits, self.precision) {
            (Some(bits), _) => bits,
            (None, Some(digits)) => bits_for_precision(digits),
            (None, None) => MAX_BITS,
        };
        SpatialKeyConfig::with_scale_factor(bits, self.scale_factor.unwrap_or(DEFAULT_SCALE_FACTOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bits() -> Result<(), SpatialKeyError> {
        let config = SpatialKeyConfig::from_bits(8)?;
        assert_eq!(config.iterations(), 4);
        assert_eq!(config.total_bits(), 8);
        assert_eq!(config.initial_bit_mask(), 0b1000_0000);
        assert_eq!(config.scale_factor(), DEFAULT_SCALE_FACTOR);

        let config = SpatialKeyConfig::from_bits(64)?;
        assert_eq!(config.iterations(), 32);
        assert_eq!(config.initial_bit_mask(), 1u64 << 63);
        Ok(())
    }

    #[test]
    fn test_bit_depth_errors() {
        assert!(matches!(
            SpatialKeyConfig::from_bits(65),
            Err(SpatialKeyError::BitDepthTooLarge(65))
        ));
        assert!(matches!(
            SpatialKeyConfig::from_bits(7),
            Err(SpatialKeyError::OddBitDepth(7))
        ));
        assert!(matches!(
            SpatialKeyConfig::from_bits(0),
            Err(SpatialKeyError::InvalidBitDepth(0))
        ));
    }

    #[test]
    fn test_bounds_follow_scale_factor() -> Result<(), SpatialKeyError> {
        let config = SpatialKeyConfig::from_bits(32)?;
        assert_eq!(
            *config.bounds(),
            FixedBounds {
                min_lat: -900_000_000,
                max_lat: 900_000_000,
                min_lon: -1_800_000_000,
                max_lon: 1_800_000_000,
            }
        );

        let config = SpatialKeyConfig::with_scale_factor(32, 1000)?;
        assert_eq!(config.bounds().max_lat, 90_000);
        assert_eq!(config.bounds().min_lon, -180_000);
        assert_eq!(config.iterations(), 16);
        Ok(())
    }

    #[test]
    fn test_invalid_scale_factor() {
        assert!(matches!(
            SpatialKeyConfig::with_scale_factor(32, 0),
            Err(SpatialKeyError::InvalidScaleFactor(0))
        ));
        assert!(matches!(
            SpatialKeyConfig::with_scale_factor(32, 20_000_000),
            Err(SpatialKeyError::InvalidScaleFactor(20_000_000))
        ));
        assert!(SpatialKeyConfig::with_scale_factor(32, 11_930_464).is_ok());
    }

    #[test]
    fn test_bits_for_precision() {
        // 2 * log2(360_000) rounds to 37, plus padding is 45, bumped to even
        assert_eq!(bits_for_precision(3), 46);
        assert_eq!(bits_for_precision(5), 58);
        assert_eq!(bits_for_precision(7), 64);
        assert_eq!(bits_for_precision(12), 64);
        assert_eq!(bits_for_precision(0), 26);
    }

    #[test]
    fn test_from_precision() -> Result<(), SpatialKeyError> {
        let config = SpatialKeyConfig::from_precision(3)?;
        assert_eq!(config.total_bits(), 46);
        assert_eq!(config.scale_factor(), DEFAULT_SCALE_FACTOR);
        Ok(())
    }

    #[test]
    fn test_exact_precision_close_to_request() -> Result<(), SpatialKeyError> {
        for digits in 1..=7 {
            let config = SpatialKeyConfig::from_precision(digits)?;
            let exact = config.exact_precision() as i64;
            assert!(
                (exact - i64::from(digits)).abs() <= 1,
                "digits {} gave {}",
                digits,
                exact
            );
        }
        Ok(())
    }

    #[test]
    fn test_cell_size() -> Result<(), SpatialKeyError> {
        let (lat, lon) = SpatialKeyConfig::from_bits(8)?.cell_size();
        assert_eq!(lat, 11.25);
        assert_eq!(lon, 22.5);
        Ok(())
    }

    #[test]
    fn test_builder() -> Result<(), SpatialKeyError> {
        let config = SpatialKeyConfig::builder().bits(40).scale_factor(1_000_000).build()?;
        assert_eq!(config.total_bits(), 40);
        assert_eq!(config.scale_factor(), 1_000_000);

        let config = SpatialKeyConfig::builder().precision(5).build()?;
        assert_eq!(config, SpatialKeyConfig::from_precision(5)?);

        let config = SpatialKeyConfig::builder().bits(20).precision(5).build()?;
        assert_eq!(config.total_bits(), 20);

        assert_eq!(SpatialKeyConfig::builder().build()?, SpatialKeyConfig::default());
        assert!(SpatialKeyConfig::builder().bits(9).build().is_err());
        Ok(())
    }
}

pub mod config;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod fixed;
mod identifier;

pub use config::{FixedBounds, SpatialKeyConfig, SpatialKeyConfigBuilder};
pub use constants::{DEFAULT_SCALE_FACTOR, IDENTIFIER_VERSION, MAX_BITS, PRECISION_PADDING_BITS};
pub use decoder::{decode_fixed, decode_key, decode_key_into};
pub use encoder::{encode_batch, encode_fixed};
pub use fixed::{to_degrees, to_fixed};
pub use identifier::{decode_cell_identifier, generate_cell_identifier};

use log::info;
use spatial_key_rs::{SpatialCell, SpatialKeyConfig, SpatialKeyError};

fn main() -> Result<(), SpatialKeyError> {
    env_logger::init();

    let lat = 52.5200066;
    let lon = 13.4049540;

    let config = SpatialKeyConfig::from_precision(5)?;
    info!(
        "{} bits, about {} decimal places",
        config.total_bits(),
        config.exact_precision()
    );

    let key = config.encode(lat, lon);
    let (dlat, dlon) = config.decode(key);
    println!("Key: {:#018x}", key);
    println!("Decoded: ({}, {})", dlat, dlon);

    let cell = SpatialCell::from_key(key, &config);
    println!("Cell ID: {}", cell.id);
    println!("Bounds: {:?}", cell.bounds());

    let parent = cell.parent()?;
    println!("Parent key: {:#018x} ({} bits)", parent.key, parent.bits());

    Ok(())
}

pub mod test_images;
pub use test_images::*;

use image_phash_core::{Config, Phasher};

/// A phasher with a small fixed pool, so tests do not depend on the host's CPU count
#[allow(dead_code)]
pub fn test_phasher() -> Phasher {
    let config = Config {
        threads: 4,
        ..Config::default()
    };
    Phasher::new(config).unwrap()
}

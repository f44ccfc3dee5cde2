#![cfg(feature = "rayon")]

use dpmatch::lowlevel::EdgeMap;
use dpmatch::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_image(width: usize, height: usize, seed: u64) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..width * height)
        .map(|_| {
            Rgb::new(
                rng.random_range(0..=255u8),
                rng.random_range(0..=255u8),
                rng.random_range(0..=255u8),
            )
        })
        .collect();
    RgbImage::new(data, width, height).unwrap()
}

#[test]
fn sobel_par_matches_scalar() {
    for (width, height, seed) in [(31usize, 17usize, 1u64), (64, 48, 2), (3, 3, 3), (5, 1, 4)] {
        let img = random_image(width, height, seed);
        let scalar = EdgeMap::sobel_scalar(&img, 80);
        let par = EdgeMap::sobel_par(&img, 80);
        assert_eq!(scalar, par, "mismatch for {width}x{height}");
    }
}

//! Synthetic images for tests.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::image::{MaskedImage, Plane};

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times; respects RUST_LOG, defaults to "info".
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Value of a normalised circular Gaussian of total `flux` at `(x, y)`.
#[inline]
pub fn gaussian_value(x: f64, y: f64, cx: f64, cy: f64, sigma: f64, flux: f64) -> f64 {
    let two_sigma_sq = 2.0 * sigma * sigma;
    let r2 = (x - cx) * (x - cx) + (y - cy) * (y - cy);
    flux / (std::f64::consts::PI * two_sigma_sq) * (-r2 / two_sigma_sq).exp()
}

/// Plane holding a Gaussian star of total `flux` centred at `(cx, cy)`.
///
/// Pixel values are point samples at pixel centres.
pub fn gaussian_plane(width: usize, height: usize, cx: f64, cy: f64, sigma: f64, flux: f64) -> Plane<f64> {
    let mut pixels = vec![0.0; width * height];
    for y in 0..height {
        for x in 0..width {
            pixels[y * width + x] = gaussian_value(x as f64, y as f64, cx, cy, sigma, flux);
        }
    }
    Plane::new(width, height, pixels)
}

/// Gaussian star with uniform variance and an empty mask.
pub fn gaussian_star(
    width: usize,
    height: usize,
    cx: f64,
    cy: f64,
    sigma: f64,
    flux: f64,
    variance: f32,
) -> MaskedImage<f64> {
    MaskedImage::from_image(gaussian_plane(width, height, cx, cy, sigma, flux), variance)
}

/// Add Gaussian noise of standard deviation `sigma` to every pixel.
pub fn add_noise(plane: &mut Plane<f64>, sigma: f64, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for v in plane.pixels_mut() {
        // Box-Muller
        let u1: f64 = rng.random_range(f64::EPSILON..1.0);
        let u2: f64 = rng.random();
        *v += sigma * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    }
}

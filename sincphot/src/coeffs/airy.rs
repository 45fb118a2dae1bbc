//! Fourier-domain construction of aperture coefficients.
//!
//! The transform of a hard-edged disk of radius `r` is `r·J1(2πrk)/k`
//! (`k` in cycles per pixel, value `πr²` at `k = 0`). Band-limiting it to the
//! pixel Nyquist square and transforming back gives the sinc-interpolated
//! disk coefficients without any real-space integration. There is no taper
//! and no radius correction on this path.

use std::f64::consts::PI;

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::{PhotometryError, Result};
use crate::image::Plane;
use crate::math::integrate::{integrate_2d, Tolerance};

use super::synth::kernel_width;
use super::CoeffImage;

/// Transform of a disk of radius `r` at spatial frequency `k`.
pub fn disk_transform(r: f64, k: f64) -> f64 {
    if r == 0.0 {
        return 0.0;
    }
    if k.abs() < 1e-12 {
        return PI * r * r;
    }
    r * libm::j1(2.0 * PI * r * k) / k
}

/// Coefficient image of the annulus `inner..outer`, built in the Fourier
/// domain. Same shape and origin as the integrated kernels, so either can be
/// used for a given radius: width [`kernel_width`], origin `-(width / 2)`.
pub fn airy_coeff_image(inner: f64, outer: f64) -> Result<CoeffImage> {
    if !inner.is_finite() || !outer.is_finite() || inner < 0.0 || outer < inner {
        return Err(PhotometryError::InvalidParameter {
            reason: "annulus needs finite radii with 0 <= inner <= outer",
            inner,
            outer,
        });
    }

    let n = kernel_width(outer);
    let half = (n / 2) as i32;
    let cell = 1.0 / n as f64;
    let annulus = |kx: f64, ky: f64| {
        let k = kx.hypot(ky);
        disk_transform(outer, k) - disk_transform(inner, k)
    };
    let scale = PI * outer * outer * cell * cell;
    let tol = Tolerance {
        abs: 1e-10 * scale,
        rel: 1e-8,
        max_intervals: 200,
    };

    // The transform is radial, so only the octant 0 <= v <= u is integrated.
    // For even `n` the Nyquist bin `half` is shared by `+half` and `-half`.
    let mut spectrum = vec![Complex::new(0.0, 0.0); n * n];
    for u in 0..=half {
        for v in 0..=u {
            let kx = u as f64 * cell;
            let ky = v as f64 * cell;
            let value = integrate_2d(
                &annulus,
                (kx - 0.5 * cell, kx + 0.5 * cell),
                (ky - 0.5 * cell, ky + 0.5 * cell),
                |_| Vec::new(),
                &[],
                tol,
            )
            .value;

            for (a, b) in [(u, v), (v, u)] {
                for (sa, sb) in [(1, 1), (-1, 1), (1, -1), (-1, -1)] {
                    let ix = wrap(sa * a, n);
                    let iy = wrap(sb * b, n);
                    spectrum[iy * n + ix] = Complex::new(value, 0.0);
                }
            }
        }
    }

    let coeffs = ifft_2d(spectrum, n);

    // Recentre: output index `x mod n` holds offset `x`.
    let mut pixels = vec![0.0; n * n];
    for ly in 0..n {
        let j = ly as i32 - half;
        for lx in 0..n {
            let i = lx as i32 - half;
            pixels[ly * n + lx] = coeffs[wrap(j, n) * n + wrap(i, n)];
        }
    }

    let image = Plane::new(n, n, pixels).with_origin(-half, -half);
    tracing::debug!(inner, outer, width = n, weight_sum = image.sum(), "built Fourier-domain aperture coefficients");
    Ok(image)
}

#[inline]
fn wrap(offset: i32, n: usize) -> usize {
    offset.rem_euclid(n as i32) as usize
}

/// Unnormalised inverse 2-D FFT of a square array; returns the real part.
fn ifft_2d(mut data: Vec<Complex<f64>>, n: usize) -> Vec<f64> {
    let mut planner = FftPlanner::new();
    let inverse = planner.plan_fft_inverse(n);

    for row in data.chunks_exact_mut(n) {
        inverse.process(row);
    }
    transpose_inplace(&mut data, n);
    for row in data.chunks_exact_mut(n) {
        inverse.process(row);
    }
    transpose_inplace(&mut data, n);

    data.iter().map(|c| c.re).collect()
}

fn transpose_inplace(data: &mut [Complex<f64>], n: usize) {
    for y in 0..n {
        for x in (y + 1)..n {
            data.swap(y * n + x, x * n + y);
        }
    }
}

//! Numerical helpers: sinc kernels and adaptive quadrature.

pub mod integrate;

#[cfg(test)]
mod tests;

use std::f64::consts::PI;

/// Half-width, in pixels, of the cosine window applied to the sinc kernel.
pub const SINC_TAPER: f64 = 10.0;

/// Normalised sinc: `sin(πx) / (πx)`, with `sinc(0) = 1`.
#[inline]
pub fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-8 {
        return 1.0;
    }
    let px = PI * x;
    px.sin() / px
}

/// Lanczos kernel `sinc(x) · sinc(x/a)` for `|x| < a`, zero beyond.
#[inline]
pub fn lanczos(x: f64, a: f64) -> f64 {
    if x.abs() >= a {
        return 0.0;
    }
    sinc(x) * sinc(x / a)
}

/// Sinc interpolant tapered to zero by a raised cosine over [`SINC_TAPER`] pixels:
/// `½(1 + cos(πt/10)) · sinc(t)` for `|t| < 10`, zero beyond.
#[inline]
pub fn tapered_sinc(t: f64) -> f64 {
    if t.abs() >= SINC_TAPER {
        return 0.0;
    }
    0.5 * (1.0 + (PI * t / SINC_TAPER).cos()) * sinc(t)
}

/// Evaluates [`tapered_sinc`]`(x - i)` for a run of consecutive integers `i`.
///
/// `sin(π(x - i)) = (-1)^i sin(πx)` and the window cosine is expanded with the
/// angle-addition formula, so each call costs two trig evaluations however
/// many offsets are requested.
#[derive(Debug, Clone)]
pub struct TaperedSincRow {
    first: i32,
    cos_i: Vec<f64>,
    sin_i: Vec<f64>,
}

impl TaperedSincRow {
    /// Offsets `first..first + len`.
    pub fn new(first: i32, len: usize) -> Self {
        let angles = (0..len).map(|k| PI * (first + k as i32) as f64 / SINC_TAPER);
        Self {
            first,
            cos_i: angles.clone().map(f64::cos).collect(),
            sin_i: angles.map(f64::sin).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cos_i.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cos_i.is_empty()
    }

    /// Fill `out[k]` with `tapered_sinc(x - (first + k))`.
    pub fn eval(&self, x: f64, out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.len());
        let sin_px = (PI * x).sin();
        let window = PI * x / SINC_TAPER;
        let (sin_w, cos_w) = window.sin_cos();

        for (k, o) in out.iter_mut().enumerate() {
            let i = self.first + k as i32;
            let t = x - i as f64;
            if t.abs() >= SINC_TAPER {
                *o = 0.0;
                continue;
            }
            // cos(π(x - i)/10)
            let cos_t = cos_w * self.cos_i[k] + sin_w * self.sin_i[k];
            let sinc_t = if t.abs() < 1e-8 {
                1.0
            } else {
                let sign = if i.rem_euclid(2) == 0 { 1.0 } else { -1.0 };
                sign * sin_px / (PI * t)
            };
            *o = 0.5 * (1.0 + cos_t) * sinc_t;
        }
    }
}

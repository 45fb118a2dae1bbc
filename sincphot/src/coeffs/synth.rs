//! Sinc-interpolated aperture coefficients by direct integration.
//!
//! Coefficient `(i, j)` is the integral of the aperture weight times the
//! tapered sinc interpolants centred on pixel `(i, j)`:
//!
//! ```text
//! c(i, j) = ∫∫ g(x, y) f(x - i) f(y - j) dx dy
//! ```
//!
//! over the box `[-L, L]²`. The integrand actually integrated is
//! `1 + g·f·f`, and the box area `(2L)²` is subtracted afterwards, so the
//! relative tolerance acts on a quantity of fixed scale for every pixel.
//!
//! All pixels are integrated together: the inner integral over `x` yields
//! `G_i(y) = ∫ g(x, y) f(x - i) dx` for every column `i` at once, and the
//! outer integral over `y` carries one component per `(i, j)`.

use crate::aperture::CircularAperture;
use crate::error::Result;
use crate::image::Plane;
use crate::math::integrate::{inner_abs_tolerance, integrate_vec, Tolerance};
use crate::math::{TaperedSincRow, SINC_TAPER};

use super::radius::effective_radius;
use super::{CoeffImage, SincKernel};

/// Relative tolerance of the coefficient integrals.
pub const SYNTH_TOLERANCE: f64 = 1e-8;

/// Interval budget per integral.
const MAX_INTERVALS: usize = 2000;

/// Pixels of margin around the outer radius; matches the sinc taper length.
pub const BUFFER_WIDTH: f64 = SINC_TAPER;

/// Side length of the coefficient image for an aperture of radius `outer`.
#[inline]
pub fn kernel_width(outer: f64) -> usize {
    (2.0 * (outer + BUFFER_WIDTH)) as usize + 1
}

pub(crate) fn synthesize(inner: f64, outer: f64, taper_width: f64) -> Result<SincKernel> {
    // Reject bad radii before spending any time on them.
    CircularAperture::new(inner, outer, taper_width)?;

    let correction = effective_radius(outer, taper_width)?;
    let radius = correction.radius.max(inner);
    let aperture = CircularAperture::new(inner, radius, taper_width)?;

    let width = kernel_width(outer);
    let x0 = -(width as i32) / 2;
    let limit = radius + taper_width;

    let (image, quadrature) = integrate_coefficients(&aperture, width, x0, limit);
    let weight_sum = image.sum();

    tracing::debug!(
        inner,
        outer,
        taper_width,
        effective_radius = radius,
        newton_iterations = correction.iterations,
        width,
        weight_sum,
        evaluations = quadrature.evaluations,
        "synthesised sinc aperture coefficients"
    );
    if !quadrature.converged {
        tracing::warn!(
            inner,
            outer,
            error = quadrature.error,
            "coefficient integration hit the interval budget; using best estimate"
        );
    }

    Ok(SincKernel {
        image: std::sync::Arc::new(image),
        inner,
        outer,
        taper_width,
        correction,
        weight_sum,
        converged: quadrature.converged && correction.converged,
    })
}

#[derive(Debug, Clone, Copy)]
struct QuadratureStats {
    evaluations: usize,
    error: f64,
    converged: bool,
}

fn integrate_coefficients(
    aperture: &CircularAperture,
    width: usize,
    x0: i32,
    limit: f64,
) -> (CoeffImage, QuadratureStats) {
    let side = 2.0 * limit;
    let box_area = side * side;
    let radii = aperture.breakpoints();
    let support = aperture.support_radius();
    let sinc = TaperedSincRow::new(x0, width);

    let outer_tol = Tolerance::relative(SYNTH_TOLERANCE).with_max_intervals(MAX_INTERVALS);
    let inner_tol = Tolerance::absolute(inner_abs_tolerance(
        Tolerance::absolute(SYNTH_TOLERANCE * box_area),
        side,
    ))
    .with_max_intervals(MAX_INTERVALS);

    let mut inner_evaluations = 0;
    let mut inner_converged = true;
    let mut fx = vec![0.0; width];
    let mut fy = vec![0.0; width];

    let y_breaks: Vec<f64> = radii.iter().flat_map(|&r| [-r, r]).collect();

    let outer = integrate_vec(
        |y, out: &mut [f64]| {
            // ∫ 1 dx over the box, for every component.
            out.fill(side);
            if y.abs() >= support {
                return;
            }

            let x_breaks: Vec<f64> = radii
                .iter()
                .filter(|&&r| r > y.abs())
                .flat_map(|&r| {
                    let h = (r * r - y * y).sqrt();
                    [-h, h]
                })
                .collect();
            let columns = integrate_vec(
                |x, g_row: &mut [f64]| {
                    let g = aperture.weight(x, y);
                    if g == 0.0 {
                        g_row.fill(0.0);
                        return;
                    }
                    sinc.eval(x, &mut fx);
                    for (o, &f) in g_row.iter_mut().zip(&fx) {
                        *o = g * f;
                    }
                },
                width,
                -limit,
                limit,
                &x_breaks,
                inner_tol,
            );
            inner_evaluations += columns.evaluations;
            inner_converged &= columns.converged;

            sinc.eval(y, &mut fy);
            for (row, &f_j) in out.chunks_exact_mut(width).zip(&fy) {
                if f_j == 0.0 {
                    continue;
                }
                for (o, &g_i) in row.iter_mut().zip(&columns.value) {
                    *o += f_j * g_i;
                }
            }
        },
        width * width,
        -limit,
        limit,
        &y_breaks,
        outer_tol,
    );

    // Corners beyond the half-width carry only truncation noise.
    let cutoff = (width / 2) as f64;
    let mut pixels = outer.value;
    for (k, c) in pixels.iter_mut().enumerate() {
        let i = x0 + (k % width) as i32;
        let j = x0 + (k / width) as i32;
        let r = ((i * i + j * j) as f64).sqrt();
        *c = if r < cutoff { *c - box_area } else { 0.0 };
    }

    let image = Plane::new(width, width, pixels).with_origin(x0, x0);
    let stats = QuadratureStats {
        evaluations: inner_evaluations,
        error: outer.error,
        converged: outer.converged && inner_converged,
    };
    (image, stats)
}


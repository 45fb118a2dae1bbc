//! Effective-radius correction.
//!
//! A raised-cosine edge centred on `r` does not enclose exactly `πr²`. The
//! correction finds the nominal radius whose tapered disk has area `π·outer²`.

use std::f64::consts::PI;

use crate::aperture::CircularAperture;
use crate::error::Result;
use crate::math::integrate::Tolerance;

/// Finite-difference step for the area derivative.
const RADIUS_STEP: f64 = 1e-6;
/// Relative area tolerance.
const AREA_TOLERANCE: f64 = 1e-12;
const MAX_ITERATIONS: usize = 20;

/// Outcome of the effective-radius search.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RadiusCorrection {
    /// Radius to build the aperture with.
    pub radius: f64,
    pub iterations: usize,
    /// Signed relative area error at the last radius evaluated.
    pub relative_error: f64,
    /// False if the iteration cap was hit; `radius` is then the last estimate.
    pub converged: bool,
}

impl RadiusCorrection {
    /// No correction: use `radius` as given.
    pub fn identity(radius: f64) -> Self {
        Self {
            radius,
            iterations: 0,
            relative_error: 0.0,
            converged: true,
        }
    }
}

fn tapered_disk_area(radius: f64, taper_width: f64) -> Result<f64> {
    let ap = CircularAperture::new(0.0, radius, taper_width)?;
    Ok(ap.area(Tolerance::relative(AREA_TOLERANCE * 0.1)).value)
}

/// Newton iteration on the area of a tapered disk of radius `outer`.
pub fn effective_radius(outer: f64, taper_width: f64) -> Result<RadiusCorrection> {
    // Validates both arguments.
    CircularAperture::new(0.0, outer, taper_width)?;
    if outer == 0.0 || taper_width == 0.0 {
        return Ok(RadiusCorrection::identity(outer));
    }
    newton(outer, taper_width, MAX_ITERATIONS)
}

fn newton(outer: f64, taper_width: f64, max_iterations: usize) -> Result<RadiusCorrection> {
    let target = PI * outer * outer;
    let mut radius = outer;
    let mut relative_error = f64::INFINITY;
    let mut iterations = 0;

    while iterations < max_iterations {
        let a1 = tapered_disk_area(radius, taper_width)?;
        relative_error = (a1 - target) / target;
        if relative_error.abs() <= AREA_TOLERANCE {
            break;
        }
        let a2 = tapered_disk_area(radius + RADIUS_STEP, taper_width)?;
        let slope = (a2 - a1) / RADIUS_STEP;
        let next = radius - (a1 - target) / slope;
        // Never step to a non-positive radius.
        radius = if next > 0.0 { next } else { 0.5 * radius };
        iterations += 1;
    }

    let converged = relative_error.abs() <= AREA_TOLERANCE;
    if !converged {
        tracing::warn!(
            outer,
            taper_width,
            radius,
            relative_error,
            "effective radius did not converge after {max_iterations} iterations"
        );
    }

    Ok(RadiusCorrection {
        radius,
        iterations,
        relative_error,
        converged,
    })
}

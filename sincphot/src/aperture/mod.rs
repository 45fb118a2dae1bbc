//! Tapered circular aperture.
//!
//! Weight is 0 inside the inner radius, rises through a raised-cosine taper to
//! 1, stays flat, and falls back to 0 through a second taper at the outer
//! radius. Each taper is centred on its radius.


use std::f64::consts::PI;

use crate::error::{PhotometryError, Result};
use crate::math::integrate::{integrate, Quadrature, Tolerance};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularAperture {
    inner: f64,
    outer: f64,
    inner_taper: f64,
    outer_taper: f64,
    lo1: f64,
    hi1: f64,
    lo2: f64,
    hi2: f64,
}

impl CircularAperture {
    /// Build an annulus `inner..outer` with tapers of `taper_width` pixels.
    ///
    /// The tapers are adjusted so they fit: an inner radius of 0 drops the
    /// inner taper, an inner taper wider than `2·inner` is narrowed to
    /// `2·inner`, and when the annulus is narrower than the two half-tapers
    /// the tapers share `2·(outer - inner)`: the inner one gets
    /// `outer - inner` but never more than `2·inner`, the outer one the rest.
    /// A zero width gives a hard edge.
    pub fn new(inner: f64, outer: f64, taper_width: f64) -> Result<Self> {
        let invalid = |reason| PhotometryError::InvalidParameter {
            reason,
            inner,
            outer,
        };
        if !inner.is_finite() || !outer.is_finite() {
            return Err(invalid("radii must be finite"));
        }
        if inner < 0.0 || outer < 0.0 {
            return Err(invalid("radii must be non-negative"));
        }
        if outer < inner {
            return Err(invalid("outer radius is smaller than inner radius"));
        }
        if !taper_width.is_finite() || taper_width < 0.0 {
            return Err(invalid("taper width must be finite and non-negative"));
        }

        let mut inner_taper = taper_width;
        let mut outer_taper = taper_width;

        if inner == 0.0 {
            inner_taper = 0.0;
        }
        if inner < 0.5 * inner_taper {
            inner_taper = 2.0 * inner;
        }
        let span = outer - inner;
        if span < 0.5 * (inner_taper + outer_taper) {
            // Inner taper must still start at or beyond the centre.
            inner_taper = if inner_taper > 0.0 { span.min(2.0 * inner) } else { 0.0 };
            outer_taper = 2.0 * span - inner_taper;
        }

        Ok(Self {
            inner,
            outer,
            inner_taper,
            outer_taper,
            lo1: inner - 0.5 * inner_taper,
            hi1: inner + 0.5 * inner_taper,
            lo2: outer - 0.5 * outer_taper,
            hi2: outer + 0.5 * outer_taper,
        })
    }

    #[inline]
    pub fn inner(&self) -> f64 {
        self.inner
    }

    #[inline]
    pub fn outer(&self) -> f64 {
        self.outer
    }

    /// Taper widths after adjustment, `(inner, outer)`.
    #[inline]
    pub fn tapers(&self) -> (f64, f64) {
        (self.inner_taper, self.outer_taper)
    }

    /// Weight at distance `d` from the centre.
    pub fn weight_at_radius(&self, d: f64) -> f64 {
        if d < self.lo1 {
            0.0
        } else if d < self.hi1 {
            0.5 * (1.0 + (PI * (d - self.hi1) / self.inner_taper).cos())
        } else if d < self.lo2 {
            1.0
        } else if d < self.hi2 {
            0.5 * (1.0 + (PI * (d - self.lo2) / self.outer_taper).cos())
        } else {
            0.0
        }
    }

    #[inline]
    pub fn weight(&self, x: f64, y: f64) -> f64 {
        self.weight_at_radius(x.hypot(y))
    }

    /// Radii where the weight profile changes form, ascending, positive only.
    pub fn breakpoints(&self) -> Vec<f64> {
        let mut points: Vec<f64> = [self.lo1, self.hi1, self.lo2, self.hi2]
            .into_iter()
            .filter(|&r| r > 0.0)
            .collect();
        points.sort_by(f64::total_cmp);
        points.dedup();
        points
    }

    /// Radius beyond which the weight is zero.
    #[inline]
    pub fn support_radius(&self) -> f64 {
        self.hi2
    }

    /// Area under the weight, `2π ∫ ρ·w(ρ) dρ`.
    pub fn area(&self, tol: Tolerance) -> Quadrature<f64> {
        let mut q = integrate(
            |r| r * self.weight_at_radius(r),
            0.0,
            self.hi2.max(0.0),
            &self.breakpoints(),
            tol,
        );
        q.value *= 2.0 * PI;
        q.error *= 2.0 * PI;
        q
    }
}

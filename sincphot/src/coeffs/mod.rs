//! Coefficient images for sinc-interpolated aperture photometry.
//!
//! A coefficient image holds, for every pixel offset from the source, the
//! weight that pixel's value carries in the aperture flux. Images are costly
//! to build and depend only on the aperture radii, so they are built once per
//! radius pair and shared through a [`CoefficientCache`].

mod airy;
mod radius;
mod synth;

#[cfg(test)]
mod tests;

use std::sync::{Arc, OnceLock};

use common::FloatExt;
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::aperture::CircularAperture;
use crate::error::Result;
use crate::image::Plane;

pub use airy::{airy_coeff_image, disk_transform};
pub use radius::{effective_radius, RadiusCorrection};
pub use synth::{kernel_width, BUFFER_WIDTH, SYNTH_TOLERANCE};

/// Weights centred on parent pixel `(0, 0)`.
pub type CoeffImage = Plane<f64>;

/// Default taper width, in pixels.
pub const DEFAULT_TAPER_WIDTH: f64 = 1.0;

/// A coefficient image together with how it was built.
#[derive(Debug, Clone)]
pub struct SincKernel {
    image: Arc<CoeffImage>,
    inner: f64,
    outer: f64,
    taper_width: f64,
    correction: RadiusCorrection,
    weight_sum: f64,
    converged: bool,
}

impl SincKernel {
    /// Build a kernel directly, bypassing any cache.
    pub fn build(inner: f64, outer: f64, taper_width: f64) -> Result<Self> {
        synth::synthesize(inner, outer, taper_width)
    }

    #[inline]
    pub fn image(&self) -> &Arc<CoeffImage> {
        &self.image
    }

    #[inline]
    pub fn radii(&self) -> (f64, f64) {
        (self.inner, self.outer)
    }

    #[inline]
    pub fn taper_width(&self) -> f64 {
        self.taper_width
    }

    #[inline]
    pub fn correction(&self) -> &RadiusCorrection {
        &self.correction
    }

    /// Sum of all coefficients; close to the aperture area.
    #[inline]
    pub fn weight_sum(&self) -> f64 {
        self.weight_sum
    }

    /// Both the radius correction and the integrals met their tolerances.
    #[inline]
    pub fn converged(&self) -> bool {
        self.converged
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheKey {
    inner: f64,
    outer: f64,
    taper_width: f64,
}

impl CacheKey {
    fn matches(&self, other: &CacheKey) -> bool {
        self.inner.machine_eq(other.inner)
            && self.outer.machine_eq(other.outer)
            && self.taper_width.machine_eq(other.taper_width)
    }
}

type Slot = Arc<OnceLock<Result<Arc<SincKernel>>>>;

/// Build-once store of coefficient images keyed by aperture radii.
///
/// Keys compare with a tolerance of `f64::EPSILON`, so radii that differ only
/// by rounding share one image. Each key is built exactly once even under
/// concurrent lookups; different keys build in parallel. Entries are never
/// evicted.
#[derive(Debug, Default)]
pub struct CoefficientCache {
    slots: Mutex<Vec<(CacheKey, Slot)>>,
}

impl CoefficientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coefficient image for the annulus `inner..outer`.
    pub fn get_kernel(&self, inner: f64, outer: f64, taper_width: f64) -> Result<Arc<CoeffImage>> {
        Ok(self.kernel_info(inner, outer, taper_width)?.image.clone())
    }

    /// Coefficient image with its build diagnostics.
    pub fn kernel_info(&self, inner: f64, outer: f64, taper_width: f64) -> Result<Arc<SincKernel>> {
        // Invalid radii never get a slot.
        CircularAperture::new(inner, outer, taper_width)?;
        let slot = self.slot(CacheKey {
            inner,
            outer,
            taper_width,
        });

        if let Some(built) = slot.get() {
            tracing::trace!(inner, outer, taper_width, "coefficient cache hit");
            return built.clone();
        }
        slot.get_or_init(|| synth::synthesize(inner, outer, taper_width).map(Arc::new))
            .clone()
    }

    /// Build several radius pairs in parallel with the default taper.
    pub fn warm(&self, radii: &[(f64, f64)]) -> Result<()> {
        radii
            .par_iter()
            .try_for_each(|&(inner, outer)| self.kernel_info(inner, outer, DEFAULT_TAPER_WIDTH).map(|_| ()))
    }

    /// Number of distinct keys requested so far.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    /// Find or create the slot for `key`. The lock is held only for the lookup.
    fn slot(&self, key: CacheKey) -> Slot {
        let mut slots = self.slots.lock();
        if let Some((_, slot)) = slots.iter().find(|(k, _)| k.matches(&key)) {
            return slot.clone();
        }
        let slot = Slot::default();
        slots.push((key, slot.clone()));
        slot
    }
}

use std::sync::Arc;

use glam::DVec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aperture::CircularAperture;
use crate::coeffs::{CoefficientCache, DEFAULT_TAPER_WIDTH};
use crate::error::{PhotometryError, Result};
use crate::footprint::Footprint;
use crate::image::{MaskedImage, Pixel};
use crate::warp::{offset_plane, WarpingKernel};

use super::evaluator::ApertureFluxEvaluator;

/// Configuration for sinc aperture fluxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SincFluxConfig {
    /// Inner radius of the annulus, pixels; 0 for a disk.
    pub radius1: f64,
    /// Outer radius, pixels; 0 disables the measurement.
    pub radius2: f64,
    /// Width of the raised-cosine edges, pixels.
    pub taper_width: f64,
    /// Kernel used to move the coefficients onto the source centre.
    pub warping_kernel: WarpingKernel,
}

impl Default for SincFluxConfig {
    fn default() -> Self {
        Self {
            radius1: 0.0,
            radius2: 7.0,
            taper_width: DEFAULT_TAPER_WIDTH,
            warping_kernel: WarpingKernel::default(),
        }
    }
}

impl SincFluxConfig {
    pub fn validate(&self) -> Result<()> {
        CircularAperture::new(self.radius1, self.radius2, self.taper_width).map(|_| ())
    }

    /// A zero outer radius turns the measurement off.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.radius2 > 0.0
    }
}

/// Detected peak of a source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Centre in parent pixel coordinates.
    pub centre: DVec2,
    /// Peak pixel value, if known.
    pub value: Option<f64>,
}

impl Peak {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            centre: DVec2::new(x, y),
            value: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

/// Flux and its 1σ uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluxMeasurement {
    pub flux: f64,
    pub flux_err: f64,
}

impl FluxMeasurement {
    pub const NAN: Self = Self {
        flux: f64::NAN,
        flux_err: f64::NAN,
    };

    #[inline]
    pub fn is_nan(&self) -> bool {
        self.flux.is_nan()
    }
}

/// Sinc-interpolated aperture photometry.
///
/// Coefficients come from a shared [`CoefficientCache`], so many services
/// (or threads) measuring with the same radii build them once.
#[derive(Debug, Clone)]
pub struct SincPhotometry {
    config: SincFluxConfig,
    cache: Arc<CoefficientCache>,
}

impl SincPhotometry {
    /// Validates `config` and builds its coefficients up front.
    pub fn new(config: SincFluxConfig, cache: Arc<CoefficientCache>) -> Result<Self> {
        config.validate()?;
        if config.is_enabled() {
            cache.kernel_info(config.radius1, config.radius2, config.taper_width)?;
        }
        Ok(Self { config, cache })
    }

    #[inline]
    pub fn config(&self) -> &SincFluxConfig {
        &self.config
    }

    #[inline]
    pub fn cache(&self) -> &Arc<CoefficientCache> {
        &self.cache
    }

    /// Flux of the source at `peak`.
    ///
    /// Without a peak, or with the measurement disabled, the result is NaN
    /// and the image is not touched.
    pub fn measure<T: Pixel>(&self, image: &MaskedImage<T>, peak: Option<&Peak>) -> Result<FluxMeasurement> {
        let Some(peak) = peak else {
            return Ok(FluxMeasurement::NAN);
        };
        if !self.config.is_enabled() {
            return Ok(FluxMeasurement::NAN);
        }

        let coeffs = self.cache.get_kernel(self.config.radius1, self.config.radius2, self.config.taper_width)?;
        let weights = offset_plane(&coeffs, peak.centre.x, peak.centre.y, self.config.warping_kernel)?;

        let kernel_box = weights.bbox();
        let Some(clip) = kernel_box.intersection(&image.bbox()) else {
            return Err(PhotometryError::out_of_bounds(kernel_box, image.bbox())
                .add_context(format!("aperture at ({:.2}, {:.2}) misses the image", peak.centre.x, peak.centre.y)));
        };
        // Keep the weights' origin on the clipped box.
        let weights = if clip == kernel_box {
            weights
        } else {
            weights.sub_plane(&clip)?
        };

        let sums = ApertureFluxEvaluator::new(&weights).apply(&Footprint::from_box(clip), image)?;
        Ok(FluxMeasurement {
            flux: sums.flux,
            flux_err: sums.flux_variance.sqrt(),
        })
    }

    /// Measure every peak; one result per peak, in order.
    ///
    /// A failure on one source does not affect the others.
    pub fn measure_all<T: Pixel>(&self, image: &MaskedImage<T>, peaks: &[Peak]) -> Vec<Result<FluxMeasurement>> {
        peaks.par_iter().map(|p| self.measure(image, Some(p))).collect()
    }
}

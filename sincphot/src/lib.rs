//! Sincphot - sinc-interpolated aperture photometry.
//!
//! This library provides:
//! - Aperture coefficient images for band-limited (sinc-interpolated) images,
//!   built once per aperture and shared through a cache
//! - Flux and flux-error measurement of sources in masked images
//! - Sub-pixel image shifts with Lanczos, bilinear or nearest kernels
//! - Postage stamps around PSF candidates with neighbouring detections masked
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sincphot::{CoefficientCache, Peak, SincFluxConfig, SincPhotometry};
//!
//! let cache = Arc::new(CoefficientCache::new());
//! let photometry = SincPhotometry::new(SincFluxConfig::default(), cache)?;
//!
//! let m = photometry.measure(&exposure, Some(&Peak::new(50.3, 50.7)))?;
//! println!("flux {} +/- {}", m.flux, m.flux_err);
//! ```

pub mod aperture;
pub mod candidate;
pub mod coeffs;
mod error;
pub mod footprint;
pub mod geom;
pub mod image;
pub(crate) mod math;
pub mod photometry;
pub mod warp;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Core types
// ============================================================================

pub use error::{PhotometryError, Result};
pub use footprint::{Connectivity, Footprint, FootprintSet, Span};
pub use geom::BoxI;
pub use image::{MaskPixel, MaskPlane, MaskedImage, Pixel, Plane, VariancePixel};
pub use math::integrate::{Quadrature, Tolerance};

// ============================================================================
// Photometry
// ============================================================================

pub use aperture::CircularAperture;
pub use coeffs::{CoeffImage, CoefficientCache, RadiusCorrection, SincKernel, DEFAULT_TAPER_WIDTH};
pub use photometry::{
    ApertureFluxEvaluator, ApertureSums, FluxMeasurement, Peak, SincFluxConfig, SincPhotometry,
};

// ============================================================================
// Warping and stamps
// ============================================================================

pub use candidate::{PsfCandidate, StampConfig};
pub use warp::{offset_image, offset_plane, WarpingKernel};

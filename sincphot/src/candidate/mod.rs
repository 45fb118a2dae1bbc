//! PSF candidates and the postage stamps cut around them.
//!
//! A candidate holds a shared reference to its exposure and extracts deep
//! copies of small regions centred on the source. Neighbouring detections
//! inside a stamp are grown and flagged `INTRP` so a PSF fitter can ignore
//! them. The most recent stamp of each kind is cached per candidate.

mod config;


use std::sync::Arc;

use crate::error::{PhotometryError, Result};
use crate::footprint::{Connectivity, FootprintSet};
use crate::geom::{position_to_index, BoxI};
use crate::image::{MaskPlane, MaskedImage, Pixel};
use crate::warp::{offset_image, WarpingKernel};

pub use config::StampConfig;

/// Growth, in pixels, applied to contaminating footprints before masking.
pub const CONTAMINATION_GROW: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OffsetKey {
    width: usize,
    height: usize,
    buffer: usize,
    kernel: WarpingKernel,
}

#[derive(Debug, Clone)]
pub struct PsfCandidate<T> {
    image: Arc<MaskedImage<T>>,
    x_center: f64,
    y_center: f64,
    size: Option<(usize, usize)>,
    amplitude: f64,
    var: f64,
    source_flux: Option<f64>,
    stamp: Option<((usize, usize), Arc<MaskedImage<T>>)>,
    offset_stamp: Option<(OffsetKey, Arc<MaskedImage<T>>)>,
    extractions: usize,
}

impl<T: Pixel> PsfCandidate<T> {
    /// Candidate at `(x_center, y_center)` in the parent frame of `image`.
    pub fn new(image: Arc<MaskedImage<T>>, x_center: f64, y_center: f64) -> Self {
        Self {
            image,
            x_center,
            y_center,
            size: None,
            amplitude: 0.0,
            var: 1.0,
            source_flux: None,
            stamp: None,
            offset_stamp: None,
            extractions: 0,
        }
    }

    /// Use this stamp size instead of the process-wide default.
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.size = Some((width, height));
        self
    }

    /// Flux of the source this candidate came from.
    pub fn with_source_flux(mut self, flux: f64) -> Self {
        self.source_flux = Some(flux);
        self
    }

    #[inline]
    pub fn image(&self) -> &Arc<MaskedImage<T>> {
        &self.image
    }

    #[inline]
    pub fn x_center(&self) -> f64 {
        self.x_center
    }

    #[inline]
    pub fn y_center(&self) -> f64 {
        self.y_center
    }

    /// Stamp size: the candidate's own, else the configured default.
    pub fn size(&self) -> (usize, usize) {
        self.size.unwrap_or_else(|| {
            let config = StampConfig::get();
            (config.default_width, config.default_height)
        })
    }

    /// Best-fit amplitude from the PSF fitter.
    #[inline]
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    #[inline]
    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.amplitude = amplitude;
    }

    /// Variance used to weight this candidate in the PSF fit.
    #[inline]
    pub fn var(&self) -> f64 {
        self.var
    }

    #[inline]
    pub fn set_var(&mut self, var: f64) {
        self.var = var;
    }

    /// How good a PSF star this is; brighter is better.
    #[inline]
    pub fn rating(&self) -> Option<f64> {
        self.source_flux
    }

    /// Number of stamps actually cut from the exposure.
    #[inline]
    pub fn extractions(&self) -> usize {
        self.extractions
    }

    /// Nearest pixel to the centre.
    pub fn center_pixel(&self) -> (i32, i32) {
        (position_to_index(self.x_center).0, position_to_index(self.y_center).0)
    }

    /// `width`×`height` stamp centred on the candidate.
    ///
    /// Cached: asking again for the same size returns the same stamp.
    /// A zero dimension is [`PhotometryError::EmptyStamp`].
    pub fn stamp(&mut self, width: usize, height: usize) -> Result<Arc<MaskedImage<T>>> {
        if let Some((key, stamp)) = &self.stamp {
            if *key == (width, height) {
                tracing::trace!(width, height, "stamp cache hit");
                return Ok(stamp.clone());
            }
        }

        let stamp = Arc::new(self.extract(width, height)?);
        self.stamp = Some(((width, height), stamp.clone()));
        Ok(stamp)
    }

    /// Stamp of [`size`](Self::size).
    pub fn default_stamp(&mut self) -> Result<Arc<MaskedImage<T>>> {
        let (width, height) = self.size();
        self.stamp(width, height)
    }

    /// Stamp shifted so the sub-pixel centre falls on the centre of its pixel.
    ///
    /// A region `buffer` pixels larger on every side is cut out and shifted,
    /// then cropped back to [`size`](Self::size), so the kernel's border band
    /// stays out of the result when `buffer` is at least its half-width.
    pub fn offset_stamp(&mut self, kernel: WarpingKernel, buffer: usize) -> Result<Arc<MaskedImage<T>>> {
        let (width, height) = self.size();
        check_stamp_size(width, height)?;
        let key = OffsetKey {
            width,
            height,
            buffer,
            kernel,
        };
        if let Some((cached, stamp)) = &self.offset_stamp {
            if *cached == key {
                return Ok(stamp.clone());
            }
        }

        let padded = self.extract(width + 2 * buffer, height + 2 * buffer)?;
        let (_, fx) = position_to_index(self.x_center);
        let (_, fy) = position_to_index(self.y_center);
        let shifted = offset_image(&padded, -fx, -fy, kernel)?;
        let stamp = Arc::new(shifted.sub_image_local(buffer, buffer, width, height)?);

        self.offset_stamp = Some((key, stamp.clone()));
        Ok(stamp)
    }

    fn extract(&mut self, width: usize, height: usize) -> Result<MaskedImage<T>> {
        check_stamp_size(width, height)?;
        let (cx, cy) = self.center_pixel();
        let bbox = BoxI::new(cx - (width / 2) as i32, cy - (height / 2) as i32, width, height);
        tracing::debug!(x = self.x_center, y = self.y_center, %bbox, "extracting PSF candidate stamp");

        let mut stamp = self.image.sub_image(&bbox).map_err(|e| {
            e.add_context(format!(
                "PSF candidate at ({:.2}, {:.2}) is too close to the image edge",
                self.x_center, self.y_center
            ))
        })?;
        mask_contaminants(&mut stamp, (cx, cy));

        self.extractions += 1;
        Ok(stamp)
    }
}

fn check_stamp_size(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(PhotometryError::EmptyStamp { width, height });
    }
    Ok(())
}

/// Grow every detection that does not contain `center` and flag it `INTRP`.
///
/// Nothing is flagged when the stamp holds at most one detection.
fn mask_contaminants<T: Pixel>(stamp: &mut MaskedImage<T>, center: (i32, i32)) {
    let detections = FootprintSet::from_mask(stamp.mask(), MaskPlane::Detected.bit(), Connectivity::Eight);
    if detections.len() <= 1 {
        return;
    }

    let intrp = MaskPlane::Intrp.bit();
    let mut masked = 0;
    for footprint in detections.footprints() {
        if footprint.contains(center.0, center.1) {
            continue;
        }
        footprint.grown(CONTAMINATION_GROW).set_mask(stamp.mask_mut(), intrp);
        masked += 1;
    }
    tracing::debug!(
        detections = detections.len(),
        masked,
        "masked contaminating detections in stamp"
    );
}

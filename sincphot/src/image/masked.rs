use strum_macros::{Display, EnumIter, EnumString};

use super::{Pixel, Plane};
use crate::error::Result;
use crate::geom::BoxI;

pub type MaskPixel = u16;
pub type VariancePixel = f32;

/// Named bit planes of the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MaskPlane {
    /// Bad pixel (dead, hot, bad column).
    Bad,
    /// Saturated.
    Sat,
    /// Interpolated, or contaminated by a neighbouring object.
    Intrp,
    /// Cosmic ray.
    Cr,
    /// Too close to the image edge to be processed properly.
    Edge,
    /// Part of a detected source.
    Detected,
    DetectedNegative,
}

impl MaskPlane {
    #[inline]
    pub const fn bit(self) -> MaskPixel {
        1 << (self as u16)
    }

    /// OR of the bits of several planes.
    pub fn bits(planes: &[MaskPlane]) -> MaskPixel {
        planes.iter().fold(0, |acc, p| acc | p.bit())
    }
}

/// Value, variance and mask planes sharing one shape and origin.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedImage<T> {
    image: Plane<T>,
    variance: Plane<VariancePixel>,
    mask: Plane<MaskPixel>,
}

impl<T: Pixel> MaskedImage<T> {
    /// Zero image, zero variance, empty mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            image: Plane::new_default(width, height),
            variance: Plane::new_default(width, height),
            mask: Plane::new_default(width, height),
        }
    }

    /// Wrap an image plane with a uniform variance and an empty mask.
    pub fn from_image(image: Plane<T>, variance: VariancePixel) -> Self {
        let (x0, y0) = image.origin();
        let (w, h) = image.dimensions();
        Self {
            variance: Plane::new_filled(w, h, variance).with_origin(x0, y0),
            mask: Plane::new_default(w, h).with_origin(x0, y0),
            image,
        }
    }

    /// # Panics
    ///
    /// Panics if the planes differ in shape or origin.
    pub fn from_planes(image: Plane<T>, variance: Plane<VariancePixel>, mask: Plane<MaskPixel>) -> Self {
        assert_eq!(image.bbox(), variance.bbox(), "variance plane must match image");
        assert_eq!(image.bbox(), mask.bbox(), "mask plane must match image");
        Self {
            image,
            variance,
            mask,
        }
    }

    pub fn with_origin(mut self, x0: i32, y0: i32) -> Self {
        self.set_origin(x0, y0);
        self
    }

    pub fn set_origin(&mut self, x0: i32, y0: i32) {
        self.image.set_origin(x0, y0);
        self.variance.set_origin(x0, y0);
        self.mask.set_origin(x0, y0);
    }

    #[inline]
    pub fn origin(&self) -> (i32, i32) {
        self.image.origin()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.image.height()
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        self.image.dimensions()
    }

    #[inline]
    pub fn bbox(&self) -> BoxI {
        self.image.bbox()
    }

    #[inline]
    pub fn image(&self) -> &Plane<T> {
        &self.image
    }

    #[inline]
    pub fn image_mut(&mut self) -> &mut Plane<T> {
        &mut self.image
    }

    #[inline]
    pub fn variance(&self) -> &Plane<VariancePixel> {
        &self.variance
    }

    #[inline]
    pub fn variance_mut(&mut self) -> &mut Plane<VariancePixel> {
        &mut self.variance
    }

    #[inline]
    pub fn mask(&self) -> &Plane<MaskPixel> {
        &self.mask
    }

    #[inline]
    pub fn mask_mut(&mut self) -> &mut Plane<MaskPixel> {
        &mut self.mask
    }

    pub fn into_planes(self) -> (Plane<T>, Plane<VariancePixel>, Plane<MaskPixel>) {
        (self.image, self.variance, self.mask)
    }

    /// Deep copy of the region `bbox` (parent coordinates) of all three planes.
    pub fn sub_image(&self, bbox: &BoxI) -> Result<Self> {
        Ok(Self {
            image: self.image.sub_plane(bbox)?,
            variance: self.variance.sub_plane(bbox)?,
            mask: self.mask.sub_plane(bbox)?,
        })
    }

    /// Deep copy of a region given relative to this image's origin.
    pub fn sub_image_local(&self, x: usize, y: usize, width: usize, height: usize) -> Result<Self> {
        let (x0, y0) = self.origin();
        self.sub_image(&BoxI::new(x0 + x as i32, y0 + y as i32, width, height))
    }

    /// Number of pixels with any of `bits` set.
    pub fn count_mask(&self, bits: MaskPixel) -> usize {
        self.mask.pixels().iter().filter(|&&m| m & bits != 0).count()
    }
}

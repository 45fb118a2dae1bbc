//! Pixel planes with an explicit origin, and masked images built from them.
//!
//! A [`Plane`] is a row-major grid whose lower-left pixel sits at parent
//! coordinate `(x0, y0)`. Local accessors take `usize` offsets from that
//! corner; `*_parent` accessors take parent coordinates.

mod masked;

#[cfg(test)]
mod tests;

use std::fmt::Debug;
use std::ops::{Index, IndexMut};

use crate::error::{PhotometryError, Result};
use crate::geom::BoxI;

pub use masked::{MaskPlane, MaskPixel, MaskedImage, VariancePixel};

/// Numeric pixel representations the measurement code is generic over.
///
/// Implemented for `f32` and `f64`; all arithmetic happens in `f64`.
pub trait Pixel: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
}

impl Pixel for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Pixel for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plane<T> {
    pixels: Vec<T>,
    width: usize,
    height: usize,
    x0: i32,
    y0: i32,
}

impl<T> Plane<T> {
    pub fn new(width: usize, height: usize, pixels: Vec<T>) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixels length must equal width * height"
        );
        Self {
            pixels,
            width,
            height,
            x0: 0,
            y0: 0,
        }
    }

    /// Same plane, relabelled so that its lower-left pixel is `(x0, y0)`.
    pub fn with_origin(mut self, x0: i32, y0: i32) -> Self {
        self.set_origin(x0, y0);
        self
    }

    #[inline]
    pub fn set_origin(&mut self, x0: i32, y0: i32) {
        self.x0 = x0;
        self.y0 = y0;
    }

    #[inline]
    pub fn origin(&self) -> (i32, i32) {
        (self.x0, self.y0)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Parent-coordinate box covered by this plane.
    #[inline]
    pub fn bbox(&self) -> BoxI {
        BoxI::new(self.x0, self.y0, self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        debug_assert!(x < self.width && y < self.height);
        &self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        debug_assert!(x < self.width && y < self.height);
        &mut self.pixels[y * self.width + x]
    }

    /// Local index of a parent coordinate, if it is inside the plane.
    #[inline]
    pub fn local_index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let lx = x - self.x0;
        let ly = y - self.y0;
        (lx >= 0 && ly >= 0 && (lx as usize) < self.width && (ly as usize) < self.height)
            .then_some((lx as usize, ly as usize))
    }

    #[inline]
    pub fn get_parent(&self, x: i32, y: i32) -> Option<&T> {
        self.local_index(x, y).map(|(lx, ly)| self.get(lx, ly))
    }

    #[inline]
    pub fn get_parent_mut(&mut self, x: i32, y: i32) -> Option<&mut T> {
        let (lx, ly) = self.local_index(x, y)?;
        Some(self.get_mut(lx, ly))
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    #[inline]
    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.pixels
    }

    #[inline]
    pub fn into_pixels(self) -> Vec<T> {
        self.pixels
    }
}

impl<T: Clone> Plane<T> {
    pub fn new_filled(width: usize, height: usize, value: T) -> Self {
        Self::new(width, height, vec![value; width * height])
    }

    /// Deep copy of the pixels inside `bbox` (parent coordinates).
    ///
    /// The copy keeps parent coordinates: its origin is the box corner.
    pub fn sub_plane(&self, bbox: &BoxI) -> Result<Plane<T>> {
        if !self.bbox().contains_box(bbox) {
            return Err(PhotometryError::out_of_bounds(*bbox, self.bbox()));
        }
        let lx = (bbox.x_min - self.x0) as usize;
        let ly = (bbox.y_min - self.y0) as usize;
        let (w, h) = bbox.dimensions();
        let mut pixels = Vec::with_capacity(w * h);
        for y in ly..ly + h {
            pixels.extend_from_slice(&self.row(y)[lx..lx + w]);
        }
        Ok(Plane::new(w, h, pixels).with_origin(bbox.x_min, bbox.y_min))
    }

    /// Deep copy of a box given in local (origin-relative) coordinates.
    pub fn sub_plane_local(&self, x: usize, y: usize, width: usize, height: usize) -> Result<Plane<T>> {
        let bbox = BoxI::new(self.x0 + x as i32, self.y0 + y as i32, width, height);
        self.sub_plane(&bbox)
    }
}

impl<T: Default + Clone> Plane<T> {
    pub fn new_default(width: usize, height: usize) -> Self {
        Self::new_filled(width, height, T::default())
    }
}

impl<T: Pixel> Plane<T> {
    /// Sum of all pixels, accumulated in `f64`.
    pub fn sum(&self) -> f64 {
        self.pixels.iter().map(|p| p.to_f64()).sum()
    }

    /// Convert pixel type, keeping shape and origin.
    pub fn convert<U: Pixel>(&self) -> Plane<U> {
        Plane {
            pixels: self.pixels.iter().map(|p| U::from_f64(p.to_f64())).collect(),
            width: self.width,
            height: self.height,
            x0: self.x0,
            y0: self.y0,
        }
    }
}

impl<T> Index<(usize, usize)> for Plane<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.pixels[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Plane<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        &mut self.pixels[y * self.width + x]
    }
}

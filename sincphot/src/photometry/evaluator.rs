use crate::coeffs::CoeffImage;
use crate::error::{PhotometryError, Result};
use crate::footprint::Footprint;
use crate::image::{MaskedImage, Pixel};

/// Weighted sums over one footprint.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ApertureSums {
    /// `Σ w·value`
    pub flux: f64,
    /// `Σ w²·variance`
    pub flux_variance: f64,
    /// Pixels visited.
    pub pixels: usize,
}

/// Applies a weight image to the pixels of a footprint.
///
/// The weight image is indexed relative to the footprint's bounding-box
/// origin, so it must have exactly the bounding box's shape.
#[derive(Debug)]
pub struct ApertureFluxEvaluator<'a> {
    weights: &'a CoeffImage,
    sums: ApertureSums,
}

impl<'a> ApertureFluxEvaluator<'a> {
    pub fn new(weights: &'a CoeffImage) -> Self {
        Self {
            weights,
            sums: ApertureSums::default(),
        }
    }

    /// Sum over `footprint`; running sums start from zero on every call.
    pub fn apply<T: Pixel>(&mut self, footprint: &Footprint, image: &MaskedImage<T>) -> Result<ApertureSums> {
        self.reset(footprint, image)?;

        let bbox = footprint.bbox();
        let values = image.image();
        let variance = image.variance();
        let (ix0, iy0) = image.origin();

        for span in footprint.spans() {
            let wy = (span.y - bbox.y_min) as usize;
            let iy = (span.y - iy0) as usize;
            let weight_row = &self.weights.row(wy)[(span.x0 - bbox.x_min) as usize..=(span.x1 - bbox.x_min) as usize];
            let lx0 = (span.x0 - ix0) as usize;
            let lx1 = (span.x1 - ix0) as usize;
            let value_row = &values.row(iy)[lx0..=lx1];
            let var_row = &variance.row(iy)[lx0..=lx1];

            for ((&w, &v), &var) in weight_row.iter().zip(value_row).zip(var_row) {
                self.sums.flux += w * v.to_f64();
                self.sums.flux_variance += w * w * var as f64;
            }
            self.sums.pixels += span.width();
        }
        Ok(self.sums)
    }

    /// Sums of the most recent [`apply`](Self::apply).
    #[inline]
    pub fn sums(&self) -> ApertureSums {
        self.sums
    }

    fn reset<T: Pixel>(&mut self, footprint: &Footprint, image: &MaskedImage<T>) -> Result<()> {
        self.sums = ApertureSums::default();

        let bbox = footprint.bbox();
        if bbox.dimensions() != self.weights.dimensions() {
            return Err(PhotometryError::SizeMismatch {
                footprint: bbox,
                weight_width: self.weights.width(),
                weight_height: self.weights.height(),
            });
        }
        if !image.bbox().contains_box(&bbox) {
            return Err(PhotometryError::out_of_bounds(bbox, image.bbox()));
        }
        Ok(())
    }
}

//! Sub-pixel image shifts with a separable interpolation kernel.
//!
//! A shift `d` is split into an integer part `⌊d + ½⌋`, applied by moving the
//! origin, and a residual `f ∈ [-½, ½)`, applied by resampling so that
//! `out(p) = in(p - f)`. The resampling weights depend only on `f`, so they
//! are computed once per axis and reused for every pixel.


use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;

use crate::error::{PhotometryError, Result};
use crate::geom::position_to_index;
use crate::image::{MaskPixel, MaskPlane, MaskedImage, Pixel, Plane};
use crate::math::lanczos;

/// Rows per parallel chunk in the horizontal pass.
const ROWS_PER_CHUNK: usize = 32;

/// Interpolation kernel used for sub-pixel shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WarpingKernel {
    /// Integer shift only; the residual is dropped.
    Nearest,
    Bilinear,
    /// Lanczos of order `n` (`n ≥ 1`), support `2n` pixels.
    Lanczos(u32),
}

impl Default for WarpingKernel {
    fn default() -> Self {
        Self::Lanczos(4)
    }
}

impl WarpingKernel {
    /// Taps on each side of the centre.
    #[inline]
    pub fn half_width(&self) -> usize {
        match self {
            Self::Nearest => 0,
            Self::Bilinear => 1,
            Self::Lanczos(n) => *n as usize,
        }
    }

    /// Full kernel width in pixels.
    #[inline]
    pub fn size(&self) -> usize {
        2 * self.half_width() + 1
    }

    /// Kernel value at distance `x`.
    pub fn value(&self, x: f64) -> f64 {
        match self {
            Self::Nearest => {
                if x.abs() < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Bilinear => (1.0 - x.abs()).max(0.0),
            Self::Lanczos(n) => lanczos(x, *n as f64),
        }
    }

    /// Normalised weights for a residual shift `frac`; entry `m + half_width`
    /// multiplies the input pixel at offset `m`.
    pub fn weights(&self, frac: f64) -> Vec<f64> {
        let a = self.half_width() as i32;
        let mut w: Vec<f64> = (-a..=a).map(|m| self.value(m as f64 + frac)).collect();
        let sum: f64 = w.iter().sum();
        if sum != 0.0 {
            w.iter_mut().for_each(|v| *v /= sum);
        }
        w
    }
}

impl fmt::Display for WarpingKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => f.write_str("nearest"),
            Self::Bilinear => f.write_str("bilinear"),
            Self::Lanczos(n) => write!(f, "lanczos{n}"),
        }
    }
}

impl FromStr for WarpingKernel {
    type Err = PhotometryError;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || PhotometryError::UnknownWarpingKernel(s.to_string());
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "bilinear" => Ok(Self::Bilinear),
            other => {
                let order = other.strip_prefix("lanczos").ok_or_else(unknown)?;
                match order.parse::<u32>() {
                    Ok(n) if n >= 1 => Ok(Self::Lanczos(n)),
                    _ => Err(unknown()),
                }
            }
        }
    }
}

impl TryFrom<String> for WarpingKernel {
    type Error = PhotometryError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<WarpingKernel> for String {
    fn from(kernel: WarpingKernel) -> Self {
        kernel.to_string()
    }
}

/// Per-axis resampling plan for one shift.
#[derive(Debug, Clone)]
struct AxisShift {
    integer: i32,
    weights: Vec<f64>,
}

impl AxisShift {
    fn new(d: f64, kernel: WarpingKernel) -> Self {
        let (integer, frac) = position_to_index(d);
        let weights = match kernel {
            WarpingKernel::Nearest => vec![1.0],
            _ if frac == 0.0 => Vec::new(),
            _ => kernel.weights(frac),
        };
        Self { integer, weights }
    }

    /// True when no resampling is needed along this axis.
    #[inline]
    fn is_identity(&self) -> bool {
        self.weights.len() <= 1
    }
}

/// Shift a plane by `(dx, dy)` pixels.
///
/// Pixels within the kernel half-width of the border are copied unshifted.
pub fn offset_plane<T: Pixel>(plane: &Plane<T>, dx: f64, dy: f64, kernel: WarpingKernel) -> Result<Plane<T>> {
    let sx = AxisShift::new(dx, kernel);
    let sy = AxisShift::new(dy, kernel);
    let (x0, y0) = plane.origin();

    if sx.is_identity() && sy.is_identity() {
        return Ok(plane.clone().with_origin(x0 + sx.integer, y0 + sy.integer));
    }
    check_size(plane.width(), plane.height(), kernel)?;

    let a = kernel.half_width();
    let values = resample(plane, &sx.weights, &sy.weights, a, |v| v.to_f64());
    let pixels = merge_interior(plane, values, a, T::from_f64);
    Ok(Plane::new(plane.width(), plane.height(), pixels).with_origin(x0 + sx.integer, y0 + sy.integer))
}

/// Shift a masked image by `(dx, dy)` pixels.
///
/// Variance is resampled with squared weights; a mask pixel is the OR of the
/// input pixels that contribute with non-zero weight. Border pixels within the
/// kernel half-width are copied unshifted and flagged `EDGE`.
pub fn offset_image<T: Pixel>(
    image: &MaskedImage<T>,
    dx: f64,
    dy: f64,
    kernel: WarpingKernel,
) -> Result<MaskedImage<T>> {
    let sx = AxisShift::new(dx, kernel);
    let sy = AxisShift::new(dy, kernel);
    let (x0, y0) = image.origin();
    let origin = (x0 + sx.integer, y0 + sy.integer);

    if sx.is_identity() && sy.is_identity() {
        return Ok(image.clone().with_origin(origin.0, origin.1));
    }
    check_size(image.width(), image.height(), kernel)?;

    let a = kernel.half_width();
    let wx2: Vec<f64> = sx.weights.iter().map(|w| w * w).collect();
    let wy2: Vec<f64> = sy.weights.iter().map(|w| w * w).collect();

    let values = resample(image.image(), &sx.weights, &sy.weights, a, |v| v.to_f64());
    let variance = resample(image.variance(), &wx2, &wy2, a, |v| v as f64);
    let mask = or_mask(image.mask(), &sx.weights, &sy.weights, a);

    let values = merge_interior(image.image(), values, a, T::from_f64);
    let variance = merge_interior(image.variance(), variance, a, |v| v as f32);
    let mut mask = merge_interior(image.mask(), mask, a, |m| m);

    let (w, h) = image.dimensions();
    let edge = MaskPlane::Edge.bit();
    for y in 0..h {
        for x in 0..w {
            if in_border(x, y, w, h, a) {
                mask[y * w + x] |= edge;
            }
        }
    }

    Ok(MaskedImage::from_planes(
        Plane::new(w, h, values),
        Plane::new(w, h, variance),
        Plane::new(w, h, mask),
    )
    .with_origin(origin.0, origin.1))
}

fn check_size(width: usize, height: usize, kernel: WarpingKernel) -> Result<()> {
    let size = kernel.size();
    if width < size || height < size {
        return Err(PhotometryError::KernelTooLarge { width, height, size });
    }
    Ok(())
}

#[inline]
fn in_border(x: usize, y: usize, w: usize, h: usize, a: usize) -> bool {
    x < a || y < a || x + a >= w || y + a >= h
}

/// Expand an empty weight list (no residual on that axis) to the identity.
fn axis_weights(weights: &[f64], a: usize) -> Vec<f64> {
    if weights.is_empty() {
        let mut w = vec![0.0; 2 * a + 1];
        w[a] = 1.0;
        w
    } else {
        weights.to_vec()
    }
}

/// Separable resampling of the interior; border entries are left at zero.
fn resample<T: Copy + Sync>(
    plane: &Plane<T>,
    wx: &[f64],
    wy: &[f64],
    a: usize,
    to_f64: impl Fn(T) -> f64 + Sync,
) -> Vec<f64> {
    let (w, h) = plane.dimensions();
    let wx = axis_weights(wx, a);
    let wy = axis_weights(wy, a);

    // Horizontal pass over every row.
    let mut horizontal = vec![0.0; w * h];
    horizontal
        .par_chunks_mut(w * ROWS_PER_CHUNK)
        .enumerate()
        .for_each(|(chunk, rows)| {
            for (r, out_row) in rows.chunks_exact_mut(w).enumerate() {
                let row = plane.row(chunk * ROWS_PER_CHUNK + r);
                for x in a..w - a {
                    out_row[x] = row[x - a..=x + a]
                        .iter()
                        .zip(&wx)
                        .map(|(&v, &k)| to_f64(v) * k)
                        .sum();
                }
            }
        });

    // Vertical pass over the interior.
    let mut out = vec![0.0; w * h];
    for y in a..h - a {
        for (k, &wk) in wy.iter().enumerate() {
            if wk == 0.0 {
                continue;
            }
            let src = &horizontal[(y + k - a) * w..(y + k - a + 1) * w];
            let dst = &mut out[y * w..(y + 1) * w];
            for x in a..w - a {
                dst[x] += wk * src[x];
            }
        }
    }
    out
}

/// OR of mask bits over taps with non-zero weight.
fn or_mask(mask: &Plane<MaskPixel>, wx: &[f64], wy: &[f64], a: usize) -> Vec<MaskPixel> {
    let (w, h) = mask.dimensions();
    let wx = axis_weights(wx, a);
    let wy = axis_weights(wy, a);
    let taps_x: Vec<usize> = (0..wx.len()).filter(|&k| wx[k] != 0.0).collect();
    let taps_y: Vec<usize> = (0..wy.len()).filter(|&k| wy[k] != 0.0).collect();

    let mut horizontal = vec![0; w * h];
    for y in 0..h {
        let row = mask.row(y);
        for x in a..w - a {
            horizontal[y * w + x] = taps_x.iter().fold(0, |acc, &k| acc | row[x + k - a]);
        }
    }

    let mut out = vec![0; w * h];
    for y in a..h - a {
        for x in a..w - a {
            out[y * w + x] = taps_y
                .iter()
                .fold(0, |acc, &k| acc | horizontal[(y + k - a) * w + x]);
        }
    }
    out
}

/// Interior from `resampled`, border copied from `plane`.
fn merge_interior<T: Copy, U: Copy>(
    plane: &Plane<T>,
    resampled: Vec<U>,
    a: usize,
    convert: impl Fn(U) -> T,
) -> Vec<T> {
    let (w, h) = plane.dimensions();
    plane
        .pixels()
        .iter()
        .zip(resampled)
        .enumerate()
        .map(|(idx, (&orig, new))| {
            if in_border(idx % w, idx / w, w, h, a) {
                orig
            } else {
                convert(new)
            }
        })
        .collect()
}

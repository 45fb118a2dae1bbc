//! Footprints: pixel sets stored as sorted horizontal spans.
//!
//! A footprint is the set of pixels a measurement sums over, or the region
//! covered by a detected object. Spans are kept sorted by `(y, x0)` and
//! merged, so containment tests are a binary search.

mod detect;

#[cfg(test)]
mod tests;

use crate::geom::BoxI;
use crate::image::{MaskPixel, Plane};

pub use detect::{Connectivity, FootprintSet};

/// Run of pixels `x0..=x1` on row `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub y: i32,
    pub x0: i32,
    pub x1: i32,
}

impl Span {
    #[inline]
    pub fn new(y: i32, x0: i32, x1: i32) -> Self {
        debug_assert!(x0 <= x1, "span must be non-empty: {x0}..={x1}");
        Self { y, x0, x1 }
    }

    /// Number of pixels in the span.
    #[inline]
    pub fn width(&self) -> usize {
        (self.x1 - self.x0 + 1) as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footprint {
    spans: Vec<Span>,
    bbox: BoxI,
}

impl Footprint {
    /// Build from arbitrary spans; overlapping or touching spans on the same
    /// row are merged. Returns `None` if no spans are given.
    pub fn from_spans(mut spans: Vec<Span>) -> Option<Self> {
        if spans.is_empty() {
            return None;
        }
        spans.sort_unstable();

        let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if last.y == span.y && span.x0 <= last.x1 + 1 => {
                    last.x1 = last.x1.max(span.x1);
                }
                _ => merged.push(span),
            }
        }

        let bbox = merged
            .iter()
            .map(|s| BoxI::from_corners((s.x0, s.y), (s.x1, s.y)))
            .reduce(|a, b| a.union(&b))?;

        Some(Self {
            spans: merged,
            bbox,
        })
    }

    /// Footprint covering every pixel of `bbox`.
    pub fn from_box(bbox: BoxI) -> Self {
        let spans = (bbox.y_min..=bbox.y_max)
            .map(|y| Span::new(y, bbox.x_min, bbox.x_max))
            .collect();
        Self { spans, bbox }
    }

    #[inline]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    #[inline]
    pub fn bbox(&self) -> BoxI {
        self.bbox
    }

    /// Number of pixels.
    pub fn area(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        if !self.bbox.contains(x, y) {
            return false;
        }
        // First span past (y, x); the candidate is the one before it.
        let idx = self.spans.partition_point(|s| (s.y, s.x0) <= (y, x));
        idx > 0 && {
            let s = &self.spans[idx - 1];
            s.y == y && x <= s.x1
        }
    }

    /// Iterate over all pixel coordinates in span order.
    pub fn pixels(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.spans
            .iter()
            .flat_map(|s| (s.x0..=s.x1).map(move |x| (x, s.y)))
    }

    /// Isotropic growth: every pixel within Euclidean distance `n` of the
    /// footprint is added (Minkowski sum with a digital disk).
    pub fn grown(&self, n: u32) -> Self {
        if n == 0 {
            return self.clone();
        }
        let n = n as i32;
        let half_widths: Vec<i32> = (-n..=n)
            .map(|dy| ((n * n - dy * dy) as f64).sqrt().floor() as i32)
            .collect();

        let mut spans = Vec::with_capacity(self.spans.len() * half_widths.len());
        for s in &self.spans {
            for (dy, &hw) in (-n..=n).zip(&half_widths) {
                spans.push(Span::new(s.y + dy, s.x0 - hw, s.x1 + hw));
            }
        }
        // Non-empty input always yields spans.
        Self::from_spans(spans).unwrap_or_else(|| self.clone())
    }

    /// Copy with only the pixels inside `bbox`, or `None` if nothing remains.
    pub fn clipped_to(&self, bbox: &BoxI) -> Option<Self> {
        let spans = self
            .spans
            .iter()
            .filter(|s| s.y >= bbox.y_min && s.y <= bbox.y_max)
            .filter_map(|s| {
                let x0 = s.x0.max(bbox.x_min);
                let x1 = s.x1.min(bbox.x_max);
                (x0 <= x1).then(|| Span::new(s.y, x0, x1))
            })
            .collect();
        Self::from_spans(spans)
    }

    /// OR `bits` into every footprint pixel that lies inside `mask`.
    pub fn set_mask(&self, mask: &mut Plane<MaskPixel>, bits: MaskPixel) {
        let region = mask.bbox();
        let (x_origin, y_origin) = mask.origin();
        for s in &self.spans {
            if s.y < region.y_min || s.y > region.y_max {
                continue;
            }
            let x0 = s.x0.max(region.x_min);
            let x1 = s.x1.min(region.x_max);
            let ly = (s.y - y_origin) as usize;
            for x in x0..=x1 {
                *mask.get_mut((x - x_origin) as usize, ly) |= bits;
            }
        }
    }
}

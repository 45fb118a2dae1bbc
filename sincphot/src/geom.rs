//! Integer bounding boxes in parent pixel coordinates.

use std::fmt;

/// Axis-aligned integer box with inclusive bounds.
///
/// Coordinates are parent-image pixel indices and may be negative: a
/// coefficient image centred on the origin starts at `(-w/2, -h/2)`.
/// A box always holds at least one pixel; empty results are expressed as
/// `Option<BoxI>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct BoxI {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl BoxI {
    /// Box with lower-left corner `(x0, y0)` and the given extent.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero.
    #[inline]
    pub fn new(x0: i32, y0: i32, width: usize, height: usize) -> Self {
        assert!(
            width > 0 && height > 0,
            "box must be non-empty, got {}x{}",
            width,
            height
        );
        Self {
            x_min: x0,
            y_min: y0,
            x_max: x0 + width as i32 - 1,
            y_max: y0 + height as i32 - 1,
        }
    }

    /// Box spanning two inclusive corners, in any order.
    #[inline]
    pub fn from_corners(a: (i32, i32), b: (i32, i32)) -> Self {
        Self {
            x_min: a.0.min(b.0),
            y_min: a.1.min(b.1),
            x_max: a.0.max(b.0),
            y_max: a.1.max(b.1),
        }
    }

    #[inline]
    pub const fn width(&self) -> usize {
        (self.x_max - self.x_min + 1) as usize
    }

    #[inline]
    pub const fn height(&self) -> usize {
        (self.y_max - self.y_min + 1) as usize
    }

    #[inline]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    #[inline]
    pub const fn origin(&self) -> (i32, i32) {
        (self.x_min, self.y_min)
    }

    #[inline]
    pub const fn area(&self) -> usize {
        self.width() * self.height()
    }

    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// `true` if `other` lies entirely inside this box.
    #[inline]
    pub const fn contains_box(&self, other: &BoxI) -> bool {
        other.x_min >= self.x_min
            && other.x_max <= self.x_max
            && other.y_min >= self.y_min
            && other.y_max <= self.y_max
    }

    /// Overlap of two boxes, or `None` when they are disjoint.
    pub fn intersection(&self, other: &BoxI) -> Option<BoxI> {
        let x_min = self.x_min.max(other.x_min);
        let y_min = self.y_min.max(other.y_min);
        let x_max = self.x_max.min(other.x_max);
        let y_max = self.y_max.min(other.y_max);
        (x_min <= x_max && y_min <= y_max).then_some(BoxI {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BoxI) -> BoxI {
        BoxI {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    #[inline]
    pub fn shifted(&self, dx: i32, dy: i32) -> BoxI {
        BoxI {
            x_min: self.x_min + dx,
            y_min: self.y_min + dy,
            x_max: self.x_max + dx,
            y_max: self.y_max + dy,
        }
    }

    /// Grow (positive) or shrink (negative) every side by `n` pixels.
    ///
    /// Returns `None` when shrinking consumes the whole box.
    pub fn grown(&self, n: i32) -> Option<BoxI> {
        let b = BoxI {
            x_min: self.x_min - n,
            y_min: self.y_min - n,
            x_max: self.x_max + n,
            y_max: self.y_max + n,
        };
        (b.x_min <= b.x_max && b.y_min <= b.y_max).then_some(b)
    }

    /// Iterate over all pixel coordinates, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (self.y_min..=self.y_max).flat_map(move |y| (self.x_min..=self.x_max).map(move |x| (x, y)))
    }
}

impl fmt::Display for BoxI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) -- ({}, {}) [{}x{}]",
            self.x_min,
            self.y_min,
            self.x_max,
            self.y_max,
            self.width(),
            self.height()
        )
    }
}

/// Nearest pixel index for a fractional position, and the residual offset.
///
/// Pixel `i` covers `[i - 0.5, i + 0.5)`, so the index is `floor(x + 0.5)` and
/// the residual lies in `[-0.5, 0.5)`.
#[inline]
pub fn position_to_index(x: f64) -> (i32, f64) {
    let index = (x + 0.5).floor();
    (index as i32, x - index)
}

use std::cmp::Ordering;

/// Tolerant comparisons for floating point values.
///
/// Both use the type's machine epsilon and are meant for keys that must not
/// miss because of float noise.
pub trait FloatExt: Copy {
    /// `true` when the values differ by less than machine epsilon.
    fn machine_eq(self, other: Self) -> bool;

    /// Total-ish ordering that treats machine-epsilon neighbours as equal.
    fn fuzzy_cmp(self, other: Self) -> Ordering;
}

impl FloatExt for f32 {
    fn machine_eq(self, other: Self) -> bool {
        (self - other).abs() < f32::EPSILON
    }

    fn fuzzy_cmp(self, other: Self) -> Ordering {
        if self.machine_eq(other) {
            Ordering::Equal
        } else if self < other {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

impl FloatExt for f64 {
    fn machine_eq(self, other: Self) -> bool {
        (self - other).abs() < f64::EPSILON
    }

    fn fuzzy_cmp(self, other: Self) -> Ordering {
        if self.machine_eq(other) {
            Ordering::Equal
        } else if self < other {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

use thiserror::Error;

use crate::geom::BoxI;

/// Errors raised by photometry and stamp extraction.
///
/// Every error is a per-call failure: a caller measuring many sources marks
/// the failing source and carries on with the rest.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhotometryError {
    /// Aperture radii or taper width are unusable.
    #[error("invalid aperture parameters: {reason} (inner={inner:.2}, outer={outer:.2})")]
    InvalidParameter {
        reason: &'static str,
        inner: f64,
        outer: f64,
    },

    /// Footprint bounding box and coefficient image disagree in shape.
    #[error(
        "footprint at {footprint} is wrong size for {weight_width}x{weight_height} weight image"
    )]
    SizeMismatch {
        footprint: BoxI,
        weight_width: usize,
        weight_height: usize,
    },

    /// A requested region extends past the image it is cut from.
    #[error("region {requested} is not inside image {available}{}", format_context(.context))]
    OutOfBounds {
        requested: BoxI,
        available: BoxI,
        /// Innermost first; appended as the error travels outwards.
        context: Vec<String>,
    },

    #[error("stamp size {width}x{height} must be non-empty")]
    EmptyStamp { width: usize, height: usize },

    #[error("unknown warping kernel '{0}'")]
    UnknownWarpingKernel(String),

    #[error("image {width}x{height} is smaller than the {size}x{size} warping kernel")]
    KernelTooLarge {
        width: usize,
        height: usize,
        size: usize,
    },
}

impl PhotometryError {
    pub(crate) fn out_of_bounds(requested: BoxI, available: BoxI) -> Self {
        Self::OutOfBounds {
            requested,
            available,
            context: Vec::new(),
        }
    }

    /// Attach a description of what the caller was doing.
    ///
    /// Only [`PhotometryError::OutOfBounds`] carries context; other variants
    /// are returned unchanged.
    pub fn add_context(mut self, message: impl Into<String>) -> Self {
        if let Self::OutOfBounds { context, .. } = &mut self {
            context.push(message.into());
        }
        self
    }
}

fn format_context(context: &[String]) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(" ({})", context.join("; "))
    }
}

pub type Result<T> = std::result::Result<T, PhotometryError>;

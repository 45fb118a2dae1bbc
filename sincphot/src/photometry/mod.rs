//! Aperture fluxes measured with sinc-interpolated coefficient images.
//!
//! [`SincPhotometry`] moves a cached coefficient image onto a source centre
//! and hands it to an [`ApertureFluxEvaluator`], which forms the weighted sum
//! of the pixels and of their variances.

mod evaluator;
mod sinc;


pub use evaluator::{ApertureFluxEvaluator, ApertureSums};
pub use sinc::{FluxMeasurement, Peak, SincFluxConfig, SincPhotometry};

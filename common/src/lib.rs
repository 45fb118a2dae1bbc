//! Small numeric helpers shared across the workspace.

pub mod float_ext;

pub use float_ext::FloatExt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::geom::BoxI;
use crate::image::{MaskedImage, Pixel};

/// Process-wide stamp geometry shared by all PSF candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampConfig {
    /// Stamp width when a candidate has no size of its own.
    pub default_width: usize,
    /// Stamp height when a candidate has no size of its own.
    pub default_height: usize,
    /// Pixels at the stamp edge excluded from fitting.
    pub border_width: usize,
}

impl StampConfig {
    pub const DEFAULT: Self = Self {
        default_width: 21,
        default_height: 21,
        border_width: 0,
    };

    /// Current process-wide configuration.
    pub fn get() -> Self {
        *STAMP_CONFIG.read()
    }

    /// Replace the process-wide configuration. Stamps already cached by a
    /// candidate keep the geometry they were extracted with.
    pub fn set(config: Self) {
        tracing::debug!(?config, "stamp config updated");
        *STAMP_CONFIG.write() = config;
    }

    /// Part of `stamp` inside the border, or `None` if the border eats the
    /// whole stamp.
    pub fn usable_region<T: Pixel>(&self, stamp: &MaskedImage<T>) -> Option<BoxI> {
        stamp.bbox().grown(-(self.border_width as i32))
    }
}

impl Default for StampConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

static STAMP_CONFIG: RwLock<StampConfig> = RwLock::new(StampConfig::DEFAULT);

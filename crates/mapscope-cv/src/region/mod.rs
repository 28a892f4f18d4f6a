//! Minimap region location
//!
//! Two interchangeable strategies produce the minimap bounding box from a
//! bounded search window; a one-shot cache turns the per-frame search into
//! an O(1) crop once the position is known.

pub mod cache;
pub mod contour;
pub mod template;

pub use cache::LockedRegionCache;
pub use contour::ContourLocator;
pub use template::TemplateLocator;

use crate::Result;
use crate::bbox::BBox;
use opencv::core::Mat;

/// Strategy seam for locating the minimap inside a full frame.
///
/// Implementations only ever inspect their configured search window and
/// return boxes in full-frame coordinates. `None` means "not on screen yet";
/// the caller retries on the next frame.
pub trait RegionLocator {
    fn locate(&self, frame: &Mat) -> Result<Option<BBox>>;
}

//! Contour-based minimap location
//!
//! The minimap is a small, wide, sharply-bordered rectangle that stands out
//! from surrounding content purely by edge geometry, so no color assumption
//! is needed and theme changes do not break detection.

use super::RegionLocator;
use crate::Result;
use crate::bbox::BBox;
use crate::config::{ContourFilter, SearchWindow};
use crate::utils::ImageUtils;
use opencv::core::{Mat, Point, Vector};
use opencv::imgproc;

/// Edge detection + bounding-box geometric filter over the search window
#[derive(Debug, Clone)]
pub struct ContourLocator {
    window: SearchWindow,
    filter: ContourFilter,
}

impl ContourLocator {
    pub fn new(window: SearchWindow, filter: ContourFilter) -> Self {
        Self { window, filter }
    }
}

impl RegionLocator for ContourLocator {
    fn locate(&self, frame: &Mat) -> Result<Option<BBox>> {
        let search = ImageUtils::crop(frame, &self.window.to_bbox())?;
        let gray = ImageUtils::to_grayscale(&search)?;

        let mut edges = Mat::default();
        imgproc::canny(
            &gray,
            &mut edges,
            self.filter.canny_low,
            self.filter.canny_high,
            3,
            false,
        )?;

        let mut contours = Vector::<Vector<Point>>::new();
        imgproc::find_contours(
            &edges,
            &mut contours,
            imgproc::RETR_EXTERNAL,
            imgproc::CHAIN_APPROX_SIMPLE,
            Point::new(0, 0),
        )?;

        // First rectangle passing the filter wins; enumeration order is the
        // accepted tie-break.
        for contour in contours.iter() {
            let rect = imgproc::bounding_rect(&contour)?;
            if self.filter.accepts(&rect) {
                return Ok(Some(
                    BBox::from_rect(rect).translate(self.window.x, self.window.y),
                ));
            }
        }

        Ok(None)
    }
}

//! Template-based minimap location
//!
//! Normalized cross-correlation against a pre-captured grayscale reference.
//! Matching locks onto a stable visual signature rather than a silhouette,
//! which suits targets with consistent pixel content such as an icon or a
//! fixed decorative frame.

use super::RegionLocator;
use crate::Result;
use crate::bbox::BBox;
use crate::config::{ConfigError, SearchWindow};
use crate::utils::ImageUtils;
use anyhow::ensure;
use opencv::core::{self, Mat, Point};
use opencv::imgproc;
use opencv::prelude::*;
use std::path::Path;

/// Single-best-match template locator over the search window.
///
/// There is no score threshold: the global maximum is always reported, and
/// callers validate the result against the known template dimensions.
pub struct TemplateLocator {
    window: SearchWindow,
    template: Mat,
}

impl TemplateLocator {
    /// Build from an in-memory grayscale template
    pub fn new(template: Mat, window: SearchWindow) -> Result<Self> {
        ensure!(!template.empty(), "template image is empty");
        let (width, height) = (template.cols(), template.rows());
        if width > window.width || height > window.height {
            return Err(ConfigError::TemplateTooLarge {
                width,
                height,
                window,
            }
            .into());
        }
        Ok(Self { window, template })
    }

    /// Load the reference image from disk, once, at startup
    pub fn from_file<P: AsRef<Path>>(path: P, window: SearchWindow) -> Result<Self> {
        let template = ImageUtils::load_grayscale(&path)?;
        Self::new(template, window)
    }

    /// Dimensions of the reference image, which are also the dimensions of
    /// every returned box
    pub fn template_size(&self) -> (i32, i32) {
        (self.template.cols(), self.template.rows())
    }
}

impl RegionLocator for TemplateLocator {
    fn locate(&self, frame: &Mat) -> Result<Option<BBox>> {
        let search = ImageUtils::crop(frame, &self.window.to_bbox())?;
        let gray = ImageUtils::to_grayscale(&search)?;

        let mut scores = Mat::default();
        imgproc::match_template(
            &gray,
            &self.template,
            &mut scores,
            imgproc::TM_CCOEFF_NORMED,
            &core::no_array(),
        )?;

        let mut max_score = 0f64;
        let mut max_loc = Point::default();
        core::min_max_loc(
            &scores,
            None,
            Some(&mut max_score),
            None,
            Some(&mut max_loc),
            &core::no_array(),
        )?;
        log::debug!(
            "template match peak {:.3} at ({}, {})",
            max_score,
            max_loc.x,
            max_loc.y
        );

        let (width, height) = self.template_size();
        Ok(Some(
            BBox::new(max_loc.x, max_loc.y, width, height)
                .translate(self.window.x, self.window.y),
        ))
    }
}

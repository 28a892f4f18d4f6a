//! Marker icon localization
//!
//! Each marker is a distinctly colored icon inside the minimap. Localization
//! builds an HSV in-range mask per configured color and reports the centroid
//! of the matching pixels. Centroid averaging assumes one contiguous blob per
//! marker; overlapping same-colored icons are averaged together.

use crate::Result;
use crate::bbox::BBox;
use crate::utils::ImageUtils;
use opencv::core::{self, Mat, Point, Scalar, Vector};
use serde::{Deserialize, Serialize};

/// A named marker identity with inclusive HSV bounds (OpenCV scale, hue 0-179)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerColorSpec {
    pub name: String,
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl MarkerColorSpec {
    pub fn new(name: &str, lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self {
            name: name.to_string(),
            lower,
            upper,
        }
    }

    /// The yellow/orange player icon
    pub fn player() -> Self {
        Self::new("player", [26, 100, 200], [31, 255, 255])
    }

    /// The magenta companion icon
    pub fn companion() -> Self {
        Self::new("companion", [135, 100, 170], [149, 160, 255])
    }

    /// Marker set tracked by default
    pub fn default_set() -> Vec<Self> {
        vec![Self::player(), Self::companion()]
    }

    /// Bounds are ordered per channel and hue stays on the OpenCV 0-179 scale
    pub fn bounds_valid(&self) -> bool {
        self.lower.iter().zip(&self.upper).all(|(lo, hi)| lo <= hi) && self.upper[0] <= 179
    }

    fn lower_scalar(&self) -> Scalar {
        Scalar::new(
            self.lower[0] as f64,
            self.lower[1] as f64,
            self.lower[2] as f64,
            0.0,
        )
    }

    fn upper_scalar(&self) -> Scalar {
        Scalar::new(
            self.upper[0] as f64,
            self.upper[1] as f64,
            self.upper[2] as f64,
            0.0,
        )
    }
}

/// Integer centroid of a marker, in the coordinate space of the sub-region
/// it was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerPosition {
    pub x: i32,
    pub y: i32,
}

impl MarkerPosition {
    /// Named conversion from sub-region coordinates into full-frame
    /// coordinates, given the sub-region's bounding box.
    pub fn to_frame(&self, region: &BBox) -> MarkerPosition {
        MarkerPosition {
            x: self.x + region.x,
            y: self.y + region.y,
        }
    }
}

/// Locates every configured marker color inside a BGR sub-region
#[derive(Debug, Clone)]
pub struct MarkerLocator {
    specs: Vec<MarkerColorSpec>,
}

impl MarkerLocator {
    pub fn new(specs: Vec<MarkerColorSpec>) -> Self {
        Self { specs }
    }

    pub fn specs(&self) -> &[MarkerColorSpec] {
        &self.specs
    }

    /// Locate a single marker color. `None` means no pixel in the sub-region
    /// fell inside the color bounds, which callers must treat as "currently
    /// off-screen or occluded", not as a failure.
    pub fn locate(&self, region: &Mat, spec: &MarkerColorSpec) -> Result<Option<MarkerPosition>> {
        let hsv = ImageUtils::to_hsv(region)?;
        let mask = color_mask(&hsv, spec)?;
        mask_centroid(&mask)
    }

    /// Locate every configured marker independently, converting to HSV once.
    /// Results keep the configuration order.
    pub fn locate_all(&self, region: &Mat) -> Result<Vec<(String, Option<MarkerPosition>)>> {
        let hsv = ImageUtils::to_hsv(region)?;
        self.specs
            .iter()
            .map(|spec| {
                let mask = color_mask(&hsv, spec)?;
                Ok((spec.name.clone(), mask_centroid(&mask)?))
            })
            .collect()
    }
}

/// Binary mask of HSV pixels within the spec's inclusive bounds
fn color_mask(hsv: &Mat, spec: &MarkerColorSpec) -> Result<Mat> {
    let mut mask = Mat::default();
    core::in_range(
        hsv,
        &spec.lower_scalar(),
        &spec.upper_scalar(),
        &mut mask,
    )?;
    Ok(mask)
}

/// Arithmetic mean of the set pixel coordinates, truncated to integers
fn mask_centroid(mask: &Mat) -> Result<Option<MarkerPosition>> {
    let mut points = Vector::<Point>::new();
    core::find_non_zero(mask, &mut points)?;
    if points.is_empty() {
        return Ok(None);
    }
    let mut sum_x = 0i64;
    let mut sum_y = 0i64;
    for point in points.iter() {
        sum_x += point.x as i64;
        sum_y += point.y as i64;
    }
    let count = points.len() as i64;
    Ok(Some(MarkerPosition {
        x: (sum_x / count) as i32,
        y: (sum_y / count) as i32,
    }))
}

//! Image processing utilities
//!
//! Thin wrappers over the OpenCV calls the rest of the crate shares, plus
//! conversion from `image`-crate buffers for capture integrations that
//! deliver RGB frames.

use crate::Result;
use crate::bbox::BBox;
use anyhow::{Context, ensure};
use opencv::core::{CV_8UC3, Mat, Scalar, Vec3b};
use opencv::prelude::*;
use opencv::{imgcodecs, imgproc};
use std::path::Path;

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Convert a BGR frame to single-channel luminance
    pub fn to_grayscale(frame: &Mat) -> Result<Mat> {
        let mut gray = Mat::default();
        imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)
            .context("grayscale conversion failed")?;
        Ok(gray)
    }

    /// Convert a BGR frame to hue/saturation/value color space
    pub fn to_hsv(frame: &Mat) -> Result<Mat> {
        let mut hsv = Mat::default();
        imgproc::cvt_color(frame, &mut hsv, imgproc::COLOR_BGR2HSV, 0)
            .context("HSV conversion failed")?;
        Ok(hsv)
    }

    /// Copy out the sub-region covered by `region`
    pub fn crop(frame: &Mat, region: &BBox) -> Result<Mat> {
        let roi = Mat::roi(frame, region.to_rect()).with_context(|| {
            format!(
                "region {:?} lies outside the {}x{} frame",
                region,
                frame.cols(),
                frame.rows()
            )
        })?;
        roi.try_clone().context("failed to copy cropped region")
    }

    /// Load an image file as a grayscale Mat
    pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<Mat> {
        let path_str = path.as_ref().to_string_lossy();
        let mat = imgcodecs::imread(&path_str, imgcodecs::IMREAD_GRAYSCALE)
            .with_context(|| format!("failed to load grayscale image: {}", path_str))?;
        ensure!(!mat.empty(), "image {} is empty or could not be decoded", path_str);
        Ok(mat)
    }

    /// Convert an `image::RgbImage` into the BGR Mat layout used everywhere else
    pub fn rgb_to_bgr_mat(rgb_image: &image::RgbImage) -> Result<Mat> {
        let (width, height) = rgb_image.dimensions();
        let mut mat = Mat::new_rows_cols_with_default(
            height as i32,
            width as i32,
            CV_8UC3,
            Scalar::all(0.0),
        )?;
        for (x, y, pixel) in rgb_image.enumerate_pixels() {
            *mat.at_2d_mut::<Vec3b>(y as i32, x as i32)? =
                Vec3b::from([pixel[2], pixel[1], pixel[0]]);
        }
        Ok(mat)
    }
}

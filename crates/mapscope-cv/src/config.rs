//! Tracker configuration
//!
//! All values are load-time constants: the session validates them once at
//! construction and never mutates them afterwards.

use crate::bbox::{BBox, ExpandMargins};
use crate::marker::MarkerColorSpec;
use anyhow::Context;
use opencv::core::Rect;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Expected capture resolution. Every frame must match it exactly.
    pub frame_width: i32,
    pub frame_height: i32,
    /// Region of the frame in which initial minimap detection is attempted
    pub search_window: SearchWindow,
    /// Which locator strategy establishes the minimap position
    pub locator: LocatorStrategy,
    pub contour_filter: ContourFilter,
    pub blackout: BlackoutConfig,
    /// Marker icons to track inside the minimap, in reporting order
    pub markers: Vec<MarkerColorSpec>,
    /// Optional extension of the locked region before marker extraction
    pub expand: Option<ExpandMargins>,
}

/// Fixed rectangle within which the minimap is searched for.
///
/// Kept small so detection stays cheap and false positives elsewhere on
/// screen are impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl SearchWindow {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn to_bbox(&self) -> BBox {
        BBox::new(self.x, self.y, self.width, self.height)
    }
}

/// Strategy used to locate the minimap inside the search window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorStrategy {
    /// Edge geometry only: robust to theme or skin changes
    Contour,
    /// Normalized cross-correlation against a pre-captured reference image
    Template { path: PathBuf },
}

/// Geometric filter applied to contour bounding rectangles
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContourFilter {
    pub min_width: i32,
    pub min_height: i32,
    pub min_aspect: f64,
    /// Canny hysteresis thresholds
    pub canny_low: f64,
    pub canny_high: f64,
}

impl ContourFilter {
    /// Whether a contour bounding rectangle looks like the minimap frame
    pub fn accepts(&self, rect: &Rect) -> bool {
        rect.width > self.min_width
            && rect.height > self.min_height
            && rect.width as f64 / rect.height as f64 > self.min_aspect
    }
}

impl Default for ContourFilter {
    fn default() -> Self {
        Self {
            min_width: 130,
            min_height: 40,
            min_aspect: 1.5,
            canny_low: 50.0,
            canny_high: 150.0,
        }
    }
}

/// Blackout detection configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlackoutConfig {
    /// Mean luminance strictly below this classifies a frame as blackout
    pub threshold: f64,
    pub policy: BlackoutPolicy,
}

/// What the cycle does while the screen is blacked out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlackoutPolicy {
    /// End the cycle on the first blackout frame
    Halt,
    /// Skip region and marker work, resume when the screen recovers
    Skip,
}

impl Default for BlackoutConfig {
    fn default() -> Self {
        Self {
            threshold: 85.0,
            policy: BlackoutPolicy::Skip,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            frame_width: 1920,
            frame_height: 1080,
            search_window: SearchWindow::new(0, 0, 280, 225),
            locator: LocatorStrategy::Contour,
            contour_filter: ContourFilter::default(),
            blackout: BlackoutConfig::default(),
            markers: MarkerColorSpec::default_set(),
            expand: None,
        }
    }
}

impl TrackerConfig {
    /// Load a configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {:?}", path.as_ref()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject malformed configurations before the cycle starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_width <= 0 || self.frame_height <= 0 {
            return Err(ConfigError::InvalidFrameSize {
                width: self.frame_width,
                height: self.frame_height,
            });
        }
        if self.search_window.width <= 0 || self.search_window.height <= 0 {
            return Err(ConfigError::EmptySearchWindow);
        }
        if !self
            .search_window
            .to_bbox()
            .fits_within(self.frame_width, self.frame_height)
        {
            return Err(ConfigError::SearchWindowOutOfBounds {
                window: self.search_window,
                width: self.frame_width,
                height: self.frame_height,
            });
        }
        let filter = &self.contour_filter;
        if filter.min_width <= 0 || filter.min_height <= 0 || filter.min_aspect <= 0.0 {
            return Err(ConfigError::InvalidContourFilter);
        }
        if !(filter.canny_low > 0.0 && filter.canny_low < filter.canny_high) {
            return Err(ConfigError::InvalidCannyThresholds);
        }
        if !(0.0..=255.0).contains(&self.blackout.threshold) {
            return Err(ConfigError::InvalidBlackoutThreshold(
                self.blackout.threshold,
            ));
        }
        if self.markers.is_empty() {
            return Err(ConfigError::NoMarkers);
        }
        for spec in &self.markers {
            if !spec.bounds_valid() {
                return Err(ConfigError::InvalidMarkerBounds {
                    name: spec.name.clone(),
                });
            }
        }
        if let Some(margins) = &self.expand {
            if margins.left < 0 || margins.right < 0 || margins.up < 0 || margins.down < 0 {
                return Err(ConfigError::NegativeMargins);
            }
        }
        Ok(())
    }
}

/// Construction-time configuration errors; none of these can surface mid-loop
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("frame dimensions must be positive, got {width}x{height}")]
    InvalidFrameSize { width: i32, height: i32 },
    #[error("search window has zero area")]
    EmptySearchWindow,
    #[error("search window {window:?} does not fit inside the {width}x{height} frame")]
    SearchWindowOutOfBounds {
        window: SearchWindow,
        width: i32,
        height: i32,
    },
    #[error("contour filter thresholds must be positive")]
    InvalidContourFilter,
    #[error("canny thresholds must satisfy 0 < low < high")]
    InvalidCannyThresholds,
    #[error("blackout threshold must lie in 0..=255, got {0}")]
    InvalidBlackoutThreshold(f64),
    #[error("no marker color specs configured")]
    NoMarkers,
    #[error("marker {name:?} has inverted or out-of-range HSV bounds")]
    InvalidMarkerBounds { name: String },
    #[error("expansion margins must be non-negative")]
    NegativeMargins,
    #[error("template {width}x{height} does not fit the {window:?} search window")]
    TemplateTooLarge {
        width: i32,
        height: i32,
        window: SearchWindow,
    },
}

//! Mapscope Computer Vision Library
//!
//! Locates a fixed on-screen minimap in a captured frame stream and tracks
//! colored marker icons inside it using OpenCV.

pub mod bbox;
pub mod blackout;
pub mod config;
pub mod marker;
pub mod region;
pub mod session;
pub mod source;
pub mod utils;

// Re-export commonly used types
pub use bbox::{BBox, ExpandMargins};
pub use blackout::{BlackoutEdge, BlackoutGate};
pub use config::{
    BlackoutConfig, BlackoutPolicy, ConfigError, ContourFilter, LocatorStrategy, SearchWindow,
    TrackerConfig,
};
pub use marker::{MarkerColorSpec, MarkerLocator, MarkerPosition};
pub use region::{ContourLocator, LockedRegionCache, RegionLocator, TemplateLocator};
pub use session::{
    CycleEnd, FrameCycle, FrameReport, MarkerReading, TrackerEvent, TrackerSession, TrackerState,
};
pub use source::FrameSource;

// Re-export opencv so downstream binaries share one Mat type
pub use opencv;

// Error handling
pub type Result<T> = anyhow::Result<T>;

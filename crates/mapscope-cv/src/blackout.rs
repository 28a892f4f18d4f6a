//! Blackout detection
//!
//! A full-screen near-black frame signals a scene transition: any previously
//! locked minimap position may no longer be valid afterwards.

use crate::Result;
use crate::utils::ImageUtils;
use opencv::core::{self, Mat};

/// Transition observed between the previous and the current classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlackoutEdge {
    /// Previous frame was normal, this one is blackout
    Entered,
    /// Blackout continues
    Persisting,
    /// Previous frame was blackout, this one is normal
    Cleared,
    /// Normal frame following a normal frame
    Steady,
}

/// Classifies frames as blackout vs normal from mean luminance and tracks
/// the previous classification so the cycle can react to edges.
#[derive(Debug)]
pub struct BlackoutGate {
    threshold: f64,
    was_black: bool,
}

impl BlackoutGate {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            was_black: false,
        }
    }

    /// `true` iff the frame's mean luminance is strictly below the threshold.
    /// A frame sitting exactly at the threshold classifies as normal.
    pub fn classify(&self, frame: &Mat) -> Result<bool> {
        let gray = ImageUtils::to_grayscale(frame)?;
        let mean = core::mean(&gray, &core::no_array())?;
        Ok(mean[0] < self.threshold)
    }

    /// Result of the previous `observe` call
    pub fn was_black(&self) -> bool {
        self.was_black
    }

    /// Record this frame's classification and report the transition edge
    pub fn observe(&mut self, black: bool) -> BlackoutEdge {
        let edge = match (self.was_black, black) {
            (false, true) => BlackoutEdge::Entered,
            (true, true) => BlackoutEdge::Persisting,
            (true, false) => BlackoutEdge::Cleared,
            (false, false) => BlackoutEdge::Steady,
        };
        self.was_black = black;
        edge
    }
}

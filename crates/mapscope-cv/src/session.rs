//! Tracking session and frame cycle
//!
//! One `TrackerSession` owns all per-session state: the blackout gate and
//! the locked-region cache. Each frame flows strictly downstream through
//! blackout gating, region location (or cache reuse), optional expansion and
//! marker extraction, producing one `FrameReport`. The `FrameCycle` drives a
//! `FrameSource` until exhaustion, a stop request, or a blackout under the
//! halt policy.

use crate::Result;
use crate::bbox::BBox;
use crate::blackout::{BlackoutEdge, BlackoutGate};
use crate::config::{BlackoutPolicy, LocatorStrategy, TrackerConfig};
use crate::marker::{MarkerLocator, MarkerPosition};
use crate::region::{ContourLocator, LockedRegionCache, RegionLocator, TemplateLocator};
use crate::source::FrameSource;
use crate::utils::ImageUtils;
use anyhow::ensure;
use opencv::core::Mat;
use opencv::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Where the session is in its one-shot detection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerState {
    /// No minimap position locked yet; every frame retries detection
    AwaitingRegion,
    /// Position locked; frames reuse it as an O(1) crop
    Tracking,
}

/// State changes worth surfacing to the consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackerEvent {
    BlackoutEntered,
    Recovered,
    RegionLocked { region: BBox },
}

/// Position of one configured marker for this frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerReading {
    pub name: String,
    pub position: Option<MarkerPosition>,
}

/// Per-frame output record
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub frame_index: u64,
    pub blackout: bool,
    pub region: Option<BBox>,
    pub markers: Vec<MarkerReading>,
    pub events: Vec<TrackerEvent>,
}

/// Why a cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleEnd {
    SourceExhausted,
    Stopped,
    BlackoutHalted,
}

/// Owns the per-session detection state and processes one frame at a time
pub struct TrackerSession {
    config: TrackerConfig,
    gate: BlackoutGate,
    cache: LockedRegionCache,
    locator: Box<dyn RegionLocator>,
    markers: MarkerLocator,
    frame_index: u64,
}

impl TrackerSession {
    /// Build a session with the locator strategy named in the config
    pub fn from_config(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        let locator: Box<dyn RegionLocator> = match &config.locator {
            LocatorStrategy::Contour => Box::new(ContourLocator::new(
                config.search_window,
                config.contour_filter,
            )),
            LocatorStrategy::Template { path } => {
                Box::new(TemplateLocator::from_file(path, config.search_window)?)
            }
        };
        Self::with_locator(config, locator)
    }

    /// Build a session around a caller-supplied locator
    pub fn with_locator(config: TrackerConfig, locator: Box<dyn RegionLocator>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            gate: BlackoutGate::new(config.blackout.threshold),
            cache: LockedRegionCache::new(),
            markers: MarkerLocator::new(config.markers.clone()),
            locator,
            config,
            frame_index: 0,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn state(&self) -> TrackerState {
        if self.cache.is_locked() {
            TrackerState::Tracking
        } else {
            TrackerState::AwaitingRegion
        }
    }

    pub fn locked_region(&self) -> Option<BBox> {
        self.cache.locked()
    }

    /// Explicitly invalidate the locked position
    pub fn reset(&mut self) {
        self.cache.reset();
    }

    /// Run one iteration of the cycle against an already-acquired frame
    pub fn process_frame(&mut self, frame: &Mat) -> Result<FrameReport> {
        ensure!(
            frame.cols() == self.config.frame_width && frame.rows() == self.config.frame_height,
            "frame is {}x{}, session is configured for {}x{}",
            frame.cols(),
            frame.rows(),
            self.config.frame_width,
            self.config.frame_height,
        );

        let frame_index = self.frame_index;
        self.frame_index += 1;
        let mut events = Vec::new();

        let black = self.gate.classify(frame)?;
        match self.gate.observe(black) {
            BlackoutEdge::Entered => {
                log::info!("black screen detected, resetting minimap lock");
                events.push(TrackerEvent::BlackoutEntered);
                self.cache.reset();
            }
            BlackoutEdge::Cleared => {
                log::info!("screen recovered, resuming minimap detection");
                events.push(TrackerEvent::Recovered);
            }
            BlackoutEdge::Persisting | BlackoutEdge::Steady => {}
        }

        // While the screen is black there is nothing to search or track
        if black {
            return Ok(FrameReport {
                frame_index,
                blackout: true,
                region: None,
                markers: Vec::new(),
                events,
            });
        }

        let newly_locked = !self.cache.is_locked();
        let region = {
            let locator = &self.locator;
            self.cache.get_or_locate(|| locator.locate(frame))?
        };
        if newly_locked {
            if let Some(region) = region {
                log::info!("minimap locked at {:?}", region);
                events.push(TrackerEvent::RegionLocked { region });
            }
        }

        let mut markers = Vec::new();
        if let Some(region) = region {
            let roi = match &self.config.expand {
                Some(margins) => {
                    region.expand(margins, self.config.frame_width, self.config.frame_height)
                }
                None => region,
            };
            let sub_region = ImageUtils::crop(frame, &roi)?;
            for (name, position) in self.markers.locate_all(&sub_region)? {
                log::debug!("marker {:?} at {:?}", name, position);
                markers.push(MarkerReading { name, position });
            }
        }

        Ok(FrameReport {
            frame_index,
            blackout: false,
            region,
            markers,
            events,
        })
    }
}

/// Pull-based cooperative loop over a frame source.
///
/// Single-threaded and synchronous: acquisition is the only suspension
/// point, and the stop flag is checked once per iteration.
pub struct FrameCycle<S: FrameSource> {
    session: TrackerSession,
    source: S,
}

impl<S: FrameSource> FrameCycle<S> {
    pub fn new(session: TrackerSession, source: S) -> Self {
        Self { session, source }
    }

    pub fn session(&self) -> &TrackerSession {
        &self.session
    }

    /// Run until the source is exhausted, the stop flag is raised, or a
    /// blackout arrives under `BlackoutPolicy::Halt`. Every report is passed
    /// to `on_report` before the next frame is acquired.
    pub fn run<F>(&mut self, stop: &AtomicBool, mut on_report: F) -> Result<CycleEnd>
    where
        F: FnMut(&FrameReport),
    {
        loop {
            if stop.load(Ordering::Relaxed) {
                log::info!("stop requested, ending cycle");
                return Ok(CycleEnd::Stopped);
            }
            let Some(frame) = self.source.next_frame()? else {
                log::info!("frame source exhausted, ending cycle");
                return Ok(CycleEnd::SourceExhausted);
            };
            let report = self.session.process_frame(&frame)?;
            let halt =
                report.blackout && self.session.config.blackout.policy == BlackoutPolicy::Halt;
            on_report(&report);
            if halt {
                log::info!("black screen detected, halting cycle");
                return Ok(CycleEnd::BlackoutHalted);
            }
        }
    }
}

//! End-to-end session scenarios driven by scripted frame sources

use mapscope_cv::{
    BBox, BlackoutPolicy, CycleEnd, ExpandMargins, FrameCycle, FrameSource, MarkerColorSpec,
    MarkerPosition, RegionLocator, SearchWindow, TrackerConfig, TrackerEvent, TrackerSession,
    TrackerState,
};
use opencv::core::{CV_8UC3, Mat, Rect, Scalar, Vec3b};
use opencv::imgproc;
use opencv::prelude::*;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

const FRAME_WIDTH: i32 = 320;
const FRAME_HEIGHT: i32 = 240;

fn base_config() -> TrackerConfig {
    let mut config = TrackerConfig::default();
    config.frame_width = FRAME_WIDTH;
    config.frame_height = FRAME_HEIGHT;
    config.search_window = SearchWindow::new(0, 0, 280, 225);
    config.markers = vec![MarkerColorSpec::new("red", [0, 200, 200], [10, 255, 255])];
    config
}

/// Mid-gray background, comfortably above the blackout threshold
fn plain_frame() -> Mat {
    Mat::new_rows_cols_with_default(FRAME_HEIGHT, FRAME_WIDTH, CV_8UC3, Scalar::all(120.0))
        .unwrap()
}

fn black_frame() -> Mat {
    Mat::new_rows_cols_with_default(FRAME_HEIGHT, FRAME_WIDTH, CV_8UC3, Scalar::all(0.0)).unwrap()
}

/// Background plus a minimap-shaped white rectangle at (10, 10) holding a
/// 4x4 red marker block at (50, 30)
fn minimap_frame() -> Mat {
    let mut frame = plain_frame();
    imgproc::rectangle(
        &mut frame,
        Rect::new(10, 10, 150, 50),
        Scalar::new(255.0, 255.0, 255.0, 0.0),
        imgproc::FILLED,
        imgproc::LINE_8,
        0,
    )
    .unwrap();
    imgproc::rectangle(
        &mut frame,
        Rect::new(50, 30, 4, 4),
        Scalar::new(0.0, 0.0, 255.0, 0.0),
        imgproc::FILLED,
        imgproc::LINE_8,
        0,
    )
    .unwrap();
    frame
}

struct VecSource {
    frames: Vec<Mat>,
}

impl FrameSource for VecSource {
    fn next_frame(&mut self) -> mapscope_cv::Result<Option<Mat>> {
        if self.frames.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.frames.remove(0)))
        }
    }
}

/// Repeats one frame forever; only a stop request ends the cycle
struct LoopSource {
    frame: Mat,
}

impl FrameSource for LoopSource {
    fn next_frame(&mut self) -> mapscope_cv::Result<Option<Mat>> {
        Ok(Some(self.frame.try_clone()?))
    }
}

struct CountingLocator {
    calls: Rc<Cell<usize>>,
    result: Option<BBox>,
}

impl RegionLocator for CountingLocator {
    fn locate(&self, _frame: &Mat) -> mapscope_cv::Result<Option<BBox>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.result)
    }
}

#[test]
fn session_locks_tracks_resets_and_recovers() {
    let mut session = TrackerSession::from_config(base_config()).unwrap();
    assert_eq!(session.state(), TrackerState::AwaitingRegion);

    // No minimap on screen yet: stay awaiting, nothing reported
    let report = session.process_frame(&plain_frame()).unwrap();
    assert_eq!(report.frame_index, 0);
    assert!(!report.blackout);
    assert_eq!(report.region, None);
    assert!(report.markers.is_empty());
    assert!(report.events.is_empty());
    assert_eq!(session.state(), TrackerState::AwaitingRegion);

    // Minimap appears: lock it and read the marker
    let report = session.process_frame(&minimap_frame()).unwrap();
    let region = report.region.expect("minimap should be located");
    assert!((region.x - 10).abs() <= 2);
    assert!((region.y - 10).abs() <= 2);
    assert!(matches!(
        report.events.as_slice(),
        [TrackerEvent::RegionLocked { .. }]
    ));
    assert_eq!(session.state(), TrackerState::Tracking);
    assert_eq!(report.markers.len(), 1);
    assert_eq!(report.markers[0].name, "red");
    let position = report.markers[0].position.expect("red marker visible");
    // The 4x4 block spans (50..54, 30..34): frame-space centroid (51, 31)
    assert_eq!(position.to_frame(&region), MarkerPosition { x: 51, y: 31 });

    // Blackout invalidates the lock
    let report = session.process_frame(&black_frame()).unwrap();
    assert!(report.blackout);
    assert_eq!(report.region, None);
    assert!(report.markers.is_empty());
    assert_eq!(report.events, vec![TrackerEvent::BlackoutEntered]);
    assert_eq!(session.state(), TrackerState::AwaitingRegion);

    // Recovery re-runs detection from scratch
    let report = session.process_frame(&minimap_frame()).unwrap();
    assert_eq!(report.frame_index, 3);
    assert_eq!(report.events.len(), 2);
    assert_eq!(report.events[0], TrackerEvent::Recovered);
    assert!(matches!(
        report.events[1],
        TrackerEvent::RegionLocked { .. }
    ));
    assert_eq!(session.state(), TrackerState::Tracking);
}

#[test]
fn persisting_blackout_reports_single_entry_event() {
    let mut session = TrackerSession::from_config(base_config()).unwrap();
    let report = session.process_frame(&black_frame()).unwrap();
    assert_eq!(report.events, vec![TrackerEvent::BlackoutEntered]);
    let report = session.process_frame(&black_frame()).unwrap();
    assert!(report.blackout);
    assert!(report.events.is_empty());
}

#[test]
fn locator_runs_once_while_locked() {
    let calls = Rc::new(Cell::new(0));
    let locator = CountingLocator {
        calls: calls.clone(),
        result: Some(BBox::new(10, 10, 150, 50)),
    };
    let mut session =
        TrackerSession::with_locator(base_config(), Box::new(locator)).unwrap();

    for _ in 0..5 {
        let report = session.process_frame(&plain_frame()).unwrap();
        assert_eq!(report.region, Some(BBox::new(10, 10, 150, 50)));
    }
    assert_eq!(calls.get(), 1);
}

#[test]
fn awaiting_region_retries_every_frame() {
    let calls = Rc::new(Cell::new(0));
    let locator = CountingLocator {
        calls: calls.clone(),
        result: None,
    };
    let mut session =
        TrackerSession::with_locator(base_config(), Box::new(locator)).unwrap();

    for _ in 0..4 {
        let report = session.process_frame(&plain_frame()).unwrap();
        assert_eq!(report.region, None);
    }
    assert_eq!(calls.get(), 4);
    assert_eq!(session.state(), TrackerState::AwaitingRegion);
}

#[test]
fn expansion_widens_the_marker_crop() {
    let mut config = base_config();
    config.expand = Some(ExpandMargins::new(10, 10, 10, 10));
    let locator = CountingLocator {
        calls: Rc::new(Cell::new(0)),
        result: Some(BBox::new(20, 20, 100, 60)),
    };
    let mut session = TrackerSession::with_locator(config, Box::new(locator)).unwrap();

    // Red pixel outside the locked box but inside the expanded crop
    let mut frame = plain_frame();
    *frame.at_2d_mut::<Vec3b>(25, 15).unwrap() = Vec3b::from([0, 0, 255]);

    let report = session.process_frame(&frame).unwrap();
    // Expanded crop origin is (10, 10), so the pixel reads as (5, 15)
    assert_eq!(
        report.markers[0].position,
        Some(MarkerPosition { x: 5, y: 15 })
    );
}

#[test]
fn frame_size_mismatch_is_an_error() {
    let mut session = TrackerSession::from_config(base_config()).unwrap();
    let wrong =
        Mat::new_rows_cols_with_default(100, 100, CV_8UC3, Scalar::all(120.0)).unwrap();
    assert!(session.process_frame(&wrong).is_err());
}

#[test]
fn cycle_ends_when_source_is_exhausted() {
    let session = TrackerSession::from_config(base_config()).unwrap();
    let mut cycle = FrameCycle::new(
        session,
        VecSource {
            frames: vec![plain_frame(), minimap_frame()],
        },
    );
    let stop = AtomicBool::new(false);
    let mut reports = 0;
    let end = cycle.run(&stop, |_| reports += 1).unwrap();
    assert_eq!(end, CycleEnd::SourceExhausted);
    assert_eq!(reports, 2);
    assert_eq!(cycle.session().state(), TrackerState::Tracking);
}

#[test]
fn cycle_halts_on_blackout_under_halt_policy() {
    let mut config = base_config();
    config.blackout.policy = BlackoutPolicy::Halt;
    let session = TrackerSession::from_config(config).unwrap();
    let mut cycle = FrameCycle::new(
        session,
        VecSource {
            frames: vec![minimap_frame(), black_frame(), minimap_frame()],
        },
    );
    let stop = AtomicBool::new(false);
    let mut last_blackout = false;
    let mut reports = 0;
    let end = cycle
        .run(&stop, |report| {
            reports += 1;
            last_blackout = report.blackout;
        })
        .unwrap();
    assert_eq!(end, CycleEnd::BlackoutHalted);
    assert_eq!(reports, 2);
    assert!(last_blackout);
}

#[test]
fn cycle_skips_blackout_under_skip_policy() {
    let session = TrackerSession::from_config(base_config()).unwrap();
    let mut cycle = FrameCycle::new(
        session,
        VecSource {
            frames: vec![minimap_frame(), black_frame(), minimap_frame()],
        },
    );
    let stop = AtomicBool::new(false);
    let mut reports = Vec::new();
    let end = cycle
        .run(&stop, |report| reports.push(report.clone()))
        .unwrap();
    assert_eq!(end, CycleEnd::SourceExhausted);
    assert_eq!(reports.len(), 3);
    assert!(reports[1].blackout);
    assert!(reports[2].region.is_some());
}

#[test]
fn cycle_honors_stop_request() {
    let session = TrackerSession::from_config(base_config()).unwrap();
    let mut cycle = FrameCycle::new(
        session,
        LoopSource {
            frame: minimap_frame(),
        },
    );
    let stop = AtomicBool::new(false);
    let mut reports = 0;
    let end = cycle
        .run(&stop, |_| {
            reports += 1;
            if reports == 3 {
                stop.store(true, Ordering::Relaxed);
            }
        })
        .unwrap();
    assert_eq!(end, CycleEnd::Stopped);
    assert_eq!(reports, 3);
}

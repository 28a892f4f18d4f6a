//! Frame acquisition seam
//!
//! Capture device configuration lives outside this crate; the cycle only
//! pulls BGR frames at the configured resolution.

use crate::Result;
use opencv::core::Mat;

/// Pull-based supplier of BGR frames.
///
/// `Ok(None)` signals end-of-stream (the capture session finished);
/// `Err` signals a device failure. Both halt the cycle and neither is
/// retried. Acquisition has no timeout: a stalled source blocks the cycle,
/// and callers needing bounded latency must wrap acquisition themselves.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Mat>>;
}

//! Recorded-frame playback source
//!
//! Walks a directory of frame dumps in name order and feeds them to the
//! cycle, so the tracker can be exercised without a capture device attached.

use anyhow::Context;
use mapscope_cv::FrameSource;
use mapscope_cv::opencv::core::Mat;
use mapscope_cv::utils::ImageUtils;
use std::fs;
use std::path::{Path, PathBuf};

const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

pub struct ImageSequenceSource {
    frames: Vec<PathBuf>,
    next: usize,
}

impl ImageSequenceSource {
    pub fn open<P: AsRef<Path>>(dir: P) -> anyhow::Result<Self> {
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("failed to read frame directory: {:?}", dir.as_ref()))?;

        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .map(|ext| {
                        SUPPORTED_EXTENSIONS
                            .iter()
                            .any(|supported| ext.eq_ignore_ascii_case(supported))
                    })
                    .unwrap_or(false)
            })
            .collect();
        frames.sort();

        log::info!("playing back {} frames from {:?}", frames.len(), dir.as_ref());
        Ok(Self { frames, next: 0 })
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> mapscope_cv::Result<Option<Mat>> {
        let Some(path) = self.frames.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        let rgb = image::open(path)
            .with_context(|| format!("failed to open frame {:?}", path))?
            .to_rgb8();
        Ok(Some(ImageUtils::rgb_to_bgr_mat(&rgb)?))
    }
}

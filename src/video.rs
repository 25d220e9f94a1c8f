//! Frame acquisition.

#[cfg(feature = "webcam")]
pub mod webcam;

use std::path::PathBuf;

use anyhow::{Context, Result};
use image::RgbImage;

/// A source of frames for a live session.
///
/// `Ok(None)` signals a clean end of stream. Sources release their underlying capture handle
/// when dropped, so a session that stops mid-stream never leaks it.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

impl FrameSource for Box<dyn FrameSource> {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        (**self).next_frame()
    }
}

/// Serves a fixed list of image files as a frame stream.
///
/// Files are decoded lazily, one per [`FrameSource::next_frame`] call. A file that fails to
/// decode surfaces as an error, which ends the session consuming the stream.
pub struct ImageSequence {
    paths: std::vec::IntoIter<PathBuf>,
}

impl ImageSequence {
    pub fn new<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        Self {
            paths: paths.into_iter().collect::<Vec<_>>().into_iter(),
        }
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.paths.next() else {
            return Ok(None);
        };
        let image = image::open(&path)
            .with_context(|| format!("failed to decode frame {}", path.display()))?
            .to_rgb8();
        Ok(Some(image))
    }
}

//! V4L2 webcam capture.
//!
//! Only `VIDEO_CAPTURE` devices yielding JFIF JPEG or Motion JPEG frames are supported.

use std::env;

use anyhow::{bail, Context, Result};
use image::{ImageFormat, RgbImage};
use linuxvideo::{
    format::{PixFormat, PixelFormat},
    stream::ReadStream,
    BufType, CapabilityFlags, Device,
};

use super::FrameSource;

const ENV_VAR_WEBCAM_NAME: &str = "FINGERSPELL_WEBCAM_NAME";

const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 720;

/// A V4L2 capture device streaming JPEG frames.
///
/// The capture handle is released when the `Webcam` is dropped.
pub struct Webcam {
    stream: ReadStream,
    width: u32,
    height: u32,
}

impl Webcam {
    /// Opens the first capture device that supports a JPEG pixel format.
    ///
    /// Setting `FINGERSPELL_WEBCAM_NAME` restricts the scan to the device with the matching
    /// card name. Opening can block for a significant amount of time (on the order of
    /// hundreds of milliseconds) while the device initializes.
    pub fn open() -> Result<Self> {
        let name_filter = env::var(ENV_VAR_WEBCAM_NAME).ok();
        if let Some(name) = &name_filter {
            log::debug!("webcam override: `{ENV_VAR_WEBCAM_NAME}` is set to '{name}'");
        }

        for device in linuxvideo::list()? {
            let device = match device {
                Ok(device) => device,
                Err(e) => {
                    log::warn!("{e}");
                    continue;
                }
            };
            match Self::open_device(device, name_filter.as_deref()) {
                Ok(Some(webcam)) => return Ok(webcam),
                Ok(None) => {}
                Err(e) => log::debug!("{e}"),
            }
        }

        bail!("no usable webcam device found")
    }

    fn open_device(device: Device, name_filter: Option<&str>) -> Result<Option<Self>> {
        let caps = device.capabilities()?;
        if let Some(name) = name_filter {
            if caps.card() != name {
                return Ok(None);
            }
        }
        if !caps
            .device_capabilities()
            .contains(CapabilityFlags::VIDEO_CAPTURE)
        {
            return Ok(None);
        }

        let mut pixel_format = None;
        for format in device.formats(BufType::VIDEO_CAPTURE) {
            let format = format?;
            if format.pixel_format() == PixelFormat::JPEG
                || format.pixel_format() == PixelFormat::MJPG
            {
                pixel_format = Some(format.pixel_format());
                break;
            }
        }
        let Some(pixel_format) = pixel_format else {
            log::debug!("{}: no supported pixel format, skipping", caps.card());
            return Ok(None);
        };

        let capture =
            device.video_capture(PixFormat::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, pixel_format))?;
        let format = capture.format();
        let (width, height) = (format.width(), format.height());
        log::info!("opened {}, {width}x{height}", caps.card());

        Ok(Some(Self {
            stream: capture.into_stream()?,
            width,
            height,
        }))
    }

    /// Returns the negotiated frame size.
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl FrameSource for Webcam {
    /// Reads and decodes the next frame, blocking until one is available.
    ///
    /// Occasional corrupt MJPG frames (USB data corruption is a fact of life, even with
    /// high-quality webcams) surface as an error, which the consuming session treats as
    /// end-of-stream.
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let decoded = self
            .stream
            .dequeue(|buf| Ok(image::load_from_memory_with_format(&buf, ImageFormat::Jpeg)))?;
        let image = decoded.context("webcam produced an undecodable frame")?;
        Ok(Some(image.to_rgb8()))
    }
}

//! Fingerspelling recognition glue.
//!
//! This crate turns the noisy per-frame output of a pretrained sign-letter detector into a
//! clean, debounced typing stream. The detector itself, the camera driver, and the display
//! toolkit are capabilities supplied by the embedder ([`detect::Detector`],
//! [`video::FrameSource`], [`session::Display`], [`session::Input`]); the crate owns
//! everything in between:
//!
//! * [`roi`] — selecting the square capture region the detector sees,
//! * [`vote`] — majority-vote smoothing of the per-frame label stream,
//! * [`commit`] — the policies that turn a stable label into typed text,
//! * [`text`] — the committed-text buffer,
//! * [`session`] — the frame loop wiring it all together.
//!
//! Still images skip the smoothing entirely; see [`detect::recognize`].
//!
//! # Environment Variables
//!
//! * `FINGERSPELL_WEBCAM_NAME`: Forces the capture device used by [`video::webcam`]
//!   (available with the `webcam` cargo feature). If unset, the first device producing a
//!   supported image format is used.

use log::LevelFilter;

pub mod commit;
pub mod detect;
pub mod draw;
pub mod rect;
pub mod roi;
pub mod session;
pub mod text;
pub mod timer;
pub mod video;
pub mod vote;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and this crate log at *debug* level; `RUST_LOG` overrides still apply.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}

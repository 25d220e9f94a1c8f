//! Session state and the shared frame-processing loop.
//!
//! All front-end surfaces drive the same loop: acquire a frame, crop the capture region, run
//! the detector, feed the majority vote, let the commit policy act, compose the overlay, and
//! render. The only difference between the live surfaces is the [`CommitPolicy`] plugged into
//! the [`Session`].

use std::time::{Duration, Instant};

use anyhow::Result;
use image::imageops::{self, FilterType};
use image::RgbImage;
use itertools::Itertools;

use crate::commit::{AutoCommit, CommitPolicy, ManualCommit};
use crate::detect::{best_candidate, top_k, Candidate, Detector};
use crate::draw::{self, Color};
use crate::roi::{Placement, RoiSelector};
use crate::text::TextBuffer;
use crate::timer::{FpsCounter, Timer};
use crate::video::FrameSource;
use crate::vote::MajorityVote;

/// How many trailing characters of the committed text fit into the on-frame overlay.
const TEXT_TAIL: usize = 20;

/// A discrete user command consumed by the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Commit the currently stable letter (manual-commit sessions only).
    CommitLetter,
    AppendSpace,
    Backspace,
    ClearText,
    StopSession,
}

/// Renders a frame and a one-line status to the user.
pub trait Display {
    fn show(&mut self, frame: &RgbImage, headline: &str) -> Result<()>;
}

/// Delivers pending user commands to the frame loop.
///
/// Polled once per frame until it returns `None`.
pub trait Input {
    fn poll_command(&mut self) -> Option<Command>;
}

/// Session configuration.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    confidence_threshold: f32,
    history: usize,
    required_consecutive: u32,
    cooldown: Duration,
    roi_side: u32,
    roi_margin: u32,
    placement: Placement,
    detector_input_side: u32,
    mirror: bool,
    overlay_depth: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: Self::DEFAULT_THRESHOLD,
            history: MajorityVote::DEFAULT_CAPACITY,
            required_consecutive: AutoCommit::DEFAULT_REQUIRED_FRAMES,
            cooldown: ManualCommit::DEFAULT_COOLDOWN,
            roi_side: RoiSelector::DEFAULT_SIDE,
            roi_margin: RoiSelector::DEFAULT_MARGIN,
            placement: Placement::Center,
            detector_input_side: Self::DEFAULT_INPUT_SIDE,
            mirror: true,
            overlay_depth: Self::DEFAULT_OVERLAY_DEPTH,
        }
    }
}

impl SessionOptions {
    pub const DEFAULT_THRESHOLD: f32 = 0.5;
    pub const DEFAULT_INPUT_SIDE: u32 = 640;
    pub const DEFAULT_OVERLAY_DEPTH: usize = 3;

    /// Sets the acceptance confidence threshold applied to per-frame detections.
    #[inline]
    pub fn confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Sets the size of the majority-vote history window.
    #[inline]
    pub fn history(mut self, window: usize) -> Self {
        self.history = window;
        self
    }

    /// Sets the number of consecutive qualifying frames an auto-commit session requires.
    #[inline]
    pub fn required_consecutive(mut self, frames: u32) -> Self {
        self.required_consecutive = frames;
        self
    }

    /// Sets the cooldown between manual commits.
    #[inline]
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Sets the side length of the capture region, in pixels.
    #[inline]
    pub fn roi_side(mut self, side: u32) -> Self {
        self.roi_side = side;
        self
    }

    /// Sets the margin between the capture region and the frame edge, in pixels.
    #[inline]
    pub fn roi_margin(mut self, margin: u32) -> Self {
        self.roi_margin = margin;
        self
    }

    /// Sets the horizontal placement of the capture region.
    #[inline]
    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Sets the square resolution the capture region is upscaled to before detection.
    #[inline]
    pub fn detector_input_side(mut self, side: u32) -> Self {
        self.detector_input_side = side;
        self
    }

    /// Sets whether frames are mirrored before processing. Mirroring is on by default; it
    /// makes aiming a hand at the capture region feel natural.
    #[inline]
    pub fn mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    /// Sets how many ranked candidates the overlay shows per frame.
    #[inline]
    pub fn overlay_depth(mut self, depth: usize) -> Self {
        self.overlay_depth = depth;
        self
    }
}

/// The composed result of one processed frame.
pub struct FrameOutput {
    /// The full frame with the capture-region box, detection annotations, and text overlay
    /// drawn onto it.
    pub frame: RgbImage,
    /// A one-line status for a title bar or label.
    pub headline: String,
}

/// One recognition session: smoothing state, commit policy, and the accumulated text.
///
/// The detector and the I/O capabilities are borrowed per [`run`](Session::run) rather than
/// owned, so a stopped session can be restarted with a fresh frame source while the text
/// carries over. Smoothing and debounce state reset on every run.
pub struct Session {
    options: SessionOptions,
    roi: RoiSelector,
    vote: MajorityVote,
    policy: Box<dyn CommitPolicy>,
    text: TextBuffer,
    /// The latest frame's best candidate, present only when it cleared the threshold.
    current: Option<Candidate>,
    t_detect: Timer,
}

impl Session {
    /// Creates a manual-commit session: letters are committed on [`Command::CommitLetter`],
    /// debounced by the configured cooldown.
    pub fn manual(options: SessionOptions) -> Self {
        let policy = ManualCommit::new(options.cooldown);
        Self::with_policy(options, Box::new(policy))
    }

    /// Creates an auto-commit session: letters are committed after the configured number of
    /// consecutive qualifying frames, without user interaction.
    pub fn auto(options: SessionOptions) -> Self {
        let policy = AutoCommit::new(options.required_consecutive);
        Self::with_policy(options, Box::new(policy))
    }

    /// Creates a session with a caller-supplied commit policy.
    pub fn with_policy(options: SessionOptions, policy: Box<dyn CommitPolicy>) -> Self {
        Self {
            roi: RoiSelector::new(options.roi_side, options.roi_margin, options.placement),
            vote: MajorityVote::new(options.history),
            policy,
            text: TextBuffer::new(),
            current: None,
            t_detect: Timer::new("detect"),
            options,
        }
    }

    /// The accumulated text.
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// The current stable letter, if the history window holds one.
    pub fn stable_label(&self) -> Option<char> {
        self.vote.stable_label()
    }

    /// Applies one user command, timestamped now.
    ///
    /// Returns `false` when the command stops the session.
    pub fn handle_command(&mut self, command: Command) -> bool {
        self.handle_command_at(command, Instant::now())
    }

    /// Applies one user command with an explicit timestamp.
    ///
    /// The timestamp feeds the manual-commit cooldown; headless drivers and tests can supply
    /// their own instead of the wall clock.
    pub fn handle_command_at(&mut self, command: Command, now: Instant) -> bool {
        match command {
            Command::CommitLetter => {
                let stable = self.vote.stable_label();
                let qualified = self.current.is_some();
                self.policy
                    .request_commit(stable, qualified, now, &mut self.text);
            }
            Command::AppendSpace => self.text.push_space(),
            Command::Backspace => self.text.backspace(),
            Command::ClearText => self.text.clear(),
            Command::StopSession => return false,
        }
        true
    }

    /// Runs one frame through crop, detect, vote, and the commit policy, returning the
    /// composed frame and headline for display.
    pub fn process_frame(
        &mut self,
        detector: &mut dyn Detector,
        mut frame: RgbImage,
    ) -> Result<FrameOutput> {
        if self.options.mirror {
            frame = imageops::flip_horizontal(&frame);
        }
        let (width, height) = frame.dimensions();
        let region = self.roi.select(width, height);

        let mut ranking = String::new();
        let candidate = if region.is_empty() {
            None
        } else {
            let crop = imageops::crop_imm(
                &frame,
                region.x() as u32,
                region.y() as u32,
                region.width(),
                region.height(),
            )
            .to_image();
            let side = self.options.detector_input_side;
            let input = imageops::resize(&crop, side, side, FilterType::Triangle);

            let threshold = self.options.confidence_threshold;
            let detections = self.t_detect.time(|| detector.detect(&input, threshold))?;

            let annotated = imageops::resize(
                &detections.visualization,
                region.width(),
                region.height(),
                FilterType::Triangle,
            );
            imageops::replace(&mut frame, &annotated, region.x().into(), region.y().into());

            ranking = top_k(&detections.candidates, self.options.overlay_depth)
                .iter()
                .map(|c| format!("{}:{:.2}", c.label, c.confidence))
                .join(" | ");

            best_candidate(&detections.candidates, threshold)
        };

        if let Some(candidate) = candidate {
            log::trace!(
                "frame candidate '{}' ({:.2})",
                candidate.label,
                candidate.confidence
            );
            self.vote.observe(candidate.label);
        }
        self.current = candidate;

        let stable = self.vote.stable_label();
        self.policy
            .observe_frame(stable, candidate.is_some(), &mut self.text);

        draw::rect_outline(&mut frame, region, Color::GREEN, 2);
        draw::text(
            &mut frame,
            12,
            8,
            "Place your hand inside the green box",
            Color::GREEN,
        );
        if !ranking.is_empty() {
            draw::text(&mut frame, 12, 30, &ranking, Color::YELLOW);
        }
        let tail = format!("Text: {}", self.text.tail(TEXT_TAIL));
        draw::text(&mut frame, 12, height as i32 - 28, &tail, Color::GREEN);

        let headline = match (stable, candidate) {
            (Some(stable), Some(candidate)) => format!(
                "Letter: {stable} (raw {}, {:.2})",
                candidate.label, candidate.confidence
            ),
            (Some(stable), None) => format!("Letter: {stable}"),
            (None, _) => "Letter: -".to_string(),
        };

        Ok(FrameOutput { frame, headline })
    }

    /// Drives a live session until the source ends or a stop command arrives.
    ///
    /// Smoothing and debounce state reset on entry; the accumulated text is kept, so a
    /// restarted session continues the same string. A frame that fails to arrive or decode
    /// ends the session (it is not retried); a detector failure propagates as an error.
    pub fn run(
        &mut self,
        detector: &mut dyn Detector,
        source: &mut dyn FrameSource,
        display: &mut dyn Display,
        input: &mut dyn Input,
    ) -> Result<()> {
        self.vote.reset();
        self.policy.reset();
        self.current = None;

        let mut fps = FpsCounter::new("session");
        loop {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    log::debug!("frame source ended");
                    break;
                }
                Err(e) => {
                    log::error!("frame acquisition failed: {e:#}");
                    break;
                }
            };

            let output = self.process_frame(detector, frame)?;
            display.show(&output.frame, &output.headline)?;

            let mut running = true;
            while let Some(command) = input.poll_command() {
                running &= self.handle_command(command);
            }
            if !running {
                log::debug!("session stopped by command");
                break;
            }

            fps.tick_with([&self.t_detect]);
        }

        Ok(())
    }
}

//! Commit policies: deciding when a stable label becomes typed text.
//!
//! The majority vote in [`crate::vote`] removes single-frame flicker, but something still has
//! to decide *when* the stable label is appended to the text. Two policies exist: committing
//! on an explicit user request debounced by a cooldown ([`ManualCommit`]), and committing
//! automatically once a label has held steady long enough ([`AutoCommit`]). Both are
//! implementations of [`CommitPolicy`], consumed by the same frame loop.

use std::time::{Duration, Instant};

use crate::text::TextBuffer;

/// Turns stable labels into committed text.
///
/// An implementation holds the debounce state of one session; the session resets it when the
/// stream restarts.
pub trait CommitPolicy {
    /// Feeds one processed frame to the policy, which may commit a letter to `text`.
    ///
    /// `stable` is the smoother's current majority label. `qualified` records whether this
    /// frame's detection cleared the acceptance threshold.
    fn observe_frame(&mut self, stable: Option<char>, qualified: bool, text: &mut TextBuffer);

    /// Handles an explicit commit request from the user.
    ///
    /// `now` is supplied by the caller so time-based debouncing stays testable.
    fn request_commit(
        &mut self,
        stable: Option<char>,
        qualified: bool,
        now: Instant,
        text: &mut TextBuffer,
    );

    /// Resets the debounce state to the state just after construction.
    fn reset(&mut self);
}

impl CommitPolicy for Box<dyn CommitPolicy> {
    fn observe_frame(&mut self, stable: Option<char>, qualified: bool, text: &mut TextBuffer) {
        (**self).observe_frame(stable, qualified, text);
    }

    fn request_commit(
        &mut self,
        stable: Option<char>,
        qualified: bool,
        now: Instant,
        text: &mut TextBuffer,
    ) {
        (**self).request_commit(stable, qualified, now, text);
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

/// Commits a letter once it has been the stable majority for a required number of consecutive
/// qualifying frames.
///
/// The confirmation counter decays by one on a non-qualifying frame instead of resetting, so a
/// single dropped frame does not restart the confirmation. After a commit the counter resets
/// and the letter is blocked until a different stable label or a space/backspace/clear
/// intervenes; holding a pose types one letter, not a stream of them.
pub struct AutoCommit {
    required: u32,
    candidate: Option<char>,
    consecutive: u32,
}

impl AutoCommit {
    pub const DEFAULT_REQUIRED_FRAMES: u32 = 8;

    pub fn new(required: u32) -> Self {
        assert!(required != 0, "required frame count must be non-zero");
        Self {
            required,
            candidate: None,
            consecutive: 0,
        }
    }
}

impl CommitPolicy for AutoCommit {
    fn observe_frame(&mut self, stable: Option<char>, qualified: bool, text: &mut TextBuffer) {
        if stable != self.candidate {
            self.candidate = stable;
            self.consecutive = 0;
        }

        if qualified {
            self.consecutive += 1;
        } else {
            self.consecutive = self.consecutive.saturating_sub(1);
        }

        let Some(label) = self.candidate else { return };
        if self.consecutive >= self.required && text.last_committed() != Some(label) {
            log::debug!("auto-committing '{label}' after {} frames", self.consecutive);
            text.push_letter(label);
            self.consecutive = 0;
        }
    }

    fn request_commit(&mut self, _: Option<char>, _: bool, _: Instant, _: &mut TextBuffer) {}

    fn reset(&mut self) {
        self.candidate = None;
        self.consecutive = 0;
    }
}

/// Commits the stable label on explicit request, debounced by a wall-clock cooldown.
///
/// Requests inside the cooldown window, or while no qualifying stable candidate exists, are
/// silently ignored; both are normal conditions, not errors.
pub struct ManualCommit {
    cooldown: Duration,
    last_commit: Option<Instant>,
}

impl ManualCommit {
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(500);

    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_commit: None,
        }
    }
}

impl CommitPolicy for ManualCommit {
    fn observe_frame(&mut self, _: Option<char>, _: bool, _: &mut TextBuffer) {}

    fn request_commit(
        &mut self,
        stable: Option<char>,
        qualified: bool,
        now: Instant,
        text: &mut TextBuffer,
    ) {
        if let Some(last) = self.last_commit {
            if now.saturating_duration_since(last) < self.cooldown {
                log::trace!("commit request inside cooldown, ignoring");
                return;
            }
        }

        let Some(label) = stable else { return };
        if !qualified {
            return;
        }

        text.push_letter(label);
        self.last_commit = Some(now);
    }

    fn reset(&mut self) {
        self.last_commit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_commit_after_required_frames() {
        let mut text = TextBuffer::new();
        let mut policy = AutoCommit::new(3);

        policy.observe_frame(Some('A'), true, &mut text);
        policy.observe_frame(Some('A'), true, &mut text);
        assert_eq!(text.as_str(), "");
        policy.observe_frame(Some('A'), true, &mut text);
        assert_eq!(text.as_str(), "A");

        // The counter restarted on commit and the letter is blocked by repeat-suppression.
        policy.observe_frame(Some('A'), true, &mut text);
        assert_eq!(text.as_str(), "A");
    }

    #[test]
    fn test_auto_commit_different_label_unblocks() {
        let mut text = TextBuffer::new();
        let mut policy = AutoCommit::new(2);

        for _ in 0..2 {
            policy.observe_frame(Some('A'), true, &mut text);
        }
        for _ in 0..2 {
            policy.observe_frame(Some('B'), true, &mut text);
        }
        for _ in 0..2 {
            policy.observe_frame(Some('A'), true, &mut text);
        }
        assert_eq!(text.as_str(), "ABA");
    }

    #[test]
    fn test_auto_commit_space_unblocks_same_label() {
        let mut text = TextBuffer::new();
        let mut policy = AutoCommit::new(2);

        for _ in 0..2 {
            policy.observe_frame(Some('A'), true, &mut text);
        }
        assert_eq!(text.as_str(), "A");

        text.push_space();
        for _ in 0..2 {
            policy.observe_frame(Some('A'), true, &mut text);
        }
        assert_eq!(text.as_str(), "A A");
    }

    #[test]
    fn test_auto_commit_counter_decays_gracefully() {
        let mut text = TextBuffer::new();
        let mut policy = AutoCommit::new(3);

        policy.observe_frame(Some('A'), true, &mut text);
        policy.observe_frame(Some('A'), true, &mut text);
        // One dropped frame costs one step of confirmation, it does not restart it.
        policy.observe_frame(Some('A'), false, &mut text);
        policy.observe_frame(Some('A'), true, &mut text);
        policy.observe_frame(Some('A'), true, &mut text);
        assert_eq!(text.as_str(), "A");
    }

    #[test]
    fn test_auto_commit_candidate_change_resets_counter() {
        let mut text = TextBuffer::new();
        let mut policy = AutoCommit::new(3);

        policy.observe_frame(Some('A'), true, &mut text);
        policy.observe_frame(Some('A'), true, &mut text);
        policy.observe_frame(Some('B'), true, &mut text);
        policy.observe_frame(Some('B'), true, &mut text);
        assert_eq!(text.as_str(), "");
        policy.observe_frame(Some('B'), true, &mut text);
        assert_eq!(text.as_str(), "B");
    }

    #[test]
    fn test_manual_commit_cooldown() {
        let mut text = TextBuffer::new();
        let mut policy = ManualCommit::new(Duration::from_millis(500));
        let t0 = Instant::now();

        policy.request_commit(Some('A'), true, t0, &mut text);
        assert_eq!(text.as_str(), "A");

        policy.request_commit(Some('A'), true, t0 + Duration::from_millis(300), &mut text);
        assert_eq!(text.as_str(), "A");

        policy.request_commit(Some('A'), true, t0 + Duration::from_millis(600), &mut text);
        assert_eq!(text.as_str(), "AA");
    }

    #[test]
    fn test_manual_commit_needs_qualifying_candidate() {
        let mut text = TextBuffer::new();
        let mut policy = ManualCommit::new(Duration::from_millis(500));
        let t0 = Instant::now();

        policy.request_commit(None, false, t0, &mut text);
        policy.request_commit(Some('A'), false, t0, &mut text);
        assert_eq!(text.as_str(), "");

        // Ignored requests must not arm the cooldown.
        policy.request_commit(Some('A'), true, t0 + Duration::from_millis(1), &mut text);
        assert_eq!(text.as_str(), "A");
    }

    #[test]
    fn test_manual_commit_reset_clears_cooldown() {
        let mut text = TextBuffer::new();
        let mut policy = ManualCommit::new(Duration::from_millis(500));
        let t0 = Instant::now();

        policy.request_commit(Some('A'), true, t0, &mut text);
        policy.reset();
        policy.request_commit(Some('B'), true, t0 + Duration::from_millis(1), &mut text);
        assert_eq!(text.as_str(), "AB");
    }
}

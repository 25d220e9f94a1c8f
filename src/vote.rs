//! Majority-vote smoothing of the per-frame label stream.

use std::collections::VecDeque;

/// Majority vote over a fixed history of accepted labels.
///
/// A single misclassified frame gets outvoted by its neighbors instead of reaching the commit
/// policy. Only labels whose detection cleared the acceptance threshold may enter the history;
/// the caller performs that filtering, so everything in the window carries equal weight.
#[derive(Clone)]
pub struct MajorityVote {
    history: VecDeque<char>,
    capacity: usize,
}

impl MajorityVote {
    pub const DEFAULT_CAPACITY: usize = 10;

    /// Creates a smoother that votes over the last `capacity` accepted labels.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity != 0, "history capacity must be non-zero");
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records an accepted label, evicting the oldest entry when the window is full.
    pub fn observe(&mut self, label: char) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(label);
    }

    /// Returns the label with the highest occurrence count in the window.
    ///
    /// When several labels tie for the highest count, the one whose first occurrence is
    /// closest to the oldest end of the window wins, so the result is deterministic for any
    /// fixed window content. Returns `None` while the window is empty.
    pub fn stable_label(&self) -> Option<char> {
        let mut counts: Vec<(char, usize)> = Vec::new();
        for &label in &self.history {
            match counts.iter_mut().find(|(l, _)| *l == label) {
                Some((_, n)) => *n += 1,
                None => counts.push((label, 1)),
            }
        }

        let mut best: Option<(char, usize)> = None;
        for &(label, count) in &counts {
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label)
    }

    /// Returns the accepted labels currently in the window, oldest first.
    pub fn labels(&self) -> impl Iterator<Item = char> + '_ {
        self.history.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Drops the accumulated history, as on session restart.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

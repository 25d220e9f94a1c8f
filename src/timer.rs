//! Lightweight instrumentation for the frame loop.

use std::cell::Cell;
use std::fmt;
use std::time::{Duration, Instant};

use itertools::Itertools;

/// Accumulates the duration of a repeated section.
///
/// Formatting a timer with `{}` prints the number of recorded runs and their average
/// duration, then starts a fresh accumulation window.
pub struct Timer {
    name: &'static str,
    total: Cell<Duration>,
    count: Cell<u32>,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            total: Cell::new(Duration::ZERO),
            count: Cell::new(0),
        }
    }

    /// Invokes a closure, recording the time it takes.
    pub fn time<T>(&self, timee: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let value = timee();
        self.total.set(self.total.get() + start.elapsed());
        self.count.set(self.count.get() + 1);
        value
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.count.replace(0);
        let total = self.total.replace(Duration::ZERO);
        let avg_ms = if count == 0 {
            0.0
        } else {
            total.as_secs_f32() * 1000.0 / count as f32
        };
        write!(f, "{}: {count}x{avg_ms:.01}ms", self.name)
    }
}

/// Logs frames per second once per second, with attached timer readouts.
pub struct FpsCounter {
    name: String,
    frames: u32,
    since: Instant,
}

impl FpsCounter {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            frames: 0,
            since: Instant::now(),
        }
    }

    /// Advances the frame counter by 1 and logs FPS if one second has passed.
    pub fn tick(&mut self) {
        self.tick_with([]);
    }

    /// Advances the frame counter by 1 and logs FPS along with `timers` if one second has
    /// passed. Displayed timers reset their accumulation window.
    pub fn tick_with<'a>(&mut self, timers: impl IntoIterator<Item = &'a Timer>) {
        self.frames += 1;
        if self.since.elapsed() < Duration::from_secs(1) {
            return;
        }

        let details = timers.into_iter().join(", ");
        if details.is_empty() {
            log::debug!("{}: {} FPS", self.name, self.frames);
        } else {
            log::debug!("{}: {} FPS ({details})", self.name, self.frames);
        }

        self.frames = 0;
        self.since = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_display_resets_window() {
        let timer = Timer::new("section");
        timer.time(|| {});
        timer.time(|| {});
        assert!(timer.to_string().starts_with("section: 2x"));
        assert!(timer.to_string().starts_with("section: 0x"));
    }
}

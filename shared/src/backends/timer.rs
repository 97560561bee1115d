use std::time::{Duration, Instant};

/// A timer used to track timeouts, e.g. waiting for acknowledgements or for
/// the next frame to arrive
#[derive(Clone, Debug)]
pub struct Timer {
    duration: Duration,
    last: Instant,
}

impl Timer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            last: Instant::now(),
        }
    }

    /// Restart the timer from now
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Whether the duration has elapsed since the last reset
    pub fn ringing(&self) -> bool {
        self.last.elapsed() >= self.duration
    }

    /// Time left before the timer rings, zero once it is ringing
    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.last.elapsed())
    }

    pub fn elapsed(&self) -> Duration {
        self.last.elapsed()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

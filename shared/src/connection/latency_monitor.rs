use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

/// Estimates one-way latency on a client from the master time written at the
/// start of every frame. Clocks are not synchronized, so latency is measured
/// relative to the smallest clock offset observed so far.
pub struct LatencyMonitor {
    min_offset: Option<f64>,
    samples: VecDeque<f64>,
    window: usize,
}

impl LatencyMonitor {
    pub fn new(window: usize) -> Self {
        Self {
            min_offset: None,
            samples: VecDeque::with_capacity(window),
            window: window.max(1),
        }
    }

    /// Record a frame stamped `master_time` that arrived at `local_time`,
    /// both in seconds. Returns the latency estimate for that frame.
    pub fn record(&mut self, master_time: f64, local_time: f64) -> f64 {
        let offset = local_time - master_time;
        let min_offset = match self.min_offset {
            Some(min) if min <= offset => min,
            _ => offset,
        };
        self.min_offset = Some(min_offset);

        let latency = offset - min_offset;
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(latency);
        latency
    }

    pub fn last(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    pub fn average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    /// Forget history, e.g. after reconnecting to a restarted master
    pub fn reset(&mut self) {
        self.min_offset = None;
        self.samples.clear();
    }
}

// Sends a peer may leave unacknowledged before the oldest are forgotten
const MAX_IN_FLIGHT: usize = 256;

/// Measures send-to-ack round trips on the master, per frame
#[derive(Default)]
pub struct RoundTripTracker {
    in_flight: VecDeque<(i32, Instant)>,
    last: Option<Duration>,
}

impl RoundTripTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_send(&mut self, frame: i32) {
        if self.in_flight.len() == MAX_IN_FLIGHT {
            self.in_flight.pop_front();
        }
        self.in_flight.push_back((frame, Instant::now()));
    }

    /// Returns the round trip of `frame`, if it was sent and not yet acked.
    /// Every send up to and including `frame` is settled by the ack, whether
    /// or not `frame` itself is still tracked.
    pub fn record_ack(&mut self, frame: i32) -> Option<Duration> {
        let mut sent_at = None;
        while let Some(&(sent, instant)) = self.in_flight.front() {
            if sent > frame {
                break;
            }
            self.in_flight.pop_front();
            if sent == frame {
                sent_at = Some(instant);
            }
        }

        let round_trip = sent_at?.elapsed();
        self.last = Some(round_trip);
        Some(round_trip)
    }

    pub fn last(&self) -> Option<Duration> {
        self.last
    }

    /// Sends still waiting for an ack
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

// src/frame.rs

//! Display-cadence coalescing.
//!
//! Sensors can push far faster than a screen refreshes. Samples are parked in
//! a [`FrameCoalescer`] and only the newest is applied when the [`FrameClock`]
//! ticks, which keeps the logic testable without a real display loop.

use std::time::Duration;

use tokio::time::{self, Interval, MissedTickBehavior};

/// Latest-wins slot for samples arriving between two frames.
#[derive(Debug, Clone)]
pub struct FrameCoalescer<T> {
    pending: Option<T>,
    dropped: u64,
}

impl<T> Default for FrameCoalescer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FrameCoalescer<T> {
    pub fn new() -> Self {
        FrameCoalescer {
            pending: None,
            dropped: 0,
        }
    }

    /// Parks a sample, replacing any sample not yet applied.
    pub fn offer(&mut self, sample: T) {
        if self.pending.replace(sample).is_some() {
            self.dropped += 1;
        }
    }

    /// Takes the sample to apply on this frame, if one arrived.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Samples superseded before they could be applied.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

/// Periodic frame tick.
///
/// Late ticks are skipped rather than bursted, so a stalled loop resumes at
/// one apply per frame.
#[derive(Debug)]
pub struct FrameClock {
    interval: Interval,
}

impl FrameClock {
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        FrameClock { interval }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    /// Waits for the next frame boundary.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

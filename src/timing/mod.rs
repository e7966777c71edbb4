//! Suspension points of the player
//!
//! Playback only ever waits in two places: for the next display refresh
//! while a leg is animating, and for a fixed settle pause between legs.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Source of refresh ticks and delays
#[async_trait]
pub trait FrameClock: Send {
    /// Wait for the next refresh; returns the time elapsed since the call
    async fn next_frame(&mut self) -> Duration;

    /// Wait for `duration`; returns the time actually elapsed
    async fn delay(&mut self, duration: Duration) -> Duration;
}

/// Fastest refresh rate an interval clock will tick at
const MAX_REFRESH_HZ: u32 = 1000;

/// Refresh ticks from a tokio interval
pub struct IntervalClock {
    interval: Interval,
}

impl IntervalClock {
    /// Create a clock ticking `refresh_hz` times per second, within 1..=1000 Hz
    pub fn new(refresh_hz: u32) -> Self {
        let period = Duration::from_secs(1) / refresh_hz.clamp(1, MAX_REFRESH_HZ);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }

    #[cfg(test)]
    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

#[async_trait]
impl FrameClock for IntervalClock {
    async fn next_frame(&mut self) -> Duration {
        let started = Instant::now();
        self.interval.tick().await;
        started.elapsed()
    }

    async fn delay(&mut self, duration: Duration) -> Duration {
        let started = Instant::now();
        tokio::time::sleep(duration).await;
        started.elapsed()
    }
}

/// Clock that ticks a fixed step without waiting
#[cfg(test)]
pub struct ManualClock {
    pub frame: Duration,
    pub frames: usize,
    pub delays: Vec<Duration>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(frame: Duration) -> Self {
        Self {
            frame,
            frames: 0,
            delays: Vec::new(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl FrameClock for ManualClock {
    async fn next_frame(&mut self) -> Duration {
        self.frames += 1;
        self.frame
    }

    async fn delay(&mut self, duration: Duration) -> Duration {
        self.delays.push(duration);
        duration
    }
}

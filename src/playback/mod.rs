pub mod engine;
pub mod leg;

pub use engine::Player;

use crate::core::geo::{self, LatLng};
use crate::core::Step;
use crate::input::LoadError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Playback configuration
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Camera travel speed in meters per millisecond
    pub speed_m_per_ms: f64,
    /// Pause after each leg
    pub settle: Duration,
    pub initial_center: LatLng,
    pub initial_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed_m_per_ms: 200.0,
            settle: Duration::from_millis(500),
            initial_center: LatLng::new(55.0, 37.0),
            initial_zoom: 4.0,
            min_zoom: 0.0,
            max_zoom: 7.0,
        }
    }
}

impl PlaybackConfig {
    /// Keep a zoom level inside what the map supports
    pub fn limit_zoom(&self, zoom: f64) -> f64 {
        geo::clamp(self.min_zoom, zoom, self.max_zoom)
    }
}

/// What Load needs before any journey is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    /// Requested start index, negative counting from the end
    pub start: i64,
}

/// Journey plus position, replaced rather than mutated on every transition
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackContext {
    pub steps: Arc<[Step]>,
    /// Step being displayed or animated toward
    pub step_index: usize,
}

impl PlaybackContext {
    pub fn new(steps: Arc<[Step]>, step_index: usize) -> Self {
        Self { steps, step_index }
    }

    /// Same journey, different position
    pub fn at(&self, step_index: usize) -> Self {
        Self {
            steps: Arc::clone(&self.steps),
            step_index,
        }
    }

    /// Step at `index`, or an error naming the gap
    pub fn step(&self, index: usize) -> Result<&Step, PlaybackError> {
        self.steps.get(index).ok_or(PlaybackError::StepOutOfRange {
            index,
            len: self.steps.len(),
        })
    }

    pub fn is_last(&self) -> bool {
        self.step_index + 1 >= self.steps.len()
    }
}

/// Playback states, each carrying exactly what it needs
#[derive(Debug)]
pub enum PlaybackState {
    Load(LoadRequest),
    LoadError { request: LoadRequest, error: LoadError },
    Ready(PlaybackContext),
    PlayStep(PlaybackContext),
    NextStep(PlaybackContext),
    Finished(PlaybackContext),
    Restart(PlaybackContext),
}

impl PlaybackState {
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackState::Load(_) => "load",
            PlaybackState::LoadError { .. } => "load-error",
            PlaybackState::Ready(_) => "ready",
            PlaybackState::PlayStep(_) => "play-step",
            PlaybackState::NextStep(_) => "next-step",
            PlaybackState::Finished(_) => "finished",
            PlaybackState::Restart(_) => "restart",
        }
    }

    /// Context of the states that have a journey
    pub fn context(&self) -> Option<&PlaybackContext> {
        match self {
            PlaybackState::Load(_) | PlaybackState::LoadError { .. } => None,
            PlaybackState::Ready(ctx)
            | PlaybackState::PlayStep(ctx)
            | PlaybackState::NextStep(ctx)
            | PlaybackState::Finished(ctx)
            | PlaybackState::Restart(ctx) => Some(ctx),
        }
    }
}

/// Unrecoverable playback failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    /// The journey has no step at the index playback needs. Happens with
    /// journeys of fewer than two steps, or a start index past the end.
    #[error("journey has no step {index} (it has {len} steps)")]
    StepOutOfRange { index: usize, len: usize },
}

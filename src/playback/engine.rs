use crate::core::current_location;
use crate::input::{load_journey, resolve_start_index, JourneySource};
use crate::playback::leg::play_leg;
use crate::playback::{LoadRequest, PlaybackConfig, PlaybackContext, PlaybackError, PlaybackState};
use crate::stage::{Button, Overlay, Stage};
use crate::timing::FrameClock;
use chrono::Utc;
use tracing::{debug, info, warn};

/// Drives a journey through the playback states
///
/// The player owns the stage and clock for the whole session; every state
/// receives its context by value and hands a new one to the next state.
pub struct Player {
    source: Box<dyn JourneySource>,
    stage: Stage,
    clock: Box<dyn FrameClock>,
    config: PlaybackConfig,
}

impl Player {
    /// Create a player and point the camera at the configured starting view
    pub fn new(
        source: Box<dyn JourneySource>,
        mut stage: Stage,
        clock: Box<dyn FrameClock>,
        config: PlaybackConfig,
    ) -> Self {
        stage
            .map
            .set_view(config.initial_center, Some(config.limit_zoom(config.initial_zoom)));

        Self {
            source,
            stage,
            clock,
            config,
        }
    }

    /// Initial state for a requested start index
    pub fn start(start: i64) -> PlaybackState {
        PlaybackState::Load(LoadRequest { start })
    }

    /// Run forever. Only returns if the journey cannot be played.
    pub async fn run(&mut self, mut state: PlaybackState) -> Result<(), PlaybackError> {
        loop {
            state = self.advance(state).await?;
        }
    }

    /// Perform one state's work and return the state that follows
    pub async fn advance(&mut self, state: PlaybackState) -> Result<PlaybackState, PlaybackError> {
        debug!(state = state.name(), index = ?state.context().map(|c| c.step_index), "entering state");

        match state {
            PlaybackState::Load(request) => Ok(self.load(request).await),
            PlaybackState::LoadError { request, error } => {
                self.stage.overlays.set_error_details(&error.to_string());
                self.stage.overlays.show(Overlay::LoadError);
                self.stage.overlays.accept(Button::Retry).await;
                self.stage.overlays.hide(Overlay::LoadError);

                info!("retrying journey load");
                Ok(PlaybackState::Load(request))
            }
            PlaybackState::Ready(ctx) => {
                let step = ctx.step(ctx.step_index)?;
                self.stage.map.set_view(step.position(), None);

                self.stage.overlays.show(Overlay::Ready);
                self.stage.overlays.accept(Button::Start).await;
                self.stage.overlays.hide(Overlay::Ready);

                self.stage.audio.play();
                self.stage.audio.repeat_on_end();

                Ok(PlaybackState::PlayStep(ctx))
            }
            PlaybackState::PlayStep(ctx) => {
                let report = play_leg(&ctx, &mut self.stage, self.clock.as_mut(), &self.config).await?;
                debug!(
                    index = ctx.step_index,
                    frames = report.frames,
                    distance_m = report.distance.round(),
                    "leg finished"
                );
                Ok(PlaybackState::NextStep(ctx))
            }
            PlaybackState::NextStep(ctx) => {
                if ctx.is_last() {
                    return Ok(PlaybackState::Finished(ctx));
                }
                let next = ctx.at(ctx.step_index + 1);
                Ok(PlaybackState::PlayStep(next))
            }
            PlaybackState::Finished(ctx) => {
                let location = current_location(&ctx.steps);
                info!(location = location.unwrap_or("-"), "journey finished");

                self.stage.overlays.set_current_location(location);
                self.stage.overlays.show(Overlay::Finished);
                self.stage.overlays.accept(Button::Restart).await;
                self.stage.overlays.hide(Overlay::Finished);

                Ok(PlaybackState::Restart(ctx))
            }
            PlaybackState::Restart(ctx) => Ok(PlaybackState::PlayStep(ctx.at(1))),
        }
    }

    async fn load(&mut self, request: LoadRequest) -> PlaybackState {
        match load_journey(self.source.as_ref(), Utc::now()).await {
            Ok(steps) => {
                let step_index = resolve_start_index(steps.len(), request.start);
                info!(steps = steps.len(), start = request.start, step_index, "journey ready");
                PlaybackState::Ready(PlaybackContext::new(steps, step_index))
            }
            Err(error) => {
                warn!(source = %self.source.describe(), "Failed to load journey: {}", error);
                PlaybackState::LoadError { request, error }
            }
        }
    }
}

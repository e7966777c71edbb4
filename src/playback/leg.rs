use crate::core::geo::{self, LatLng};
use crate::core::Step;
use crate::playback::{PlaybackConfig, PlaybackContext, PlaybackError};
use crate::stage::Stage;
use crate::timing::FrameClock;
use std::time::Duration;
use tracing::{info, trace};

/// Camera travel between two consecutive steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegPlan {
    pub from: LatLng,
    pub to: LatLng,
    /// Great-circle length in meters
    pub distance: f64,
    pub duration: Duration,
}

impl LegPlan {
    pub fn new(from: LatLng, to: LatLng, speed_m_per_ms: f64) -> Self {
        let distance = geo::distance(from, to);
        let millis = distance / speed_m_per_ms;
        let duration = Duration::try_from_secs_f64(millis / 1000.0).unwrap_or(Duration::ZERO);

        Self {
            from,
            to,
            distance,
            duration,
        }
    }

    /// Fraction of the leg covered after `elapsed`, in `[0, 1]`
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        geo::clamp(0.0, elapsed.as_secs_f64() / self.duration.as_secs_f64(), 1.0)
    }

    pub fn position_at(&self, elapsed: Duration) -> LatLng {
        LatLng::lerp(self.from, self.to, self.progress(elapsed))
    }
}

/// What a finished leg looked like
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegReport {
    pub frames: usize,
    pub distance: f64,
}

/// Animate the camera and path from `steps[i - 1]` to `steps[i]`.
///
/// Zoom levels of already visited steps are applied up front so the camera
/// never pans and zooms at the same time. The leg always runs to the end;
/// if the clock stops ticking, so does the leg.
pub async fn play_leg(
    ctx: &PlaybackContext,
    stage: &mut Stage,
    clock: &mut dyn FrameClock,
    config: &PlaybackConfig,
) -> Result<LegReport, PlaybackError> {
    let index = ctx.step_index;
    let current = ctx.step(index)?;
    let previous = ctx.step(index.wrapping_sub(1))?;
    let visited: &[Step] = &ctx.steps[..index];

    for step in visited {
        if let Some(zoom) = step.zoom {
            stage.map.set_zoom(config.limit_zoom(zoom));
        }
    }

    let plan = LegPlan::new(previous.position(), current.position(), config.speed_m_per_ms);
    info!(
        from = %previous.id,
        to = %current.id,
        distance_m = plan.distance.round(),
        duration_ms = plan.duration.as_millis() as u64,
        "leg started"
    );

    let mut trail: Vec<LatLng> = visited.iter().map(Step::position).collect();
    let mut elapsed = Duration::ZERO;
    let mut frames = 0;

    while elapsed < plan.duration {
        elapsed += clock.next_frame().await;
        frames += 1;

        let head = plan.position_at(elapsed);
        trail.push(head);
        stage.path.set_points(&trail);
        trail.pop();
        stage.map.set_view(head, None);

        trace!(frame = frames, progress = plan.progress(elapsed), "leg frame");
    }

    // Land exactly on the step
    trail.push(current.position());
    stage.path.set_points(&trail);
    stage.map.set_view(current.position(), current.zoom.map(|z| config.limit_zoom(z)));

    clock.delay(config.settle).await;

    Ok(LegReport {
        frames,
        distance: plan.distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::mock::{RecordingStage, StageEvent};
    use crate::timing::ManualClock;
    use std::sync::Arc;

    const FRAME: Duration = Duration::from_millis(16);

    fn context(steps: Vec<Step>, index: usize) -> PlaybackContext {
        PlaybackContext::new(steps.into(), index)
    }

    #[test]
    fn test_plan_duration_from_speed() {
        // ~111 km at 200 m/ms
        let plan = LegPlan::new(LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0), 200.0);
        let ms = plan.duration.as_secs_f64() * 1000.0;
        assert!((ms - 556.0).abs() < 2.0, "got {ms}");
    }

    #[test]
    fn test_plan_endpoints() {
        let from = LatLng::new(41.39, 2.17);
        let to = LatLng::new(38.72, -9.14);
        let plan = LegPlan::new(from, to, 200.0);

        assert_eq!(plan.position_at(Duration::ZERO), from);
        assert_eq!(plan.position_at(plan.duration), to);
        assert_eq!(plan.position_at(plan.duration * 3), to);
    }

    #[test]
    fn test_plan_zero_distance() {
        let p = LatLng::new(10.0, 10.0);
        let plan = LegPlan::new(p, p, 200.0);
        assert_eq!(plan.duration, Duration::ZERO);
        assert_eq!(plan.progress(Duration::ZERO), 1.0);
    }

    #[tokio::test]
    async fn test_leg_ends_exactly_on_step() {
        let recorder = RecordingStage::new();
        let mut stage = recorder.stage();
        let mut clock = ManualClock::new(FRAME);
        let config = PlaybackConfig::default();

        let steps = vec![Step::new("0", 0.0, 0.0), Step::new("1", 0.3, 0.7)];
        let ctx = context(steps, 1);

        let report = play_leg(&ctx, &mut stage, &mut clock, &config).await.unwrap();
        assert!(report.frames > 1);
        assert_eq!(clock.frames, report.frames);
        assert_eq!(clock.delays, vec![Duration::from_millis(500)]);

        assert_eq!(recorder.last_view(), Some((LatLng::new(0.3, 0.7), None)));
        assert_eq!(
            recorder.last_path(),
            Some(vec![LatLng::new(0.0, 0.0), LatLng::new(0.3, 0.7)])
        );
    }

    #[tokio::test]
    async fn test_leg_frames_move_forward() {
        let recorder = RecordingStage::new();
        let mut stage = recorder.stage();
        let mut clock = ManualClock::new(FRAME);

        let ctx = context(vec![Step::new("0", 0.0, 0.0), Step::new("1", 0.0, 2.0)], 1);
        play_leg(&ctx, &mut stage, &mut clock, &PlaybackConfig::default()).await.unwrap();

        let lngs: Vec<f64> = recorder
            .events()
            .into_iter()
            .filter_map(|e| match e {
                StageEvent::SetView(center, _) => Some(center.lng),
                _ => None,
            })
            .collect();

        assert!(lngs.windows(2).all(|w| w[0] <= w[1]));
        assert!(lngs.iter().all(|lng| (0.0..=2.0).contains(lng)));

        // Every frame draws the visited steps plus the moving head
        for event in recorder.events() {
            if let StageEvent::SetPoints(points) = event {
                assert_eq!(points.len(), 2);
                assert_eq!(points[0], LatLng::new(0.0, 0.0));
            }
        }
    }

    #[tokio::test]
    async fn test_coincident_steps_skip_animation() {
        let recorder = RecordingStage::new();
        let mut stage = recorder.stage();
        let mut clock = ManualClock::new(FRAME);

        let ctx = context(
            vec![Step::new("0", 5.0, 5.0), Step::new("1", 5.0, 5.0).with_zoom(6.0)],
            1,
        );
        let report = play_leg(&ctx, &mut stage, &mut clock, &PlaybackConfig::default()).await.unwrap();

        assert_eq!(report.frames, 0);
        assert_eq!(report.distance, 0.0);
        assert_eq!(
            recorder.events(),
            vec![
                StageEvent::SetPoints(vec![LatLng::new(5.0, 5.0), LatLng::new(5.0, 5.0)]),
                StageEvent::SetView(LatLng::new(5.0, 5.0), Some(6.0)),
            ]
        );
        assert_eq!(clock.delays.len(), 1);
    }

    #[tokio::test]
    async fn test_visited_zooms_applied_before_moving() {
        let recorder = RecordingStage::new();
        let mut stage = recorder.stage();
        let mut clock = ManualClock::new(FRAME);

        let steps = vec![
            Step::new("0", 0.0, 0.0).with_zoom(3.0),
            Step::new("1", 0.0, 1.0),
            Step::new("2", 0.0, 2.0).with_zoom(12.0),
            Step::new("3", 0.0, 3.0).with_zoom(5.0),
        ];
        let ctx = context(steps, 3);
        play_leg(&ctx, &mut stage, &mut clock, &PlaybackConfig::default()).await.unwrap();

        let events = recorder.events();
        assert_eq!(events[0], StageEvent::SetZoom(3.0));
        // Clamped to the map's maximum
        assert_eq!(events[1], StageEvent::SetZoom(7.0));
        assert!(matches!(events[2], StageEvent::SetPoints(_)));
        assert_eq!(recorder.last_view(), Some((LatLng::new(0.0, 3.0), Some(5.0))));

        let path = recorder.last_path().unwrap();
        assert_eq!(path.len(), 4);
    }

    #[tokio::test]
    async fn test_leg_without_previous_step() {
        let recorder = RecordingStage::new();
        let mut stage = recorder.stage();
        let mut clock = ManualClock::new(FRAME);

        let ctx = PlaybackContext::new(Arc::from(vec![Step::new("0", 0.0, 0.0)]), 1);
        let err = play_leg(&ctx, &mut stage, &mut clock, &PlaybackConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err, PlaybackError::StepOutOfRange { index: 1, len: 1 });
        assert!(recorder.events().is_empty());
    }
}

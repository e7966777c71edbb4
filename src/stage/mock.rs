use async_trait::async_trait;
use crate::core::LatLng;
use crate::stage::{AudioTrack, Button, MapView, Overlay, Overlays, PathLayer, Stage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Something the player did to the stage
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    SetView(LatLng, Option<f64>),
    SetZoom(f64),
    SetPoints(Vec<LatLng>),
    Play,
    RepeatOnEnd,
    Show(Overlay),
    Hide(Overlay),
    Location(Option<String>),
    ErrorDetails(String),
    Accepted(Button),
}

/// Stage double that records every call in order
///
/// Buttons are pressed from a budget: `accept` returns immediately while
/// presses for that button remain, and waits forever once they run out.
#[derive(Clone, Default)]
pub struct RecordingStage {
    events: Arc<Mutex<Vec<StageEvent>>>,
    presses: Arc<Mutex<HashMap<Button, usize>>>,
}

impl RecordingStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `count` more presses of `button`
    pub fn press(&self, button: Button, count: usize) {
        *self.presses.lock().unwrap().entry(button).or_default() += count;
    }

    pub fn events(&self) -> Vec<StageEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Points of the most recent path update
    pub fn last_path(&self) -> Option<Vec<LatLng>> {
        self.events().into_iter().rev().find_map(|e| match e {
            StageEvent::SetPoints(points) => Some(points),
            _ => None,
        })
    }

    /// The most recent camera move
    pub fn last_view(&self) -> Option<(LatLng, Option<f64>)> {
        self.events().into_iter().rev().find_map(|e| match e {
            StageEvent::SetView(center, zoom) => Some((center, zoom)),
            _ => None,
        })
    }

    pub fn stage(&self) -> Stage {
        Stage {
            map: Box::new(self.clone()),
            path: Box::new(self.clone()),
            audio: Box::new(self.clone()),
            overlays: Box::new(self.clone()),
        }
    }

    fn record(&self, event: StageEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl MapView for RecordingStage {
    fn set_view(&mut self, center: LatLng, zoom: Option<f64>) {
        self.record(StageEvent::SetView(center, zoom));
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.record(StageEvent::SetZoom(zoom));
    }
}

impl PathLayer for RecordingStage {
    fn set_points(&mut self, points: &[LatLng]) {
        self.record(StageEvent::SetPoints(points.to_vec()));
    }
}

impl AudioTrack for RecordingStage {
    fn play(&mut self) {
        self.record(StageEvent::Play);
    }

    fn repeat_on_end(&mut self) {
        self.record(StageEvent::RepeatOnEnd);
    }
}

#[async_trait]
impl Overlays for RecordingStage {
    fn show(&mut self, overlay: Overlay) {
        self.record(StageEvent::Show(overlay));
    }

    fn hide(&mut self, overlay: Overlay) {
        self.record(StageEvent::Hide(overlay));
    }

    fn set_current_location(&mut self, location: Option<&str>) {
        self.record(StageEvent::Location(location.map(str::to_string)));
    }

    fn set_error_details(&mut self, details: &str) {
        self.record(StageEvent::ErrorDetails(details.to_string()));
    }

    async fn accept(&mut self, button: Button) {
        let available = {
            let mut presses = self.presses.lock().unwrap();
            match presses.get_mut(&button) {
                Some(left) if *left > 0 => {
                    *left -= 1;
                    true
                }
                _ => false,
            }
        };

        if !available {
            std::future::pending::<()>().await;
        }
        self.record(StageEvent::Accepted(button));
    }
}

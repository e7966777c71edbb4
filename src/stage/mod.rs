pub mod latch;
#[cfg(test)]
pub mod mock;
pub mod terminal;

pub use latch::ButtonLatch;
pub use terminal::{TerminalAudio, TerminalMap, TerminalOverlays, TerminalPath};

use async_trait::async_trait;
use crate::core::LatLng;

/// Camera of the map the journey is drawn on
pub trait MapView: Send {
    /// Center the camera, optionally changing the zoom level
    fn set_view(&mut self, center: LatLng, zoom: Option<f64>);

    /// Change the zoom level without moving
    fn set_zoom(&mut self, zoom: f64);
}

/// The drawn journey line
pub trait PathLayer: Send {
    /// Replace every point of the line
    fn set_points(&mut self, points: &[LatLng]);
}

/// Background music
pub trait AudioTrack: Send {
    /// Start playback
    fn play(&mut self);

    /// Start over whenever the track ends
    fn repeat_on_end(&mut self);
}

/// Overlay panels shown over the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Overlay {
    /// Journey could not be loaded
    LoadError,
    /// Journey loaded, waiting to start
    Ready,
    /// Last leg played
    Finished,
}

/// Buttons the viewer can press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Retry,
    Start,
    Restart,
}

impl Button {
    pub fn label(self) -> &'static str {
        match self {
            Button::Retry => "retry",
            Button::Start => "start",
            Button::Restart => "restart",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "retry" | "r" => Some(Button::Retry),
            "start" | "s" => Some(Button::Start),
            "restart" => Some(Button::Restart),
            _ => None,
        }
    }
}

/// Overlay panels and their buttons
#[async_trait]
pub trait Overlays: Send {
    fn show(&mut self, overlay: Overlay);

    fn hide(&mut self, overlay: Overlay);

    /// Text of the "current location" line on the finished panel
    fn set_current_location(&mut self, location: Option<&str>);

    /// Diagnostics shown on the load error panel
    fn set_error_details(&mut self, details: &str);

    /// Resolve on the first press of `button` after this call.
    ///
    /// Presses before the call, or of other buttons, are ignored.
    async fn accept(&mut self, button: Button);
}

/// Everything the player draws on or plays through
pub struct Stage {
    pub map: Box<dyn MapView>,
    pub path: Box<dyn PathLayer>,
    pub audio: Box<dyn AudioTrack>,
    pub overlays: Box<dyn Overlays>,
}

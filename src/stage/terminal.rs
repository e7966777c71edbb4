//! Text-mode stage
//!
//! Camera and path changes go to the log, overlays are printed to stdout,
//! and buttons are pressed by typing on stdin.

use async_trait::async_trait;
use crate::core::LatLng;
use crate::stage::{AudioTrack, Button, ButtonLatch, MapView, Overlay, Overlays, PathLayer};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, trace, warn};

/// Map camera that logs where it is looking
pub struct TerminalMap {
    center: Option<LatLng>,
    zoom: Option<f64>,
}

impl TerminalMap {
    pub fn new() -> Self {
        Self { center: None, zoom: None }
    }
}

impl Default for TerminalMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MapView for TerminalMap {
    fn set_view(&mut self, center: LatLng, zoom: Option<f64>) {
        self.center = Some(center);
        if zoom.is_some() {
            self.zoom = zoom;
        }
        trace!(lat = center.lat, lng = center.lng, zoom = ?self.zoom, "camera");
    }

    fn set_zoom(&mut self, zoom: f64) {
        if self.zoom != Some(zoom) {
            debug!(zoom, "zoom");
        }
        self.zoom = Some(zoom);
    }
}

/// Journey line that logs its length
pub struct TerminalPath {
    points: usize,
}

impl TerminalPath {
    pub fn new() -> Self {
        Self { points: 0 }
    }
}

impl Default for TerminalPath {
    fn default() -> Self {
        Self::new()
    }
}

impl PathLayer for TerminalPath {
    fn set_points(&mut self, points: &[LatLng]) {
        if points.len() != self.points {
            debug!(points = points.len(), "path");
        }
        self.points = points.len();
    }
}

/// Soundtrack placeholder that only reports what it would play
pub struct TerminalAudio {
    track: String,
    repeating: bool,
}

impl TerminalAudio {
    pub fn new(track: &str) -> Self {
        Self {
            track: track.to_string(),
            repeating: false,
        }
    }
}

impl AudioTrack for TerminalAudio {
    fn play(&mut self) {
        info!(track = %self.track, repeat = self.repeating, "music started");
    }

    fn repeat_on_end(&mut self) {
        self.repeating = true;
        debug!(track = %self.track, "music set to repeat");
    }
}

/// Overlay panels on stdout, buttons on stdin
///
/// An empty line presses whichever button is currently offered; typing a
/// button name presses only that one.
pub struct TerminalOverlays {
    latch: ButtonLatch,
    autoplay: bool,
    error_details: String,
    location: Option<String>,
}

impl TerminalOverlays {
    /// Create the overlays and start listening on stdin.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(autoplay: bool) -> Self {
        let latch = ButtonLatch::new();
        tokio::spawn(read_buttons(latch.clone()));
        Self::with_latch(latch, autoplay)
    }

    /// Create the overlays around an existing latch, without reading stdin
    pub fn with_latch(latch: ButtonLatch, autoplay: bool) -> Self {
        Self {
            latch,
            autoplay,
            error_details: String::new(),
            location: None,
        }
    }
}

async fn read_buttons(latch: ButtonLatch) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => {
                let pressed = latch.press_armed();
                debug!(?pressed, "enter");
            }
            Ok(Some(line)) => match Button::from_label(&line) {
                Some(button) => {
                    if !latch.press(button) {
                        debug!(button = button.label(), "button not offered right now");
                    }
                }
                None => println!("Unknown command {:?}", line.trim()),
            },
            Ok(None) => {
                debug!("stdin closed");
                break;
            }
            Err(e) => {
                warn!("Failed to read stdin: {}", e);
                break;
            }
        }
    }
}

#[async_trait]
impl Overlays for TerminalOverlays {
    fn show(&mut self, overlay: Overlay) {
        match overlay {
            Overlay::LoadError => {
                println!("Could not load the journey: {}", self.error_details);
                println!("Press Enter to retry.");
            }
            Overlay::Ready => println!("Journey ready. Press Enter to start."),
            Overlay::Finished => {
                println!("The end.");
                if let Some(location) = &self.location {
                    println!("Currently in {}.", location);
                }
                println!("Press Enter to watch again.");
            }
        }
    }

    fn hide(&mut self, overlay: Overlay) {
        trace!(?overlay, "overlay hidden");
    }

    fn set_current_location(&mut self, location: Option<&str>) {
        self.location = location.map(str::to_string);
    }

    fn set_error_details(&mut self, details: &str) {
        self.error_details = details.to_string();
    }

    async fn accept(&mut self, button: Button) {
        loop {
            let pressed = self.latch.arm(button);

            if self.autoplay && button == Button::Start {
                self.latch.press(button);
            }

            match pressed.await {
                Ok(()) => return,
                // Subscription replaced before it fired; only a press may resolve
                Err(_) => debug!(button = button.label(), "button subscription dropped, re-arming"),
            }
        }
    }
}

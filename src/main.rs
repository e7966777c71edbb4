mod core;
mod input;
mod playback;
mod settings;
mod stage;
mod timing;

use anyhow::{Context, Result};
use clap::Parser;
use input::source_for;
use playback::Player;
use settings::Settings;
use stage::{Stage, TerminalAudio, TerminalMap, TerminalOverlays, TerminalPath};
use std::path::PathBuf;
use std::time::Duration;
use timing::IntervalClock;
use tracing_subscriber::EnvFilter;

/// Replay a travel journey step by step
#[derive(Parser, Debug)]
#[command(name = "journey-replay", version)]
struct Cli {
    /// Journey document (URL or file path)
    #[arg(long)]
    source: Option<String>,

    /// Step to start from; negative values count back from the end
    #[arg(long, allow_negative_numbers = true)]
    start: Option<i64>,

    /// Camera speed in meters per millisecond
    #[arg(long)]
    speed: Option<f64>,

    /// Settings file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start playing as soon as the journey is loaded
    #[arg(long)]
    autoplay: bool,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    save_settings: bool,
}

impl Cli {
    fn settings(&self) -> Settings {
        let mut settings = Settings::load(self.config.as_deref());
        if let Some(source) = &self.source {
            settings.source = source.clone();
        }
        if let Some(start) = self.start {
            settings.start = start;
        }
        if let Some(speed) = self.speed {
            settings.speed_m_per_ms = speed;
        }
        settings
    }
}

async fn play(settings: Settings, autoplay: bool) -> Result<()> {
    let stage = Stage {
        map: Box::new(TerminalMap::new()),
        path: Box::new(TerminalPath::new()),
        audio: Box::new(TerminalAudio::new(&settings.audio_track)),
        overlays: Box::new(TerminalOverlays::new(autoplay)),
    };

    let mut player = Player::new(
        source_for(&settings.source),
        stage,
        Box::new(IntervalClock::new(settings.refresh_hz)),
        settings.playback_config(),
    );

    player
        .run(Player::start(settings.start))
        .await
        .with_context(|| format!("Cannot play journey from {}", settings.source))
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = cli.settings();

    if cli.save_settings {
        let path = settings.save(cli.config.as_deref())?;
        tracing::info!(path = %path.display(), "settings saved");
    }

    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let result = rt.block_on(play(settings, cli.autoplay));

    // The stdin reader may still be blocked on a read
    rt.shutdown_timeout(Duration::from_millis(100));
    result
}

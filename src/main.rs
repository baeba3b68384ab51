use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use watchtrack::{
    utils::{format_time, logging},
    Database, LogNotifier, PlaybackSignal, PlayerCommand, ProgressKey, ProgressRecord,
    ProgressStore, SessionController, SettingsStore, SimulatedMedia, TrackingConfig,
    TrackingSession, VideoInfo, watched_duration,
};

/// watchtrack - watched-interval tracking for video playback
///
/// Replays scripted playback against a simulated player and inspects the
/// progress records it leaves behind.
#[derive(Parser, Debug)]
#[command(name = "watchtrack")]
#[command(version)]
#[command(about = "Track which parts of a video were actually watched", long_about = None)]
struct Cli {
    /// Directory holding the progress database and settings.json
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// User the progress records belong to
    #[arg(long, global = true, default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive a simulated player through a JSON script of steps
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        #[command(flatten)]
        video: VideoArgs,
    },
    /// Print the stored record for one video
    Show {
        #[arg(long)]
        video: String,
    },
    /// Print every stored record of the user
    List,
    /// Forget the stored record for one video
    Reset {
        #[arg(long)]
        video: String,
    },
    /// Print the tracking settings, applying any given changes first
    Config {
        #[command(flatten)]
        changes: ConfigArgs,
    },
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Seconds between periodic flushes while playing
    #[arg(long)]
    flush_secs: Option<u64>,

    /// Largest gap in seconds still counted as continuous playback
    #[arg(long)]
    tolerance: Option<f64>,

    /// Volume restored when unmuting at zero volume
    #[arg(long)]
    unmute_volume: Option<f64>,
}

impl ConfigArgs {
    fn is_empty(&self) -> bool {
        self.flush_secs.is_none() && self.tolerance.is_none() && self.unmute_volume.is_none()
    }

    fn apply(&self, config: &mut TrackingConfig) -> Result<()> {
        if let Some(secs) = self.flush_secs {
            if secs == 0 {
                anyhow::bail!("Flush interval must be at least 1 second");
            }
            config.flush_interval_secs = secs;
        }
        if let Some(tolerance) = self.tolerance {
            if !(tolerance.is_finite() && tolerance > 0.0) {
                anyhow::bail!("Tolerance must be positive, got: {tolerance}");
            }
            config.continuity_tolerance_secs = tolerance;
        }
        if let Some(volume) = self.unmute_volume {
            if !(0.0..=1.0).contains(&volume) {
                anyhow::bail!("Unmute volume must be within 0..=1, got: {volume}");
            }
            config.unmute_volume = volume;
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
struct VideoArgs {
    /// Video identifier
    #[arg(long)]
    video: String,

    /// Title used in the completion notification
    #[arg(long, default_value = "Untitled")]
    title: String,

    /// Clip length in seconds
    #[arg(long)]
    duration: f64,
}

impl VideoArgs {
    fn validate(&self) -> Result<()> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            anyhow::bail!("Duration must be positive, got: {}", self.duration);
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
enum ReplayStep {
    Play,
    Pause,
    Watch {
        seconds: f64,
        #[serde(default = "default_sample_step")]
        step: f64,
    },
    Seek {
        to: f64,
    },
    Skip {
        by: f64,
    },
    Volume {
        level: f64,
    },
    Mute,
    Fullscreen,
    /// Plays through to the end of the clip.
    End,
}

fn default_sample_step() -> f64 {
    0.25
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();
    if !ProgressKey::is_valid_user_id(&cli.user) {
        anyhow::bail!("User id must be non-empty and must not contain '_', got: {:?}", cli.user);
    }

    let data_dir = match cli.data_dir.clone() {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    if let Command::Config { changes } = &cli.command {
        let settings = SettingsStore::new(data_dir.join("settings.json"))?;
        if !changes.is_empty() {
            let mut config = settings.stored_tracking()?;
            changes.apply(&mut config)?;
            settings.update_tracking(config)?;
        }
        println!("{}", serde_json::to_string_pretty(&settings.stored_tracking()?)?);
        return Ok(());
    }

    let database = Database::new(data_dir.join("watchtrack.sqlite3"))?;
    let store = ProgressStore::new(Arc::new(database));

    match cli.command {
        Command::Replay { script, video } => {
            video.validate()?;
            let settings = SettingsStore::new(data_dir.join("settings.json"))?;
            replay(&cli.user, &script, &video, store, &settings).await
        }
        Command::Show { video } => {
            let key = ProgressKey::new(cli.user.clone(), video);
            match store.load(&key)? {
                Some(record) => {
                    print_record(&key.video_id, &record);
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
                None => println!("no saved progress for {key}"),
            }
            Ok(())
        }
        Command::List => {
            let records = store.list_for_user(&cli.user)?;
            if records.is_empty() {
                println!("no saved progress for {}", cli.user);
            }
            for (video_id, record) in records {
                print_record(&video_id, &record);
            }
            Ok(())
        }
        Command::Reset { video } => {
            let key = ProgressKey::new(cli.user.clone(), video);
            store.discard(&key)?;
            println!("cleared progress for {key}");
            Ok(())
        }
        Command::Config { .. } => Ok(()),
    }
}

fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("watchtrack"))
        .ok_or_else(|| anyhow!("could not determine a data directory; pass --data-dir"))
}

async fn replay(
    user: &str,
    script: &Path,
    video: &VideoArgs,
    store: ProgressStore,
    settings: &SettingsStore,
) -> Result<()> {
    let contents = fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let steps: Vec<ReplayStep> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse script {}", script.display()))?;

    let media = SimulatedMedia::new(video.duration);
    let session = TrackingSession::new(
        user,
        VideoInfo::new(video.video.clone(), video.title.clone(), video.duration),
        settings.tracking()?,
        store,
        Box::new(media.clone()),
        Arc::new(LogNotifier),
    );
    let controller = SessionController::spawn(session);
    forward_signals(&controller, &media).await?;

    for step in steps {
        let playing = controller.snapshot().await?.is_playing;
        match step {
            ReplayStep::Play if !playing => controller.command(PlayerCommand::TogglePlayPause)?,
            ReplayStep::Pause if playing => controller.command(PlayerCommand::TogglePlayPause)?,
            ReplayStep::Play | ReplayStep::Pause => {}
            ReplayStep::Watch { seconds, step } => media.advance(seconds, step),
            ReplayStep::Seek { to } => controller.command(PlayerCommand::Seek { time: to })?,
            ReplayStep::Skip { by } => {
                controller.command(PlayerCommand::SkipBy { seconds: by })?
            }
            ReplayStep::Volume { level } => {
                controller.command(PlayerCommand::SetVolume { volume: level })?
            }
            ReplayStep::Mute => controller.command(PlayerCommand::ToggleMute)?,
            ReplayStep::Fullscreen => controller.command(PlayerCommand::ToggleFullscreen)?,
            ReplayStep::End => media.advance(f64::INFINITY, default_sample_step()),
        }
        forward_signals(&controller, &media).await?;
    }

    let snapshot = controller.shutdown().await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Waits for queued commands to land, then hands the player's events to the
/// session.
async fn forward_signals(controller: &SessionController, media: &SimulatedMedia) -> Result<()> {
    controller.snapshot().await?;
    let signals: Vec<PlaybackSignal> = media.drain_signals();
    for signal in signals {
        controller.signal(signal)?;
    }
    Ok(())
}

fn print_record(video_id: &str, record: &ProgressRecord) {
    let watched = watched_duration(&record.intervals);
    println!(
        "{video_id}: {:.1}% watched ({}), resume at {}, updated {}",
        record.progress,
        format_time(watched),
        format_time(record.last_position),
        record.updated_at.to_rfc3339()
    );
}

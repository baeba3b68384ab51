use serde::{Deserialize, Serialize};

/// Events delivered by the media layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackSignal {
    MetadataLoaded { duration: f64 },
    PositionUpdate { position: f64 },
    Play,
    Pause,
    Ended,
    VolumeChanged { volume: f64, muted: bool },
}

/// Commands issued by player controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerCommand {
    TogglePlayPause,
    Seek { time: f64 },
    SetVolume { volume: f64 },
    ToggleMute,
    SkipBy { seconds: f64 },
    ToggleFullscreen,
}

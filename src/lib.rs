//! Watched-interval tracking for video playback.
//!
//! A [`TrackingSession`](session::TrackingSession) listens to a media clock,
//! accumulates the spans that were actually played, merges them into a
//! disjoint cover and persists a progress record per (user, video) so the
//! next session can resume where the last one stopped.

pub mod intervals;
pub mod media;
pub mod models;
pub mod notify;
pub mod session;
pub mod settings;
pub mod store;
pub mod utils;

pub use intervals::{merge_intervals, progress_percent, watched_duration};
pub use media::{MediaElement, SimulatedMedia};
pub use models::{Interval, ProgressKey, ProgressRecord, VideoInfo};
pub use notify::{LogNotifier, Notification, Notifier, RecordingNotifier};
pub use session::{
    PlaybackSignal, PlayerCommand, PlayerSnapshot, SessionController, SessionStatus,
    TrackingConfig, TrackingSession,
};
pub use settings::SettingsStore;
pub use store::{Database, KeyValueStore, MemoryStore, ProgressError, ProgressStore};

pub mod config;
pub mod controller;
pub mod signals;
pub mod state;
pub mod tracker;

pub use config::TrackingConfig;
pub use controller::SessionController;
pub use signals::{PlaybackSignal, PlayerCommand};
pub use state::{PlayerSnapshot, SessionState, SessionStatus};
pub use tracker::TrackingSession;

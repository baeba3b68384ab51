pub mod interval;
pub mod progress;
pub mod video;

pub use interval::Interval;
pub use progress::{ProgressKey, ProgressRecord};
pub use video::VideoInfo;

pub mod merge;
pub mod metrics;

pub use merge::{is_merged, merge_intervals};
pub use metrics::{progress_percent, watched_duration};

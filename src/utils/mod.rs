//! Ambient utilities: configuration, result writers, progress display,
//! fast line counting.

pub mod configuration;
pub mod format_writers;
pub mod line_count;
pub mod progress_display;

pub use configuration::{ConfigurationError, PipelineConfiguration};
pub use line_count::line_count;
pub use progress_display::{format_duration, ProgressBar};

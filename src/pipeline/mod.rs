//! Pipeline orchestration.

pub mod driver;

pub use driver::{AnalysisReport, FilterSummary, OverlapPipeline};

//! # OverlapForge - Contig Overlap Graph Analysis
//!
//! Ingests a sharded tab-delimited corpus of pairwise contig-overlap records,
//! assigns each contig identifier a dense integer id, builds an undirected
//! multigraph over those ids, and computes structural statistics (degree
//! distribution, connected-component sizes). A concurrent pre-filtering pass
//! removes containment overlaps before graph construction.

pub mod core;
pub mod filter;
pub mod graph;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types at crate level
pub use crate::core::identifier_index::{IdentifierIndex, IndexOutcome};
pub use crate::core::overlap::{OverlapRecord, ShardLayout};
pub use crate::filter::{RunReport, ShardTaskRunner};
pub use crate::graph::connectivity::connected_components;
pub use crate::graph::store::OverlapGraph;
pub use crate::pipeline::driver::{AnalysisReport, OverlapPipeline};
pub use crate::utils::configuration::PipelineConfiguration;

/// Result type used throughout the crate
pub type Result<T> = anyhow::Result<T>;

/// Error type used throughout the crate
pub type Error = anyhow::Error;

//! Undirected overlap graph: storage, construction, connectivity analytics.

pub mod builder;
pub mod connectivity;
pub mod store;

pub use builder::{build_graph, GraphBuildOutcome};
pub use connectivity::connected_components;
pub use store::OverlapGraph;

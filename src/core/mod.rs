//! Core data model: overlap records, shard naming, identifier indexing.

pub mod identifier_index;
pub mod overlap;

pub use identifier_index::{index_shards, IdentifierIndex, IndexOutcome, ShardFailure};
pub use overlap::{OverlapRecord, ShardLayout, DEFAULT_DELIMITER};

//! Graph construction from sharded overlap records
//!
//! Second sequential pass over the (filtered) shards: each line contributes
//! one edge between the indexed ids of its two contig identifiers. Follows
//! the same abort-on-shard-failure policy as the indexing pass.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::core::identifier_index::{IdentifierIndex, ShardFailure};
use crate::core::overlap::OverlapRecord;
use crate::graph::store::OverlapGraph;

/// Result of an edge-building pass. `failure` is set when a shard could not
/// be read and the remaining shards were abandoned.
#[derive(Debug)]
pub struct GraphBuildOutcome {
    pub graph: OverlapGraph,
    pub edges_added: usize,
    pub shards_scanned: usize,
    pub skipped_lines: usize,
    pub failure: Option<ShardFailure>,
}

impl GraphBuildOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Build the overlap graph over `index.len()` vertices by scanning `paths`
/// in shard order and adding one edge per well-formed line.
///
/// Lines that are malformed, or whose identifiers are absent from the index
/// (possible when the shards changed between the two passes), are skipped
/// with a warning and counted.
pub fn build_graph<P: AsRef<Path>>(
    index: &IdentifierIndex,
    paths: &[P],
    delimiter: char,
) -> GraphBuildOutcome {
    let mut graph = OverlapGraph::new(index.len());
    let mut edges_added = 0usize;
    let mut skipped_lines = 0usize;

    for (shard, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        match scan_shard(index, &mut graph, path, delimiter) {
            Ok((added, skipped)) => {
                edges_added += added;
                skipped_lines += skipped;
                debug!(shard, edges = edges_added, "shard edges added");
            }
            Err(error) => {
                warn!(
                    shard,
                    path = %path.display(),
                    %error,
                    "shard unreadable, aborting graph build"
                );
                return GraphBuildOutcome {
                    graph,
                    edges_added,
                    shards_scanned: shard,
                    skipped_lines,
                    failure: Some(ShardFailure {
                        shard,
                        path: path.to_path_buf(),
                        error,
                    }),
                };
            }
        }
    }

    GraphBuildOutcome {
        graph,
        edges_added,
        shards_scanned: paths.len(),
        skipped_lines,
        failure: None,
    }
}

fn scan_shard(
    index: &IdentifierIndex,
    graph: &mut OverlapGraph,
    path: &Path,
    delimiter: char,
) -> std::io::Result<(usize, usize)> {
    let reader = BufReader::new(File::open(path)?);
    let mut added = 0usize;
    let mut skipped = 0usize;

    for (pos, line) in reader.lines().enumerate() {
        let line = line?;
        let ids = OverlapRecord::parse(&line, delimiter)
            .contig_ids()
            .and_then(|(a, b)| Some((index.get(a)?, index.get(b)?)));
        match ids {
            Some((u, v)) => {
                graph.add_edge(u, v);
                added += 1;
            }
            None => {
                warn!(
                    path = %path.display(),
                    line = pos + 1,
                    "record without indexed identifiers, skipping"
                );
                skipped += 1;
            }
        }
    }
    Ok((added, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifier_index::index_shards;

    #[test]
    fn test_edges_built_from_indexed_shards() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let shard = dir.path().join("chunk0000");
        std::fs::write(&shard, "a\tb\nb\tc\na\tb\n")?;

        let indexed = index_shards(&[&shard], '\t');
        let built = build_graph(&indexed.index, &[&shard], '\t');
        assert!(built.is_complete());
        assert_eq!(built.edges_added, 3);
        assert_eq!(built.graph.num_vertices(), 3);
        // Duplicate a-b line is kept as a parallel edge.
        assert_eq!(built.graph.num_edges(), 3);
        Ok(())
    }

    #[test]
    fn test_missing_shard_aborts_with_partial_graph() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let shard = dir.path().join("chunk0000");
        std::fs::write(&shard, "a\tb\n")?;
        let missing = dir.path().join("chunk0001");

        let indexed = index_shards(&[&shard], '\t');
        let built = build_graph(&indexed.index, &[shard, missing], '\t');
        assert!(!built.is_complete());
        assert_eq!(built.shards_scanned, 1);
        assert_eq!(built.edges_added, 1);
        Ok(())
    }

    #[test]
    fn test_unindexed_identifiers_skipped() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let indexed_shard = dir.path().join("chunk0000");
        std::fs::write(&indexed_shard, "a\tb\n")?;
        let drifted_shard = dir.path().join("chunk0001");
        std::fs::write(&drifted_shard, "a\tb\nnew\tb\n")?;

        let indexed = index_shards(&[&indexed_shard], '\t');
        let built = build_graph(&indexed.index, &[&drifted_shard], '\t');
        assert!(built.is_complete());
        assert_eq!(built.edges_added, 1);
        assert_eq!(built.skipped_lines, 1);
        Ok(())
    }
}

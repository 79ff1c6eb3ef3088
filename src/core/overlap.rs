//! Overlap record model
//!
//! One logical record per line, fields separated by a single-byte delimiter
//! (tab in the production corpus). Fields 0 and 1 are the contig identifier
//! strings; fields 5-7 and 9-11 carry the overlap geometry consumed by the
//! containment predicate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default field delimiter of the overlap corpus.
pub const DEFAULT_DELIMITER: char = '\t';

/// Zero-padded width of the shard index in shard filenames.
const SHARD_INDEX_WIDTH: usize = 4;

/// A parsed, borrowed view of one overlap line.
#[derive(Debug)]
pub struct OverlapRecord<'a> {
    fields: Vec<&'a str>,
}

impl<'a> OverlapRecord<'a> {
    /// Split a raw line into fields. Never fails; downstream accessors report
    /// missing fields instead.
    pub fn parse(line: &'a str, delimiter: char) -> Self {
        Self {
            fields: line.split(delimiter).collect(),
        }
    }

    /// The two contig identifiers (fields 0 and 1), or `None` for a
    /// malformed line with fewer than two fields.
    pub fn contig_ids(&self) -> Option<(&'a str, &'a str)> {
        match (self.fields.first(), self.fields.get(1)) {
            (Some(&a), Some(&b)) => Some((a, b)),
            _ => None,
        }
    }

    /// True when the overlap spans the entire length of either contig.
    ///
    /// The geometry fields encode `(strand, start, end, length)` per side;
    /// a side is fully contained when its overlap starts at 0 and ends at
    /// the contig length. Lines with missing or otherwise incomparable
    /// geometry classify as non-containments and are kept by the filter.
    pub fn is_containment(&self) -> bool {
        self.side_contained(5, 6, 7) || self.side_contained(9, 10, 11)
    }

    fn side_contained(&self, start: usize, end: usize, length: usize) -> bool {
        match (
            self.fields.get(start),
            self.fields.get(end),
            self.fields.get(length),
        ) {
            (Some(&s), Some(&e), Some(&l)) => s == "0" && e == l,
            _ => false,
        }
    }

    /// Number of fields on the line.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Naming scheme of the sharded corpus on disk.
///
/// Input shards are `<dir>/<prefix><%04d>`; the filtered-copy pass writes
/// `<dir>/<prefix>F<%04d>` siblings, index range `0..num_shards`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardLayout {
    pub dir: PathBuf,
    pub prefix: String,
    pub num_shards: usize,
}

impl ShardLayout {
    pub fn new<P: AsRef<Path>>(dir: P, prefix: &str, num_shards: usize) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
            num_shards,
        }
    }

    /// Path of input shard `index`.
    pub fn input_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!(
            "{}{:0width$}",
            self.prefix,
            index,
            width = SHARD_INDEX_WIDTH
        ))
    }

    /// Path of the filtered sibling of shard `index`.
    pub fn filtered_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!(
            "{}F{:0width$}",
            self.prefix,
            index,
            width = SHARD_INDEX_WIDTH
        ))
    }

    /// All input shard paths in shard order.
    pub fn input_paths(&self) -> Vec<PathBuf> {
        (0..self.num_shards).map(|i| self.input_path(i)).collect()
    }

    /// All filtered shard paths in shard order.
    pub fn filtered_paths(&self) -> Vec<PathBuf> {
        (0..self.num_shards).map(|i| self.filtered_path(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: &str) -> OverlapRecord<'_> {
        OverlapRecord::parse(line, DEFAULT_DELIMITER)
    }

    #[test]
    fn test_contig_ids() {
        let line = "ctg_a\tctg_b\t99.1\t512\t0\t0\t512\t512\t1\t100\t612\t2048";
        assert_eq!(record(line).contig_ids(), Some(("ctg_a", "ctg_b")));
    }

    #[test]
    fn test_malformed_line_has_no_ids() {
        assert_eq!(record("only_one_field").contig_ids(), None);
        assert_eq!(record("").contig_ids(), None);
    }

    #[test]
    fn test_containment_of_first_contig() {
        // field5 == "0" and field6 == field7: overlap spans all of contig 1
        let line = "a\tb\t99\t500\t0\t0\t500\t500\t0\t10\t510\t2000";
        assert!(record(line).is_containment());
    }

    #[test]
    fn test_containment_of_second_contig() {
        let line = "a\tb\t99\t500\t0\t10\t510\t2000\t0\t0\t500\t500";
        assert!(record(line).is_containment());
    }

    #[test]
    fn test_partial_overlap_is_not_containment() {
        let line = "a\tb\t99\t500\t0\t10\t510\t2000\t0\t100\t600\t3000";
        assert!(!record(line).is_containment());
    }

    #[test]
    fn test_short_line_is_not_containment() {
        assert!(!record("a\tb\t99").is_containment());
        assert!(!record("a\tb").is_containment());
    }

    #[test]
    fn test_shard_layout_naming() {
        let layout = ShardLayout::new("/data/splits", "chunk", 641);
        assert!(layout.input_path(0).ends_with("chunk0000"));
        assert!(layout.input_path(640).ends_with("chunk0640"));
        assert!(layout.filtered_path(7).ends_with("chunkF0007"));
        assert_eq!(layout.input_paths().len(), 641);
    }
}

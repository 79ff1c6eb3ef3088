//! Identifier indexing
//!
//! Maps opaque contig identifier strings to dense integer ids, assigned in
//! strictly increasing first-seen order starting at 0 with no gaps. The scan
//! runs single-threaded in shard order then line order, which is what makes
//! first-seen-wins assignment deterministic.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::core::overlap::OverlapRecord;

/// Dense bijection between contig identifier strings and `0..len` integers.
#[derive(Debug, Default, Clone)]
pub struct IdentifierIndex {
    ids: AHashMap<String, u32>,
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id of `key`, assigning the next free id on first sight.
    /// Re-inserting a known key is a no-op returning the existing id.
    pub fn insert_or_get(&mut self, key: &str) -> u32 {
        if let Some(&id) = self.ids.get(key) {
            return id;
        }
        let id = self.ids.len() as u32;
        self.ids.insert(key.to_string(), id);
        id
    }

    pub fn get(&self, key: &str) -> Option<u32> {
        self.ids.get(key).copied()
    }

    /// Number of distinct keys, which equals the next unassigned id.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.ids.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

/// Identity of the shard on which a sequential scan gave up.
#[derive(Debug)]
pub struct ShardFailure {
    pub shard: usize,
    pub path: PathBuf,
    pub error: std::io::Error,
}

/// Result of a sequential indexing pass over the shards.
///
/// A shard-level I/O failure aborts the remaining shards; the index built so
/// far is still returned, with `failure` set so callers can tell a partial
/// result from a complete one.
#[derive(Debug)]
pub struct IndexOutcome {
    pub index: IdentifierIndex,
    pub shards_scanned: usize,
    pub skipped_lines: usize,
    pub failure: Option<ShardFailure>,
}

impl IndexOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Build the identifier index by scanning `paths` in order, indexing fields
/// 0 and 1 of every line. Malformed lines (fewer than two fields) are
/// skipped with a warning; a shard open/read failure stops the scan.
pub fn index_shards<P: AsRef<Path>>(paths: &[P], delimiter: char) -> IndexOutcome {
    let mut index = IdentifierIndex::new();
    let mut skipped_lines = 0usize;

    for (shard, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        match scan_shard(&mut index, path, delimiter) {
            Ok(skipped) => {
                skipped_lines += skipped;
                debug!(shard, indexed = index.len(), "shard indexed");
            }
            Err(error) => {
                warn!(
                    shard,
                    path = %path.display(),
                    %error,
                    "shard unreadable, aborting index scan"
                );
                return IndexOutcome {
                    index,
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

    IndexOutcome {
        index,
        shards_scanned: paths.len(),
        skipped_lines,
        failure: None,
    }
}

fn scan_shard(
    index: &mut IdentifierIndex,
    path: &Path,
    delimiter: char,
) -> std::io::Result<usize> {
    let reader = BufReader::new(File::open(path)?);
    let mut skipped = 0usize;

    for (pos, line) in reader.lines().enumerate() {
        let line = line?;
        match OverlapRecord::parse(&line, delimiter).contig_ids() {
            Some((a, b)) => {
                index.insert_or_get(a);
                index.insert_or_get(b);
            }
            None => {
                warn!(
                    path = %path.display(),
                    line = pos + 1,
                    "malformed record, skipping"
                );
                skipped += 1;
            }
        }
    }
    Ok(skipped)
}

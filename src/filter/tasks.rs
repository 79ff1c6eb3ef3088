//! Built-in per-line tasks: identifier collection, exclusion scanning, and
//! filtered copying.
//!
//! Each task instance owns one shard's state; the only genuinely shared
//! structures are the identifier set and the exclusion map, both designed for
//! commutative concurrent insertion (set union, disjoint shard-index keys).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use ahash::AHashSet;
use anyhow::Context;
use dashmap::{DashMap, DashSet};
use tracing::info;

use crate::core::overlap::OverlapRecord;
use crate::filter::{LineTask, RunReport, ShardTaskRunner};

/// Map from shard index to the 1-based line positions of containment
/// overlaps found in that shard. Each key is written by exactly one task.
pub type ExclusionMap = DashMap<usize, AHashSet<usize>>;

/// Collects both identifier fields of every line into a shared set.
struct CollectIdentifiersTask {
    identifiers: Arc<DashSet<String>>,
    delimiter: char,
}

impl LineTask for CollectIdentifiersTask {
    fn process_line(&mut self, _position: usize, line: &str) -> crate::Result<()> {
        if let Some((a, b)) = OverlapRecord::parse(line, self.delimiter).contig_ids() {
            self.identifiers.insert(a.to_string());
            self.identifiers.insert(b.to_string());
        }
        Ok(())
    }
}

/// Flags containment lines, accumulating positions locally and publishing
/// the shard's set once at the end (one map insertion per shard, no
/// fine-grained contention).
struct ExclusionScanTask {
    shard: usize,
    delimiter: char,
    positions: AHashSet<usize>,
    exclusions: Arc<ExclusionMap>,
}

impl LineTask for ExclusionScanTask {
    fn process_line(&mut self, position: usize, line: &str) -> crate::Result<()> {
        if OverlapRecord::parse(line, self.delimiter).is_containment() {
            self.positions.insert(position);
        }
        Ok(())
    }

    fn finish(&mut self) -> crate::Result<()> {
        if !self.positions.is_empty() {
            self.exclusions
                .insert(self.shard, std::mem::take(&mut self.positions));
        }
        Ok(())
    }
}

/// Copies non-containment lines, order preserved, into the shard's filtered
/// sibling file (created or truncated).
struct FilteredCopyTask {
    delimiter: char,
    writer: BufWriter<File>,
}

impl LineTask for FilteredCopyTask {
    fn process_line(&mut self, _position: usize, line: &str) -> crate::Result<()> {
        if !OverlapRecord::parse(line, self.delimiter).is_containment() {
            writeln!(self.writer, "{line}")?;
        }
        Ok(())
    }

    fn finish(&mut self) -> crate::Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl ShardTaskRunner {
    /// Count unique identifiers across all shards without building the full
    /// index. Returns the shared set (still shared with any abandoned
    /// stragglers after a timeout) alongside the pool report.
    pub fn collect_identifiers(&self) -> crate::Result<(Arc<DashSet<String>>, RunReport)> {
        let identifiers: Arc<DashSet<String>> = Arc::new(DashSet::new());
        let delimiter = self.delimiter();
        let handle = Arc::clone(&identifiers);

        let report = self.run(move |_shard| {
            Ok(CollectIdentifiersTask {
                identifiers: Arc::clone(&handle),
                delimiter,
            })
        })?;
        info!(
            identifiers = identifiers.len(),
            completed = report.completed,
            "identifier collection finished"
        );
        Ok((identifiers, report))
    }

    /// Locate containment overlaps per shard, keyed by shard index.
    pub fn find_exclusions(&self) -> crate::Result<(Arc<ExclusionMap>, RunReport)> {
        let exclusions: Arc<ExclusionMap> = Arc::new(DashMap::new());
        let delimiter = self.delimiter();
        let handle = Arc::clone(&exclusions);

        let report = self.run(move |shard| {
            Ok(ExclusionScanTask {
                shard,
                delimiter,
                positions: AHashSet::new(),
                exclusions: Arc::clone(&handle),
            })
        })?;
        info!(
            shards_with_exclusions = exclusions.len(),
            completed = report.completed,
            "exclusion scan finished"
        );
        Ok((exclusions, report))
    }

    /// Write a filtered sibling of every shard containing only its
    /// non-containment lines, in the original order.
    pub fn filter_containments(&self) -> crate::Result<RunReport> {
        let delimiter = self.delimiter();
        let layout = self.layout().clone();

        let report = self.run(move |shard| {
            let target = layout.filtered_path(shard);
            let file = File::create(&target)
                .with_context(|| format!("failed to create {}", target.display()))?;
            Ok(FilteredCopyTask {
                delimiter,
                writer: BufWriter::new(file),
            })
        })?;
        info!(
            completed = report.completed,
            failed = report.failed,
            timed_out = report.timed_out,
            "filtered copy finished"
        );
        Ok(report)
    }
}

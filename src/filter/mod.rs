//! Shard task runner
//!
//! A bounded pool of worker threads applies a per-line operation
//! independently to each input shard. One task covers one whole shard,
//! streamed line-by-line with 1-based positions; the runner owns the read
//! loop and hands each line to a per-shard [`LineTask`] built by an injected
//! factory, so the per-run behavior is a parameter rather than a hierarchy.
//!
//! Failure semantics: a task that cannot open or read its shard is logged
//! and counted, and its siblings proceed. The caller waits for completion
//! events under a fixed budget; an expired budget is surfaced as
//! [`RunReport::timed_out`] and the stragglers are abandoned to finish in
//! the background.

pub mod tasks;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossbeam_channel::{bounded, RecvTimeoutError};
use tracing::{debug, warn};

use crate::core::overlap::ShardLayout;

/// Default ceiling on the pool-wide completion wait.
pub const DEFAULT_WAIT_BUDGET: Duration = Duration::from_secs(60);

/// Per-shard line operation. Created once per shard by the factory passed to
/// [`ShardTaskRunner::run`], fed every line of that shard in order, then
/// finished. State is private to the shard, so no `Sync` bound is needed;
/// cross-shard aggregation goes through whatever shared handles the task's
/// factory captured.
pub trait LineTask {
    /// Handle one line. `position` is 1-based within the shard.
    fn process_line(&mut self, position: usize, line: &str) -> crate::Result<()>;

    /// Called after the last line of the shard (flush point for writers).
    fn finish(&mut self) -> crate::Result<()> {
        Ok(())
    }
}

/// Outcome of one pool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub submitted: usize,
    pub completed: usize,
    pub failed: usize,
    /// True when the wait budget expired before every task reported back.
    pub timed_out: bool,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        !self.timed_out && self.failed == 0 && self.completed == self.submitted
    }
}

/// Dispatches one task per shard onto a fixed-size worker pool.
#[derive(Debug, Clone)]
pub struct ShardTaskRunner {
    layout: ShardLayout,
    delimiter: char,
    workers: usize,
    wait_budget: Duration,
}

impl ShardTaskRunner {
    pub fn new(layout: ShardLayout, delimiter: char, workers: usize) -> Self {
        Self {
            layout,
            delimiter,
            workers: workers.max(1),
            wait_budget: DEFAULT_WAIT_BUDGET,
        }
    }

    pub fn with_wait_budget(mut self, wait_budget: Duration) -> Self {
        self.wait_budget = wait_budget;
        self
    }

    pub fn layout(&self) -> &ShardLayout {
        &self.layout
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Run `make_task(shard_index)` over every shard on a pool of
    /// `self.workers` threads and wait for completion under the budget.
    ///
    /// Task-level I/O failures are isolated: they are logged by the worker
    /// and show up in `RunReport::failed` without cancelling siblings.
    pub fn run<T, F>(&self, make_task: F) -> crate::Result<RunReport>
    where
        T: LineTask + 'static,
        F: Fn(usize) -> crate::Result<T> + Send + Sync + 'static,
    {
        let num_shards = self.layout.num_shards;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("shard-worker-{i}"))
            .build()
            .context("failed to build shard worker pool")?;

        let make_task = Arc::new(make_task);
        let (done_tx, done_rx) = bounded::<(usize, bool)>(num_shards);

        for shard in 0..num_shards {
            let make_task = Arc::clone(&make_task);
            let done_tx = done_tx.clone();
            let path = self.layout.input_path(shard);
            pool.spawn(move || {
                let outcome = run_one_shard(shard, &path, make_task.as_ref());
                let ok = match outcome {
                    Ok(()) => true,
                    Err(error) => {
                        warn!(shard, path = %path.display(), %error, "shard task failed");
                        false
                    }
                };
                // The receiver may be gone if the caller already timed out.
                let _ = done_tx.send((shard, ok));
            });
        }
        drop(done_tx);

        let deadline = Instant::now() + self.wait_budget;
        let mut completed = 0usize;
        let mut failed = 0usize;
        let mut timed_out = false;

        for _ in 0..num_shards {
            match done_rx.recv_deadline(deadline) {
                Ok((shard, true)) => {
                    completed += 1;
                    debug!(shard, "shard task completed");
                }
                Ok((_, false)) => failed += 1,
                Err(RecvTimeoutError::Timeout) => {
                    warn!(
                        outstanding = num_shards - completed - failed,
                        budget_secs = self.wait_budget.as_secs_f64(),
                        "wait budget expired before all shard tasks finished"
                    );
                    timed_out = true;
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if timed_out {
            // Dropping the pool would block on the stragglers; leak it so the
            // caller gets control back and the abandoned tasks drain on their
            // own threads.
            std::mem::forget(pool);
        }

        Ok(RunReport {
            submitted: num_shards,
            completed,
            failed,
            timed_out,
        })
    }
}

fn run_one_shard<T, F>(
    shard: usize,
    path: &std::path::Path,
    make_task: &F,
) -> crate::Result<()>
where
    T: LineTask,
    F: Fn(usize) -> crate::Result<T>,
{
    use std::io::BufRead;

    let mut task = make_task(shard)?;
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open shard {}", path.display()))?;
    let reader = std::io::BufReader::new(file);

    for (pos, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read error in shard {}", path.display()))?;
        task.process_line(pos + 1, &line)?;
    }
    task.finish()
}

//! Pipeline driver
//!
//! Sequences the full analysis: optional containment pre-filter, identifier
//! indexing, graph construction, then degree and connectivity statistics.
//! Assembles everything into an [`AnalysisReport`] and optionally writes the
//! text and JSON artifacts.

use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::identifier_index::index_shards;
use crate::core::overlap::ShardLayout;
use crate::filter::{RunReport, ShardTaskRunner};
use crate::graph::builder::build_graph;
use crate::graph::connectivity::connected_components;
use crate::utils::configuration::PipelineConfiguration;
use crate::utils::format_writers::{write_json_report, write_map_report, write_sizes_report};
use crate::utils::progress_display::format_duration;

/// Summary of the concurrent pre-filter pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSummary {
    pub submitted: usize,
    pub completed: usize,
    pub failed: usize,
    pub timed_out: bool,
}

impl From<&RunReport> for FilterSummary {
    fn from(report: &RunReport) -> Self {
        Self {
            submitted: report.submitted,
            completed: report.completed,
            failed: report.failed,
            timed_out: report.timed_out,
        }
    }
}

/// Structural statistics of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_name: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    /// Pre-filter summary, absent when the filter pass was disabled
    pub filter: Option<FilterSummary>,
    pub vertices: usize,
    pub edges: usize,
    /// Malformed or unindexable lines skipped across both sequential passes
    pub skipped_lines: usize,
    /// False when a shard failure truncated the indexing pass
    pub index_complete: bool,
    /// False when a shard failure truncated the edge-building pass
    pub graph_complete: bool,
    /// Degree value -> number of vertices with that degree
    pub degree_distribution: BTreeMap<usize, usize>,
    /// Component sizes in discovery order
    pub component_sizes: Vec<usize>,
    pub elapsed_secs: f64,
}

impl AnalysisReport {
    pub fn num_components(&self) -> usize {
        self.component_sizes.len()
    }

    pub fn largest_component(&self) -> usize {
        self.component_sizes.iter().copied().max().unwrap_or(0)
    }
}

/// Orchestrates filter, index, graph and statistics stages per the loaded
/// configuration.
pub struct OverlapPipeline {
    config: PipelineConfiguration,
}

impl OverlapPipeline {
    pub fn new(config: PipelineConfiguration) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfiguration {
        &self.config
    }

    /// Run the full analysis and return the report.
    pub fn run_analysis(&self) -> crate::Result<AnalysisReport> {
        let start = Instant::now();
        let layout = self.config.shard_layout();

        let filter_summary = if self.config.filter.enabled {
            Some(self.run_filter_pass(&layout)?)
        } else {
            info!("containment pre-filter disabled, using raw shards");
            None
        };

        // The sequential passes read the filtered siblings when the filter
        // pass ran, otherwise the raw shards.
        let graph_shards = if filter_summary.is_some() {
            layout.filtered_paths()
        } else {
            layout.input_paths()
        };

        info!(shards = graph_shards.len(), "indexing identifiers");
        let indexed = index_shards(&graph_shards, self.config.shards.delimiter);
        if let Some(failure) = &indexed.failure {
            warn!(
                shard = failure.shard,
                "identifier index is partial ({} of {} shards scanned)",
                indexed.shards_scanned,
                graph_shards.len()
            );
        }
        info!(
            identifiers = indexed.index.len(),
            elapsed = %format_duration(start.elapsed()),
            "identifier index built"
        );

        let built = build_graph(&indexed.index, &graph_shards, self.config.shards.delimiter);
        if let Some(failure) = &built.failure {
            warn!(
                shard = failure.shard,
                "overlap graph is partial ({} of {} shards scanned)",
                built.shards_scanned,
                graph_shards.len()
            );
        }
        info!(
            vertices = built.graph.num_vertices(),
            edges = built.graph.num_edges(),
            "overlap graph built"
        );

        let degree_distribution: BTreeMap<usize, usize> =
            built.graph.degree_distribution().into_iter().collect();
        let component_sizes = connected_components(&built.graph);
        info!(
            components = component_sizes.len(),
            largest = component_sizes.iter().copied().max().unwrap_or(0),
            "connectivity analysis finished"
        );

        let report = AnalysisReport {
            run_name: self.config.general.run_name.clone(),
            generated_at: chrono::Utc::now(),
            filter: filter_summary,
            vertices: built.graph.num_vertices(),
            edges: built.graph.num_edges(),
            skipped_lines: indexed.skipped_lines + built.skipped_lines,
            index_complete: indexed.is_complete(),
            graph_complete: built.is_complete(),
            degree_distribution,
            component_sizes,
            elapsed_secs: start.elapsed().as_secs_f64(),
        };
        Ok(report)
    }

    /// Run the concurrent filtered-copy pass over the raw shards.
    fn run_filter_pass(&self, layout: &ShardLayout) -> crate::Result<FilterSummary> {
        let runner = ShardTaskRunner::new(
            layout.clone(),
            self.config.shards.delimiter,
            self.config.performance.worker_threads,
        )
        .with_wait_budget(self.config.wait_budget());

        info!(
            shards = layout.num_shards,
            workers = self.config.performance.worker_threads,
            "starting containment pre-filter"
        );
        let report = runner.filter_containments()?;
        if report.timed_out {
            warn!("pre-filter wait budget expired; proceeding with completed shards");
        }
        if report.failed > 0 {
            warn!(failed = report.failed, "pre-filter tasks failed");
        }
        Ok(FilterSummary::from(&report))
    }

    /// Write the degree, component and JSON artifacts into the configured
    /// output directory.
    pub fn write_artifacts(&self, report: &AnalysisReport) -> crate::Result<()> {
        let out = &self.config.general.output_dir;
        std::fs::create_dir_all(out)
            .with_context(|| format!("failed to create output dir {}", out.display()))?;

        let stem = &report.run_name;
        write_map_report(
            report.degree_distribution.iter(),
            out.join(format!("{stem}.degrees.txt")),
            "degree:vertex_count",
        )?;
        write_sizes_report(
            report.component_sizes.iter(),
            out.join(format!("{stem}.components.txt")),
            "component sizes in discovery order",
        )?;
        write_json_report(report, out.join(format!("{stem}.report.json")))?;
        info!(dir = %out.display(), "artifacts written");
        Ok(())
    }
}

//! End-to-end pipeline and concurrency tests over synthetic shard fixtures.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tempfile::TempDir;

use overlap_forge::core::overlap::ShardLayout;
use overlap_forge::filter::{LineTask, ShardTaskRunner};
use overlap_forge::pipeline::driver::OverlapPipeline;
use overlap_forge::utils::configuration::PipelineConfiguration;

/// A partial overlap between `a` and `b` (kept by the filter).
fn partial(a: &str, b: &str) -> String {
    format!("{a}\t{b}\t99.1\t450\t0\t10\t460\t2000\t0\t100\t550\t3000")
}

/// Overlap spanning all of the first contig (dropped by the filter).
fn contained_first(a: &str, b: &str) -> String {
    format!("{a}\t{b}\t99.8\t500\t0\t0\t500\t500\t0\t100\t600\t3000")
}

/// Overlap spanning all of the second contig (dropped by the filter).
fn contained_second(a: &str, b: &str) -> String {
    format!("{a}\t{b}\t99.8\t500\t0\t10\t510\t2000\t0\t0\t500\t500")
}

/// Write one shard file per entry of `shards` under the chunk naming scheme.
fn write_shards(dir: &Path, shards: &[Vec<String>]) -> Result<ShardLayout> {
    let layout = ShardLayout::new(dir, "chunk", shards.len());
    for (i, lines) in shards.iter().enumerate() {
        std::fs::write(layout.input_path(i), lines.join("\n") + "\n")?;
    }
    Ok(layout)
}

fn runner(layout: &ShardLayout, workers: usize) -> ShardTaskRunner {
    ShardTaskRunner::new(layout.clone(), '\t', workers)
}

mod filtered_copy_tests {
    use super::*;

    #[test]
    fn test_only_partial_overlaps_survive_in_order() -> Result<()> {
        let dir = TempDir::new()?;
        let layout = write_shards(
            dir.path(),
            &[vec![
                contained_first("a", "b"),
                contained_second("c", "d"),
                partial("e", "f"),
                partial("a", "c"),
            ]],
        )?;

        let report = runner(&layout, 2).filter_containments()?;
        assert!(report.all_succeeded());

        let filtered = std::fs::read_to_string(layout.filtered_path(0))?;
        let lines: Vec<&str> = filtered.lines().collect();
        assert_eq!(lines, vec![partial("e", "f"), partial("a", "c")]);
        Ok(())
    }

    #[test]
    fn test_filtered_copy_overwrites_previous_output() -> Result<()> {
        let dir = TempDir::new()?;
        let layout = write_shards(dir.path(), &[vec![partial("a", "b")]])?;
        std::fs::write(layout.filtered_path(0), "stale content\n")?;

        runner(&layout, 1).filter_containments()?;
        let filtered = std::fs::read_to_string(layout.filtered_path(0))?;
        assert_eq!(filtered, partial("a", "b") + "\n");
        Ok(())
    }

    #[test]
    fn test_unreadable_shard_does_not_block_siblings() -> Result<()> {
        let dir = TempDir::new()?;
        let layout = write_shards(
            dir.path(),
            &[vec![partial("a", "b")], vec![partial("c", "d")]],
        )?;
        // Grow the layout past the files on disk: shard 2 is missing.
        let layout = ShardLayout::new(dir.path(), "chunk", 3);

        let report = runner(&layout, 2).filter_containments()?;
        assert_eq!(report.submitted, 3);
        assert_eq!(report.completed, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.timed_out);
        assert!(layout.filtered_path(0).exists());
        assert!(layout.filtered_path(1).exists());
        Ok(())
    }
}

mod exclusion_tests {
    use super::*;

    #[test]
    fn test_positions_recorded_per_shard() -> Result<()> {
        let dir = TempDir::new()?;
        let layout = write_shards(
            dir.path(),
            &[
                vec![
                    contained_first("a", "b"),
                    partial("c", "d"),
                    contained_second("e", "f"),
                ],
                vec![partial("g", "h")],
            ],
        )?;

        let (exclusions, report) = runner(&layout, 2).find_exclusions()?;
        assert!(report.all_succeeded());

        let shard0 = exclusions.get(&0).expect("shard 0 has containments");
        assert!(shard0.contains(&1));
        assert!(shard0.contains(&3));
        assert_eq!(shard0.len(), 2);
        // Shards without containments get no entry at all.
        assert!(!exclusions.contains_key(&1));
        Ok(())
    }

    #[test]
    fn test_unparsable_geometry_is_kept() -> Result<()> {
        let dir = TempDir::new()?;
        // Too few fields for the geometry check: not a containment.
        let layout = write_shards(dir.path(), &[vec!["a\tb\t99.9".to_string()]])?;

        let (exclusions, _) = runner(&layout, 1).find_exclusions()?;
        assert!(exclusions.is_empty());

        let report = runner(&layout, 1).filter_containments()?;
        assert!(report.all_succeeded());
        let filtered = std::fs::read_to_string(layout.filtered_path(0))?;
        assert_eq!(filtered, "a\tb\t99.9\n");
        Ok(())
    }
}

mod identifier_collection_tests {
    use super::*;

    #[test]
    fn test_concurrent_count_matches_distinct_identifiers() -> Result<()> {
        let dir = TempDir::new()?;
        // Overlapping identifier sets across 4 shards; 6 distinct names.
        let layout = write_shards(
            dir.path(),
            &[
                vec![partial("a", "b"), partial("b", "c")],
                vec![partial("c", "d"), partial("a", "d")],
                vec![partial("e", "f"), partial("f", "a")],
                vec![partial("b", "e")],
            ],
        )?;

        for workers in 1..=layout.num_shards {
            let (identifiers, report) = runner(&layout, workers).collect_identifiers()?;
            assert!(report.all_succeeded(), "workers={workers}");
            assert_eq!(identifiers.len(), 6, "workers={workers}");
        }
        Ok(())
    }
}

mod wait_budget_tests {
    use super::*;

    struct SlowTask;

    impl LineTask for SlowTask {
        fn process_line(&mut self, _position: usize, _line: &str) -> overlap_forge::Result<()> {
            std::thread::sleep(Duration::from_millis(500));
            Ok(())
        }
    }

    #[test]
    fn test_expired_budget_is_surfaced_not_swallowed() -> Result<()> {
        let dir = TempDir::new()?;
        let layout = write_shards(
            dir.path(),
            &[
                vec![partial("a", "b")],
                vec![partial("c", "d")],
                vec![partial("e", "f")],
            ],
        )?;

        let report = runner(&layout, 1)
            .with_wait_budget(Duration::from_millis(50))
            .run(|_shard| Ok(SlowTask))?;
        assert!(report.timed_out);
        assert!(report.completed < report.submitted);
        Ok(())
    }

    #[test]
    fn test_generous_budget_completes() -> Result<()> {
        let dir = TempDir::new()?;
        let layout = write_shards(dir.path(), &[vec![partial("a", "b")]])?;

        let report = runner(&layout, 2)
            .with_wait_budget(Duration::from_secs(30))
            .filter_containments()?;
        assert!(report.all_succeeded());
        Ok(())
    }
}

mod end_to_end_tests {
    use super::*;

    fn config_for(layout: &ShardLayout, out: &Path) -> PipelineConfiguration {
        let mut config = PipelineConfiguration::default();
        config.general.run_name = "test-run".to_string();
        config.general.output_dir = out.to_path_buf();
        config.shards.dir = layout.dir.clone();
        config.shards.prefix = layout.prefix.clone();
        config.shards.num_shards = layout.num_shards;
        config.performance.worker_threads = 2;
        config
    }

    #[test]
    fn test_full_analysis_over_filtered_shards() -> Result<()> {
        let dir = TempDir::new()?;
        let out = TempDir::new()?;
        // Component {a,b,c} via a-b, b-c; component {d,e} via d-e. The
        // containment a-z must be filtered out before indexing, so "z"
        // never becomes a vertex.
        let layout = write_shards(
            dir.path(),
            &[
                vec![partial("a", "b"), contained_first("a", "z")],
                vec![partial("b", "c"), partial("d", "e")],
            ],
        )?;

        let pipeline = OverlapPipeline::new(config_for(&layout, out.path()))?;
        let report = pipeline.run_analysis()?;

        assert_eq!(report.vertices, 5);
        assert_eq!(report.edges, 3);
        assert!(report.index_complete);
        assert!(report.graph_complete);
        assert_eq!(report.skipped_lines, 0);

        let mut sizes = report.component_sizes.clone();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![2, 3]);
        assert_eq!(
            report.component_sizes.iter().sum::<usize>(),
            report.vertices
        );
        // a, b have degree 1... a-b, b-c, d-e: degrees a=1 b=2 c=1 d=1 e=1.
        assert_eq!(report.degree_distribution.get(&1), Some(&4));
        assert_eq!(report.degree_distribution.get(&2), Some(&1));

        pipeline.write_artifacts(&report)?;
        assert!(out.path().join("test-run.degrees.txt").exists());
        assert!(out.path().join("test-run.components.txt").exists());
        assert!(out.path().join("test-run.report.json").exists());
        Ok(())
    }

    #[test]
    fn test_analysis_without_filter_keeps_containments() -> Result<()> {
        let dir = TempDir::new()?;
        let out = TempDir::new()?;
        let layout = write_shards(
            dir.path(),
            &[vec![partial("a", "b"), contained_first("a", "z")]],
        )?;

        let mut config = config_for(&layout, out.path());
        config.filter.enabled = false;
        let report = OverlapPipeline::new(config)?.run_analysis()?;

        assert!(report.filter.is_none());
        assert_eq!(report.vertices, 3); // z survives without the filter
        assert_eq!(report.edges, 2);
        Ok(())
    }

    #[test]
    fn test_symmetric_records_become_parallel_edges() -> Result<()> {
        let dir = TempDir::new()?;
        let out = TempDir::new()?;
        // The same pair reported in both orientations: two edges, degrees 2.
        let layout = write_shards(
            dir.path(),
            &[vec![partial("a", "b"), partial("b", "a")]],
        )?;

        let mut config = config_for(&layout, out.path());
        config.filter.enabled = false;
        let report = OverlapPipeline::new(config)?.run_analysis()?;

        assert_eq!(report.vertices, 2);
        assert_eq!(report.edges, 2);
        assert_eq!(report.degree_distribution.get(&2), Some(&2));
        assert_eq!(report.component_sizes, vec![2]);
        Ok(())
    }

    #[test]
    fn test_missing_shard_marks_report_partial() -> Result<()> {
        let dir = TempDir::new()?;
        let out = TempDir::new()?;
        let layout = write_shards(dir.path(), &[vec![partial("a", "b")]])?;
        // Claim one more shard than exists on disk.
        let layout = ShardLayout::new(dir.path(), &layout.prefix, 2);

        let mut config = config_for(&layout, out.path());
        config.filter.enabled = false;
        let report = OverlapPipeline::new(config)?.run_analysis()?;

        assert!(!report.index_complete);
        assert_eq!(report.vertices, 2); // partial index from shard 0
        Ok(())
    }
}

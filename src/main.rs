use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use overlap_forge::pipeline::driver::OverlapPipeline;
use overlap_forge::filter::ShardTaskRunner;
use overlap_forge::utils::configuration::PipelineConfiguration;
use overlap_forge::utils::line_count::line_count;
use overlap_forge::utils::progress_display::{format_duration, ProgressBar};

#[derive(Parser)]
#[command(
    name = "overlap-forge",
    about = "Contig overlap graph analysis over sharded alignment corpora"
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Command-line overrides of the shard configuration section.
#[derive(Args, Default)]
struct ShardArgs {
    /// Directory holding the input shards
    #[arg(long)]
    shard_dir: Option<PathBuf>,

    /// Shard filename prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Number of shards
    #[arg(long)]
    num_shards: Option<usize>,

    /// Worker threads for the shard task pool
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis: filter, index, graph, statistics
    Analyze {
        #[command(flatten)]
        shards: ShardArgs,

        /// Skip the containment pre-filter and read the raw shards
        #[arg(long)]
        no_filter: bool,

        /// Directory for result artifacts
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Write filtered copies of the shards, dropping containment overlaps
    Filter {
        #[command(flatten)]
        shards: ShardArgs,
    },
    /// Report per-shard containment positions without rewriting anything
    Exclusions {
        #[command(flatten)]
        shards: ShardArgs,
    },
    /// Count unique contig identifiers across all shards concurrently
    CountIdentifiers {
        #[command(flatten)]
        shards: ShardArgs,
    },
    /// Count records across all shards
    CountLines {
        #[command(flatten)]
        shards: ShardArgs,

        /// Count the filtered siblings instead of the raw shards
        #[arg(long)]
        filtered: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
        .init();

    let base = PipelineConfiguration::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            shards,
            no_filter,
            output_dir,
        } => {
            let mut config = apply_overrides(base, &shards);
            if no_filter {
                config.filter.enabled = false;
            }
            if let Some(dir) = output_dir {
                config.general.output_dir = dir;
            }

            let pipeline = OverlapPipeline::new(config)?;
            let report = pipeline.run_analysis()?;
            pipeline.write_artifacts(&report)?;

            println!("✅ Analysis completed");
            println!("   Vertices:   {}", report.vertices);
            println!("   Edges:      {}", report.edges);
            println!("   Components: {}", report.num_components());
            println!("   Largest:    {}", report.largest_component());
            if !report.index_complete || !report.graph_complete {
                println!("   ⚠️ partial result: one or more shards were unreadable");
            }
            println!(
                "   Elapsed:    {}",
                format_duration(std::time::Duration::from_secs_f64(report.elapsed_secs))
            );
        }
        Commands::Filter { shards } => {
            let config = apply_overrides(base, &shards);
            let report = runner_from(&config).filter_containments()?;
            println!(
                "Filtered {} of {} shards ({} failed{})",
                report.completed,
                report.submitted,
                report.failed,
                if report.timed_out { ", wait budget expired" } else { "" }
            );
        }
        Commands::Exclusions { shards } => {
            let config = apply_overrides(base, &shards);
            let (exclusions, report) = runner_from(&config).find_exclusions()?;

            let mut per_shard: Vec<(usize, usize)> = exclusions
                .iter()
                .map(|entry| (*entry.key(), entry.value().len()))
                .collect();
            per_shard.sort_unstable();
            let total: usize = per_shard.iter().map(|(_, n)| n).sum();
            for (shard, count) in &per_shard {
                println!("shard {shard:04}: {count} containments");
            }
            println!(
                "Total: {total} containments in {} shards ({} tasks completed)",
                per_shard.len(),
                report.completed
            );
        }
        Commands::CountIdentifiers { shards } => {
            let config = apply_overrides(base, &shards);
            let start = Instant::now();
            let (identifiers, report) = runner_from(&config).collect_identifiers()?;
            println!(
                "Identifiers: {} ({} of {} shards, {})",
                identifiers.len(),
                report.completed,
                report.submitted,
                format_duration(start.elapsed())
            );
        }
        Commands::CountLines { shards, filtered } => {
            let config = apply_overrides(base, &shards);
            let layout = config.shard_layout();
            let paths = if filtered {
                layout.filtered_paths()
            } else {
                layout.input_paths()
            };

            let mut bar = ProgressBar::new("counting");
            let mut total = 0usize;
            for (i, path) in paths.iter().enumerate() {
                total += line_count(path)?;
                bar.update((i + 1) as f64 / paths.len() as f64);
            }
            bar.finish();
            println!("Total records: {total}");
        }
    }

    Ok(())
}

fn apply_overrides(mut config: PipelineConfiguration, args: &ShardArgs) -> PipelineConfiguration {
    if let Some(dir) = &args.shard_dir {
        config.shards.dir = dir.clone();
    }
    if let Some(prefix) = &args.prefix {
        config.shards.prefix = prefix.clone();
    }
    if let Some(n) = args.num_shards {
        config.shards.num_shards = n;
    }
    if let Some(workers) = args.workers {
        config.performance.worker_threads = workers;
    }
    config
}

fn runner_from(config: &PipelineConfiguration) -> ShardTaskRunner {
    ShardTaskRunner::new(
        config.shard_layout(),
        config.shards.delimiter,
        config.performance.worker_threads,
    )
    .with_wait_budget(config.wait_budget())
}

//! Command-line interface for generate-and-load
//!
//! # Usage Examples
//!
//! ```bash
//! # 1000 records in batches of 200, loaded into a local org directory
//! generate-and-load \
//!   --num-records 1000 --batch-size 200 \
//!   --data-generation-task schema \
//!   --data-generation-option schema=datagen_schema.yml \
//!   --org-dir ./org
//!
//! # Same run, options from a file, keeping the staging database around
//! generate-and-load --options-file options.yml \
//!   --debug-dir ./debug --dry-run
//!
//! # Reuse a persistent staging database across runs
//! DATABASE_URL=sqlite:///tmp/staging.db generate-and-load \
//!   --options-file options.yml --replace-database --org-dir ./org
//! ```

use anyhow::Context;
use clap::Parser;
use datagen::GeneratorRegistry;
use dataload::{LocalOrgSink, MemorySink};
use generate_and_load::{GenerateAndLoad, GenerateAndLoadArgs};
use staging_core::{OrgConfig, ProjectConfig, RecordSink, TaskContext};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "generate-and-load")]
#[command(about = "Generate records in batches and load them through a SQLite staging database")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    options: GenerateAndLoadArgs,

    /// Directory the local org writes its records to
    #[arg(long, conflicts_with = "dry_run", required_unless_present = "dry_run")]
    org_dir: Option<PathBuf>,

    /// Load into an in-memory org instead of writing anything
    #[arg(long)]
    dry_run: bool,

    /// Org name used in logs
    #[arg(long, default_value = "local")]
    org_name: String,

    /// Project name used in logs
    #[arg(long, default_value = "generate-and-load")]
    project_name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let sink: Arc<dyn RecordSink> = match &cli.org_dir {
        Some(dir) if !cli.dry_run => Arc::new(LocalOrgSink::new(dir)),
        _ => Arc::new(MemorySink::new()),
    };

    let project_root =
        std::env::current_dir().context("Failed to determine the current directory")?;
    let context = TaskContext::new(
        ProjectConfig::new(cli.project_name.clone(), project_root),
        OrgConfig::new(cli.org_name.clone(), sink),
        "generate_and_load",
    );

    let options = cli.options.resolve().context("Failed to read options")?;
    let registry = GeneratorRegistry::with_builtin();
    let task = GenerateAndLoad::new(options, context, &registry)
        .await
        .context("Invalid generate-and-load configuration")?;

    let summary = task.run().await.context("Generate-and-load failed")?;
    for batch in &summary.batches {
        tracing::info!(
            "Batch {}: {} records generated, {} loaded",
            batch.index,
            batch.rows_generated,
            batch.rows_loaded
        );
    }
    println!(
        "Loaded {} records in {} batches into org '{}'",
        summary.rows_loaded(),
        summary.batches.len(),
        cli.org_name
    );

    Ok(())
}

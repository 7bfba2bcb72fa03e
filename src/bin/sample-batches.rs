use anyhow::{Context, Result};
use clap::Parser;
use dialogue_viewer::sampler::{self, Collection, DEFAULT_BATCH_COUNT, DEFAULT_BATCH_SIZE};
use dialogue_viewer::telemetry::init_tracing;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::info;

/// Split a JSON dataset into disjoint random batches for annotation.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dataset file: a JSON array or an object keyed by record id
    input: PathBuf,

    /// Number of batches to write
    #[arg(long, default_value_t = DEFAULT_BATCH_COUNT)]
    batch_count: usize,

    /// Records per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Directory receiving the batch files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Batch files are named `<prefix>_<n>.json`
    #[arg(long, default_value = "sample")]
    prefix: String,

    /// Seed for a reproducible shuffle
    #[arg(long, env = "SAMPLE_SEED")]
    seed: Option<u64>,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let collection = Collection::from_file(&cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;
    info!(
        "Loaded {} records from {}; {} needed",
        collection.len(),
        cli.input.display(),
        sampler::records_needed(cli.batch_count, cli.batch_size)
    );

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let batches = collection.into_batches(cli.batch_count, cli.batch_size, &mut rng);
    let written = sampler::write_batches(&batches, &cli.output_dir, &cli.prefix)?;

    println!(
        "Wrote {} batches of {} records (no duplicates between batches)",
        written.len(),
        cli.batch_size
    );
    for path in written {
        println!("  {}", path.display());
    }

    Ok(())
}

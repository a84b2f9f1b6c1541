use aujoin::{
    load_records, load_synonyms, load_taxonomy, write_results, EvidenceSources, JoinConfig, JoinPipeline,
    OutputTarget, ReducerKind, VerifierKind,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Threshold similarity join over segmented strings
#[derive(Parser, Debug)]
#[command(name = "aujoin")]
#[command(about = "Join two segmented string lists under taxonomy, synonym and n-gram similarity", long_about = None)]
#[command(after_help = "example: aujoin --taxonomy tax.txt --synonym syn.txt --jaccard 3 -c 3 -o result.csv 0.9 list1.txt list2.txt")]
struct Args {
    /// Enable taxonomy similarity with this knowledge file (DEWEY<TAB>LABEL)
    #[arg(long)]
    taxonomy: Option<PathBuf>,

    /// Enable synonym similarity with this knowledge file (CANONICAL<TAB>syn;syn)
    #[arg(long)]
    synonym: Option<PathBuf>,

    /// Enable Jaccard similarity with this gram length (> 1)
    #[arg(long, value_name = "GRAM")]
    jaccard: Option<usize>,

    /// Number of common signatures
    #[arg(short = 'c', long = "common", default_value_t = 1)]
    overlap: usize,

    /// Filtering method: fast (heuristic) or dp (dynamic programming)
    #[arg(long, default_value = "fast")]
    filter: String,

    /// Verification method: greedy or claw (squareimp)
    #[arg(long, default_value = "greedy")]
    verify: String,

    /// Worker threads (default: available cores minus two)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Run filtering and verification on a single thread
    #[arg(long)]
    single: bool,

    /// Result handling: null, stdout, a .json/.jsonl file or a csv file
    #[arg(short, long, default_value = "null")]
    output: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Similarity threshold (0, 1]
    #[arg(value_name = "THRESHOLD")]
    threshold: f64,

    /// First segmented string list
    #[arg(value_name = "LIST_1")]
    list1: PathBuf,

    /// Second segmented string list
    #[arg(value_name = "LIST_2")]
    list2: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting AU-Join v{}", env!("CARGO_PKG_VERSION"));

    let config = JoinConfig {
        threshold: args.threshold,
        overlap: args.overlap,
        reducer: args.filter.parse::<ReducerKind>()?,
        verifier: args.verify.parse::<VerifierKind>()?,
        threads: args.threads,
        single_thread: args.single,
    };
    let output: OutputTarget = args.output.parse()?;

    let left = load_records(&args.list1, 0)?;
    let right = load_records(&args.list2, 1)?;
    info!("{} + {} strings loaded", left.len(), right.len());

    let sources = EvidenceSources {
        taxonomy: args.taxonomy.as_ref().map(load_taxonomy).transpose()?,
        synonyms: args.synonym.as_ref().map(load_synonyms).transpose()?,
        gram_size: args.jaccard,
    };

    let pipeline = JoinPipeline::new(config, sources)?;
    info!(
        "Joining with filter {} and verifier {} on {} thread(s)",
        pipeline.config().reducer,
        pipeline.config().verifier,
        pipeline.threads()
    );

    let started = Instant::now();
    let report = pipeline.run(&left, &right);
    info!(
        "{} candidates, {} results in {} ms",
        report.stats.candidates,
        report.stats.results,
        started.elapsed().as_millis()
    );
    debug!("join stats: {}", serde_json::to_string(&report.stats)?);

    write_results(&output, &report.results)?;

    Ok(())
}

use anyhow::{bail, Context, Result};
use clap::Parser;
use parallel_kmeans::config::{EmptyClusterPolicy, ExecutionMode, InitStrategy, KMeansConfig};
use parallel_kmeans::{arff, normalize, report, tfidf, KMeans, VectorStore};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "parallel-kmeans")]
#[command(about = "Cluster ARFF tables or TF-IDF vectors of a document directory with k-means")]
struct Args {
    /// ARFF file to cluster.
    #[arg(short, long, conflicts_with = "input_dir", required_unless_present = "input_dir")]
    input: Option<PathBuf>,

    /// Directory of text documents, clustered by their TF-IDF vectors.
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Where to write the cluster table.
    #[arg(short, long)]
    output: PathBuf,

    /// Number of clusters.
    #[arg(short = 'c', long)]
    clusters: Option<usize>,

    /// Iteration cap (0 = until convergence).
    #[arg(short = 'm', long)]
    max_iterations: Option<usize>,

    /// Expand sparse input to dense points before clustering.
    #[arg(short, long)]
    dense: bool,

    /// Random seed for reproducibility.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum)]
    init: Option<InitStrategy>,

    #[arg(long, value_enum)]
    empty_clusters: Option<EmptyClusterPolicy>,

    /// Worker threads for the k-means pool.
    #[arg(long)]
    threads: Option<usize>,

    /// Run the assignment loop on a single thread.
    #[arg(long)]
    sequential: bool,

    /// YAML file with k-means settings; flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cluster the raw attribute values.
    #[arg(long)]
    no_normalize: bool,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn kmeans_config(&self) -> Result<KMeansConfig> {
        let mut config = match &self.config {
            Some(path) => KMeansConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => KMeansConfig::default(),
        };
        if let Some(k) = self.clusters {
            config.num_clusters = k;
        }
        if let Some(m) = self.max_iterations {
            config.max_iterations = m;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(init) = self.init {
            config.init = init;
        }
        if let Some(policy) = self.empty_clusters {
            config.empty_clusters = policy;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        if self.sequential {
            config.execution = ExecutionMode::Sequential;
        }
        config.validate()?;
        Ok(config)
    }

    fn load(&self) -> Result<VectorStore> {
        match (&self.input, &self.input_dir) {
            (Some(file), _) => {
                arff::read_arff(file).with_context(|| format!("reading {}", file.display()))
            }
            (None, Some(dir)) => tfidf::load_directory(dir)
                .with_context(|| format!("reading documents under {}", dir.display())),
            (None, None) => bail!("one of --input or --input-dir is required"),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.kmeans_config()?;
    let total_start = Instant::now();

    let start = Instant::now();
    let mut store = args.load()?;
    if args.dense {
        store = store.into_dense();
    }
    info!(
        elapsed = ?start.elapsed(),
        points = store.len(),
        dimensions = store.dimensions(),
        "input"
    );

    let start = Instant::now();
    let extrema = if args.no_normalize {
        None
    } else {
        Some(normalize::min_max_normalize(&mut store))
    };
    info!(elapsed = ?start.elapsed(), "normalize");

    let start = Instant::now();
    let result = store.cluster(&KMeans::new(config))?;
    info!(elapsed = ?start.elapsed(), "k-means");

    println!("sparse? {}", if store.is_sparse() { "yes" } else { "no" });
    println!("iterations: {}", result.iterations);
    println!("within cluster SSE: {:11.4}", result.within_sse);

    let start = Instant::now();
    report::write_report_file(&args.output, &store.attributes, &result, extrema.as_deref())
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(elapsed = ?start.elapsed(), "output");
    info!(elapsed = ?total_start.elapsed(), "complete");

    Ok(())
}

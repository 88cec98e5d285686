use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use context_corpus::{Corpus, ElementCorpus};
use context_features::{DiscoveryConfig, FeatureDiscovery, LlmOracle, Strategy};
use context_graph::{GraphBuilder, RelationshipType};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod backend;

use backend::{BackendConfig, HttpChatModel, HttpEmbedder};

#[derive(Parser)]
#[command(name = "context-features")]
#[command(about = "Discover high-level features in a code element corpus", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Group corpus elements into named features
    Discover(DiscoverArgs),

    /// Show relationship graph statistics, or the relations of one element
    Relations(RelationsArgs),
}

#[derive(Args)]
struct DiscoverArgs {
    /// Corpus JSON document
    #[arg(long)]
    corpus: PathBuf,

    /// Discovery strategy: bottom-up or top-down
    #[arg(long, default_value_t = Strategy::BottomUp)]
    strategy: Strategy,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Known feature name (repeatable); replaces the configured list
    #[arg(long = "known-feature")]
    known_features: Vec<String>,

    /// Override minimum cluster size
    #[arg(long)]
    min_cluster_size: Option<usize>,

    /// Override refinement round limit
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Write the feature map here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print features together with run diagnostics
    #[arg(long)]
    report: bool,
}

#[derive(Args)]
struct RelationsArgs {
    /// Corpus JSON document
    #[arg(long)]
    corpus: PathBuf,

    /// Element id to list relations for
    #[arg(long)]
    element: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Discover(args) => run_discover(args).await,
        Commands::Relations(args) => run_relations(args).await,
    }
}

async fn load_corpus(path: &Path) -> Result<ElementCorpus> {
    ElementCorpus::load(path)
        .await
        .with_context(|| format!("Failed to load corpus {}", path.display()))
}

async fn load_config(args: &DiscoverArgs) -> Result<DiscoveryConfig> {
    let mut config = match &args.config {
        Some(path) => DiscoveryConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DiscoveryConfig::default(),
    };
    if !args.known_features.is_empty() {
        config.known_features = args.known_features.clone();
    }
    if let Some(size) = args.min_cluster_size {
        config.min_cluster_size = size;
    }
    if let Some(rounds) = args.max_iterations {
        config.max_iterations = rounds;
    }
    Ok(config)
}

async fn run_discover(args: DiscoverArgs) -> Result<()> {
    let corpus = load_corpus(&args.corpus).await?;
    let config = load_config(&args).await?;
    let strategy = args.strategy;

    let backend = BackendConfig::from_env();
    let timeout = config.oracle.timeout();
    let chat = HttpChatModel::new(backend.clone(), timeout)?;
    let mut engine = FeatureDiscovery::new(config, Arc::new(LlmOracle::new(chat)))
        .context("Invalid discovery configuration")?;
    if strategy == Strategy::TopDown {
        engine = engine.with_embedder(Arc::new(HttpEmbedder::new(backend, timeout)?));
    }

    let discovery = engine
        .discover(&corpus, strategy)
        .await
        .context("Feature discovery failed")?;

    if let Some(out) = &args.out {
        discovery
            .features
            .save(out)
            .await
            .with_context(|| format!("Failed to write {}", out.display()))?;
        log::info!("Wrote {} features to {}", discovery.features.len(), out.display());
    }

    if args.report {
        println!("{}", serde_json::to_string_pretty(&discovery)?);
    } else if args.out.is_none() {
        println!("{}", serde_json::to_string_pretty(&discovery.features)?);
    }
    Ok(())
}

#[derive(Serialize)]
struct GraphSummary {
    elements: usize,
    edges: usize,
    calls: usize,
    inherits: usize,
}

#[derive(Serialize)]
struct RelationEntry {
    target: String,
    relationship: RelationshipType,
}

async fn run_relations(args: RelationsArgs) -> Result<()> {
    let corpus = load_corpus(&args.corpus).await?;
    let snapshot = corpus.elements_with_embeddings()?;
    let graph = GraphBuilder::new().build(snapshot.elements());

    let json = match &args.element {
        Some(id) => {
            let relations: Vec<RelationEntry> = graph
                .relations_of(id)
                .with_context(|| format!("Unknown element {id}"))?
                .into_iter()
                .map(|(target, relationship)| RelationEntry {
                    target,
                    relationship,
                })
                .collect();
            serde_json::to_string_pretty(&relations)?
        }
        None => serde_json::to_string_pretty(&GraphSummary {
            elements: graph.node_count(),
            edges: graph.edge_count(),
            calls: graph.count_relationship(RelationshipType::Calls),
            inherits: graph.count_relationship(RelationshipType::Inherits),
        })?,
    };
    println!("{json}");
    Ok(())
}

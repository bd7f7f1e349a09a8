//! Command-line access to the reframing pipeline.
//!
//! Every subcommand prints its result as pretty JSON on stdout.
//!
//! Usage:
//!   cargo run --bin reframe -- classify "I will fail again" --situation "exam tomorrow"
//!   cargo run --bin reframe -- retrieve "I will fail again" -k 3
//!   cargo run --bin reframe -- reframe "I will fail again" --situation "exam tomorrow"
//!   cargo run --bin reframe -- score "I can prepare more" --thought "I will fail"
//!   cargo run --bin reframe -- control "I can prepare more" --attribute empathy

use anyhow::Result;
use clap::{Parser, Subcommand};
use reframe_mind::{
    config::Config,
    corpus::CaseStore,
    embeddings::create_embedder,
    metrics::MetricScorer,
    retrieval::{self, RetrievalQuery},
    server::{ClassifyParams, ControlParams, ReframeParams, ReframeServer},
};
use serde::Serialize;
use serde_json::json;

#[derive(Parser)]
#[command(name = "reframe")]
#[command(about = "Classify, retrieve, reframe and score distorted thoughts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Name the thinking trap behind a thought
    Classify {
        thought: String,
        #[arg(long, default_value = "")]
        situation: String,
    },
    /// Show the corpus cases most similar to a thought (no model calls)
    Retrieve {
        thought: String,
        #[arg(long, default_value = "")]
        situation: String,
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Generate candidate reframes from similar cases
    Reframe {
        thought: String,
        #[arg(long, default_value = "")]
        situation: String,
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Score a reframe on specificity, actionability, empathy and positivity
    Score {
        reframe: String,
        #[arg(long)]
        thought: String,
        #[arg(long, default_value = "")]
        situation: String,
    },
    /// Rewrite a reframe toward one attribute and re-score it
    Control {
        reframe: String,
        #[arg(long)]
        attribute: String,
        #[arg(long, default_value = "")]
        thought: String,
        #[arg(long, default_value = "")]
        situation: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(config.runtime.log_level.as_str())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Retrieve { thought, situation, k } => retrieve(config, thought, situation, k),
        Commands::Score {
            reframe,
            thought,
            situation,
        } => score(config, reframe, thought, situation).await,
        Commands::Classify { thought, situation } => {
            let server = ReframeServer::new(config)?;
            let result = server.classify(ClassifyParams { thought, situation }).await?;
            print_json(&json!({
                "thinking_trap": result.label_with_confidence,
                "label": result.label(),
                "confidence_percent": result.confidence_percent(),
            }))
        }
        Commands::Reframe { thought, situation, k } => {
            let server = ReframeServer::new(config)?;
            print_json(&server.reframe(ReframeParams { thought, situation, k }).await?)
        }
        Commands::Control {
            reframe,
            attribute,
            thought,
            situation,
        } => {
            let server = ReframeServer::new(config)?;
            let outcome = server
                .control(ControlParams {
                    reframe,
                    attribute,
                    thought,
                    situation,
                })
                .await?;
            print_json(&outcome)
        }
    }
}

/// Retrieval only needs the corpus, so no API key is required.
fn retrieve(config: Config, thought: String, situation: String, k: Option<usize>) -> Result<()> {
    let k = k.unwrap_or(config.retrieval.top_k);
    if k == 0 {
        anyhow::bail!("k must be a positive integer");
    }
    let store = CaseStore::from_path(&config.system.dataset_path);
    let dataset = store.load();
    eprintln!("Loaded {} cases from {}", dataset.len(), config.system.dataset_path);

    let query = RetrievalQuery::new(thought.trim(), situation.trim()).with_k(k);
    print_json(&retrieval::retrieve(&query, dataset))
}

/// Scoring only needs the embedder; without a key specificity takes the fallback value.
async fn score(config: Config, reframe: String, thought: String, situation: String) -> Result<()> {
    if reframe.trim().is_empty() || thought.trim().is_empty() {
        anyhow::bail!("reframe and thought must not be empty");
    }
    let embedder = create_embedder(&config)?;
    let scorer = MetricScorer::new(embedder, config.metrics.clone())?;
    let scores = scorer
        .score(reframe.trim(), thought.trim(), situation.trim())
        .await;
    print_json(&scores)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

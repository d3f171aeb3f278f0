//! Parapet - IAM Policy Analyzer
//!
//! Analyzes AWS-style IAM policy documents for structural defects and
//! serves the analysis over HTTP.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use parapet_api::ApiServer;
use parapet_core::config::ParapetConfig;
use parapet_core::types::{AnalyzeResponse, Severity};
use parapet_core::decode;
use parapet_engine::{analyzer, graph, normalizer, scorer, simplifier};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "parapet")]
#[command(author = "Parapet Team")]
#[command(version = parapet_core::VERSION)]
#[command(about = "IAM policy analyzer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Bind address
    #[arg(long, env = "PARAPET_BIND_ADDRESS")]
    bind: Option<String>,

    /// Port number
    #[arg(short, long, env = "PARAPET_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PARAPET_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the analyzer HTTP server
    Server,

    /// Analyze a local policy file and print the report
    Analyze {
        /// Path to a policy JSON document
        file: PathBuf,

        /// Emit the full analysis as JSON instead of a report
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();

    // Load or create config
    let mut config = if let Some(config_path) = &cli.config {
        ParapetConfig::from_file(config_path)?
    } else {
        ParapetConfig::from_env()
    };

    // Override with CLI args
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command {
        Some(Commands::Analyze { file, json }) => analyze_file(&file, json),
        Some(Commands::Server) | None => {
            info!("Parapet {} starting", parapet_core::VERSION);
            ApiServer::new(config).run().await?;
            Ok(())
        }
    }
}

fn analyze_file(path: &PathBuf, json_output: bool) -> anyhow::Result<()> {
    let raw = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let policy = decode::parse_policy(&raw)?;

    let normalized = normalizer::normalize(&policy);
    let graph = graph::build(&normalized);

    let score = scorer::score(&normalized);
    let findings = analyzer::analyze_with(&normalized, &graph);
    let mut suggestions = simplifier::suggest_with(&normalized, &graph);
    simplifier::render_previews(&normalized, &mut suggestions);
    let graph_data = graph::serialize(&graph, &normalized);

    if json_output {
        let response = AnalyzeResponse {
            original: policy,
            normalized,
            score,
            findings,
            suggestions,
            graph: Some(graph_data),
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!(
        "{} score {} (rank {:?})",
        path.display(),
        score.score,
        score.rank
    );
    for factor in &score.breakdown {
        println!("  {:<44} {:>3}  {}", factor.label, factor.score, factor.value);
    }

    if findings.is_empty() {
        println!("\n{}", "No findings.".green());
    } else {
        println!("\n{} finding(s):", findings.len());
        for finding in &findings {
            let severity = match finding.severity {
                Severity::High => "high".red().bold(),
                Severity::Medium => "medium".yellow(),
                Severity::Low => "low".normal(),
            };
            println!("  [{}] {} - {}", severity, finding.title, finding.evidence);
        }
    }

    if !suggestions.is_empty() {
        println!("\n{} suggestion(s):", suggestions.len());
        for patch in &suggestions {
            println!("  {}  {} ({})", patch.id, patch.title, patch.impact);
        }
    }

    Ok(())
}

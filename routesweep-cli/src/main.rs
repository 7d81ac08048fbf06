use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use routesweep_core::{generate, CancellationToken, GenerateRequest, GenerateResult};
use routesweep_oracle::{OracleClient, OracleConfig};

#[derive(Parser, Debug)]
#[command(name = "routesweep", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the pipeline against a `GenerateRequest`-shaped JSON file.
    Generate {
        /// Path to the request JSON file.
        request_file: PathBuf,

        /// Base URL of a live routing oracle. Omit to run fully offline
        /// (every gap bridged with a synthetic straight line).
        #[arg(long, env = "ROUTESWEEP_ORACLE_URL")]
        oracle_url: Option<reqwest::Url>,

        /// Output format.
        #[arg(long, value_enum, default_value = "summary")]
        format: OutputFormat,

        /// Disables the progress spinner.
        #[arg(long, env)]
        no_progress: bool,

        /// Overrides `oracle_call_budget` from the request file.
        #[arg(long, env)]
        oracle_call_budget: Option<u32>,
    },
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum OutputFormat {
    Summary,
    Geojson,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            request_file,
            oracle_url,
            format,
            no_progress,
            oracle_call_budget,
        } => run_generate(&request_file, oracle_url, format, no_progress, oracle_call_budget).await,
    }
}

async fn run_generate(
    request_file: &PathBuf,
    oracle_url: Option<reqwest::Url>,
    format: OutputFormat,
    no_progress: bool,
    oracle_call_budget: Option<u32>,
) -> Result<()> {
    let bytes = fs::read(request_file)
        .with_context(|| format!("failed to read request file at {}", request_file.display()))?;
    let mut request: GenerateRequest =
        serde_json::from_slice(&bytes).context("request file is not valid GenerateRequest JSON")?;
    if oracle_call_budget.is_some() {
        request.oracle_call_budget = oracle_call_budget;
    }

    let spinner = (!no_progress).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_message("Running route-sweeping pipeline...");
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    });

    if let Some(url) = &oracle_url {
        info!(%url, "using live routing oracle");
    } else {
        info!("no oracle URL given, running fully offline (synthetic connectors only)");
    }

    let oracle = OracleClient::new(OracleConfig {
        base_url: oracle_url,
        ..OracleConfig::default()
    });
    let cancel = CancellationToken::never();

    let result = generate(&request, &oracle, &cancel).await;

    if let Some(bar) = &spinner {
        bar.finish_and_clear();
    }

    match result {
        Ok(result) => {
            print_result(&result, format)?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn print_result(result: &GenerateResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Geojson => {
            let coordinates: Vec<[f64; 2]> = result.geometry.iter().map(|p| [p.lon, p.lat]).collect();
            let feature = serde_json::json!({
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": coordinates,
                },
                "properties": {
                    "length_m": result.length_m,
                    "duration_s": result.duration_s,
                    "status": result.status,
                    "chunk_count": result.chunks.len(),
                },
            });
            println!("{}", serde_json::to_string_pretty(&feature)?);
        }
        OutputFormat::Summary => {
            println!("status: {:?}", result.status);
            println!("length_m: {:.1}", result.length_m);
            println!("duration_s: {:.1}", result.duration_s);
            println!("chunks: {}", result.chunks.len());
            println!(
                "nodes: {} -> {}  edges: {} -> {}",
                result.diagnostics.nodes_before,
                result.diagnostics.nodes_after,
                result.diagnostics.edges_before,
                result.diagnostics.edges_after
            );
            println!(
                "sccs: {} (sizes: {:?})",
                result.diagnostics.scc_count, result.diagnostics.scc_sizes
            );
            println!(
                "deadhead_ratio: {:.3}  duplicated_length_m: {:.1}",
                result.diagnostics.deadhead_ratio, result.diagnostics.duplicated_length_m
            );
            println!(
                "oracle calls: {} real, {} synthetic",
                result.diagnostics.oracle_calls_real, result.diagnostics.oracle_calls_synthetic
            );
            println!(
                "gaps: max={:.1}m mean={:.1}m p95={:.1}m violations={}",
                result.diagnostics.gap_max_m,
                result.diagnostics.gap_mean_m,
                result.diagnostics.gap_p95_m,
                result.diagnostics.violations
            );
            println!("continuity_valid: {}", result.diagnostics.continuity_valid);
            println!(
                "timings: graph_build={}ms eulerization={}ms assembly={}ms total={}ms",
                result.diagnostics.timings.graph_build_ms,
                result.diagnostics.timings.eulerization_ms,
                result.diagnostics.timings.assembly_ms,
                result.diagnostics.timings.total_ms
            );
        }
    }
    Ok(())
}

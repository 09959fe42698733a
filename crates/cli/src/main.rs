use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mdc_engine::{Summary, read_script, run_script};
use mdc_mcp::{
    EchoToolClient, LaunchConfig, McpToolClient, ToolClient, config::validate_config, load_launch_config, load_launch_config_from_path,
};
use mdc_types::RunContext;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod context;

use context::parse_context;

/// Run an MDC script against an MCP tool server and print the run summary as JSON.
#[derive(Parser, Debug)]
#[command(name = "mdc-run", version, about)]
struct Args {
    /// Path to the MDC script
    script: PathBuf,

    /// Run context as JSON: {"variables": {...}} or a flat object of variables
    #[arg(long)]
    context: Option<String>,

    /// Server launch configuration (JSON); defaults to the user config directory
    #[arg(long, value_name = "PATH")]
    server_config: Option<PathBuf>,

    /// Pass --headless to the tool server
    #[arg(long)]
    headless: bool,

    /// Per-command invocation timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Print the summary on a single line
    #[arg(long)]
    compact: bool,

    /// Echo commands instead of starting a tool server
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    // Usage errors surface here, before any run exists.
    let context = match &args.context {
        Some(raw) => parse_context(raw)?,
        None => RunContext::new(),
    };
    let script_text = read_script(&args.script)?;
    let launch = resolve_launch_config(&args)?;

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    info!(script = %args.script.display(), variables = context.variables.len(), "starting run");
    let summary = if args.dry_run {
        execute(&script_text, &context, EchoToolClient::new(), &launch, cancel).await
    } else {
        execute(&script_text, &context, McpToolClient::new(), &launch, cancel).await
    };

    print_summary(&summary, args.compact)?;
    std::process::exit(summary.exit_code());
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn resolve_launch_config(args: &Args) -> Result<LaunchConfig> {
    let mut launch = match &args.server_config {
        Some(path) => {
            anyhow::ensure!(path.exists(), "Failed to load server config: {} does not exist", path.display());
            load_launch_config_from_path(path).with_context(|| format!("Failed to load server config: {}", path.display()))?
        }
        None => load_launch_config().context("Failed to load server config")?,
    };
    if args.headless {
        launch.push_flag("--headless");
    }
    if let Some(timeout_ms) = args.timeout_ms {
        launch.invocation_timeout_ms = timeout_ms;
    }
    validate_config(&launch).context("Invalid server config")?;
    Ok(launch)
}

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; cancelling run");
            cancel.cancel();
        }
    });
}

async fn execute<C: ToolClient>(
    script_text: &str,
    context: &RunContext,
    client: C,
    launch: &LaunchConfig,
    cancel: CancellationToken,
) -> Summary {
    let summary = run_script(script_text, context, client, launch, cancel).await;
    info!(
        success = summary.success,
        total = summary.total,
        successful = summary.successful,
        failed = summary.failed,
        skipped = summary.skipped,
        total_duration_ms = summary.total_duration_ms,
        "run finished"
    );
    summary
}

fn print_summary(summary: &Summary, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(summary)?
    } else {
        serde_json::to_string_pretty(summary)?
    };
    println!("{rendered}");
    Ok(())
}

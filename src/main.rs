// ABOUTME: Entry point for the podexec CLI application.
// ABOUTME: Loads cluster config and streams a remote command's output to the terminal.

mod cli;

use clap::Parser;
use cli::Cli;
use podexec::cluster::ClusterConnection;
use podexec::config::ClusterConfig;
use podexec::error::{Error, Result};
use podexec::exec::{CancellationToken, CommandExecutor, ExecRequest, PodExecOps};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        let code = match &e {
            Error::Exec(exec) => exec.exit_code().unwrap_or(1),
            _ => 1,
        };
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ClusterConfig::load(path)?,
        None => ClusterConfig::discover(&env::current_dir()?)?,
    };

    // Apply context overrides if specified
    let config = if let Some(context) = &cli.context {
        config.for_context(context)?
    } else {
        config
    };

    let connection = ClusterConnection::from_config(&config)?;
    let executor = CommandExecutor::new(connection);

    let request = ExecRequest::new(cli.pod, cli.command)
        .namespace(cli.namespace.unwrap_or(config.namespace))
        .container(cli.container.unwrap_or(config.container))
        .timeout(cli.timeout.unwrap_or(config.timeout))
        .stdout(tokio::io::stdout())
        .stderr(tokio::io::stderr());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    executor.execute_with_cancel(request, &cancel).await?;
    Ok(())
}

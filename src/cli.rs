// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the target pod, container, timeout, and command arguments.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "podexec")]
#[command(about = "Run a command inside a pod container and capture its output")]
#[command(version)]
pub struct Cli {
    /// Path to the cluster config file (defaults to podexec.yml discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Named context from the config file
    #[arg(long)]
    pub context: Option<String>,

    /// Namespace of the pod
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Container within the pod
    #[arg(short, long)]
    pub container: Option<String>,

    /// Execution timeout, e.g. 30s or 2m
    #[arg(short, long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Pod to exec into
    pub pod: String,

    /// Command and arguments to run
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

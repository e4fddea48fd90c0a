use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tnready")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_TIME"), ")"))]
#[command(about = "Testnet readiness checker for multi-repository workspaces", long_about = None)]
pub struct Cli {
    /// Workspace root holding the sibling repositories (default: current directory)
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Config file (default: <workspace>/readiness.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where to write the JSON report (default: <workspace>/TESTNET_READINESS_REPORT.json)
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Console output format (text or json)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Debug logging and per-check details
    #[arg(short, long)]
    pub verbose: bool,

    /// List the registered checks and exit
    #[arg(long)]
    pub list: bool,
}

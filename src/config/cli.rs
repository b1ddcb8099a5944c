use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "port-bridge")]
#[command(about = "Replay application port messages against the host bridge")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "port-bridge.toml")]
    pub config: PathBuf,

    /// JSON-lines file of outbound messages; stdin when omitted
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON regardless of the config file
    #[arg(long)]
    pub json_logs: bool,

    /// How long to wait for pending audio notifications after the script ends
    #[arg(long, default_value = "500")]
    pub settle_ms: u64,
}

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "fare-squirrel")]
#[command(about = "Appends one ride fare/time estimate between two places to a CSV log")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "squirrel.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Validate the configuration and print what would be sampled
    #[arg(long)]
    pub dry_run: bool,
}

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Await Clippy CLI options.
#[derive(Debug, Parser)]
#[command(
    name = "await-clippy",
    version,
    about = "Detect synchronous calls with awaitable alternatives",
    args_conflicts_with_subcommands = true,
    subcommand_precedence_over_arg = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub analyze: AnalyzeArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze compilation fixtures.
    Analyze(AnalyzeArgs),

    /// List available rules.
    ListRules,

    /// Explain a rule.
    Explain {
        /// Rule name.
        rule: String,
    },
}

#[derive(Debug, Clone, ClapArgs)]
pub struct AnalyzeArgs {
    /// JSON fixture files describing compilations to analyze.
    #[arg(value_name = "FIXTURE")]
    pub paths: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Only run these rules (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip these rules (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Exit with code 1 if any diagnostics are emitted.
    #[arg(long)]
    pub deny_warnings: bool,

    /// Explicit config file path (skips upward discovery).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Analyze generated compilation units instead of skipping them.
    #[arg(long)]
    pub analyze_generated: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

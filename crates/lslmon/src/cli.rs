//! Clap derive structures for the `lslmon` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lslmon -- watch Lab Streaming Layer streams come and go
#[derive(Debug, Parser)]
#[command(
    name = "lslmon",
    version,
    about = "Monitor Lab Streaming Layer streams from the command line",
    long_about = "Discovers the data streams advertised on a Lab Streaming Layer network\n\
        (natively through liblsl, or through an HTTP stream directory service),\n\
        shows their metadata, and reports streams as they appear and disappear.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Stream directory backend (overrides config)
    #[arg(long, short = 'b', env = "LSLMON_BACKEND", global = true)]
    pub backend: Option<Backend>,

    /// HTTP stream directory URL (overrides config)
    #[arg(long, short = 'u', env = "LSLMON_URL", global = true)]
    pub url: Option<String>,

    /// Bearer token for the HTTP stream directory
    #[arg(long, env = "LSLMON_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Seconds each resolution may aggregate results
    #[arg(long, short = 'r', global = true, value_name = "SECS")]
    pub resolve_time: Option<f64>,

    /// Minimum seconds between discovery cycles
    #[arg(long, global = true, value_name = "SECS")]
    pub poll_interval: Option<f64>,

    /// Keep reporting a vanished stream for this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub forget_after: Option<f64>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Most streams to display
    #[arg(long, short = 'n', global = true, value_name = "N")]
    pub max_entries: Option<usize>,

    /// Output format
    #[arg(long, short = 'o', env = "LSLMON_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Value Enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// HTTP stream directory service
    Http,
    /// Native LSL network through liblsl
    Lsl,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Lsl => "lsl",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one stream name per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve once and list the visible streams
    #[command(alias = "ls")]
    List,

    /// Resolve once and show the full metadata of one stream
    Show(ShowArgs),

    /// Keep watching and report streams as they appear and disappear
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage lslmon configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Stream name
    pub name: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Start with automatic updates off (press `a` to enable)
    #[arg(long)]
    pub paused: bool,

    /// Ignore keyboard commands on stdin
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration (tokens masked)
    Show,

    /// Print the config file location
    Path,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use contracts::{HeroId, SupersedePolicy};
use std::path::PathBuf;

/// Heroes - client for a remote hero collection
#[derive(Parser, Debug)]
#[command(
    name = "heroes",
    author,
    version,
    about = "Browse, edit and search a remote hero collection",
    long_about = "Client for a remote hero collection.\n\n\
                  Every command goes through a gateway that never fails: transport \n\
                  errors are logged to the message log and replaced by a fallback \n\
                  value. The message log is printed after each command."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "HEROES_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "HEROES_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, global = true, env = "HEROES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the collection base URL from configuration
    #[arg(long, global = true, env = "HEROES_BASE_URL")]
    pub base_url: Option<String>,

    /// Use the seeded in-memory collection instead of HTTP
    #[arg(long, global = true, env = "HEROES_IN_MEMORY")]
    pub in_memory: bool,

    /// Prometheus metrics port (disabled when omitted)
    #[arg(long, global = true, env = "HEROES_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Hero(HeroCommand),

    /// Validate configuration without touching the collection
    Validate(ValidateArgs),
}

/// Commands that go through the gateway
#[derive(Subcommand, Debug, Clone)]
pub enum HeroCommand {
    /// List all heroes
    List,

    /// Show one hero
    Get(IdArgs),

    /// Create a hero; the server assigns the id
    Add(AddArgs),

    /// Rename a hero
    Update(UpdateArgs),

    /// Delete a hero
    Delete(IdArgs),

    /// Type-ahead search: each stdin line is one keystroke snapshot
    Search(SearchArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IdArgs {
    /// Hero id
    pub id: HeroId,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Hero name
    pub name: String,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Hero id
    pub id: HeroId,

    /// New name
    pub name: String,
}

/// Arguments for the `search` command
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Override the debounce interval from configuration (milliseconds)
    #[arg(long, env = "HEROES_DEBOUNCE_MS")]
    pub debounce_ms: Option<u64>,

    /// Override when an in-flight search is superseded
    #[arg(long, value_enum)]
    pub supersede: Option<Supersede>,

    /// Delay between stdin lines, to replay typing speed (milliseconds)
    #[arg(long, default_value = "0")]
    pub pace_ms: u64,

    /// Print pipeline statistics when input ends
    #[arg(long)]
    pub stats: bool,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Supersede rule as a CLI value
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Supersede {
    /// Any new keystroke invalidates the in-flight search
    OnInput,
    /// Only the next dispatched search invalidates it
    OnDispatch,
}

impl From<Supersede> for SupersedePolicy {
    fn from(value: Supersede) -> Self {
        match value {
            Supersede::OnInput => Self::OnInput,
            Supersede::OnDispatch => Self::OnDispatch,
        }
    }
}

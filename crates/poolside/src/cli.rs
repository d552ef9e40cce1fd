//! Clap derive structures for the `poolside` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// poolside -- control Fluidra pool equipment from the command line
#[derive(Debug, Parser)]
#[command(
    name = "poolside",
    version,
    about = "Monitor and control Fluidra pool equipment from the command line",
    long_about = "Polls the Fluidra Pool cloud for device state and dispatches\n\
        heat-pump commands (presets, setpoints, power) against it.\n\n\
        Credentials come from a profile in the config file, the keyring,\n\
        or POOLSIDE_* environment variables.",
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
    /// Account profile to use
    #[arg(long, short = 'p', env = "POOLSIDE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Fluidra account email (overrides profile)
    #[arg(long, short = 'u', env = "POOLSIDE_USERNAME", global = true)]
    pub username: Option<String>,

    /// Fluidra account password (prefer the keyring or a profile)
    #[arg(long, env = "POOLSIDE_PASSWORD", global = true, hide_env = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "POOLSIDE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "POOLSIDE_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
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
    /// List pool controllers on the account
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Show mapped entities (sensors, binary sensors, switches, climate)
    #[command(alias = "ent", alias = "e")]
    Entities(EntitiesArgs),

    /// Heat-pump climate control
    #[command(alias = "cl")]
    Climate(ClimateArgs),

    /// Watch snapshots as they arrive
    Watch(WatchArgs),

    /// Show who is signed in and their pool access
    #[command(alias = "whoami")]
    Account,

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Show a single device in detail
    pub device_id: Option<String>,
}

// ── Entities ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EntitiesArgs {
    /// Only entities belonging to this device
    #[arg(long, short = 'd')]
    pub device: Option<String>,
}

// ── Climate ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ClimateArgs {
    #[command(subcommand)]
    pub command: ClimateCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClimateCommand {
    /// Show the climate entity for each heat pump
    Status,

    /// Select an operating preset
    SetMode {
        /// Target device id
        device_id: String,
        /// Preset name, e.g. "Boost Heating" (see `climate modes`)
        mode: String,
    },

    /// List the available presets and their wire codes
    Modes,

    /// Change the target temperature (°C, 10.0-40.0 in 0.5 steps)
    SetTemp {
        /// Target device id
        device_id: String,
        /// Temperature in °C
        celsius: f64,
    },

    /// Power the heat pump on
    On {
        /// Target device id
        device_id: String,
    },

    /// Power the heat pump off
    Off {
        /// Target device id
        device_id: String,
    },
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval override in minutes (5-120)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Stop after this many snapshots (default: run until interrupted)
    #[arg(long)]
    pub count: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the active configuration (passwords redacted)
    Show,

    /// Print the config file path
    Path,

    /// Store credentials for a profile (password goes to the keyring)
    SetCredentials {
        /// Profile name
        #[arg(default_value = "default")]
        profile: String,
        /// Account email
        #[arg(long)]
        username: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

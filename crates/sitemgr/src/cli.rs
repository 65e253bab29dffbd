//! Clap derive structures for the `sitemgr` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

use sitemgr_core::MetricCategory;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sitemgr -- poll the UniFi Site Manager cloud API
#[derive(Debug, Parser)]
#[command(
    name = "sitemgr",
    version,
    about = "Inspect UniFi Site Manager sites, devices, ISP metrics and SD-WAN from the command line",
    long_about = "Polls the UniFi Site Manager cloud API (api.ui.com) and presents sites,\n\
        devices, ISP link metrics and SD-WAN topology as stable, named entities.",
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
    #[arg(long, short = 'p', env = "SITEMGR_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, env = "SITEMGR_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Site Manager API key
    #[arg(long, env = "SITEMGR_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Restrict entities to these site ids (repeatable, overrides profile)
    #[arg(long = "site", short = 's', global = true)]
    pub sites: Vec<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SITEMGR_OUTPUT",
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

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "SITEMGR_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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

/// ISP metric category, as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Latency,
    PacketLoss,
    Bandwidth,
    Wan,
}

impl From<CategoryArg> for MetricCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Latency => Self::Latency,
            CategoryArg::PacketLoss => Self::PacketLoss,
            CategoryArg::Bandwidth => Self::Bandwidth,
            CategoryArg::Wan => Self::Wan,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one refresh cycle and summarize what was fetched
    Refresh,

    /// List sites
    Sites,

    /// List hosts, or show one by id
    Hosts(HostsArgs),

    /// List devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Show ISP metrics for a site
    Metrics(MetricsArgs),

    /// List SD-WAN configs with hub and spoke status
    Sdwan,

    /// List the entities a refresh projects
    Entities(EntitiesArgs),

    /// Poll on an interval and report each cycle
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Subcommand arguments ─────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HostsArgs {
    /// Host id to fetch directly
    pub id: Option<String>,
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Only offline devices
    #[arg(long)]
    pub offline: bool,
}

#[derive(Debug, Args)]
pub struct MetricsArgs {
    /// Site id
    pub site: String,

    /// Show every sample of one category instead of the latest per category
    #[arg(long, short = 'c')]
    pub category: Option<CategoryArg>,
}

#[derive(Debug, Args)]
pub struct EntitiesArgs {
    /// Only entities of this kind (site, device, isp_metrics, sd_wan_config, sd_wan_hub, sd_wan_spoke)
    #[arg(long)]
    pub kind: Option<String>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Polling period in seconds (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Stop after this many cycles
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Set a value on the active profile
    Set {
        /// Key: base_url, api_key_env, sites, refresh_interval, timeout, default_site_alias, ca_cert
        key: String,

        /// Value to set (comma-separated for sites)
        value: String,
    },

    /// Store the active profile's API key in the system keyring
    SetKey {
        /// Profile name (defaults to active profile)
        #[arg(long)]
        profile: Option<String>,
    },

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

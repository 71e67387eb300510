//! Clap derive structures for the `unified` CLI.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use unified_api::events::{DeviceModelKind, ProtectEventKind};
use unified_api::types::FileType;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unified -- UniFi Network and Protect from the command line
#[derive(Debug, Parser)]
#[command(
    name = "unified",
    version,
    about = "Query and control UniFi Network and Protect consoles",
    long_about = "Talks to the official UniFi integration APIs with an API key.\n\n\
        REST calls go through /proxy/network and /proxy/protect; Protect\n\
        event and device streams are consumed over WebSocket.",
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
    /// Config profile to use
    #[arg(long, short = 'p', env = "UNIFI_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Console hostname, optionally host:port (overrides profile)
    #[arg(long, env = "UNIFI_HOST", global = true)]
    pub host: Option<String>,

    /// Integration API key (overrides profile and keyring)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// WebSocket keep-alive interval, e.g. "30s" or "2m"
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    pub keep_alive_interval: Option<Duration>,

    /// Skip TLS certificate verification (true/false)
    #[arg(long, global = true, value_name = "BOOL")]
    pub insecure: Option<bool>,

    /// Talk plain http/ws instead of https/wss
    #[arg(long, global = true, hide = true)]
    pub plaintext: bool,

    /// Output format
    #[arg(long, short = 'o', env = "UNIFI_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// UniFi Network application
    #[command(alias = "net", alias = "n")]
    Network(NetworkArgs),

    /// UniFi Protect application
    #[command(alias = "p")]
    Protect(ProtectArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Site selector for Network commands.
#[derive(Debug, Args)]
pub struct SiteArg {
    /// Site ID
    #[arg(long, short = 's', env = "UNIFI_SITE")]
    pub site: String,
}

/// Pagination arguments.
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Pagination offset
    #[arg(long)]
    pub offset: Option<u32>,

    /// Max results per page
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,

    /// Print only the IDs, one per line
    #[arg(long)]
    pub id_only: bool,

    /// Print only the items, without page metadata
    #[arg(long)]
    pub hide_page: bool,
}

/// Pagination plus a filter expression.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Filter expression, e.g. "name.eq('lobby')"
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    #[command(flatten)]
    pub page: PageArgs,
}

/// JSON request body for patch/create commands.
#[derive(Debug, Args)]
pub struct BodyFileArg {
    /// Path to a JSON file with the request body
    #[arg(long = "file", short = 'F')]
    pub file: PathBuf,
}

// ── Network ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NetworkArgs {
    #[command(subcommand)]
    pub command: NetworkCommand,
}

#[derive(Debug, Subcommand)]
pub enum NetworkCommand {
    /// Network application version
    Info,

    /// Sites on this console
    Sites {
        #[command(subcommand)]
        command: SitesCommand,
    },

    /// Connected clients
    #[command(alias = "cl")]
    Clients {
        #[command(subcommand)]
        command: ClientsCommand,
    },

    /// Adopted devices
    #[command(alias = "dev", alias = "d")]
    Devices {
        #[command(subcommand)]
        command: DevicesCommand,
    },

    /// Hotspot vouchers
    Vouchers {
        #[command(subcommand)]
        command: VouchersCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List sites
    #[command(alias = "ls")]
    List(ListArgs),
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List connected clients
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        site: SiteArg,
        #[command(flatten)]
        list: ListArgs,
    },

    /// Show one client
    #[command(alias = "get")]
    Details {
        #[command(flatten)]
        site: SiteArg,
        /// Client ID
        client: String,
    },

    /// Run a client action such as AUTHORIZE_GUEST_ACCESS
    Action {
        #[command(flatten)]
        site: SiteArg,
        /// Client ID
        client: String,
        /// Action name
        action: String,
        /// Guest authorization time limit in minutes
        #[arg(long)]
        time_limit: Option<u32>,
        /// Data usage limit in megabytes
        #[arg(long)]
        data_limit: Option<u32>,
        /// Download rate limit in kbps
        #[arg(long)]
        rx_limit: Option<u32>,
        /// Upload rate limit in kbps
        #[arg(long)]
        tx_limit: Option<u32>,
    },
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List adopted devices
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        site: SiteArg,
        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one device
    #[command(alias = "get")]
    Details {
        #[command(flatten)]
        site: SiteArg,
        /// Device ID
        device: String,
    },

    /// Latest statistics for a device
    Stats {
        #[command(flatten)]
        site: SiteArg,
        /// Device ID
        device: String,
    },

    /// Run a device action such as RESTART
    Action {
        #[command(flatten)]
        site: SiteArg,
        /// Device ID
        device: String,
        /// Action name
        action: String,
    },

    /// Run a port action such as POWER_CYCLE
    PortAction {
        #[command(flatten)]
        site: SiteArg,
        /// Device ID
        device: String,
        /// Port index
        port: u32,
        /// Action name
        action: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum VouchersCommand {
    /// List vouchers
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        site: SiteArg,
        #[command(flatten)]
        list: ListArgs,
    },

    /// Show one voucher
    #[command(alias = "get")]
    Details {
        #[command(flatten)]
        site: SiteArg,
        /// Voucher ID
        voucher: String,
    },

    /// Generate vouchers
    Generate {
        #[command(flatten)]
        site: SiteArg,
        /// Number of vouchers
        #[arg(long, default_value = "1")]
        count: u32,
        /// Voucher name
        #[arg(long)]
        name: String,
        /// Guests allowed per voucher (0 = unlimited)
        #[arg(long, default_value = "0")]
        guest_limit: u32,
        /// Access time limit in minutes
        #[arg(long)]
        time_limit: u32,
        /// Data usage limit in megabytes (0 = unlimited)
        #[arg(long, default_value = "0")]
        data_limit: u32,
        /// Download rate limit in kbps (0 = unlimited)
        #[arg(long, default_value = "0")]
        rx_limit: u32,
        /// Upload rate limit in kbps (0 = unlimited)
        #[arg(long, default_value = "0")]
        tx_limit: u32,
    },

    /// Delete one voucher
    #[command(alias = "rm")]
    Delete {
        #[command(flatten)]
        site: SiteArg,
        /// Voucher ID
        voucher: String,
    },

    /// Delete every voucher matching a filter
    DeleteFilter {
        #[command(flatten)]
        site: SiteArg,
        /// Filter expression selecting vouchers to delete
        filter: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

// ── Protect ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProtectArgs {
    #[command(subcommand)]
    pub command: ProtectCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProtectCommand {
    /// Protect application version
    Info,

    /// Cameras
    #[command(alias = "cam")]
    Cameras {
        #[command(subcommand)]
        command: CamerasCommand,
    },

    /// Viewports
    Viewers {
        #[command(subcommand)]
        command: ViewersCommand,
    },

    /// Live view layouts
    Liveviews {
        #[command(subcommand)]
        command: LiveviewsCommand,
    },

    /// Floodlights
    Lights {
        #[command(subcommand)]
        command: DeviceCommand,
    },

    /// The NVR
    Nvrs,

    /// Chimes
    Chimes {
        #[command(subcommand)]
        command: DeviceCommand,
    },

    /// Sensors
    Sensors {
        #[command(subcommand)]
        command: DeviceCommand,
    },

    /// Device asset files
    Files {
        #[command(subcommand)]
        command: FilesCommand,
    },

    /// Trigger an alarm manager webhook
    AlarmWebhook {
        /// Alarm trigger ID
        trigger: String,
    },

    /// Stream events or device updates until interrupted
    #[command(alias = "sub")]
    Subscribe {
        #[command(subcommand)]
        command: SubscribeCommand,
    },
}

/// Selects which RTSPS stream qualities to act on.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct QualityArgs {
    #[arg(long)]
    pub high: bool,
    #[arg(long)]
    pub medium: bool,
    #[arg(long)]
    pub low: bool,
    #[arg(long)]
    pub package: bool,
}

#[derive(Debug, Subcommand)]
pub enum CamerasCommand {
    /// List cameras
    #[command(alias = "ls")]
    List,

    /// Show one camera
    #[command(alias = "get")]
    Details { camera: String },

    /// Patch camera settings from a JSON file
    Patch {
        camera: String,
        #[command(flatten)]
        body: BodyFileArg,
    },

    /// Save a JPEG snapshot
    Snapshot {
        camera: String,
        /// Request the full-resolution image
        #[arg(long)]
        high_quality: bool,
        /// Write to this file instead of stdout
        #[arg(long, short = 'O')]
        out: Option<PathBuf>,
    },

    /// Create RTSPS streams
    StreamCreate {
        camera: String,
        #[command(flatten)]
        qualities: QualityArgs,
    },

    /// Delete RTSPS streams
    StreamDelete {
        camera: String,
        #[command(flatten)]
        qualities: QualityArgs,
    },

    /// Show existing RTSPS streams
    StreamGet { camera: String },

    /// Permanently disable the camera microphone
    DisableMicPermanently { camera: String },

    /// Open a talkback session
    TalkbackSession { camera: String },

    /// Start a PTZ patrol
    PtzPatrolStart {
        camera: String,
        /// Patrol slot, 0 to 3
        slot: i64,
    },

    /// Stop the active PTZ patrol
    PtzPatrolStop { camera: String },

    /// Move to a PTZ preset
    PtzGoto {
        camera: String,
        /// Preset slot, 0 to 3
        slot: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum ViewersCommand {
    #[command(alias = "ls")]
    List,
    #[command(alias = "get")]
    Details { viewer: String },
    /// Patch viewer settings from a JSON file
    Settings {
        viewer: String,
        #[command(flatten)]
        body: BodyFileArg,
    },
}

#[derive(Debug, Subcommand)]
pub enum LiveviewsCommand {
    #[command(alias = "ls")]
    List,
    #[command(alias = "get")]
    Details { liveview: String },
    /// Create a live view from a JSON file
    Create {
        #[command(flatten)]
        body: BodyFileArg,
    },
    /// Patch a live view from a JSON file
    Patch {
        liveview: String,
        #[command(flatten)]
        body: BodyFileArg,
    },
}

/// List/details/patch for lights, chimes, and sensors.
#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    #[command(alias = "ls")]
    List,
    #[command(alias = "get")]
    Details { id: String },
    /// Patch settings from a JSON file
    Patch {
        id: String,
        #[command(flatten)]
        body: BodyFileArg,
    },
}

#[derive(Debug, Subcommand)]
pub enum FilesCommand {
    /// List uploaded assets
    #[command(alias = "ls")]
    List {
        #[arg(long, default_value = "animations")]
        file_type: FileType,
    },

    /// Upload an asset (gif, jpg, png, mp3, mp4, wav, caf)
    Upload {
        path: PathBuf,
        #[arg(long, default_value = "animations")]
        file_type: FileType,
    },
}

#[derive(Debug, Subcommand)]
pub enum SubscribeCommand {
    /// Protect events (rings, motion, smart detections, sensors)
    Events {
        /// Only print these event kinds (repeatable)
        #[arg(long = "kind", value_name = "TAG")]
        kinds: Vec<ProtectEventKind>,
    },

    /// Protect device add/update/remove messages
    Devices {
        /// Only print these device model keys (repeatable)
        #[arg(long = "kind", value_name = "MODEL_KEY")]
        kinds: Vec<DeviceModelKind>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile; prompts for anything not given.
    /// The console comes from --host.
    Init {
        /// Profile name
        #[arg(long)]
        name: Option<String>,
        /// Read the API key from this environment variable
        #[arg(long)]
        api_key_env: Option<String>,
        /// Make this the default profile
        #[arg(long)]
        set_default: bool,
    },

    /// Show the current config (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Store a profile's API key in the system keyring
    SetKey {
        /// Key value; prompted for when omitted
        #[arg(long)]
        value: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

//! Centertech CLI
//!
//! Terminal interface for the storefront utility layer.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use centertech_cli::countdown_cmd;
use centertech_cli::remote_cmd::{self, AdminAction};
use centertech_cli::sanitize_cmd;
use centertech_cli::session_cmd::{self, RoleAction};
use centertech_cli::users_cmd::{self, UsersAction};
use centertech_core::config::load_config;
use centertech_core::sanitize::SanitizeKind;
use centertech_core::tracing_init::{LogFormat, init_tracing};
use centertech_core::{Role, Services};

#[derive(Parser, Debug)]
#[command(name = "centertech")]
#[command(version, about = "Centertech storefront utility CLI", long_about = None)]
struct Cli {
    /// Config file (JSON), applied over the global settings
    #[arg(long, env = "CENTERTECH_CONFIG")]
    config: Option<PathBuf>,

    /// Store file, overrides configuration
    #[arg(long)]
    store: Option<PathBuf>,

    /// Remote service base URL, overrides configuration
    #[arg(long)]
    api_url: Option<String>,

    /// Emit JSON log lines, overrides configuration
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a sanitizer over a value
    Sanitize {
        /// text, multiline, email, phone, numeric, currency, code or url
        kind: SanitizeKind,
        value: String,
    },
    /// Coerce a value to a non-negative number
    Number {
        value: String,
        /// Printed when the value is negative or not a number
        #[arg(long, default_value_t = 0.0)]
        fallback: f64,
    },
    /// Manage the stored role
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },
    /// Store a session token (and optionally a role)
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        role: Option<Role>,
    },
    /// Clear the session token and role
    Logout,
    /// Show the guard decision for a location
    Guard {
        location: String,
        /// Also require the ADMIN role
        #[arg(long)]
        admin: bool,
    },
    /// Manage locally stored users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Count down to a draw
    Countdown {
        /// Target timestamp, e.g. 2026-12-24T20:00:00-03:00
        target: String,
        /// Print once and exit
        #[arg(long)]
        once: bool,
    },
    /// Admin-only views backed by the remote service
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Download a file from the remote service
    Download {
        path: String,
        /// Directory to save into
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.storage.path = Some(store);
    }
    if let Some(api_url) = cli.api_url {
        config.api.base_url = api_url;
    }

    if cli.log_json {
        config.log_format = LogFormat::Json;
    }

    init_tracing(&config.log_level, config.log_format)?;
    debug!(version = env!("CARGO_PKG_VERSION"), "Starting centertech CLI");

    let services = Services::from_config(&config);

    match cli.command {
        Command::Sanitize { kind, value } => sanitize_cmd::run_sanitize(kind, &value),
        Command::Number { value, fallback } => sanitize_cmd::run_number(&value, fallback),
        Command::Role { action } => session_cmd::run_role(&services, action),
        Command::Login { token, role } => session_cmd::login(&services, &token, role),
        Command::Logout => session_cmd::logout(&services),
        Command::Guard { location, admin } => session_cmd::run_guard(&services, &location, admin),
        Command::Users { action } => users_cmd::run(&services, action),
        Command::Countdown { target, once } => countdown_cmd::run(&target, once).await,
        Command::Admin { action } => remote_cmd::run_admin(&services, &config.api, action).await,
        Command::Download { path, out } => {
            remote_cmd::download(&services, &config.api, &path, &out).await
        }
    }
}

//! tabletmap daemon entry point.
//!
//! Keeps every attached graphics tablet mapped onto one application window
//! (by default the Rnote note-taking app) under sway or i3.
//!
//! # Usage
//!
//! ```text
//! tabletmap [OPTIONS]
//!
//! Options:
//!   --config <PATH>      Config file [default: $XDG_CONFIG_HOME/tabletmap/config.toml]
//!   --app-id <ID>        app_id of the target window
//!   --socket <PATH>      Compositor IPC socket [default: $SWAYSOCK, then $I3SOCK]
//!   --log-level <LEVEL>  Log level when RUST_LOG is unset
//!   --print-config       Print the effective configuration and exit
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load config, apply CLI overrides
//!  └─ SwayIpc::connect()        -- command connection
//!  └─ SwayIpc::subscribe()      -- event connection + reader task
//!  └─ SyncRegionUseCase::seed() -- register attached tablets
//!  └─ select! { run(events), ctrl_c }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tabletmap_core::protocol::EventKind;
use tabletmap_daemon::application::sync_region::SyncRegionUseCase;
use tabletmap_daemon::infrastructure::ipc::sway::{resolve_socket_path, SwayIpc};
use tabletmap_daemon::infrastructure::ipc::CompositorIpc;
use tabletmap_daemon::infrastructure::storage::config::{load_config, load_config_from, AppConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Maps graphics tablets onto one application window under sway/i3.
///
/// Every option overrides the matching config file value.
#[derive(Debug, Parser)]
#[command(name = "tabletmap", version)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, env = "TABLETMAP_CONFIG")]
    config: Option<PathBuf>,

    /// `app_id` of the window to map tablets onto.
    #[arg(long, env = "TABLETMAP_APP_ID")]
    app_id: Option<String>,

    /// Path to the compositor's IPC socket.
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(long)]
    log_level: Option<String>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Loads the config file and applies the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, parsed, or
    /// validated.
    fn into_config(self) -> anyhow::Result<(AppConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => load_config().context("failed to load config")?,
        };

        if let Some(app_id) = self.app_id {
            config.daemon.target_app_id = app_id;
        }
        if let Some(socket) = self.socket {
            config.ipc.socket_path = Some(socket);
        }
        if let Some(level) = self.log_level {
            config.daemon.log_level = level;
        }
        config.validate().context("invalid command-line override")?;

        Ok((config, self.print_config))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, print_config) = Cli::parse().into_config()?;

    if print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    // `RUST_LOG` wins; otherwise the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.daemon.log_level)),
        )
        .init();

    info!("tabletmap starting");

    // ── Compositor connection ─────────────────────────────────────────────────
    let socket_path = resolve_socket_path(config.ipc.socket_path.as_deref())?;
    let ipc = SwayIpc::connect(&socket_path, config.ipc.channel_capacity)
        .await
        .context("failed to connect to the compositor")?;

    match ipc.version().await {
        Ok(version) => info!("compositor version {}", version.human_readable),
        Err(e) => warn!("could not query compositor version: {e}"),
    }

    let ipc = Arc::new(ipc);

    // Subscribe before seeding so no attach between the two is missed.
    let events = ipc
        .subscribe(&EventKind::ALL)
        .await
        .context("failed to subscribe to compositor events")?;

    let mut use_case = SyncRegionUseCase::new(ipc, config.size_table(), &config.daemon.target_app_id)
        .with_remap_on_attach(config.daemon.remap_on_attach);

    let seeded = use_case
        .seed()
        .await
        .context("failed to enumerate input devices")?;
    if seeded > 0 && config.daemon.remap_on_attach {
        match use_case.sync_mapping().await {
            Ok(report) => info!(?report, "initial mapping pass done"),
            Err(e) => warn!("initial mapping pass failed: {e}"),
        }
    }

    info!(
        "tabletmap ready; mapping tablets onto {}.  Press Ctrl-C to exit.",
        use_case.target_app_id()
    );

    // ── Event loop / Ctrl-C ───────────────────────────────────────────────────
    tokio::select! {
        () = use_case.run(events) => {}
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for Ctrl-C")?;
            info!("shutdown signal received");
        }
    }

    info!("tabletmap stopped");
    Ok(())
}

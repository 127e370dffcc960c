//! # vrcbridge
//!
//! Bridge binary: loads settings, wires the OSC transport to the dispatch
//! loop, and serves the control panels.

#![deny(unsafe_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use vrcbridge_osc::{OscListener, UdpOscSender};
use vrcbridge_runtime::{AvatarLoader, Bridge, Registry, inbound};
use vrcbridge_server::{BridgeServer, ServerConfig, ShutdownCoordinator};
use vrcbridge_settings::BridgeSettings;

/// VRChat OSC parameter bridge.
#[derive(Parser, Debug)]
#[command(name = "vrcbridge", about = "Bridge VRChat OSC parameters to browser control panels")]
struct Cli {
    /// Settings file (default `~/.vrcbridge/settings.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Web gateway port.
    #[arg(long)]
    web_port: Option<u16>,

    /// Port VRChat listens on.
    #[arg(long)]
    osc_send_port: Option<u16>,

    /// Port to receive VRChat's OSC output on.
    #[arg(long)]
    osc_receive_port: Option<u16>,

    /// Directory holding `usr_*/Avatars/*.json` definition files.
    #[arg(long)]
    avatar_dir: Option<PathBuf>,

    /// Log level filter (overridden by `RUST_LOG`).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Flags win over the file and the environment.
    fn apply(&self, settings: &mut BridgeSettings) {
        if let Some(port) = self.web_port {
            settings.web.port = port;
        }
        if let Some(port) = self.osc_send_port {
            settings.osc.send_port = port;
        }
        if let Some(port) = self.osc_receive_port {
            settings.osc.receive_port = port;
        }
        if let Some(ref dir) = self.avatar_dir {
            settings.avatar.osc_dir = Some(dir.clone());
        }
        if let Some(ref level) = self.log_level {
            settings.logging.level.clone_from(level);
        }
    }
}

fn load_settings(cli: &Cli) -> Result<BridgeSettings> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(vrcbridge_settings::settings_path);
    let mut settings = vrcbridge_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    cli.apply(&mut settings);
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

/// Where the OSC listener binds. Resolved the same way as the send target.
fn receive_addr(settings: &BridgeSettings) -> Result<SocketAddr> {
    let osc = &settings.osc;
    vrcbridge_osc::resolve(&osc.receive_host, osc.receive_port).with_context(|| {
        format!(
            "Invalid OSC receive address {}:{}",
            osc.receive_host, osc.receive_port
        )
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    vrcbridge_core::logging::init_subscriber(&settings.logging.level, settings.logging.json);
    let metrics = vrcbridge_server::metrics::install_recorder();

    // Dispatch loop
    let registry = Registry::builtin().context("Built-in parameter catalog is inconsistent")?;
    let sender = UdpOscSender::connect(&settings.osc.send_host, settings.osc.send_port)
        .with_context(|| {
            format!(
                "Failed to set up OSC sender for {}:{}",
                settings.osc.send_host, settings.osc.send_port
            )
        })?;
    tracing::info!(target = %sender.target(), "osc sender ready");
    let (bridge, handle) = Bridge::new(
        registry,
        AvatarLoader::new(settings.avatar.osc_dir.clone()),
        Arc::new(sender),
        Duration::from_millis(settings.runtime.poll_interval_ms),
    );
    let shutdown = ShutdownCoordinator::new();
    let bridge_task = tokio::spawn(bridge.run(shutdown.token()));

    // OSC receive side
    let receive_addr = receive_addr(&settings)?;
    let router = inbound::router(&handle).context("Failed to build OSC router")?;
    let mut listener = OscListener::spawn(receive_addr, router)
        .with_context(|| format!("Failed to bind OSC listener on {receive_addr}"))?;
    tracing::info!(addr = %listener.local_addr(), "osc listener ready");

    // Web gateway
    let server = BridgeServer::new(
        ServerConfig::from(&settings.web),
        handle,
        shutdown.clone(),
        metrics,
    );
    let (addr, server_task) = server
        .listen()
        .await
        .context("Failed to start web gateway")?;
    tracing::info!("vrcbridge listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    listener.stop();
    shutdown.drain(vec![bridge_task, server_task], None).await;
    tracing::info!("Shutdown complete");
    Ok(())
}

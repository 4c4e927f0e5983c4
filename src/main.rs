//! Zero HID Gateway - HTTP-controlled USB keyboard
//!
//! Provisions the USB HID gadget, then serves keypress requests.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use zero_hid_gateway::{
    config::Config,
    keyboard::{HidDevice, KeymapRegistry},
    server, ConfigfsGadget, GadgetProvisioner, Gateway,
};

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Override the listen port
    #[arg(long, short)]
    port: Option<u16>,

    /// Skip USB gadget provisioning
    #[arg(long)]
    no_provision: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load().context("failed to load config")?,
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.no_provision {
        config.gadget.provision = false;
    }

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    log::info!("Zero HID Gateway {}", env!("CARGO_PKG_VERSION"));

    let keymaps = Arc::new(KeymapRegistry::builtin().context("invalid built-in keymap")?);
    log::info!(
        "layouts: {} (default {})",
        keymaps.layout_names().join(", "),
        keymaps.default_layout()
    );

    let gateway = Gateway::for_device(keymaps, HidDevice::new(&config.device.path), &config.typing)
        .context("invalid typing configuration")?;

    if config.gadget.provision {
        ConfigfsGadget::new(config.gadget.clone())
            .ensure_ready()
            .context("USB gadget provisioning failed")?;
    } else {
        log::info!("gadget provisioning disabled");
    }

    let addr = config.server.socket_addr()?;
    server::serve(Arc::new(gateway), addr)
        .await
        .with_context(|| format!("HTTP server on {} failed", addr))?;

    Ok(())
}

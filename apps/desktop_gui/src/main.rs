mod backend_bridge;
mod controller;
mod map;
mod ui;

use clap::Parser;
use client_core::ClientConfig;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing::info;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::PetMapApp;

#[derive(Parser, Debug)]
#[command(name = "petmap", about = "Lost & found pet map client")]
struct Args {
    /// Backend base URL; falls back to PETMAP_SERVER_URL, then the local
    /// default.
    #[arg(long)]
    server_url: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let config = ClientConfig::resolve(args.server_url);
    info!(server_url = %config.server_url, "starting pet map client");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(config, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Lost Pets Map")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([980.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Lost Pets Map",
        options,
        Box::new(move |_cc| Ok(Box::new(PetMapApp::new(cmd_tx, ui_rx)))),
    )
}

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;

mod backend_bridge;
mod config;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use backend_bridge::runtime;
use controller::events::UiEvent;
use ui::{ConsoleApp, PersistedConsoleSettings, SETTINGS_STORAGE_KEY};

#[derive(Parser, Debug)]
#[command(
    name = "console_gui",
    about = "Operator console for the firewall command executor"
)]
struct Args {
    /// Executor service base URL; overrides the environment, console.toml,
    /// and the previously used URL.
    #[arg(long)]
    server_url: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let settings = config::load_settings();
    let env_override = std::env::var(config::ENV_SERVER_URL).is_ok();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    runtime::launch(cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Firewall Ops Console")
            .with_inner_size([1080.0, 720.0])
            .with_min_inner_size([760.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Firewall Ops Console",
        options,
        Box::new(move |cc| {
            let persisted = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedConsoleSettings>(&text).ok())
            });
            let server_url = match (args.server_url, env_override, persisted) {
                (Some(url), _, _) => url,
                (None, true, _) => settings.server_url,
                (None, false, Some(saved)) => saved.server_url,
                (None, false, None) => settings.server_url,
            };
            Ok(Box::new(ConsoleApp::new(cmd_tx, ui_rx, server_url)))
        }),
    )
}

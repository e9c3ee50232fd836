use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Result;
use mealmind_core::Config;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

const DEFAULT_LOG_FILTER: &str = "mealmind=info,mealmind_core=info";

/// Log to a file under the config dir; stderr belongs to the terminal UI.
fn init_logging() -> Result<()> {
    let dir = Config::config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("mealmind.log"))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    if let Err(e) = init_logging() {
        eprintln!("logging disabled: {}", e);
    }

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read config, using defaults");
        Config::new()
    });

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(config, events.sender());

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "mealmind started");

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event),
            None => break,
        }
    }

    tui::restore()?;
    Ok(())
}

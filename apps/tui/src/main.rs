mod app;
mod event;
mod terminal;
mod ui;

use std::sync::Arc;

use app::{App, AppStore, EffectRunner};
use clap::Parser;
use color_eyre::Result;
use prayer_core::{Controller, MemoryStore, Persistence, PrayerApi};
use prayer_times_tui::{cli, config, http, logging, store};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = cli::CliArgs::parse();
    args.apply_env_overrides();
    let config = config::init_app_config()?;

    if let Err(e) = logging::init(&config.log_path, config.debug) {
        eprintln!("Logging disabled: {e}");
    }
    tracing::info!(store = %config.store_path.display(), "starting prayer-times");

    let store = open_store(&config.store_path);
    let api = Arc::new(PrayerApi::new(
        http::ReqwestTransport::new()?,
        config.endpoints.clone(),
    ));

    // Check if we're running in a terminal
    if args.headless || !is_terminal() {
        let persistence = Persistence::new(store);
        return event::run_headless(&api, &persistence, &config, &args).await;
    }

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut runner = EffectRunner::new(api, events_tx);
    let mut app = App::new(Controller::with_default_method(
        store,
        config.default_method,
    ));

    terminal::install_panic_hook();
    let mut terminal = terminal::setup()?;

    let result = event::run(&mut terminal, &mut app, &mut runner, &mut events_rx).await;

    // Stop the ticker before handing the terminal back
    drop(runner);
    terminal::cleanup(true, true);

    result
}

/// The JSON store, or an in-memory one when the file cannot be used.
fn open_store(path: &std::path::Path) -> AppStore {
    match store::FileStore::open(path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!("{e}; selections will not survive a restart");
            Box::new(MemoryStore::new())
        }
    }
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}

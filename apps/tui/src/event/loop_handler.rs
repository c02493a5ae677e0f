use chrono::NaiveDateTime;
use color_eyre::Result;
use crossterm::event::{self, Event as TermEvent, KeyEventKind};
use prayer_core::Event;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::Stdout;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app::{handle_input, App, EffectRunner};
use crate::ui;

/// Local wall-clock time; the API answers in the city's local time.
pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Run the main application event loop
pub async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    runner: &mut EffectRunner,
    completions: &mut UnboundedReceiver<Event>,
) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    app.start(local_now());
    runner.run(app.take_effects());

    loop {
        app.update();

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        // Fetch completions and ticks
        while let Ok(event) = completions.try_recv() {
            app.dispatch(event, local_now());
        }
        runner.run(app.take_effects());

        if matches!(
            event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(TermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key, local_now());
                    runner.run(app.take_effects());
                    if !app.running {
                        break;
                    }
                }
                Ok(TermEvent::Resize(_, _)) => {
                    if terminal.draw(|f| ui::ui(app, f)).is_err() {
                        tracing::warn!("redraw after resize failed");
                    }
                }
                Ok(_) | Err(_) => {}
            }
        }

        // Let spawned fetches make progress between frames
        tokio::task::yield_now().await;
    }

    Ok(())
}

mod fetch;
mod state;
mod storage;
mod ui;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use chrono::NaiveDateTime;
use gloo_timers::callback::Interval;
use prayer_core::{Controller, Effect, Endpoints, Event, MemoryStore, PrayerApi};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen_futures::spawn_local;

use crate::fetch::FetchTransport;
use crate::state::{WebApp, WebStore};
use crate::storage::LocalStore;

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Owns the app state, the client and the single countdown interval.
struct Shell {
    app: RefCell<WebApp>,
    api: PrayerApi<FetchTransport>,
    ticker: RefCell<Option<Interval>>,
}

impl Shell {
    fn start(self: &Rc<Self>) {
        let effects = self.app.borrow_mut().start(now());
        self.run(effects);
    }

    fn dispatch(self: &Rc<Self>, event: Event) {
        let effects = self.app.borrow_mut().dispatch(event, now());
        self.run(effects);
    }

    fn key(self: &Rc<Self>, event: &ratzilla::event::KeyEvent) {
        let effects = self
            .app
            .borrow_mut()
            .handle_key(event.code.clone(), event.shift, now());
        self.run(effects);
    }

    fn run(self: &Rc<Self>, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchCountries { ticket, continent } => {
                    let shell = Rc::clone(self);
                    spawn_local(async move {
                        let result = shell.api.fetch_countries(&continent).await;
                        shell.dispatch(Event::CountriesLoaded { ticket, result });
                    });
                }
                Effect::FetchCities { ticket, country } => {
                    let shell = Rc::clone(self);
                    spawn_local(async move {
                        let result = shell.api.fetch_cities(&country).await;
                        shell.dispatch(Event::CitiesLoaded { ticket, result });
                    });
                }
                Effect::FetchTimings {
                    ticket,
                    query,
                    purpose,
                } => {
                    let shell = Rc::clone(self);
                    spawn_local(async move {
                        let result = shell.api.fetch_prayer_times(&query).await;
                        shell.dispatch(Event::TimingsLoaded {
                            ticket,
                            purpose,
                            result,
                        });
                    });
                }
                Effect::StartTicker { period } => {
                    let shell = Rc::downgrade(self);
                    let millis = u32::try_from(period.as_millis()).unwrap_or(u32::MAX);
                    let interval = Interval::new(millis, move || {
                        if let Some(shell) = shell.upgrade() {
                            shell.dispatch(Event::Tick);
                        }
                    });
                    *self.ticker.borrow_mut() = Some(interval);
                }
                Effect::StopTicker => {
                    *self.ticker.borrow_mut() = None;
                }
            }
        }
    }
}

fn open_store() -> WebStore {
    if let Some(store) = LocalStore::open() {
        return Box::new(store);
    }
    log::warn!("localStorage unavailable; selections will not persist");
    Box::new(MemoryStore::new())
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }

    let shell = Rc::new(Shell {
        app: RefCell::new(WebApp::new(Controller::new(open_store()))),
        api: PrayerApi::new(FetchTransport, Endpoints::default()),
        ticker: RefCell::new(None),
    });
    shell.start();

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let shell = Rc::clone(&shell);
        move |event| shell.key(&event)
    });

    terminal.draw_web(move |f| {
        ui::draw(&shell.app.borrow(), f);
    });

    Ok(())
}

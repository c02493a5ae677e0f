use std::sync::Arc;
use std::time::Duration;

use prayer_core::{Effect, Event, PrayerApi};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::http::ReqwestTransport;

pub type Api = PrayerApi<ReqwestTransport>;

/// Interval task feeding [`Event::Tick`]. Dropping the handle stops it.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    pub fn spawn(period: Duration, events: UnboundedSender<Event>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; the controller already drew it.
            interval.tick().await;
            loop {
                interval.tick().await;
                if events.send(Event::Tick).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Carries out controller effects on the tokio runtime. Completions come back
/// on the event channel.
pub struct EffectRunner {
    api: Arc<Api>,
    events: UnboundedSender<Event>,
    ticker: Option<Ticker>,
}

impl EffectRunner {
    pub const fn new(api: Arc<Api>, events: UnboundedSender<Event>) -> Self {
        Self {
            api,
            events,
            ticker: None,
        }
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.run_one(effect);
        }
    }

    fn run_one(&mut self, effect: Effect) {
        match effect {
            Effect::FetchCountries { ticket, continent } => {
                tracing::debug!(%continent, seq = ticket.seq, "fetching countries");
                let api = Arc::clone(&self.api);
                let events = self.events.clone();
                tokio::spawn(async move {
                    let result = api.fetch_countries(&continent).await;
                    let _ = events.send(Event::CountriesLoaded { ticket, result });
                });
            }
            Effect::FetchCities { ticket, country } => {
                tracing::debug!(%country, seq = ticket.seq, "fetching cities");
                let api = Arc::clone(&self.api);
                let events = self.events.clone();
                tokio::spawn(async move {
                    let result = api.fetch_cities(&country).await;
                    let _ = events.send(Event::CitiesLoaded { ticket, result });
                });
            }
            Effect::FetchTimings {
                ticket,
                query,
                purpose,
            } => {
                tracing::debug!(city = %query.city, ?purpose, seq = ticket.seq, "fetching timings");
                let api = Arc::clone(&self.api);
                let events = self.events.clone();
                tokio::spawn(async move {
                    let result = api.fetch_prayer_times(&query).await;
                    let _ = events.send(Event::TimingsLoaded {
                        ticket,
                        purpose,
                        result,
                    });
                });
            }
            Effect::StartTicker { period } => {
                self.ticker = Some(Ticker::spawn(period, self.events.clone()));
            }
            Effect::StopTicker => {
                self.ticker = None;
            }
        }
    }
}

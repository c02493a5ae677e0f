use chrono::{NaiveDate, NaiveDateTime};
use color_eyre::Result;
use prayer_core::countdown::{countdown_status, fajr_on, find_next_prayer, CountdownStatus};
use prayer_core::time::{day_label, format_hhmmss, parse_api_date};
use prayer_core::{
    KeyValueStore, NextPrayer, Persistence, Prayer, PrayerApi, Timings, TimingsQuery, Transport,
};
use serde::Serialize;
use thiserror::Error;

use crate::cli::CliArgs;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeadlessError {
    #[error("no {0} selected: pass --{0} or pick one in the interactive UI first")]
    MissingLocation(&'static str),

    #[error("invalid --date '{0}', expected DD-MM-YYYY")]
    InvalidDate(String),
}

#[derive(Debug, Serialize)]
pub struct HeadlessReport {
    pub city: String,
    pub country: String,
    pub method: u16,
    pub date: NaiveDate,
    pub timings: Vec<HeadlessTiming>,
    pub next_prayer: Option<HeadlessNextPrayer>,
}

#[derive(Debug, Serialize)]
pub struct HeadlessTiming {
    pub prayer: &'static str,
    pub time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HeadlessNextPrayer {
    pub name: &'static str,
    pub time: String,
    pub day: String,
    pub at: NaiveDateTime,
    pub countdown: String,
}

/// Resolves the location from flags, then from the persisted selection.
pub fn resolve_query<S: KeyValueStore>(
    args: &CliArgs,
    persistence: &Persistence<S>,
    default_method: u16,
    today: NaiveDate,
) -> std::result::Result<TimingsQuery, HeadlessError> {
    let saved = persistence.load_all().selection;

    let city = args
        .city
        .clone()
        .or(saved.city)
        .ok_or(HeadlessError::MissingLocation("city"))?;
    let country = args
        .country
        .clone()
        .or(saved.country)
        .ok_or(HeadlessError::MissingLocation("country"))?;
    let date = match &args.date {
        Some(raw) => parse_api_date(raw).ok_or_else(|| HeadlessError::InvalidDate(raw.clone()))?,
        None => today,
    };

    Ok(TimingsQuery {
        city,
        country,
        method: args.method.or(saved.method).unwrap_or(default_method),
        date: Some(date),
    })
}

/// Fetches the timings and, for today, the next prayer (rolling over to
/// tomorrow's Fajr after Isha).
pub async fn build_report<T: Transport>(
    api: &PrayerApi<T>,
    query: TimingsQuery,
    now: NaiveDateTime,
) -> Result<HeadlessReport> {
    let date = query.date.unwrap_or_else(|| now.date());
    let timings = api.fetch_prayer_times(&query).await?;

    let next = if date == now.date() {
        next_prayer(api, &query, &timings, now).await
    } else {
        None
    };

    Ok(HeadlessReport {
        city: query.city,
        country: query.country,
        method: query.method,
        date,
        timings: Prayer::ALL
            .iter()
            .map(|&prayer| HeadlessTiming {
                prayer: prayer.as_str(),
                time: timings.get(prayer).map(str::to_string),
            })
            .collect(),
        next_prayer: next.and_then(|record| describe(&record, now)),
    })
}

async fn next_prayer<T: Transport>(
    api: &PrayerApi<T>,
    query: &TimingsQuery,
    timings: &Timings,
    now: NaiveDateTime,
) -> Option<NextPrayer> {
    if let Some(record) = find_next_prayer(timings, now) {
        return Some(record);
    }

    let tomorrow = now.date().succ_opt()?;
    let rollover = TimingsQuery {
        date: Some(tomorrow),
        ..query.clone()
    };
    match api.fetch_prayer_times(&rollover).await {
        Ok(timings) => fajr_on(&timings, tomorrow),
        Err(e) => {
            tracing::warn!("rollover fetch failed: {e}");
            None
        }
    }
}

fn describe(record: &NextPrayer, now: NaiveDateTime) -> Option<HeadlessNextPrayer> {
    let CountdownStatus::Running { remaining_seconds } = countdown_status(record, now) else {
        return None;
    };
    Some(HeadlessNextPrayer {
        name: record.name.as_str(),
        time: record.time_str.clone(),
        day: day_label(record.next_date.date(), now.date()),
        at: record.next_date,
        countdown: format_hhmmss(remaining_seconds),
    })
}

pub fn render_text(report: &HeadlessReport) {
    println!("\nPrayer Times");
    println!("============");
    println!(
        "{}, {} (method {}) on {}",
        report.city,
        report.country,
        report.method,
        report.date.format("%d/%m/%Y")
    );
    println!();

    for timing in &report.timings {
        println!(
            "- {:<8} {}",
            timing.prayer,
            timing.time.as_deref().unwrap_or("-")
        );
    }

    if let Some(next) = &report.next_prayer {
        println!(
            "\nNext prayer: {} at {} ({}), in {}",
            next.name, next.time, next.day, next.countdown
        );
    }
}

pub fn render_json(report: &HeadlessReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prayer_core::{Endpoints, MemoryStore, StorageKey, TransportError};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        today().and_hms_opt(hour, minute, 0).unwrap()
    }

    /// Answers GETs from a queue and remembers the URLs it saw.
    struct QueuedTransport {
        replies: Mutex<VecDeque<Result<Value, TransportError>>>,
        urls: Arc<Mutex<Vec<String>>>,
    }

    impl Transport for QueuedTransport {
        async fn get_json(&self, url: &str) -> std::result::Result<Value, TransportError> {
            self.urls.lock().unwrap().push(url.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Failed("unexpected request".to_string())))
        }

        async fn post_json(
            &self,
            _url: &str,
            _body: &Value,
        ) -> std::result::Result<Value, TransportError> {
            Err(TransportError::Failed("unexpected POST".to_string()))
        }
    }

    type Seen = Arc<Mutex<Vec<String>>>;

    fn api(replies: Vec<Result<Value, TransportError>>) -> (PrayerApi<QueuedTransport>, Seen) {
        let urls = Seen::default();
        let transport = QueuedTransport {
            replies: Mutex::new(replies.into()),
            urls: Arc::clone(&urls),
        };
        (PrayerApi::new(transport, Endpoints::default()), urls)
    }

    fn day_body(fajr: &str) -> Value {
        json!({
            "code": 200,
            "data": { "timings": {
                "Fajr": fajr,
                "Dhuhr": "12:30",
                "Asr": "16:00",
                "Maghrib": "18:45",
                "Isha": "20:15"
            } }
        })
    }

    fn oran(date: NaiveDate) -> TimingsQuery {
        TimingsQuery {
            city: "Oran".to_string(),
            country: "Algeria".to_string(),
            method: 2,
            date: Some(date),
        }
    }

    const ROLLOVER_URL: &str =
        "https://api.aladhan.com/v1/timingsByCity?city=Oran&country=Algeria&method=2&date=02-03-2024";

    #[tokio::test]
    async fn afternoon_report_counts_down_to_maghrib() {
        let (api, seen) = api(vec![Ok(day_body("05:00"))]);

        let report = build_report(&api, oran(today()), at(17, 0)).await.unwrap();

        let next = report.next_prayer.unwrap();
        assert_eq!(next.name, "Maghrib");
        assert_eq!(next.time, "18:45");
        assert_eq!(next.day, "today");
        assert_eq!(next.countdown, "01:45:00");
        assert_eq!(report.timings.len(), 5);
        assert_eq!(report.timings[0].time.as_deref(), Some("05:00"));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn after_isha_fetches_tomorrow_for_fajr() {
        let (api, seen) = api(vec![Ok(day_body("05:00")), Ok(day_body("05:02"))]);

        let report = build_report(&api, oran(today()), at(21, 0)).await.unwrap();

        let next = report.next_prayer.unwrap();
        assert_eq!(next.name, "Fajr");
        assert_eq!(next.time, "05:02");
        assert_eq!(next.day, "tomorrow");
        assert_eq!(next.countdown, "08:02:00");
        assert_eq!(report.date, today());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], ROLLOVER_URL);
    }

    #[tokio::test]
    async fn failed_rollover_still_reports_todays_table() {
        let (api, seen) = api(vec![
            Ok(day_body("05:00")),
            Err(TransportError::Status {
                code: 502,
                message: "Bad Gateway".to_string(),
            }),
        ]);

        let report = build_report(&api, oran(today()), at(21, 0)).await.unwrap();

        assert!(report.next_prayer.is_none());
        assert_eq!(report.timings[4].time.as_deref(), Some("20:15"));
        assert_eq!(seen.lock().unwrap()[1], ROLLOVER_URL);
    }

    #[tokio::test]
    async fn other_dates_skip_the_countdown() {
        let other_day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let (api, seen) = api(vec![Ok(day_body("04:50"))]);

        let report = build_report(&api, oran(other_day), at(17, 0)).await.unwrap();

        assert_eq!(report.date, other_day);
        assert!(report.next_prayer.is_none());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_day_fetch_is_an_error() {
        let (api, _) = api(vec![Err(TransportError::Failed("offline".to_string()))]);

        assert!(build_report(&api, oran(today()), at(9, 0)).await.is_err());
    }

    #[test]
    fn flags_win_over_persisted_selection() {
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence.save(StorageKey::City, "Oran");
        persistence.save(StorageKey::Country, "Algeria");
        persistence.save(StorageKey::Method, &5_u16);

        let args = CliArgs {
            city: Some("Algiers".to_string()),
            date: Some("02-03-2024".to_string()),
            ..CliArgs::default()
        };
        let query = resolve_query(&args, &persistence, 2, today()).unwrap();

        assert_eq!(query.city, "Algiers");
        assert_eq!(query.country, "Algeria");
        assert_eq!(query.method, 5);
        assert_eq!(query.date, NaiveDate::from_ymd_opt(2024, 3, 2));
    }

    #[test]
    fn missing_location_is_reported() {
        let persistence = Persistence::new(MemoryStore::new());
        let args = CliArgs {
            city: Some("Oran".to_string()),
            ..CliArgs::default()
        };

        assert_eq!(
            resolve_query(&args, &persistence, 2, today()).unwrap_err(),
            HeadlessError::MissingLocation("country")
        );
    }

    #[test]
    fn malformed_date_is_rejected() {
        let persistence = Persistence::new(MemoryStore::new());
        let args = CliArgs {
            city: Some("Oran".to_string()),
            country: Some("Algeria".to_string()),
            date: Some("2024-03-02".to_string()),
            ..CliArgs::default()
        };

        assert!(matches!(
            resolve_query(&args, &persistence, 3, today()),
            Err(HeadlessError::InvalidDate(_))
        ));
    }
}

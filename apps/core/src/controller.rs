//! The selection cascade and the next-prayer countdown.
//!
//! [`Controller`] is a synchronous state machine. Shells feed it [`Event`]s
//! together with the local wall-clock time and carry out the [`Effect`]s it
//! returns: fetches run on the shell's executor and come back as `*Loaded`
//! events, the ticker turns into [`Event::Tick`]s.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};

use crate::api::TimingsQuery;
use crate::countdown::{countdown_status, fajr_on, find_next_prayer, CountdownStatus, TICK_PERIOD};
use crate::domain::{CalculationMethod, NextPrayer, Selection, Timings, DEFAULT_METHOD};
use crate::error::ApiError;
use crate::sequence::{Field, RequestSequencer, Ticket};
use crate::storage::{KeyValueStore, Persistence, StorageKey};
use crate::view::{
    SelectId, SelectOption, Screen, CITIES_LOADING, CITY_PLACEHOLDER, COUNTRIES_LOADING,
    COUNTRY_PLACEHOLDER,
};

/// Why a timings fetch was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingsPurpose {
    /// The user asked to load the table.
    Today,
    /// Every prayer of the day has passed; only Fajr of `date` is wanted.
    Rollover { date: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An empty value means the placeholder was chosen.
    ContinentChanged(String),
    CountryChanged(String),
    CityChanged(String),
    MethodChanged(u16),
    LoadRequested,
    ResetRequested,
    CountriesLoaded {
        ticket: Ticket,
        result: Result<Vec<String>, ApiError>,
    },
    CitiesLoaded {
        ticket: Ticket,
        result: Result<Vec<String>, ApiError>,
    },
    TimingsLoaded {
        ticket: Ticket,
        purpose: TimingsPurpose,
        result: Result<Timings, ApiError>,
    },
    Tick,
}

impl Event {
    /// The change event for committing `value` on a select.
    pub fn select(id: SelectId, value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        match id {
            SelectId::Continent => Some(Self::ContinentChanged(value)),
            SelectId::Country => Some(Self::CountryChanged(value)),
            SelectId::City => Some(Self::CityChanged(value)),
            SelectId::Method => value.parse().ok().map(Self::MethodChanged),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchCountries {
        ticket: Ticket,
        continent: String,
    },
    FetchCities {
        ticket: Ticket,
        country: String,
    },
    FetchTimings {
        ticket: Ticket,
        query: TimingsQuery,
        purpose: TimingsPurpose,
    },
    StartTicker {
        period: Duration,
    },
    StopTicker,
}

/// Persisted values still waiting for their list to arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RestorePlan {
    country: Option<String>,
    city: Option<String>,
    timings: Option<Timings>,
    next_prayer: Option<NextPrayer>,
}

#[derive(Debug)]
pub struct Controller<S> {
    screen: Screen,
    selection: Selection,
    persistence: Persistence<S>,
    sequencer: RequestSequencer,
    restore: Option<RestorePlan>,
    timings: Option<Timings>,
    next_prayer: Option<NextPrayer>,
    ticking: bool,
    default_method: u16,
}

impl<S: KeyValueStore> Controller<S> {
    pub fn new(store: S) -> Self {
        Self::with_default_method(store, DEFAULT_METHOD)
    }

    /// Unknown method ids fall back to [`DEFAULT_METHOD`].
    pub fn with_default_method(store: S, method: u16) -> Self {
        let default_method = CalculationMethod::find(method).map_or(DEFAULT_METHOD, |m| m.id);
        let mut screen = Screen::new();
        screen.populate_methods(default_method);

        Self {
            screen,
            selection: Selection {
                method: Some(default_method),
                ..Selection::default()
            },
            persistence: Persistence::new(store),
            sequencer: RequestSequencer::new(),
            restore: None,
            timings: None,
            next_prayer: None,
            ticking: false,
            default_method,
        }
    }

    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    pub const fn timings(&self) -> Option<&Timings> {
        self.timings.as_ref()
    }

    pub const fn next_prayer(&self) -> Option<&NextPrayer> {
        self.next_prayer.as_ref()
    }

    pub const fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub const fn is_restoring(&self) -> bool {
        self.restore.is_some()
    }

    pub const fn store(&self) -> &S {
        self.persistence.store()
    }

    /// Restores whatever the previous session persisted.
    pub fn start(&mut self, now: NaiveDateTime) -> Vec<Effect> {
        let saved = self.persistence.load_all();
        let mut effects = Vec::new();

        let method = saved
            .selection
            .method
            .and_then(CalculationMethod::find)
            .map_or(self.default_method, |m| m.id);
        self.screen.populate_methods(method);
        self.selection.method = Some(method);

        let plan = RestorePlan {
            country: saved.selection.country,
            city: saved.selection.city,
            timings: saved.timings,
            next_prayer: saved.next_prayer,
        };

        match saved.selection.continent {
            Some(continent) if self.screen.set_value(SelectId::Continent, &continent) => {
                log::debug!("Restoring continent {continent}");
                self.selection.continent = Some(continent.clone());
                self.screen.set_loading(SelectId::Country, COUNTRIES_LOADING);
                self.screen.set_empty(SelectId::City, CITY_PLACEHOLDER);
                self.restore = Some(plan);
                let ticket = self.sequencer.issue(Field::Countries);
                effects.push(Effect::FetchCountries { ticket, continent });
            }
            _ => self.resume_countdown_only(plan.next_prayer, now, &mut effects),
        }

        self.update_load_enabled();
        effects
    }

    pub fn handle(&mut self, event: Event, now: NaiveDateTime) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            Event::ContinentChanged(value) => self.change_continent(value, &mut effects),
            Event::CountryChanged(value) => self.change_country(value, &mut effects),
            Event::CityChanged(value) => self.change_city(value),
            Event::MethodChanged(id) => self.change_method(id),
            Event::LoadRequested => self.request_load(&mut effects),
            Event::ResetRequested => self.reset(&mut effects),
            Event::CountriesLoaded { ticket, result } => {
                if self.accept(ticket) {
                    self.countries_loaded(result, now, &mut effects);
                }
            }
            Event::CitiesLoaded { ticket, result } => {
                if self.accept(ticket) {
                    self.cities_loaded(result, now, &mut effects);
                }
            }
            Event::TimingsLoaded {
                ticket,
                purpose,
                result,
            } => {
                if self.accept(ticket) {
                    match purpose {
                        TimingsPurpose::Today => self.timings_loaded(result, now, &mut effects),
                        TimingsPurpose::Rollover { date } => {
                            self.rollover_loaded(result, date, now, &mut effects);
                        }
                    }
                }
            }
            Event::Tick => self.tick(now, &mut effects),
        }

        self.update_load_enabled();
        effects
    }

    fn accept(&self, ticket: Ticket) -> bool {
        let current = self.sequencer.is_current(ticket);
        if !current {
            log::debug!("Discarding stale {:?} response #{}", ticket.field, ticket.seq);
        }
        current
    }

    fn change_continent(&mut self, value: String, effects: &mut Vec<Effect>) {
        if !value.is_empty() && !self.screen.continent.contains(&value) {
            log::warn!("Ignoring unknown continent '{value}'");
            return;
        }

        self.restore = None;
        self.clear_country();
        self.sequencer.invalidate(Field::Cities);

        if value.is_empty() {
            self.screen.clear_value(SelectId::Continent);
            self.selection.continent = None;
            self.persistence.remove(StorageKey::Continent);
            self.sequencer.invalidate(Field::Countries);
            self.screen.set_empty(SelectId::Country, COUNTRY_PLACEHOLDER);
            return;
        }

        self.screen.set_value(SelectId::Continent, &value);
        self.persistence.save(StorageKey::Continent, &value);
        self.selection.continent = Some(value.clone());
        self.screen.set_loading(SelectId::Country, COUNTRIES_LOADING);
        let ticket = self.sequencer.issue(Field::Countries);
        effects.push(Effect::FetchCountries {
            ticket,
            continent: value,
        });
    }

    fn change_country(&mut self, value: String, effects: &mut Vec<Effect>) {
        if !value.is_empty() && !self.screen.country.contains(&value) {
            log::warn!("Ignoring country '{value}' outside the current list");
            return;
        }

        self.restore = None;
        self.clear_city();

        if value.is_empty() {
            self.screen.clear_value(SelectId::Country);
            self.selection.country = None;
            self.persistence.remove(StorageKey::Country);
            self.sequencer.invalidate(Field::Cities);
            return;
        }

        self.screen.set_value(SelectId::Country, &value);
        self.persistence.save(StorageKey::Country, &value);
        self.selection.country = Some(value.clone());
        self.screen.set_loading(SelectId::City, CITIES_LOADING);
        let ticket = self.sequencer.issue(Field::Cities);
        effects.push(Effect::FetchCities {
            ticket,
            country: value,
        });
    }

    fn change_city(&mut self, value: String) {
        if value.is_empty() {
            self.screen.clear_value(SelectId::City);
            self.selection.city = None;
            self.persistence.remove(StorageKey::City);
            return;
        }

        if !self.screen.set_value(SelectId::City, &value) {
            log::warn!("Ignoring city '{value}' outside the current list");
            return;
        }
        self.restore = None;
        self.persistence.save(StorageKey::City, &value);
        self.selection.city = Some(value);
    }

    fn change_method(&mut self, id: u16) {
        if !self.screen.set_value(SelectId::Method, &id.to_string()) {
            log::warn!("Ignoring unknown calculation method {id}");
            return;
        }
        self.persistence.save(StorageKey::Method, &id);
        self.selection.method = Some(id);
    }

    /// Drops the country level and everything below it.
    fn clear_country(&mut self) {
        self.selection.country = None;
        self.persistence.remove(StorageKey::Country);
        self.clear_city();
        self.screen.set_empty(SelectId::Country, COUNTRY_PLACEHOLDER);
    }

    fn clear_city(&mut self) {
        self.selection.city = None;
        self.persistence.remove(StorageKey::City);
        self.screen.set_empty(SelectId::City, CITY_PLACEHOLDER);
    }

    fn request_load(&mut self, effects: &mut Vec<Effect>) {
        let Some(query) = self.query(None) else {
            log::debug!("Load requested before the selection is complete");
            return;
        };

        self.screen.hide_error();
        let ticket = self.sequencer.issue(Field::Timings);
        effects.push(Effect::FetchTimings {
            ticket,
            query,
            purpose: TimingsPurpose::Today,
        });
    }

    fn query(&self, date: Option<NaiveDate>) -> Option<TimingsQuery> {
        if !self.selection.is_complete() {
            return None;
        }
        Some(TimingsQuery {
            city: self.selection.city.clone()?,
            country: self.selection.country.clone()?,
            method: self.selection.method?,
            date,
        })
    }

    fn countries_loaded(
        &mut self,
        result: Result<Vec<String>, ApiError>,
        now: NaiveDateTime,
        effects: &mut Vec<Effect>,
    ) {
        let countries = match result {
            Ok(countries) => countries,
            Err(e) => {
                log::warn!("Country list failed: {e}");
                self.screen.show_error(e.to_string());
                self.screen.set_empty(SelectId::Country, COUNTRY_PLACEHOLDER);
                self.screen.set_empty(SelectId::City, CITY_PLACEHOLDER);
                self.restore = None;
                return;
            }
        };

        let items = countries.into_iter().map(SelectOption::plain).collect();
        self.screen
            .set_options(SelectId::Country, items, Some(COUNTRY_PLACEHOLDER));
        self.screen.set_empty(SelectId::City, CITY_PLACEHOLDER);

        let Some(mut plan) = self.restore.take() else {
            return;
        };

        match plan.country.take() {
            Some(country) if self.screen.set_value(SelectId::Country, &country) => {
                log::debug!("Restoring country {country}");
                self.selection.country = Some(country.clone());
                self.screen.set_loading(SelectId::City, CITIES_LOADING);
                self.restore = Some(plan);
                let ticket = self.sequencer.issue(Field::Cities);
                effects.push(Effect::FetchCities { ticket, country });
            }
            _ => self.resume_countdown_only(plan.next_prayer, now, effects),
        }
    }

    fn cities_loaded(
        &mut self,
        result: Result<Vec<String>, ApiError>,
        now: NaiveDateTime,
        effects: &mut Vec<Effect>,
    ) {
        let cities = match result {
            Ok(cities) => cities,
            Err(e) => {
                log::warn!("City list failed: {e}");
                self.screen.show_error(e.to_string());
                self.screen.set_empty(SelectId::City, CITY_PLACEHOLDER);
                self.restore = None;
                return;
            }
        };

        let items = cities.into_iter().map(SelectOption::plain).collect();
        self.screen
            .set_options(SelectId::City, items, Some(CITY_PLACEHOLDER));

        let Some(mut plan) = self.restore.take() else {
            return;
        };

        match plan.city.take() {
            Some(city) if self.screen.set_value(SelectId::City, &city) => {
                log::debug!("Restoring city {city}");
                self.selection.city = Some(city);
                match plan.timings {
                    Some(timings) => self.restore_timings(timings, plan.next_prayer, now, effects),
                    None => self.resume_countdown_only(plan.next_prayer, now, effects),
                }
            }
            _ => self.resume_countdown_only(plan.next_prayer, now, effects),
        }
    }

    /// Shows persisted timings without refetching. A persisted countdown that
    /// is still running wins over a recomputation.
    fn restore_timings(
        &mut self,
        timings: Timings,
        saved: Option<NextPrayer>,
        now: NaiveDateTime,
        effects: &mut Vec<Effect>,
    ) {
        self.show_table(&timings);
        self.timings = Some(timings.clone());

        match saved {
            Some(record) if record.next_date > now => self.activate(record, now, effects),
            _ => self.begin_countdown(&timings, now, effects),
        }
    }

    fn resume_countdown_only(
        &mut self,
        saved: Option<NextPrayer>,
        now: NaiveDateTime,
        effects: &mut Vec<Effect>,
    ) {
        match saved {
            Some(record) if record.next_date > now => {
                log::debug!("Resuming countdown to {}", record.name.as_str());
                self.activate(record, now, effects);
            }
            Some(_) => self.persistence.remove(StorageKey::NextPrayer),
            None => {}
        }
    }

    fn timings_loaded(
        &mut self,
        result: Result<Timings, ApiError>,
        now: NaiveDateTime,
        effects: &mut Vec<Effect>,
    ) {
        match result {
            Ok(timings) => {
                self.persistence.save(StorageKey::PrayerTimes, &timings);
                self.show_table(&timings);
                self.begin_countdown(&timings, now, effects);
                self.timings = Some(timings);
            }
            Err(e) => {
                log::warn!("Timings failed: {e}");
                self.screen.show_error(e.to_string());
            }
        }
    }

    fn show_table(&mut self, timings: &Timings) {
        self.screen.render_timings(timings);
        self.screen.show_timings();
        self.screen.show_reset();
    }

    fn begin_countdown(&mut self, timings: &Timings, now: NaiveDateTime, effects: &mut Vec<Effect>) {
        if let Some(record) = find_next_prayer(timings, now) {
            self.activate(record, now, effects);
            return;
        }

        let tomorrow = now.date().succ_opt();
        match tomorrow.and_then(|date| self.query(Some(date)).map(|query| (date, query))) {
            Some((date, query)) => {
                log::debug!("All prayers passed, fetching timings for {date}");
                self.clear_countdown(effects);
                let ticket = self.sequencer.issue(Field::Timings);
                effects.push(Effect::FetchTimings {
                    ticket,
                    query,
                    purpose: TimingsPurpose::Rollover { date },
                });
            }
            None => self.clear_countdown(effects),
        }
    }

    fn rollover_loaded(
        &mut self,
        result: Result<Timings, ApiError>,
        date: NaiveDate,
        now: NaiveDateTime,
        effects: &mut Vec<Effect>,
    ) {
        match result.map(|timings| fajr_on(&timings, date)) {
            Ok(Some(record)) => self.activate(record, now, effects),
            Ok(None) => {
                log::warn!("Timings for {date} have no readable Fajr");
                self.clear_countdown(effects);
            }
            Err(e) => {
                log::warn!("Rollover timings failed: {e}");
                self.screen.show_error(e.to_string());
                self.clear_countdown(effects);
            }
        }
    }

    /// Makes `record` the single running countdown.
    fn activate(&mut self, record: NextPrayer, now: NaiveDateTime, effects: &mut Vec<Effect>) {
        let CountdownStatus::Running { remaining_seconds } = countdown_status(&record, now) else {
            self.clear_countdown(effects);
            return;
        };

        self.persistence.save(StorageKey::NextPrayer, &record);
        self.screen
            .show_next_prayer(&record, now.date(), remaining_seconds);
        self.next_prayer = Some(record);

        effects.push(Effect::StopTicker);
        effects.push(Effect::StartTicker {
            period: TICK_PERIOD,
        });
        self.ticking = true;
    }

    fn tick(&mut self, now: NaiveDateTime, effects: &mut Vec<Effect>) {
        let Some(record) = &self.next_prayer else {
            if self.ticking {
                effects.push(Effect::StopTicker);
                self.ticking = false;
            }
            return;
        };

        match countdown_status(record, now) {
            CountdownStatus::Running { remaining_seconds } => {
                let record = record.clone();
                self.screen
                    .show_next_prayer(&record, now.date(), remaining_seconds);
            }
            CountdownStatus::Expired => {
                log::debug!("Countdown to {} reached zero", record.name.as_str());
                self.clear_countdown(effects);
            }
        }
    }

    fn clear_countdown(&mut self, effects: &mut Vec<Effect>) {
        self.screen.hide_next_prayer();
        if self.next_prayer.take().is_some() {
            self.persistence.remove(StorageKey::NextPrayer);
        }
        if self.ticking {
            effects.push(Effect::StopTicker);
            self.ticking = false;
        }
    }

    fn reset(&mut self, effects: &mut Vec<Effect>) {
        self.persistence.clear();
        self.sequencer.invalidate_all();
        self.restore = None;
        self.timings = None;
        self.next_prayer = None;
        self.selection = Selection {
            method: Some(self.default_method),
            ..Selection::default()
        };

        self.screen.clear_value(SelectId::Continent);
        self.screen.set_empty(SelectId::Country, COUNTRY_PLACEHOLDER);
        self.screen.set_empty(SelectId::City, CITY_PLACEHOLDER);
        self.screen.populate_methods(self.default_method);
        self.screen.hide_error();
        self.screen.hide_timings();
        self.screen.hide_next_prayer();
        self.screen.hide_reset();
        // Load is re-evaluated, not forced on: with no city it stays disabled.
        self.update_load_enabled();

        effects.push(Effect::StopTicker);
        self.ticking = false;
    }

    fn update_load_enabled(&mut self) {
        self.screen.set_load_enabled(self.selection.is_complete());
    }
}

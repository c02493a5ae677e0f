//! View model for the widget's controls.
//!
//! The orchestrator decides what to show; these functions only write it down.
//! Every mutation is idempotent, so a late response landing on a reset screen
//! does no harm. Shells draw a [`Screen`] and keep their own cursor state.

use chrono::NaiveDate;

use crate::domain::{Continent, NextPrayer, Prayer, Timings, CALCULATION_METHODS, DEFAULT_METHOD};
use crate::time::{day_label, format_hhmmss};

pub const CONTINENT_PLACEHOLDER: &str = "Select continent";
pub const COUNTRY_PLACEHOLDER: &str = "Select country";
pub const CITY_PLACEHOLDER: &str = "Select city";
pub const COUNTRIES_LOADING: &str = "Loading countries...";
pub const CITIES_LOADING: &str = "Loading cities...";
pub const MISSING_TIME: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectId {
    Continent,
    Country,
    City,
    Method,
}

impl SelectId {
    pub const ALL: [Self; 4] = [Self::Continent, Self::Country, Self::City, Self::Method];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Continent => "Continent",
            Self::Country => "Country",
            Self::City => "City",
            Self::Method => "Method",
        }
    }
}

/// A keyboard-focusable control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Select(SelectId),
    Load,
    Reset,
}

impl Focus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Select(id) => id.label(),
            Self::Load => "Load",
            Self::Reset => "Reset",
        }
    }

    pub const fn select(self) -> Option<SelectId> {
        match self {
            Self::Select(id) => Some(id),
            Self::Load | Self::Reset => None,
        }
    }

    /// Where focus goes once `id` is committed: the level it unlocks, then Load.
    pub const fn after_commit(id: SelectId) -> Option<Self> {
        match id {
            SelectId::Continent => Some(Self::Select(SelectId::Country)),
            SelectId::Country => Some(Self::Select(SelectId::City)),
            SelectId::City => Some(Self::Load),
            SelectId::Method => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Option whose label is its value (countries, cities).
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectControl {
    pub options: Vec<SelectOption>,
    /// Disabled pseudo-option shown while `value` is `None`.
    pub placeholder: Option<String>,
    pub value: Option<String>,
    pub disabled: bool,
    pub loading: bool,
}

impl SelectControl {
    pub fn position(&self, value: &str) -> Option<usize> {
        self.options.iter().position(|option| option.value == value)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.position(value).is_some()
    }

    pub fn selected(&self) -> Option<&SelectOption> {
        let value = self.value.as_deref()?;
        self.options.iter().find(|option| option.value == value)
    }

    /// What a closed select shows: the chosen label or the placeholder.
    pub fn display_text(&self) -> &str {
        self.selected()
            .map(|option| option.label.as_str())
            .or(self.placeholder.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingRow {
    pub prayer: Prayer,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPrayerPanel {
    pub name: String,
    /// `"18:45 (today)"`
    pub time_label: String,
    /// `HH:MM:SS`
    pub countdown: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub continent: SelectControl,
    pub country: SelectControl,
    pub city: SelectControl,
    pub method: SelectControl,
    pub load_enabled: bool,
    pub reset_visible: bool,
    pub error: Option<String>,
    pub timings: Vec<TimingRow>,
    pub timings_visible: bool,
    pub next_prayer: Option<NextPrayerPanel>,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// Continent and method populated, dependent selects empty and disabled.
    pub fn new() -> Self {
        let mut screen = Self {
            continent: SelectControl::default(),
            country: SelectControl::default(),
            city: SelectControl::default(),
            method: SelectControl::default(),
            load_enabled: false,
            reset_visible: false,
            error: None,
            timings: Vec::new(),
            timings_visible: false,
            next_prayer: None,
        };
        screen.populate_continents();
        screen.populate_methods(DEFAULT_METHOD);
        screen.set_empty(SelectId::Country, COUNTRY_PLACEHOLDER);
        screen.set_empty(SelectId::City, CITY_PLACEHOLDER);
        screen
    }

    pub const fn select(&self, id: SelectId) -> &SelectControl {
        match id {
            SelectId::Continent => &self.continent,
            SelectId::Country => &self.country,
            SelectId::City => &self.city,
            SelectId::Method => &self.method,
        }
    }

    pub fn select_mut(&mut self, id: SelectId) -> &mut SelectControl {
        match id {
            SelectId::Continent => &mut self.continent,
            SelectId::Country => &mut self.country,
            SelectId::City => &mut self.city,
            SelectId::Method => &mut self.method,
        }
    }

    pub fn populate_continents(&mut self) {
        let items = Continent::ALL
            .iter()
            .map(|continent| SelectOption::new(continent.as_str(), continent.label()))
            .collect();
        self.set_options(SelectId::Continent, items, Some(CONTINENT_PLACEHOLDER));
    }

    pub fn populate_methods(&mut self, default_id: u16) {
        let items = CALCULATION_METHODS
            .iter()
            .map(|method| SelectOption::new(method.id.to_string(), method.name))
            .collect();
        self.set_options(SelectId::Method, items, None);
        self.set_value(SelectId::Method, &default_id.to_string());
    }

    /// Replaces the options and enables the control. With a placeholder
    /// nothing is selected; without one the first option is.
    pub fn set_options(&mut self, id: SelectId, items: Vec<SelectOption>, placeholder: Option<&str>) {
        let control = self.select_mut(id);
        control.value = if placeholder.is_some() {
            None
        } else {
            items.first().map(|option| option.value.clone())
        };
        control.options = items;
        control.placeholder = placeholder.map(str::to_string);
        control.disabled = false;
        control.loading = false;
    }

    pub fn set_loading(&mut self, id: SelectId, text: &str) {
        self.clear_select(id, text);
        self.select_mut(id).loading = true;
    }

    pub fn set_empty(&mut self, id: SelectId, text: &str) {
        self.clear_select(id, text);
    }

    fn clear_select(&mut self, id: SelectId, text: &str) {
        let control = self.select_mut(id);
        control.options.clear();
        control.placeholder = Some(text.to_string());
        control.value = None;
        control.disabled = true;
        control.loading = false;
    }

    /// Selects `value` if it is one of the options. Returns whether it was.
    pub fn set_value(&mut self, id: SelectId, value: &str) -> bool {
        let control = self.select_mut(id);
        if control.contains(value) {
            control.value = Some(value.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_value(&mut self, id: SelectId) {
        self.select_mut(id).value = None;
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn hide_error(&mut self) {
        self.error = None;
    }

    /// Rows in fixed prayer order, `-` for anything the API left out.
    pub fn render_timings(&mut self, timings: &Timings) {
        self.timings = Prayer::ALL
            .iter()
            .map(|&prayer| TimingRow {
                prayer,
                time: timings
                    .get(prayer)
                    .filter(|time| !time.is_empty())
                    .unwrap_or(MISSING_TIME)
                    .to_string(),
            })
            .collect();
    }

    pub fn show_timings(&mut self) {
        self.timings_visible = true;
    }

    pub fn hide_timings(&mut self) {
        self.timings_visible = false;
    }

    pub fn show_next_prayer(&mut self, record: &NextPrayer, today: NaiveDate, remaining_seconds: i64) {
        self.next_prayer = Some(NextPrayerPanel {
            name: record.name.as_str().to_string(),
            time_label: format!(
                "{} ({})",
                record.time_str,
                day_label(record.next_date.date(), today)
            ),
            countdown: format_hhmmss(remaining_seconds),
        });
    }

    pub fn hide_next_prayer(&mut self) {
        self.next_prayer = None;
    }

    pub fn set_load_enabled(&mut self, enabled: bool) {
        self.load_enabled = enabled;
    }

    pub fn show_reset(&mut self) {
        self.reset_visible = true;
    }

    pub fn hide_reset(&mut self) {
        self.reset_visible = false;
    }

    /// Tab order. Reset only while it is shown.
    pub fn focus_order(&self) -> Vec<Focus> {
        let mut order = SelectId::ALL.map(Focus::Select).to_vec();
        order.push(Focus::Load);
        if self.reset_visible {
            order.push(Focus::Reset);
        }
        order
    }

    /// Index of the committed value of `focus`'s select, if it has one.
    pub fn committed_position(&self, focus: Focus) -> Option<usize> {
        let control = self.select(focus.select()?);
        control.position(control.value.as_deref()?)
    }
}

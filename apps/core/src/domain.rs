use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    /// Display and scan order. Never the order the API returns.
    pub const ALL: [Self; 5] = [
        Self::Fajr,
        Self::Dhuhr,
        Self::Asr,
        Self::Maghrib,
        Self::Isha,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fajr => "Fajr",
            Self::Dhuhr => "Dhuhr",
            Self::Asr => "Asr",
            Self::Maghrib => "Maghrib",
            Self::Isha => "Isha",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Continent {
    Africa,
    Americas,
    Asia,
    Europe,
    Oceania,
}

impl Continent {
    pub const ALL: [Self; 5] = [
        Self::Africa,
        Self::Americas,
        Self::Asia,
        Self::Europe,
        Self::Oceania,
    ];

    /// Region name understood by the country list API.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Africa => "africa",
            Self::Americas => "americas",
            Self::Asia => "asia",
            Self::Europe => "europe",
            Self::Oceania => "oceania",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Africa => "Africa",
            Self::Americas => "Americas",
            Self::Asia => "Asia",
            Self::Europe => "Europe",
            Self::Oceania => "Oceania",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculationMethod {
    pub id: u16,
    pub name: &'static str,
}

pub const DEFAULT_METHOD: u16 = 2;

pub const CALCULATION_METHODS: [CalculationMethod; 5] = [
    CalculationMethod {
        id: 2,
        name: "Islamic Society of North America (ISNA)",
    },
    CalculationMethod {
        id: 3,
        name: "Muslim World League",
    },
    CalculationMethod {
        id: 4,
        name: "Umm Al-Qura University, Makkah",
    },
    CalculationMethod {
        id: 5,
        name: "Egyptian General Authority",
    },
    CalculationMethod {
        id: 12,
        name: "Dubai, UAE",
    },
];

impl CalculationMethod {
    pub fn find(id: u16) -> Option<Self> {
        CALCULATION_METHODS.iter().copied().find(|method| method.id == id)
    }
}

/// The user's cascade of choices. Each level only means something relative to
/// the one above it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub continent: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub method: Option<u16>,
}

impl Selection {
    pub fn is_complete(&self) -> bool {
        let filled = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        filled(&self.continent)
            && filled(&self.country)
            && filled(&self.city)
            && self.method.is_some()
    }
}

/// Prayer name to time-of-day text, exactly as the API returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timings(BTreeMap<String, String>);

impl Timings {
    pub fn get(&self, prayer: Prayer) -> Option<&str> {
        self.0.get(prayer.as_str()).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Timings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, time)| (name.into(), time.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextPrayer {
    pub name: Prayer,
    pub time_str: String,
    /// Local wall-clock target, serialized as ISO-8601.
    pub next_date: NaiveDateTime,
}

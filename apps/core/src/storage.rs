//! Namespaced persistence of the selection, timings and countdown.
//!
//! Every key is stored as `prayer-times-<name>` with a JSON value. Failures are
//! logged and swallowed: a broken store degrades to defaults, it never takes the
//! widget down.

use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::{NextPrayer, Selection, Timings};
use crate::error::PersistenceError;

pub const STORAGE_PREFIX: &str = "prayer-times-";

/// Durable string key-value store (localStorage, a JSON file, memory).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;

    /// Every key in the store, including ones outside our namespace.
    fn keys(&self) -> Result<Vec<String>, PersistenceError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, PersistenceError> {
        (**self).keys()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<K: Into<String>, V: Into<String>>(
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, PersistenceError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    Continent,
    Country,
    City,
    Method,
    PrayerTimes,
    NextPrayer,
}

impl StorageKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Continent => "continent",
            Self::Country => "country",
            Self::City => "city",
            Self::Method => "method",
            Self::PrayerTimes => "prayerTimes",
            Self::NextPrayer => "nextPrayer",
        }
    }

    pub fn storage_key(self) -> String {
        format!("{STORAGE_PREFIX}{}", self.as_str())
    }
}

/// Everything a previous session left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Saved {
    pub selection: Selection,
    pub timings: Option<Timings>,
    pub next_prayer: Option<NextPrayer>,
}

#[derive(Debug)]
pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn save<T: Serialize + ?Sized>(&mut self, key: StorageKey, value: &T) {
        if let Err(e) = self.try_save(key, value) {
            log::warn!("Failed to save {} to storage: {e}", key.as_str());
        }
    }

    fn try_save<T: Serialize + ?Sized>(
        &mut self,
        key: StorageKey,
        value: &T,
    ) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(value).map_err(|e| PersistenceError::Serialization {
            key: key.as_str().to_string(),
            message: e.to_string(),
        })?;
        self.store.set(&key.storage_key(), &raw)
    }

    /// Stored value, or `None` when absent, unreadable or of the wrong shape.
    pub fn load<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        match self.try_load(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to load {} from storage: {e}", key.as_str());
                None
            }
        }
    }

    fn try_load<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, PersistenceError> {
        let Some(raw) = self.store.get(&key.storage_key())? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| PersistenceError::Serialization {
                key: key.as_str().to_string(),
                message: e.to_string(),
            })
    }

    pub fn remove(&mut self, key: StorageKey) {
        if let Err(e) = self.store.remove(&key.storage_key()) {
            log::warn!("Failed to remove {} from storage: {e}", key.as_str());
        }
    }

    pub fn load_all(&self) -> Saved {
        Saved {
            selection: Selection {
                continent: self.load::<String>(StorageKey::Continent).filter(|v| !v.is_empty()),
                country: self.load::<String>(StorageKey::Country).filter(|v| !v.is_empty()),
                city: self.load::<String>(StorageKey::City).filter(|v| !v.is_empty()),
                method: self.load(StorageKey::Method),
            },
            timings: self.load(StorageKey::PrayerTimes),
            next_prayer: self.load(StorageKey::NextPrayer),
        }
    }

    /// Removes every key under [`STORAGE_PREFIX`] and nothing else.
    pub fn clear(&mut self) {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                log::warn!("Failed to clear storage: {e}");
                return;
            }
        };

        for key in keys.iter().filter(|key| key.starts_with(STORAGE_PREFIX)) {
            if let Err(e) = self.store.remove(key) {
                log::warn!("Failed to remove {key} from storage: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Prayer;
    use chrono::NaiveDate;

    /// A store whose every operation fails, like a browser with storage disabled.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
            Err(PersistenceError::Unavailable("denied".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unavailable("denied".to_string()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unavailable("denied".to_string()))
        }

        fn keys(&self) -> Result<Vec<String>, PersistenceError> {
            Err(PersistenceError::Unavailable("denied".to_string()))
        }
    }

    #[test]
    fn values_are_json_under_prefixed_keys() {
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence.save(StorageKey::Country, "Algeria");
        persistence.save(StorageKey::Method, &12_u16);

        assert_eq!(
            persistence.store().get("prayer-times-country").unwrap(),
            Some("\"Algeria\"".to_string())
        );
        assert_eq!(persistence.load::<u16>(StorageKey::Method), Some(12));
    }

    #[test]
    fn load_all_collects_selection_timings_and_countdown() {
        let mut persistence = Persistence::new(MemoryStore::new());
        let record = NextPrayer {
            name: Prayer::Isha,
            time_str: "20:15".to_string(),
            next_date: NaiveDate::from_ymd_opt(2024, 3, 1)
                .and_then(|d| d.and_hms_opt(20, 15, 0))
                .unwrap(),
        };
        let timings: Timings = [("Isha", "20:15")].into_iter().collect();

        persistence.save(StorageKey::Continent, "africa");
        persistence.save(StorageKey::PrayerTimes, &timings);
        persistence.save(StorageKey::NextPrayer, &record);

        let saved = persistence.load_all();
        assert_eq!(saved.selection.continent.as_deref(), Some("africa"));
        assert_eq!(saved.selection.country, None);
        assert_eq!(saved.timings, Some(timings));
        assert_eq!(saved.next_prayer, Some(record));
    }

    #[test]
    fn corrupt_values_degrade_to_none() {
        let persistence = Persistence::new(MemoryStore::with_entries([
            ("prayer-times-method", "not json"),
            ("prayer-times-nextPrayer", "{\"name\":\"Fajr\"}"),
        ]));

        let saved = persistence.load_all();
        assert_eq!(saved.selection.method, None);
        assert_eq!(saved.next_prayer, None);
    }

    #[test]
    fn clear_only_touches_namespaced_keys() {
        let mut persistence = Persistence::new(MemoryStore::with_entries([
            ("prayer-times-city", "\"Oran\""),
            ("prayer-times-nextPrayer", "{}"),
            ("theme", "\"dark\""),
            ("other-app-prayer-times-city", "\"Paris\""),
        ]));

        persistence.clear();

        assert_eq!(
            persistence.store().keys().unwrap(),
            vec!["other-app-prayer-times-city".to_string(), "theme".to_string()]
        );
    }

    #[test]
    fn unavailable_store_is_tolerated() {
        let mut persistence = Persistence::new(BrokenStore);
        persistence.save(StorageKey::City, "Oran");
        persistence.remove(StorageKey::City);
        persistence.clear();
        assert_eq!(persistence.load_all(), Saved::default());
    }
}

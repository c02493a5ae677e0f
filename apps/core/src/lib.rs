pub mod api;
pub mod controller;
pub mod countdown;
pub mod domain;
pub mod error;
pub mod sequence;
pub mod storage;
pub mod time;
pub mod view;

pub use api::{Endpoints, PrayerApi, TimingsQuery, Transport};
pub use controller::{Controller, Effect, Event, TimingsPurpose};
pub use domain::{CalculationMethod, Continent, NextPrayer, Prayer, Selection, Timings};
pub use error::{ApiError, PersistenceError, Resource, TransportError};
pub use sequence::{Field, Ticket};
pub use storage::{KeyValueStore, MemoryStore, Persistence, StorageKey};
pub use view::{Focus, Screen, SelectId, SelectOption};

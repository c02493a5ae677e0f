//! Remote data client for the three public endpoints the widget talks to.
//!
//! Each shell supplies its own [`Transport`] (reqwest in the terminal, `fetch`
//! in the browser); URL building, envelope parsing, sorting and the city cache
//! live here so both shells behave identically.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;
use serde_json::{json, Value};
use url::Url;

use crate::domain::Timings;
use crate::error::{ApiError, Resource, TransportError};
use crate::time::format_api_date;

pub const DEFAULT_COUNTRIES_URL: &str = "https://restcountries.com/v3.1/region";
pub const DEFAULT_CITIES_URL: &str = "https://countriesnow.space/api/v0.1/countries/cities";
pub const DEFAULT_TIMINGS_URL: &str = "https://api.aladhan.com/v1/timingsByCity";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Base of the continent-scoped country list; the continent is appended as
    /// a path segment.
    pub countries: String,
    pub cities: String,
    pub timings: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            countries: DEFAULT_COUNTRIES_URL.to_string(),
            cities: DEFAULT_CITIES_URL.to_string(),
            timings: DEFAULT_TIMINGS_URL.to_string(),
        }
    }
}

/// JSON over HTTP. Non-success statuses must come back as
/// [`TransportError::Status`].
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError>;

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingsQuery {
    pub city: String,
    pub country: String,
    pub method: u16,
    pub date: Option<NaiveDate>,
}

/// Client with a session-scoped city cache.
///
/// The cache has no TTL: a country's city list is fetched at most once per
/// client, so a long-lived session never sees upstream changes.
#[derive(Debug)]
pub struct PrayerApi<T> {
    transport: T,
    endpoints: Endpoints,
    city_cache: Mutex<HashMap<String, Vec<String>>>,
}

impl<T: Transport> PrayerApi<T> {
    pub fn new(transport: T, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
            city_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Country names of a continent, sorted and de-duplicated.
    pub async fn fetch_countries(&self, continent: &str) -> Result<Vec<String>, ApiError> {
        let url = countries_url(&self.endpoints.countries, continent)?;
        let body = self
            .transport
            .get_json(url.as_str())
            .await
            .map_err(|e| ApiError::from_transport(Resource::Countries, e))?;

        parse_countries(&body)
    }

    /// City names of a country, sorted. Only successful results are cached.
    pub async fn fetch_cities(&self, country: &str) -> Result<Vec<String>, ApiError> {
        if let Some(cities) = self.cached_cities(country) {
            return Ok(cities);
        }

        let body = self
            .transport
            .post_json(&self.endpoints.cities, &json!({ "country": country }))
            .await
            .map_err(|e| ApiError::from_transport(Resource::Cities, e))?;

        let cities = parse_cities(&body)?;
        self.city_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(country.to_string(), cities.clone());
        Ok(cities)
    }

    pub fn cached_cities(&self, country: &str) -> Option<Vec<String>> {
        self.city_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(country)
            .cloned()
    }

    /// Timings for the location, for `query.date` or today when absent.
    pub async fn fetch_prayer_times(&self, query: &TimingsQuery) -> Result<Timings, ApiError> {
        let url = timings_url(&self.endpoints.timings, query)?;
        let body = self
            .transport
            .get_json(url.as_str())
            .await
            .map_err(|e| ApiError::from_transport(Resource::PrayerTimes, e))?;

        parse_timings(&body)
    }
}

fn invalid_endpoint(resource: Resource, endpoint: &str, reason: impl std::fmt::Display) -> ApiError {
    ApiError::network(resource, None, format!("invalid endpoint '{endpoint}': {reason}"))
}

fn countries_url(base: &str, continent: &str) -> Result<Url, ApiError> {
    let mut url =
        Url::parse(base).map_err(|e| invalid_endpoint(Resource::Countries, base, e))?;
    url.path_segments_mut()
        .map_err(|()| invalid_endpoint(Resource::Countries, base, "cannot be a base"))?
        .pop_if_empty()
        .push(continent);
    Ok(url)
}

fn timings_url(base: &str, query: &TimingsQuery) -> Result<Url, ApiError> {
    let mut url =
        Url::parse(base).map_err(|e| invalid_endpoint(Resource::PrayerTimes, base, e))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("city", &query.city)
            .append_pair("country", &query.country)
            .append_pair("method", &query.method.to_string());
        if let Some(date) = query.date {
            pairs.append_pair("date", &format_api_date(date));
        }
    }
    Ok(url)
}

fn parse_countries(body: &Value) -> Result<Vec<String>, ApiError> {
    let entries = body
        .as_array()
        .ok_or_else(|| ApiError::data(Resource::Countries, "expected a list of countries"))?;

    let mut names = entries
        .iter()
        .filter_map(|entry| entry.pointer("/name/common").and_then(Value::as_str))
        .map(str::to_string)
        .collect::<Vec<_>>();
    names.sort_unstable();
    names.dedup();
    Ok(names)
}

fn parse_cities(body: &Value) -> Result<Vec<String>, ApiError> {
    let entries = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::data(Resource::Cities, "Cities not found"))?;

    let mut cities = entries
        .iter()
        .map(|city| city.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ApiError::data(Resource::Cities, "city list contains non-text entries"))?;
    cities.sort_unstable();
    cities.dedup();
    Ok(cities)
}

fn parse_timings(body: &Value) -> Result<Timings, ApiError> {
    let timings = body
        .pointer("/data/timings")
        .and_then(Value::as_object)
        .ok_or_else(|| ApiError::data(Resource::PrayerTimes, "response lacks a timings object"))?;

    Ok(timings
        .iter()
        .filter_map(|(name, time)| time.as_str().map(|time| (name.clone(), time.to_string())))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Prayer;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Get(String),
        Post(String, Value),
    }

    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<Value, TransportError>>>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedTransport {
        fn replying(replies: Vec<Result<Value, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::default(),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn next_reply(&self) -> Result<Value, TransportError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Failed("no scripted reply".to_string())))
        }
    }

    impl Transport for ScriptedTransport {
        async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
            self.calls.lock().unwrap().push(Call::Get(url.to_string()));
            self.next_reply()
        }

        async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Post(url.to_string(), body.clone()));
            self.next_reply()
        }
    }

    fn client(replies: Vec<Result<Value, TransportError>>) -> PrayerApi<ScriptedTransport> {
        PrayerApi::new(ScriptedTransport::replying(replies), Endpoints::default())
    }

    #[tokio::test]
    async fn countries_are_sorted_and_unique() {
        let api = client(vec![Ok(json!([
            { "name": { "common": "Kenya" } },
            { "name": { "common": "Algeria" } },
            { "name": { "official": "no common name" } },
            { "name": { "common": "Egypt" } },
            { "name": { "common": "Algeria" } },
        ]))]);

        let countries = api.fetch_countries("africa").await.unwrap();

        assert_eq!(countries, vec!["Algeria", "Egypt", "Kenya"]);
        assert!(countries.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(
            api.transport.calls(),
            vec![Call::Get(
                "https://restcountries.com/v3.1/region/africa".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn countries_surface_http_status_as_network_error() {
        let api = client(vec![Err(TransportError::Status {
            code: 500,
            message: "Internal Server Error".to_string(),
        })]);

        let err = api.fetch_countries("asia").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Network {
                resource: Resource::Countries,
                status: Some(500),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn cities_are_fetched_once_per_country() {
        let api = client(vec![Ok(json!({
            "error": false,
            "data": ["Oran", "Algiers", "Constantine"]
        }))]);

        let first = api.fetch_cities("Algeria").await.unwrap();
        let second = api.fetch_cities("Algeria").await.unwrap();

        assert_eq!(first, vec!["Algiers", "Constantine", "Oran"]);
        assert_eq!(first, second);
        assert_eq!(
            api.transport.calls(),
            vec![Call::Post(
                DEFAULT_CITIES_URL.to_string(),
                json!({ "country": "Algeria" })
            )]
        );
    }

    #[tokio::test]
    async fn failed_city_lookups_are_not_cached() {
        let api = client(vec![
            Err(TransportError::Failed("connection reset".to_string())),
            Ok(json!({ "data": ["Lyon"] })),
        ]);

        assert!(api.fetch_cities("France").await.is_err());
        assert_eq!(api.cached_cities("France"), None);
        assert_eq!(api.fetch_cities("France").await.unwrap(), vec!["Lyon"]);
        assert_eq!(api.transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn malformed_city_list_is_a_data_error() {
        let api = client(vec![Ok(json!({ "error": true, "msg": "country not found" }))]);

        let err = api.fetch_cities("Atlantis").await.unwrap_err();
        assert_eq!(err, ApiError::data(Resource::Cities, "Cities not found"));
    }

    #[tokio::test]
    async fn timings_query_carries_method_and_explicit_date() {
        let api = client(vec![Ok(json!({
            "code": 200,
            "data": { "timings": { "Fajr": "05:00", "Isha": "20:15", "Sunrise": "06:31" } }
        }))]);

        let query = TimingsQuery {
            city: "Abou el Hassan".to_string(),
            country: "Algeria".to_string(),
            method: 2,
            date: NaiveDate::from_ymd_opt(2024, 3, 2),
        };
        let timings = api.fetch_prayer_times(&query).await.unwrap();

        assert_eq!(timings.get(Prayer::Fajr), Some("05:00"));
        assert_eq!(timings.get(Prayer::Isha), Some("20:15"));
        assert_eq!(timings.get(Prayer::Dhuhr), None);
        assert_eq!(
            api.transport.calls(),
            vec![Call::Get(
                "https://api.aladhan.com/v1/timingsByCity?city=Abou+el+Hassan&country=Algeria&method=2&date=02-03-2024"
                    .to_string()
            )]
        );
    }

    #[tokio::test]
    async fn timings_without_envelope_are_a_data_error() {
        let api = client(vec![Ok(json!({ "data": "Invalid city" }))]);

        let query = TimingsQuery {
            city: "Nowhere".to_string(),
            country: "Algeria".to_string(),
            method: 3,
            date: None,
        };
        let err = api.fetch_prayer_times(&query).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Data {
                resource: Resource::PrayerTimes,
                ..
            }
        ));
    }
}

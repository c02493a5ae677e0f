use dotenv::dotenv;
use prayer_core::api::{DEFAULT_CITIES_URL, DEFAULT_COUNTRIES_URL, DEFAULT_TIMINGS_URL};
use prayer_core::domain::{CalculationMethod, DEFAULT_METHOD};
use prayer_core::Endpoints;
use std::env;
use std::path::PathBuf;

pub const STORE_ENV: &str = "PRAYER_TIMES_STORE";
pub const LOG_ENV: &str = "PRAYER_TIMES_LOG";
pub const METHOD_ENV: &str = "PRAYER_METHOD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// JSON file holding the persisted selection and countdown
    pub store_path: PathBuf,
    /// Log file; the terminal itself belongs to the UI
    pub log_path: PathBuf,
    pub endpoints: Endpoints,
    pub default_method: u16,
    pub debug: bool,
}

/// Initializes the application configuration from `.env` and the environment
pub fn init_app_config() -> color_eyre::eyre::Result<AppConfig> {
    dotenv().ok();

    let base_dir: PathBuf = env::current_dir()?;
    Ok(config_from(&base_dir, |key| env::var(key).ok()))
}

/// Builds the configuration from a variable lookup, resolving relative paths
/// against `base_dir`.
pub fn config_from(base_dir: &std::path::Path, var: impl Fn(&str) -> Option<String>) -> AppConfig {
    let path = |key: &str, default: &str| {
        let value = var(key).filter(|v| !v.trim().is_empty());
        base_dir.join(value.as_deref().unwrap_or(default))
    };
    let url = |key: &str, default: &str| {
        var(key)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let default_method = var(METHOD_ENV)
        .and_then(|v| v.trim().parse::<u16>().ok())
        .and_then(CalculationMethod::find)
        .map_or(DEFAULT_METHOD, |method| method.id);

    AppConfig {
        store_path: path(STORE_ENV, "prayer-times.json"),
        log_path: path(LOG_ENV, "prayer-times.log"),
        endpoints: Endpoints {
            countries: url("COUNTRIES_API_URL", DEFAULT_COUNTRIES_URL),
            cities: url("CITIES_API_URL", DEFAULT_CITIES_URL),
            timings: url("TIMINGS_API_URL", DEFAULT_TIMINGS_URL),
        },
        default_method,
        debug: var("DEBUG").is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_live_next_to_the_working_directory() {
        let config = config_from(Path::new("/work"), lookup(&[]));

        assert_eq!(config.store_path, PathBuf::from("/work/prayer-times.json"));
        assert_eq!(config.log_path, PathBuf::from("/work/prayer-times.log"));
        assert_eq!(config.endpoints, Endpoints::default());
        assert_eq!(config.default_method, DEFAULT_METHOD);
        assert!(!config.debug);
    }

    #[test]
    fn environment_overrides_paths_urls_and_method() {
        let config = config_from(
            Path::new("/work"),
            lookup(&[
                (STORE_ENV, "/tmp/store.json"),
                ("TIMINGS_API_URL", "http://localhost:9000/timings"),
                (METHOD_ENV, "12"),
                ("DEBUG", "1"),
            ]),
        );

        assert_eq!(config.store_path, PathBuf::from("/tmp/store.json"));
        assert_eq!(config.endpoints.timings, "http://localhost:9000/timings");
        assert_eq!(config.endpoints.cities, DEFAULT_CITIES_URL);
        assert_eq!(config.default_method, 12);
        assert!(config.debug);
    }

    #[test]
    fn unknown_method_falls_back_to_default() {
        let config = config_from(Path::new("/work"), lookup(&[(METHOD_ENV, "99")]));
        assert_eq!(config.default_method, DEFAULT_METHOD);
    }
}

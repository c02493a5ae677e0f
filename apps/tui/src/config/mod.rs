#[allow(clippy::module_inception)]
mod config;

pub use config::{config_from, init_app_config, AppConfig, LOG_ENV, METHOD_ENV, STORE_ENV};

use clap::Parser;

use crate::config::{METHOD_ENV, STORE_ENV};

#[derive(Debug, Default, Parser)]
#[command(name = "prayer-times", version, about = "Prayer times with a next-prayer countdown")]
pub struct CliArgs {
    /// Print today's timings and the next prayer, then exit
    #[arg(long)]
    pub headless: bool,

    /// Print headless output as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override the persisted-state file
    #[arg(long, value_name = "PATH")]
    pub store: Option<String>,

    /// City for headless mode (defaults to the persisted one)
    #[arg(long)]
    pub city: Option<String>,

    /// Country for headless mode (defaults to the persisted one)
    #[arg(long)]
    pub country: Option<String>,

    /// Calculation method id (2, 3, 4, 5 or 12)
    #[arg(long)]
    pub method: Option<u16>,

    /// Date for headless mode, as DD-MM-YYYY
    #[arg(long, value_name = "DD-MM-YYYY")]
    pub date: Option<String>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(store) = &self.store {
            std::env::set_var(STORE_ENV, store);
        }
        if let Some(method) = self.method {
            std::env::set_var(METHOD_ENV, method.to_string());
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parses_headless_location_flags() {
        let args = CliArgs::parse_from([
            "prayer-times",
            "--headless",
            "--json",
            "--city",
            "Oran",
            "--country",
            "Algeria",
            "--method",
            "3",
            "--date",
            "02-03-2024",
        ]);

        assert!(args.headless && args.json);
        assert_eq!(args.city.as_deref(), Some("Oran"));
        assert_eq!(args.country.as_deref(), Some("Algeria"));
        assert_eq!(args.method, Some(3));
        assert_eq!(args.date.as_deref(), Some("02-03-2024"));
    }

    #[test]
    fn command_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn method_must_be_numeric() {
        assert!(CliArgs::try_parse_from(["prayer-times", "--method", "isna"]).is_err());
    }
}

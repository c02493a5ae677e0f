pub mod headless;
mod loop_handler;

use color_eyre::Result;
use prayer_core::{KeyValueStore, Persistence};

use crate::app::effects::Api;
use crate::cli::CliArgs;
use crate::config::AppConfig;

pub use loop_handler::{local_now, run};

/// Run the application in headless mode (no UI)
pub async fn run_headless<S: KeyValueStore>(
    api: &Api,
    persistence: &Persistence<S>,
    config: &AppConfig,
    args: &CliArgs,
) -> Result<()> {
    let now = local_now();
    let query = headless::resolve_query(args, persistence, config.default_method, now.date())?;
    let report = headless::build_report(api, query, now).await?;

    if args.json {
        headless::render_json(&report)?;
    } else {
        headless::render_text(&report);
    }

    Ok(())
}

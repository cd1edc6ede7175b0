// Entrypoint for the CLI application.
// - Keeps `main` small: settings, logger, store and API client, then the
//   menu loop.
// - Table setup failing is fatal; nothing in the menu works without it.

use anyhow::Context;
use hh_vacancies::{api::ApiClient, config::Settings, db::Store, logging, ui::main_menu};
use log::LevelFilter;

fn main() -> anyhow::Result<()> {
    logging::init_logger(LevelFilter::Warn).context("Failed to initialise logging")?;

    let settings = Settings::from_env().context("Invalid configuration")?;

    let store = Store::open(&settings.db_path)
        .with_context(|| format!("Failed to open database {}", settings.db_path.display()))?;
    store.create_tables().context("Failed to create tables")?;

    let api = ApiClient::from_settings(&settings)?;

    // Blocks until the user exits; the store is closed on the way out.
    main_menu(&api, store, &settings)?;
    Ok(())
}

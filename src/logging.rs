// Logger setup: `env_logger` behind the `log` facade, initialised once
// from `main`.

use log::LevelFilter;

/// Initializes `env_logger` once for the process.
///
/// `level` is the fallback used when `RUST_LOG` is not set. The menu prints
/// to stdout, so keep the default at `warn` to avoid interleaving.
pub fn init_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    // RUST_LOG wins over the defaults above.
    builder.parse_default_env();
    builder.format_timestamp_secs();
    builder.try_init()
}

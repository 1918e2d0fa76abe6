//! Logging utilities

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence; otherwise `default_level` is used, falling
/// back to `info` when it does not parse.
pub fn init(default_level: &str) {
    let level = default_level.parse().unwrap_or(log::LevelFilter::Info);
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    // A second initialisation (tests, embedding apps) keeps the first logger
    let _ = builder.try_init();
}

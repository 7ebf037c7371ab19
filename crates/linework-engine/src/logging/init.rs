use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "linework_engine=debug,wgpu_core=warn"). When it is `None`, `RUST_LOG` is
/// consulted, and `default_level` applies when neither is set.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    /// Extra per-module levels applied after the default level.
    ///
    /// wgpu is chatty at `info`; the defaults quiet it down.
    pub module_levels: Vec<(String, LevelFilter)>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            module_levels: vec![
                ("wgpu_core".to_string(), LevelFilter::Warn),
                ("wgpu_hal".to_string(), LevelFilter::Warn),
                ("naga".to_string(), LevelFilter::Warn),
            ],
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Idempotent; later calls are ignored. Call early in `main`, before the
/// runtime starts, so initialization failures are logged as well.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.filter_level(config.default_level);
        for (module, level) in &config.module_levels {
            builder.filter_module(module, *level);
        }

        // Explicit filters win over the defaults above.
        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_err() {
            // Another logger was installed by the host (tests, embedding app).
            return;
        }

        log::debug!("logging initialized");
    });
}

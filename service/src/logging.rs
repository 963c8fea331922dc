use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{self, ConfigBuilder};

/// HTTP and runtime crates whose per-request chatter would bury the
/// subscribe/supersede/terminate lines the `sse` crate logs for each
/// connection. They are only shown at Trace.
const FILTERED_MODULES: &[&str] = &["tower", "tower_http", "hyper", "axum", "tokio", "mio"];

pub struct Logger {}

impl Logger {
    /// Installs the terminal logger for the push service.
    ///
    /// Connection churn (`Registered new SSE connection`, `superseded`,
    /// registry removals) is logged at info and debug, so `--log-level-filter
    /// debug` is enough to follow a user's stream without dependency noise.
    /// Fails if a global logger was already installed.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        simplelog::TermLogger::init(
            Self::convert_level_filter(config.log_level_filter),
            Self::build_log_config(config.log_level_filter),
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
    }

    fn convert_level_filter(level: LevelFilter) -> simplelog::LevelFilter {
        match level {
            LevelFilter::Off => simplelog::LevelFilter::Off,
            LevelFilter::Error => simplelog::LevelFilter::Error,
            LevelFilter::Warn => simplelog::LevelFilter::Warn,
            LevelFilter::Info => simplelog::LevelFilter::Info,
            LevelFilter::Debug => simplelog::LevelFilter::Debug,
            LevelFilter::Trace => simplelog::LevelFilter::Trace,
        }
    }

    /// Modules hidden at `level`; empty at Trace.
    fn ignored_modules(level: LevelFilter) -> &'static [&'static str] {
        if level == LevelFilter::Trace {
            &[]
        } else {
            FILTERED_MODULES
        }
    }

    fn build_log_config(level: LevelFilter) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder
            .set_time_format_rfc3339()
            .set_target_level(simplelog::LevelFilter::Error);

        for module in Self::ignored_modules(level) {
            builder.add_filter_ignore_str(*module);
        }

        builder.build()
    }
}

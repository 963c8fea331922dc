use crate::directory::RoleMembers;
use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::time::Duration;

/// Largest worker id that fits the snowflake worker field.
pub const MAX_SNOWFLAKE_WORKER_ID: u16 = 1023;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Seconds between keep-alive comments written to idle SSE connections
    #[arg(long, env, default_value_t = 15)]
    pub sse_keep_alive_secs: u64,

    /// Maximum lifetime in seconds of one SSE connection before it times out (0 = never)
    #[arg(long, env, default_value_t = 0)]
    pub sse_connection_timeout_secs: u64,

    /// Worker id embedded in every generated notification id (0-1023).
    /// Must be unique per running instance.
    #[arg(
        long,
        env,
        default_value_t = 1,
        value_parser = clap::value_parser!(u16).range(0..=MAX_SNOWFLAKE_WORKER_ID as i64)
    )]
    pub snowflake_worker_id: u16,

    /// Role memberships used to resolve ROLE-targeted notifications,
    /// e.g. "1=100,101;2=102" (role 1 has users 100 and 101).
    #[arg(long, env, value_delimiter = ';')]
    pub role_members: Vec<RoleMembers>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn sse_keep_alive(&self) -> Duration {
        Duration::from_secs(self.sse_keep_alive_secs)
    }

    /// `None` when connections never time out.
    pub fn sse_connection_timeout(&self) -> Option<Duration> {
        match self.sse_connection_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn bind_address(&self) -> String {
        format!(
            "{}:{}",
            self.interface.as_deref().unwrap_or("127.0.0.1"),
            self.port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["notification-push"]).unwrap();

        assert_eq!(config.sse_keep_alive(), Duration::from_secs(15));
        assert_eq!(config.sse_connection_timeout(), None);
        assert_eq!(config.snowflake_worker_id, 1);
        assert!(config.role_members.is_empty());
    }

    #[test]
    fn test_parses_role_members_and_timeout() {
        let config = Config::try_parse_from([
            "notification-push",
            "--role-members",
            "1=100,101;2=102",
            "--sse-connection-timeout-secs",
            "30",
        ])
        .unwrap();

        assert_eq!(config.role_members.len(), 2);
        assert_eq!(config.role_members[0].role_id, 1);
        assert_eq!(config.role_members[0].user_ids, vec![100, 101]);
        assert_eq!(config.role_members[1].user_ids, vec![102]);
        assert_eq!(
            config.sse_connection_timeout(),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_rejects_out_of_range_worker_id() {
        let result = Config::try_parse_from([
            "notification-push",
            "--snowflake-worker-id",
            "1024",
        ]);

        assert!(result.is_err());
    }
}

use clap::builder::TypedValueParser as _;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::fmt;
use std::time::Duration;

/// Analysis endpoint used when `FOLLOWTHROUGH_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/meeting-analysis";

/// How the wait between two non-terminal status checks evolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PollBackoff {
    /// Wait `poll_interval_ms` every time.
    Fixed,
    /// Start at `poll_interval_ms` and double up to `poll_max_interval_ms`.
    Exponential,
}

impl fmt::Display for PollBackoff {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PollBackoff::Fixed => write!(f, "fixed"),
            PollBackoff::Exponential => write!(f, "exponential"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
pub struct Config {
    /// The FollowThrough meeting analysis endpoint. Jobs are submitted here and
    /// polled at `<api-url>/<sessionId>`.
    #[arg(long, env = "FOLLOWTHROUGH_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Bearer token attached to every request.
    #[arg(long, env = "FOLLOWTHROUGH_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Timeout in seconds for a single HTTP request
    #[arg(long, env, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Transport-level retries for a single status fetch, on top of the poll loop's own attempts
    #[arg(long, env, default_value_t = 0)]
    pub http_max_retries: u32,

    /// Maximum number of status checks before giving up on a job
    #[arg(long, env, default_value_t = 20)]
    pub poll_max_attempts: u32,

    /// Wait in milliseconds after a status check that found the job still running
    #[arg(long, env, default_value_t = 3000)]
    pub poll_interval_ms: u64,

    /// Wait in milliseconds after a status check that failed transiently
    #[arg(long, env, default_value_t = 5000)]
    pub poll_recovery_delay_ms: u64,

    /// Delay strategy between status checks
    #[arg(long, env, value_enum, default_value_t = PollBackoff::Fixed)]
    pub poll_backoff: PollBackoff,

    /// Upper bound in milliseconds for exponential backoff delays
    #[arg(long, env, default_value_t = 30000)]
    pub poll_max_interval_ms: u64,

    /// Optional wall-clock limit in seconds for polling one job
    #[arg(long, env)]
    pub poll_time_budget_secs: Option<u64>,

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
}

impl Config {
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn set_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    pub fn set_api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_recovery_delay(&self) -> Duration {
        Duration::from_millis(self.poll_recovery_delay_ms)
    }

    pub fn poll_max_interval(&self) -> Duration {
        Duration::from_millis(self.poll_max_interval_ms)
    }

    pub fn poll_time_budget(&self) -> Option<Duration> {
        self.poll_time_budget_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_poll_contract() {
        let config = Config::try_parse_from(["followthrough"]).unwrap();

        assert_eq!(config.poll_max_attempts, 20);
        assert_eq!(config.poll_interval(), Duration::from_millis(3000));
        assert_eq!(config.poll_recovery_delay(), Duration::from_millis(5000));
        assert_eq!(config.poll_backoff, PollBackoff::Fixed);
        assert_eq!(config.http_max_retries, 0);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            "followthrough",
            "--api-url",
            "https://api.example.com/meeting-analysis",
            "--api-token",
            "secret",
            "--poll-backoff",
            "exponential",
            "--poll-max-interval-ms",
            "12000",
            "--poll-time-budget-secs",
            "90",
            "-l",
            "DEBUG",
        ])
        .unwrap();

        assert_eq!(config.api_url(), "https://api.example.com/meeting-analysis");
        assert_eq!(config.api_token(), Some("secret"));
        assert_eq!(config.poll_backoff, PollBackoff::Exponential);
        assert_eq!(config.poll_max_interval(), Duration::from_secs(12));
        assert_eq!(config.poll_time_budget(), Some(Duration::from_secs(90)));
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
    }

    #[test]
    fn test_unknown_backoff_is_rejected() {
        assert!(Config::try_parse_from(["followthrough", "--poll-backoff", "linear"]).is_err());
    }

    #[test]
    fn test_setters_override_parsed_values() {
        let config = Config::try_parse_from(["followthrough"])
            .unwrap()
            .set_api_url("http://127.0.0.1:1234/analysis")
            .set_api_token("token");

        assert_eq!(config.api_url(), "http://127.0.0.1:1234/analysis");
        assert_eq!(config.api_token(), Some("token"));
    }
}

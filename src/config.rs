//! Configuration

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, ValueEnum};
use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::{orders::OrderStatus, profile::Role};

/// Which ordering flow the session runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    /// Single-role counter: students only, orders are accepted and that's it.
    Counter,

    /// Students order, the cook marks orders ready.
    #[default]
    Kitchen,
}

impl Flow {
    /// Role a fresh (or logged out) session starts in.
    pub fn initial_role(self) -> Option<Role> {
        match self {
            Flow::Counter => Some(Role::Student),
            Flow::Kitchen => None,
        }
    }

    /// Status given to a newly placed order.
    pub fn initial_status(self) -> OrderStatus {
        match self {
            Flow::Counter => OrderStatus::Accepted,
            Flow::Kitchen => OrderStatus::Preparing,
        }
    }
}

/// Session settings.
#[derive(Debug, Clone, Args)]
pub struct SessionConfig {
    /// Ordering flow (counter, kitchen)
    #[arg(long, env = "CANTEEN_FLOW", value_enum, default_value_t = Flow::Kitchen)]
    pub flow: Flow,

    /// Minutes between placing an order and its pickup deadline
    #[arg(long, env = "CANTEEN_PICKUP_WINDOW_MINUTES", default_value_t = 30)]
    pub pickup_window_minutes: u32,

    /// Seconds a notification stays up before it disappears
    #[arg(long, env = "CANTEEN_NOTIFICATION_TTL_SECONDS", default_value_t = 5)]
    pub notification_ttl_seconds: u32,

    /// Display clock refresh interval in milliseconds
    #[arg(long, env = "CANTEEN_TICK_INTERVAL_MS", default_value_t = 1_000)]
    pub tick_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            flow: Flow::Kitchen,
            pickup_window_minutes: 30,
            notification_ttl_seconds: 5,
            tick_interval_ms: 1_000,
        }
    }
}

impl SessionConfig {
    /// Config for the given flow with default timings.
    pub fn for_flow(flow: Flow) -> Self {
        Self {
            flow,
            ..Self::default()
        }
    }

    /// Pickup deadline offset.
    pub fn pickup_window(&self) -> SignedDuration {
        SignedDuration::from_mins(i64::from(self.pickup_window_minutes))
    }

    /// Notification lifetime, as a timestamp offset.
    pub fn notification_ttl(&self) -> SignedDuration {
        SignedDuration::from_secs(i64::from(self.notification_ttl_seconds))
    }

    /// Notification lifetime, as a timer delay.
    pub fn notification_delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.notification_ttl_seconds))
    }

    /// Display clock refresh interval.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Canteen scripted session runner configuration
#[derive(Debug, Parser)]
#[command(name = "canteen", about = "Replay a scripted canteen ordering session", long_about = None)]
pub struct Config {
    /// Session settings.
    #[command(flatten)]
    pub session: SessionConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Fixture directory
    #[arg(long, env = "CANTEEN_FIXTURES", default_value = "./fixtures")]
    pub fixtures: PathBuf,

    /// Menu fixture to load
    #[arg(short, long, default_value = "canteen")]
    pub menu: String,

    /// Script fixture to replay
    #[arg(short, long, default_value = "lunch")]
    pub script: String,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_match_cli_defaults() -> TestResult {
        let config = Config::try_parse_from(["canteen"])?;
        let defaults = SessionConfig::default();

        assert_eq!(config.session.flow, defaults.flow);
        assert_eq!(
            config.session.pickup_window_minutes,
            defaults.pickup_window_minutes
        );
        assert_eq!(
            config.session.notification_ttl_seconds,
            defaults.notification_ttl_seconds
        );
        assert_eq!(config.session.tick_interval_ms, defaults.tick_interval_ms);

        Ok(())
    }

    #[test]
    fn flags_override_defaults() -> TestResult {
        let config = Config::try_parse_from([
            "canteen",
            "--flow",
            "counter",
            "--pickup-window-minutes",
            "45",
            "--script",
            "counter",
        ])?;

        assert_eq!(config.session.flow, Flow::Counter);
        assert_eq!(config.session.pickup_window(), SignedDuration::from_mins(45));
        assert_eq!(config.script, "counter");

        Ok(())
    }

    #[test]
    fn durations() {
        let config = SessionConfig::default();

        assert_eq!(config.pickup_window(), SignedDuration::from_mins(30));
        assert_eq!(config.notification_ttl(), SignedDuration::from_secs(5));
        assert_eq!(config.notification_delay(), Duration::from_secs(5));
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn flows_pick_initial_state() {
        assert_eq!(Flow::Counter.initial_role(), Some(Role::Student));
        assert_eq!(Flow::Kitchen.initial_role(), None);
        assert_eq!(Flow::Counter.initial_status(), OrderStatus::Accepted);
        assert_eq!(Flow::Kitchen.initial_status(), OrderStatus::Preparing);
    }
}

use crate::shipper::BackoffPolicy;
use crate::transport::SendPolicy;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
#[serde(default)]
pub struct Config {
    /// Collector hostname
    #[arg(long, env = "PULSE_COLLECTOR_HOST", default_value = "localhost")]
    pub collector_host: String,

    /// Collector port
    #[arg(long, env = "PULSE_COLLECTOR_PORT", default_value = "9600")]
    pub collector_port: u16,

    /// Spool snapshot path for undelivered records
    #[arg(
        long,
        env = "PULSE_SPOOL_PATH",
        default_value = "/tmp/pulse-forwarder/spool.bin"
    )]
    pub spool_path: PathBuf,

    /// Behavior when the send buffer is full
    #[arg(long, env = "PULSE_SEND_POLICY", value_enum, default_value = "wait-writable")]
    pub send_policy: SendPolicy,

    /// Initial reconnect backoff in milliseconds
    #[arg(long, env = "PULSE_BACKOFF_BASE_MS", default_value = "1000")]
    pub backoff_base_ms: u64,

    /// Reconnect backoff ceiling in milliseconds
    #[arg(long, env = "PULSE_BACKOFF_CEILING_MS", default_value = "60000")]
    pub backoff_ceiling_ms: u64,

    /// Write-readiness poll timeout in milliseconds
    #[arg(long, env = "PULSE_WRITE_POLL_TIMEOUT_MS", default_value = "500")]
    pub write_poll_timeout_ms: u64,

    /// Connection attempt timeout in seconds
    #[arg(long, env = "PULSE_CONNECT_TIMEOUT_SECS", default_value = "10")]
    pub connect_timeout_secs: u64,

    /// Number of sensor producer tasks
    #[arg(long, env = "PULSE_SENSORS", default_value = "1")]
    pub sensors: usize,

    /// Log level
    #[arg(long, env = "PULSE_LOG_LEVEL", value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Configuration file path (optional)
    #[arg(long, env = "PULSE_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Derived fields (not CLI arguments)
    #[serde(skip)]
    #[arg(skip)]
    pub backoff_base: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub backoff_ceiling: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub write_poll_timeout: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collector_host: "localhost".to_string(),
            collector_port: 9600,
            spool_path: PathBuf::from("/tmp/pulse-forwarder/spool.bin"),
            send_policy: SendPolicy::WaitWritable,
            backoff_base_ms: 1000,
            backoff_ceiling_ms: 60_000,
            write_poll_timeout_ms: 500,
            connect_timeout_secs: 10,
            sensors: 1,
            log_level: LogLevel::Info,
            config_file: None,
            backoff_base: Duration::from_millis(1000),
            backoff_ceiling: Duration::from_secs(60),
            write_poll_timeout: Duration::from_millis(500),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut config = Config::parse_from(args);
        config.post_process();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.post_process();
        config.validate()?;
        Ok(config)
    }

    pub fn post_process(&mut self) {
        self.backoff_base = Duration::from_millis(self.backoff_base_ms);
        self.backoff_ceiling = Duration::from_millis(self.backoff_ceiling_ms);
        self.write_poll_timeout = Duration::from_millis(self.write_poll_timeout_ms);
        self.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backoff_base_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "backoff base must be greater than zero".to_string(),
            ));
        }
        if self.backoff_ceiling_ms < self.backoff_base_ms {
            return Err(ConfigError::InvalidConfig(
                "backoff ceiling must be at least the backoff base".to_string(),
            ));
        }
        if self.write_poll_timeout_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "write poll timeout must be greater than zero".to_string(),
            ));
        }
        if self.sensors == 0 {
            return Err(ConfigError::InvalidConfig(
                "at least one sensor is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.backoff_base, self.backoff_ceiling)
    }
}

// Configuration types module
// Defines all configuration-related data structures

use crate::fileserver::default_index_pages;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub files: FilesConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Log line format for the tracing subscriber
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

impl PerformanceConfig {
    /// Upper bound for serving one connection
    pub const fn connection_timeout(&self) -> Duration {
        let secs = if self.read_timeout > self.write_timeout {
            self.read_timeout
        } else {
            self.write_timeout
        };
        Duration::from_secs(secs + self.keep_alive_timeout)
    }
}

/// Served content configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    /// Host directory used as the filesystem root
    #[serde(default = "default_root")]
    pub root: String,
    /// Root-relative paths answered with 404, matched by file identity
    #[serde(default)]
    pub hide: Vec<String>,
    /// Directory index candidates, highest priority first
    #[serde(default = "default_index_pages")]
    pub index_files: Vec<String>,
    /// `Retry-After` seconds sent with 503 responses
    #[serde(default = "default_retry_after")]
    pub retry_after: u64,
}

#[allow(clippy::missing_const_for_fn)]
fn default_root() -> String {
    ".".to_string()
}

const fn default_retry_after() -> u64 {
    5
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            hide: Vec::new(),
            index_files: default_index_pages(),
            retry_after: default_retry_after(),
        }
    }
}

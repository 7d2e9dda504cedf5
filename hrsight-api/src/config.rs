//! Configuration for the HTTP API.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use hrsight_common::{Error, LoggingConfig, Result, load_config, parse_config};
use hrsight_snmp::{SessionOptions, SnmpVersion};
use serde::{Deserialize, Serialize};

/// Complete service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to listen on (default: "0.0.0.0:6969").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Session settings used when a request leaves them out.
    #[serde(default)]
    pub snmp: SnmpDefaults,

    /// Allow cross-origin requests from any origin.
    #[serde(default = "default_true")]
    pub cors: bool,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_listen() -> String {
    "0.0.0.0:6969".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            snmp: SnmpDefaults::default(),
            cors: true,
            logging: LoggingConfig::default(),
        }
    }
}

/// Default SNMP session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnmpDefaults {
    #[serde(default = "default_community")]
    pub community: String,

    /// Protocol version: "1" or "2c".
    #[serde(default)]
    pub version: SnmpVersion,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Extra attempts after a timeout, for table walks.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Extra attempts after a timeout, for sysDescr.
    #[serde(default = "default_system_retries")]
    pub system_retries: u32,
}

fn default_community() -> String {
    "public".to_string()
}

fn default_port() -> u16 {
    161
}

fn default_timeout_ms() -> u64 {
    2500
}

fn default_retries() -> u32 {
    1
}

fn default_system_retries() -> u32 {
    2
}

impl Default for SnmpDefaults {
    fn default() -> Self {
        Self {
            community: default_community(),
            version: SnmpVersion::default(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
            system_retries: default_system_retries(),
        }
    }
}

impl SnmpDefaults {
    /// Session options for table and column queries.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            version: self.version,
            community: self.community.clone(),
            port: self.port,
            timeout: Duration::from_millis(self.timeout_ms),
            retries: self.retries,
        }
    }
}

impl ApiConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: ApiConfig = load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: ApiConfig = parse_config(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;

        if self.snmp.timeout_ms == 0 {
            return Err(Error::Config("snmp.timeout_ms must be positive".to_string()));
        }
        if self.snmp.community.is_empty() {
            return Err(Error::Config("snmp.community cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Parsed listen address.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| Error::Config(format!("Invalid listen address '{}': {}", self.listen, e)))
    }
}

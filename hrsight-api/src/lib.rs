//! HTTP API for HOST-RESOURCES-MIB health data.
//!
//! Each route opens one SNMP session to the device named by the `ip` query
//! parameter, materializes the requested table and returns it as JSON.
//!
//! # Usage
//!
//! ```bash
//! hrsight-api --config config.json5
//! curl 'http://localhost:6969/api/snmp/hrstorage?ip=192.168.1.79&community=public'
//! ```
//!
//! # Configuration
//!
//! See [`config::ApiConfig`] for configuration options.

pub mod config;
pub mod http;

pub use config::{ApiConfig, SnmpDefaults};
pub use http::{HttpServer, TargetParams, create_router};

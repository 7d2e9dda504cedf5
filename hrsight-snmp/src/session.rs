//! Session capability used by the query layer.
//!
//! The core never builds a transport itself: callers hand in a [`Connector`], and
//! tests substitute a scripted one.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};
use crate::value::VarBind;

/// SNMP protocol version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnmpVersion {
    #[serde(rename = "1", alias = "v1")]
    V1,
    #[default]
    #[serde(rename = "2c", alias = "v2c")]
    V2c,
}

impl FromStr for SnmpVersion {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1" | "v1" => Ok(Self::V1),
            "2c" | "v2c" | "2" => Ok(Self::V2c),
            other => Err(QueryError::config(format!(
                "unsupported SNMP version '{}'",
                other
            ))),
        }
    }
}

/// Per-query session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub version: SnmpVersion,
    pub community: String,
    pub port: u16,
    /// Time allowed for each request attempt.
    pub timeout: Duration,
    /// Extra attempts after a timed-out request.
    pub retries: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            version: SnmpVersion::V2c,
            community: "public".to_string(),
            port: 161,
            timeout: Duration::from_millis(2500),
            retries: 1,
        }
    }
}

/// An open SNMP session to one agent.
#[async_trait]
pub trait SnmpSession: Send {
    /// GET each OID; error-marked values come back as error bindings.
    async fn fetch(&mut self, oids: &[&str]) -> Result<Vec<VarBind>>;

    /// Enumerate the subtree under `base`, excluding the end-of-view marker.
    async fn walk(&mut self, base: &str) -> Result<Vec<VarBind>>;

    /// Release the session. Calling it more than once is harmless.
    async fn close(&mut self);
}

/// Opens sessions to agents.
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: SnmpSession;

    async fn open(&self, target: &str, options: &SessionOptions) -> Result<Self::Session>;
}

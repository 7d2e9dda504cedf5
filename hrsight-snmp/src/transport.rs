//! [`Connector`] backed by the `snmp2` async client.

use std::time::Duration;

use async_trait::async_trait;
use snmp2::{AsyncSession, Oid, Value};
use tokio::time::timeout;

use crate::error::{QueryError, Result};
use crate::oid::{oid_to_string, parse_oid};
use crate::session::{Connector, SessionOptions, SnmpSession, SnmpVersion};
use crate::value::{BindingError, RawValue, VarBind};

/// Opens UDP sessions with `snmp2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Snmp2Connector;

#[async_trait]
impl Connector for Snmp2Connector {
    type Session = Snmp2Session;

    async fn open(&self, target: &str, options: &SessionOptions) -> Result<Snmp2Session> {
        let address = socket_address(target, options.port);
        let community = options.community.as_bytes();

        let session = match options.version {
            SnmpVersion::V1 => AsyncSession::new_v1(&address, community, 0).await,
            SnmpVersion::V2c => AsyncSession::new_v2c(&address, community, 0).await,
        }
        .map_err(|e| QueryError::Connect {
            target: target.to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!(address = %address, version = ?options.version, "Opened SNMP session");

        Ok(Snmp2Session {
            inner: Some(session),
            address,
            timeout: options.timeout,
            attempts: options.retries.saturating_add(1),
        })
    }
}

/// Join host and port, bracketing bare IPv6 literals.
fn socket_address(target: &str, port: u16) -> String {
    if target.contains(':') && !target.starts_with('[') {
        format!("[{}]:{}", target, port)
    } else {
        format!("{}:{}", target, port)
    }
}

/// Session to one agent. Dropping the inner client closes the socket.
pub struct Snmp2Session {
    inner: Option<AsyncSession>,
    address: String,
    timeout: Duration,
    attempts: u32,
}

impl Snmp2Session {
    fn client(&mut self, oid: &str) -> Result<&mut AsyncSession> {
        self.inner.as_mut().ok_or_else(|| QueryError::Request {
            oid: oid.to_string(),
            message: "session is closed".to_string(),
        })
    }

    /// GET a single OID, retrying timed-out attempts.
    async fn get_one(&mut self, oid_str: &str) -> Result<VarBind> {
        let oid = parse_oid(oid_str)?;
        let (request_timeout, attempts) = (self.timeout, self.attempts);
        let session = self.client(oid_str)?;

        for attempt in 1..=attempts {
            match timeout(request_timeout, session.get(&oid)).await {
                Ok(Ok(response)) => {
                    let Some((resp_oid, value)) = response.varbinds.into_iter().next() else {
                        return Err(QueryError::Request {
                            oid: oid_str.to_string(),
                            message: "empty response".to_string(),
                        });
                    };
                    return Ok(to_varbind(&resp_oid, &value));
                }
                Ok(Err(e)) => {
                    return Err(QueryError::Request {
                        oid: oid_str.to_string(),
                        message: e.to_string(),
                    });
                }
                Err(_) => {
                    tracing::debug!(oid = %oid_str, attempt, attempts, "SNMP GET timed out");
                }
            }
        }

        Err(QueryError::Timeout {
            oid: oid_str.to_string(),
            attempts,
        })
    }

    /// GETNEXT from `current`, retrying timed-out attempts.
    ///
    /// Returns `None` once the agent answers outside `subtree` or reports the end of
    /// its MIB view.
    async fn get_next(
        &mut self,
        subtree: &Oid<'static>,
        current: &Oid<'static>,
    ) -> Result<Option<(Oid<'static>, VarBind)>> {
        let (request_timeout, attempts) = (self.timeout, self.attempts);
        let current_str = oid_to_string(current);
        let session = self.client(&current_str)?;

        for attempt in 1..=attempts {
            match timeout(request_timeout, session.getnext(current)).await {
                Ok(Ok(response)) => {
                    let Some((resp_oid, value)) = response.varbinds.into_iter().next() else {
                        return Ok(None);
                    };

                    if !resp_oid.starts_with(subtree) || matches!(value, Value::EndOfMibView) {
                        return Ok(None);
                    }

                    return Ok(Some((resp_oid.to_owned(), to_varbind(&resp_oid, &value))));
                }
                Ok(Err(e)) => {
                    return Err(QueryError::Request {
                        oid: current_str,
                        message: e.to_string(),
                    });
                }
                Err(_) => {
                    tracing::debug!(oid = %current_str, attempt, attempts, "SNMP GETNEXT timed out");
                }
            }
        }

        Err(QueryError::Timeout {
            oid: current_str,
            attempts,
        })
    }
}

#[async_trait]
impl SnmpSession for Snmp2Session {
    async fn fetch(&mut self, oids: &[&str]) -> Result<Vec<VarBind>> {
        let mut results = Vec::with_capacity(oids.len());
        for oid in oids {
            results.push(self.get_one(oid).await?);
        }
        Ok(results)
    }

    async fn walk(&mut self, base: &str) -> Result<Vec<VarBind>> {
        let subtree = parse_oid(base)?;
        let mut current = subtree.clone();
        let mut last_arcs = oid_arcs(base);
        let mut results = Vec::new();

        while let Some((next, vb)) = self.get_next(&subtree, &current).await? {
            // Agents that do not increase the OID would loop forever
            let arcs = oid_arcs(&vb.oid);
            if arcs <= last_arcs {
                tracing::warn!(
                    address = %self.address,
                    oid = %vb.oid,
                    "Agent returned non-increasing OID, stopping walk"
                );
                break;
            }
            results.push(vb);
            current = next;
            last_arcs = arcs;
        }

        tracing::trace!(address = %self.address, base, bindings = results.len(), "Walk complete");
        Ok(results)
    }

    async fn close(&mut self) {
        if self.inner.take().is_some() {
            tracing::trace!(address = %self.address, "Closed SNMP session");
        }
    }
}

/// Numeric arcs of a dotted OID, for lexicographic OID comparison.
fn oid_arcs(oid: &str) -> Vec<u64> {
    oid.split('.').filter_map(|arc| arc.parse().ok()).collect()
}

/// Convert an `snmp2` binding into an owned [`VarBind`].
fn to_varbind(oid: &Oid, value: &Value) -> VarBind {
    let oid = oid_to_string(oid);

    let raw = match value {
        Value::Integer(n) => RawValue::Integer(*n),
        Value::OctetString(s) => RawValue::OctetString(s.to_vec()),
        Value::ObjectIdentifier(id) => RawValue::ObjectIdentifier(oid_to_string(id)),
        Value::IpAddress(ip) => RawValue::IpAddress(*ip),
        Value::Counter32(n) => RawValue::Counter32(*n),
        Value::Unsigned32(n) => RawValue::Unsigned32(*n),
        Value::Timeticks(n) => RawValue::Timeticks(*n),
        Value::Counter64(n) => RawValue::Counter64(*n),
        Value::NoSuchObject => return VarBind::error(oid, BindingError::NoSuchObject),
        Value::NoSuchInstance => return VarBind::error(oid, BindingError::NoSuchInstance),
        Value::EndOfMibView => return VarBind::error(oid, BindingError::EndOfMibView),
        _ => RawValue::Null,
    };

    VarBind::new(oid, raw)
}

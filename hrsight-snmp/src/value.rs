//! Variable bindings and value coercion.
//!
//! [`RawValue`] is an owned copy of what the agent returned, independent of the
//! transport. Coercion turns it into a [`Cell`] for the joiner; a value that cannot
//! be coerced yields `None` and the cell stays absent.

use std::fmt;

use serde::Serialize;

/// SNMP value as returned by the agent, detached from the PDU buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Integer(i64),
    OctetString(Vec<u8>),
    ObjectIdentifier(String),
    IpAddress([u8; 4]),
    Counter32(u32),
    Unsigned32(u32),
    Timeticks(u32),
    Counter64(u64),
    Null,
}

/// Protocol-level error marker carried by a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingError {
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoSuchObject => "NoSuchObject",
            Self::NoSuchInstance => "NoSuchInstance",
            Self::EndOfMibView => "EndOfMibView",
        };
        f.write_str(text)
    }
}

/// One OID/value observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    pub oid: String,
    pub value: RawValue,
    pub error: Option<BindingError>,
}

impl VarBind {
    /// Create a regular binding.
    pub fn new(oid: impl Into<String>, value: RawValue) -> Self {
        Self {
            oid: oid.into(),
            value,
            error: None,
        }
    }

    /// Create an error-marked binding.
    pub fn error(oid: impl Into<String>, error: BindingError) -> Self {
        Self {
            oid: oid.into(),
            value: RawValue::Null,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Coerced value stored in a partial record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(i64),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            Self::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

/// Column transform: raw value to cell, `None` when the value does not coerce.
pub type Transform = fn(&RawValue) -> Option<Cell>;

/// Decode an octet string as text, dropping NUL terminators.
fn bytes_to_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace('\0', "")
}

/// Render any value as display text.
pub fn to_text(value: &RawValue) -> String {
    match value {
        RawValue::OctetString(bytes) => bytes_to_text(bytes),
        RawValue::ObjectIdentifier(oid) => oid.clone(),
        RawValue::IpAddress(ip) => format!("{}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]),
        RawValue::Integer(n) => n.to_string(),
        RawValue::Counter32(n) | RawValue::Unsigned32(n) | RawValue::Timeticks(n) => {
            n.to_string()
        }
        RawValue::Counter64(n) => n.to_string(),
        RawValue::Null => String::new(),
    }
}

/// Strict integer conversion.
pub fn to_number(value: &RawValue) -> Option<i64> {
    match value {
        RawValue::Integer(n) => Some(*n),
        RawValue::Counter32(n) | RawValue::Unsigned32(n) | RawValue::Timeticks(n) => {
            Some(i64::from(*n))
        }
        RawValue::Counter64(n) => i64::try_from(*n).ok(),
        RawValue::OctetString(bytes) => bytes_to_text(bytes).trim().parse::<i64>().ok(),
        RawValue::ObjectIdentifier(_) | RawValue::IpAddress(_) | RawValue::Null => None,
    }
}

/// Render an OID-typed value as dotted text.
///
/// Some agents return OID columns as octet strings, so those are accepted too.
pub fn to_oid_text(value: &RawValue) -> Option<String> {
    match value {
        RawValue::ObjectIdentifier(oid) => Some(oid.clone()),
        RawValue::OctetString(bytes) => Some(bytes_to_text(bytes)),
        _ => None,
    }
}

/// Transform for display-string columns.
pub fn text(value: &RawValue) -> Option<Cell> {
    Some(Cell::Text(to_text(value)))
}

/// Transform for numeric columns.
pub fn number(value: &RawValue) -> Option<Cell> {
    to_number(value).map(Cell::Number)
}

/// Transform for OBJECT IDENTIFIER columns.
pub fn object_id(value: &RawValue) -> Option<Cell> {
    to_oid_text(value).map(Cell::Text)
}

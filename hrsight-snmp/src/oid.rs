//! OID parsing and row index extraction.

use std::fmt;

use serde::Serialize;
use snmp2::Oid;

use crate::error::{QueryError, Result};

/// Parse an OID string (e.g., "1.3.6.1.2.1.1.1.0") into an snmp2::Oid.
pub fn parse_oid(oid_str: &str) -> Result<Oid<'static>> {
    oid_str
        .parse::<Oid>()
        .map_err(|e| QueryError::config(format!("Invalid OID '{}': {:?}", oid_str, e)))
        .map(|oid| oid.to_owned())
}

/// Convert an snmp2::Oid back to a dotted string representation.
pub fn oid_to_string(oid: &Oid) -> String {
    oid.to_id_string()
}

/// Row identifier derived from the OID suffix after a column OID.
///
/// Numeric indices order before composite ones; composite indices order lexically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum RowIndex {
    /// Simple integer index (e.g. hrStorageIndex).
    Numeric(u64),
    /// Dotted multi-value index, kept verbatim.
    Composite(String),
}

impl RowIndex {
    /// Whether this is a simple integer index.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }
}

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{}", n),
            Self::Composite(s) => f.write_str(s),
        }
    }
}

/// Extract the row index of `oid` relative to the column OID `base`.
///
/// Returns `None` when `oid` is not strictly below `base`.
pub fn extract_index(oid: &str, base: &str) -> Option<RowIndex> {
    let base = base.trim_end_matches('.');
    let suffix = oid.strip_prefix(base)?.strip_prefix('.')?;

    if suffix.is_empty() {
        return None;
    }

    if suffix.bytes().all(|b| b.is_ascii_digit())
        && let Ok(n) = suffix.parse::<u64>()
    {
        return Some(RowIndex::Numeric(n));
    }

    Some(RowIndex::Composite(suffix.to_string()))
}

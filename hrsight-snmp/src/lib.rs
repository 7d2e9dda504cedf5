//! HOST-RESOURCES-MIB table materialization.
//!
//! Turns the flat variable-bindings of SNMP walks into joined, typed rows:
//!
//! - [`oid`] - OID parsing and row index extraction
//! - [`value`] - Bindings and value coercion
//! - [`table`] - Table descriptions and the column joiner
//! - [`tables`] - Storage, process and processor-load tables
//! - [`metrics`] - Byte totals, percentages, averages, human-readable sizes
//! - [`session`] - Session capability traits
//! - [`transport`] - `snmp2` implementation of the session capability
//! - [`query`] - Query orchestration
//!
//! # Example
//!
//! ```ignore
//! use hrsight_snmp::{SessionOptions, Snmp2Connector, query_table, tables::STORAGE};
//!
//! let result = query_table(&Snmp2Connector, "192.168.1.79", &SessionOptions::default(), &STORAGE).await?;
//! for row in &result.data {
//!     println!("{} {}", row.descr, row.usage.pretty.used);
//! }
//! ```

pub mod error;
pub mod metrics;
pub mod mib;
pub mod oid;
pub mod query;
pub mod session;
pub mod table;
pub mod tables;
pub mod transport;
pub mod value;

pub use error::{QueryError, Result};
pub use oid::{RowIndex, extract_index};
pub use query::{
    ColumnRow, ProcessorLoadReport, ScalarResult, SystemCounts, TableResult, query_column,
    query_processor_load, query_sys_descr, query_system_counts, query_table,
};
pub use session::{Connector, SessionOptions, SnmpSession, SnmpVersion};
pub use table::{ColumnSpec, IndexKind, PartialRecord, PartialRecordSet, TableSpec, join};
pub use transport::Snmp2Connector;
pub use value::{BindingError, Cell, RawValue, VarBind};

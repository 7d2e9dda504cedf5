//! Query orchestration: session lifecycle, walks, join and finalize.

use serde::Serialize;

use crate::error::{QueryError, Result};
use crate::metrics::average;
use crate::mib;
use crate::oid::{RowIndex, extract_index};
use crate::session::{Connector, SessionOptions, SnmpSession};
use crate::table::{ColumnSpec, TableSpec, join};
use crate::tables::{PROCESSOR_LOAD, ProcessorLoadRow};
use crate::value::{Cell, VarBind, to_number, to_text};

/// Ordered rows of one table query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableResult<R> {
    pub target: String,
    /// Root OID of the first walk.
    pub oid: String,
    pub count: usize,
    pub data: Vec<R>,
}

impl<R> TableResult<R> {
    fn new(target: &str, oid: &str, data: Vec<R>) -> Self {
        Self {
            target: target.to_string(),
            oid: oid.to_string(),
            count: data.len(),
            data,
        }
    }
}

/// Processor loads with their mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessorLoadReport {
    #[serde(flatten)]
    pub table: TableResult<ProcessorLoadRow>,
    /// Mean load in percent, `None` when the agent lists no processors.
    pub average: Option<f64>,
}

/// One value of a single walked column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRow {
    pub index: RowIndex,
    pub value: Cell,
}

/// A single-instance value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalarResult {
    pub target: String,
    pub oid: String,
    pub value: String,
}

/// hrSystem counters. Fields the agent cannot report are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemCounts {
    pub target: String,
    pub users: Option<i64>,
    pub processes: Option<i64>,
    pub max_processes: Option<i64>,
}

/// Reject empty targets before a session is opened.
fn check_target(target: &str) -> Result<()> {
    if target.trim().is_empty() {
        return Err(QueryError::config("ip is required"));
    }
    Ok(())
}

/// Run `request` inside one session opened for `target`.
///
/// The session is closed on every exit path; the first failing request fails the
/// whole batch.
async fn collect<C: Connector>(
    connector: &C,
    target: &str,
    options: &SessionOptions,
    request: Request<'_>,
) -> Result<Vec<Vec<VarBind>>> {
    check_target(target)?;

    let mut session = connector.open(target, options).await?;
    let result = run_request(&mut session, request).await;
    session.close().await;

    if let Err(e) = &result {
        tracing::warn!(device = %target, error = %e, "SNMP query failed");
    }
    result
}

enum Request<'a> {
    Walks(&'a [&'a str]),
    Fetch(&'a [&'a str]),
}

async fn run_request<S: SnmpSession>(
    session: &mut S,
    request: Request<'_>,
) -> Result<Vec<Vec<VarBind>>> {
    match request {
        Request::Walks(roots) => {
            let mut walks = Vec::with_capacity(roots.len());
            for root in roots {
                walks.push(session.walk(root).await?);
            }
            Ok(walks)
        }
        Request::Fetch(oids) => Ok(vec![session.fetch(oids).await?]),
    }
}

/// Walk, join and finalize a table described by `spec`.
pub async fn query_table<C: Connector, R>(
    connector: &C,
    target: &str,
    options: &SessionOptions,
    spec: &TableSpec<R>,
) -> Result<TableResult<R>> {
    let walks = collect(connector, target, options, Request::Walks(spec.walks)).await?;

    let records = join(spec, &walks);
    let data = records.finalize(spec);

    tracing::debug!(
        device = %target,
        table = spec.name,
        bindings = walks.iter().map(Vec::len).sum::<usize>(),
        records = records.len(),
        rows = data.len(),
        "Table query complete"
    );

    let oid = spec.walks.first().copied().unwrap_or_default();
    Ok(TableResult::new(target, oid, data))
}

/// Query hrProcessorLoad and compute the average load.
pub async fn query_processor_load<C: Connector>(
    connector: &C,
    target: &str,
    options: &SessionOptions,
) -> Result<ProcessorLoadReport> {
    let table = query_table(connector, target, options, &PROCESSOR_LOAD).await?;
    let loads: Vec<f64> = table.data.iter().map(|row| row.load as f64).collect();

    Ok(ProcessorLoadReport {
        average: average(&loads),
        table,
    })
}

/// Walk a single column and list its coerced values by index.
///
/// Unlike table queries, any index kind is accepted here.
pub async fn query_column<C: Connector>(
    connector: &C,
    target: &str,
    options: &SessionOptions,
    column: &ColumnSpec,
) -> Result<TableResult<ColumnRow>> {
    let walks = collect(connector, target, options, Request::Walks(&[column.oid])).await?;

    let mut data: Vec<ColumnRow> = walks
        .iter()
        .flatten()
        .filter(|vb| !vb.is_error())
        .filter_map(|vb| {
            let index = extract_index(&vb.oid, column.oid)?;
            let value = (column.transform)(&vb.value)?;
            Some(ColumnRow { index, value })
        })
        .collect();
    data.sort_by(|a, b| a.index.cmp(&b.index));

    tracing::debug!(
        device = %target,
        column = column.name,
        rows = data.len(),
        "Column query complete"
    );

    Ok(TableResult::new(target, column.oid, data))
}

/// GET sysDescr.0. An error binding fails the query.
pub async fn query_sys_descr<C: Connector>(
    connector: &C,
    target: &str,
    options: &SessionOptions,
) -> Result<ScalarResult> {
    let mut fetched =
        collect(connector, target, options, Request::Fetch(&[mib::SYS_DESCR])).await?;

    let vb = fetched
        .pop()
        .and_then(|bindings| bindings.into_iter().next())
        .ok_or_else(|| QueryError::Request {
            oid: mib::SYS_DESCR.to_string(),
            message: "empty response".to_string(),
        })?;

    if let Some(kind) = vb.error {
        return Err(QueryError::Binding { oid: vb.oid, kind });
    }

    Ok(ScalarResult {
        target: target.to_string(),
        oid: mib::SYS_DESCR.to_string(),
        value: to_text(&vb.value),
    })
}

/// GET the hrSystem user and process counters.
pub async fn query_system_counts<C: Connector>(
    connector: &C,
    target: &str,
    options: &SessionOptions,
) -> Result<SystemCounts> {
    const OIDS: [&str; 3] = [
        mib::HR_SYSTEM_NUM_USERS,
        mib::HR_SYSTEM_PROCESSES,
        mib::HR_SYSTEM_MAX_PROCESSES,
    ];

    let fetched = collect(connector, target, options, Request::Fetch(&OIDS)).await?;

    let value_of = |oid: &str| {
        fetched
            .iter()
            .flatten()
            .find(|vb| vb.oid == oid && !vb.is_error())
            .and_then(|vb| to_number(&vb.value))
    };

    Ok(SystemCounts {
        target: target.to_string(),
        users: value_of(mib::HR_SYSTEM_NUM_USERS),
        processes: value_of(mib::HR_SYSTEM_PROCESSES),
        max_processes: value_of(mib::HR_SYSTEM_MAX_PROCESSES),
    })
}

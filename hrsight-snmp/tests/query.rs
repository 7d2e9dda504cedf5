//! Query orchestration tests against a scripted agent.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use hrsight_snmp::mib;
use hrsight_snmp::tables::{PROCESSES, STORAGE, process_column, storage_column};
use hrsight_snmp::{
    BindingError, Cell, Connector, QueryError, RawValue, Result, RowIndex, SessionOptions,
    SnmpSession, VarBind, query_column, query_processor_load, query_sys_descr,
    query_system_counts, query_table,
};

/// Replays canned walks and GETs, counting session opens and closes.
#[derive(Default, Clone)]
struct ScriptedAgent {
    walks: HashMap<String, Vec<VarBind>>,
    values: HashMap<String, VarBind>,
    failing_walks: Vec<String>,
    unreachable: bool,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    walked: Arc<std::sync::Mutex<Vec<String>>>,
}

impl ScriptedAgent {
    fn with_walk(mut self, base: &str, bindings: Vec<VarBind>) -> Self {
        self.walks.insert(base.to_string(), bindings);
        self
    }

    fn with_value(mut self, vb: VarBind) -> Self {
        self.values.insert(vb.oid.clone(), vb);
        self
    }

    fn failing(mut self, base: &str) -> Self {
        self.failing_walks.push(base.to_string());
        self
    }

    fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

struct ScriptedSession {
    agent: ScriptedAgent,
}

#[async_trait]
impl SnmpSession for ScriptedSession {
    async fn fetch(&mut self, oids: &[&str]) -> Result<Vec<VarBind>> {
        Ok(oids
            .iter()
            .map(|oid| {
                self.agent
                    .values
                    .get(*oid)
                    .cloned()
                    .unwrap_or_else(|| VarBind::error(*oid, BindingError::NoSuchObject))
            })
            .collect())
    }

    async fn walk(&mut self, base: &str) -> Result<Vec<VarBind>> {
        self.agent.walked.lock().unwrap().push(base.to_string());

        if self.agent.failing_walks.iter().any(|b| b == base) {
            return Err(QueryError::Timeout {
                oid: base.to_string(),
                attempts: 2,
            });
        }
        Ok(self.agent.walks.get(base).cloned().unwrap_or_default())
    }

    async fn close(&mut self) {
        self.agent.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for ScriptedAgent {
    type Session = ScriptedSession;

    async fn open(&self, target: &str, _options: &SessionOptions) -> Result<ScriptedSession> {
        if self.unreachable {
            return Err(QueryError::Connect {
                target: target.to_string(),
                message: "host unreachable".to_string(),
            });
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedSession {
            agent: self.clone(),
        })
    }
}

fn octets(s: &str) -> RawValue {
    RawValue::OctetString(s.as_bytes().to_vec())
}

fn vb(column: &str, index: u32, value: RawValue) -> VarBind {
    VarBind::new(format!("{}.{}", column, index), value)
}

fn storage_walk() -> Vec<VarBind> {
    vec![
        // hrStorageIndex column is walked but not joined
        vb("1.3.6.1.2.1.25.2.3.1.1", 1, RawValue::Integer(1)),
        vb("1.3.6.1.2.1.25.2.3.1.1", 31, RawValue::Integer(31)),
        vb(
            mib::HR_STORAGE_TYPE,
            1,
            RawValue::ObjectIdentifier(mib::HR_STORAGE_RAM.to_string()),
        ),
        vb(
            mib::HR_STORAGE_TYPE,
            31,
            RawValue::ObjectIdentifier("1.3.6.1.2.1.25.2.1.4".to_string()),
        ),
        vb(mib::HR_STORAGE_DESCR, 1, octets("Physical memory")),
        vb(mib::HR_STORAGE_DESCR, 31, octets("/")),
        vb(mib::HR_STORAGE_ALLOCATION_UNITS, 1, RawValue::Integer(1024)),
        vb(mib::HR_STORAGE_ALLOCATION_UNITS, 31, RawValue::Integer(4096)),
        vb(mib::HR_STORAGE_SIZE, 1, RawValue::Integer(8_000_000)),
        vb(mib::HR_STORAGE_SIZE, 31, RawValue::Integer(1000)),
        vb(mib::HR_STORAGE_USED, 1, RawValue::Integer(2_000_000)),
        VarBind::error(
            format!("{}.31", mib::HR_STORAGE_USED),
            BindingError::NoSuchInstance,
        ),
    ]
}

#[tokio::test]
async fn test_storage_query() {
    let agent = ScriptedAgent::default().with_walk(mib::HR_STORAGE_TABLE, storage_walk());

    let result = query_table(&agent, "10.0.0.5", &SessionOptions::default(), &STORAGE)
        .await
        .expect("query failed");

    assert_eq!(result.target, "10.0.0.5");
    assert_eq!(result.oid, mib::HR_STORAGE_TABLE);
    // Row 31 lost its used value to an error binding and is excluded
    assert_eq!(result.count, 1);
    assert_eq!(result.data[0].index, RowIndex::Numeric(1));
    assert_eq!(result.data[0].usage.used_pct, 25.0);
    assert_eq!(agent.opened(), 1);
    assert_eq!(agent.closed(), 1);
}

#[tokio::test]
async fn test_process_query_walks_both_tables() {
    let agent = ScriptedAgent::default()
        .with_walk(
            mib::HR_SW_RUN_TABLE,
            vec![
                vb(mib::HR_SW_RUN_NAME, 420, octets("nginx")),
                vb(mib::HR_SW_RUN_NAME, 7, octets("systemd")),
                vb(mib::HR_SW_RUN_STATUS, 7, RawValue::Integer(1)),
                vb(mib::HR_SW_RUN_STATUS, 420, RawValue::Integer(4)),
            ],
        )
        .with_walk(
            mib::HR_SW_RUN_PERF_TABLE,
            vec![
                vb(mib::HR_SW_RUN_PERF_CPU, 7, RawValue::Integer(812)),
                vb(mib::HR_SW_RUN_PERF_MEM, 7, RawValue::Integer(11_264)),
            ],
        );

    let result = query_table(&agent, "10.0.0.5", &SessionOptions::default(), &PROCESSES)
        .await
        .unwrap();

    assert_eq!(
        *agent.walked.lock().unwrap(),
        vec![mib::HR_SW_RUN_TABLE, mib::HR_SW_RUN_PERF_TABLE]
    );
    assert_eq!(result.count, 2);
    assert_eq!(result.data[0].name, "systemd");
    assert_eq!(result.data[0].status.as_deref(), Some("running"));
    assert_eq!(result.data[0].mem_kb, Some(11_264));
    assert_eq!(result.data[1].name, "nginx");
    assert_eq!(result.data[1].status.as_deref(), Some("invalid"));
    assert_eq!(result.data[1].cpu_ticks, None);
}

#[tokio::test]
async fn test_failed_walk_returns_no_partial_data_and_closes() {
    let agent = ScriptedAgent::default()
        .with_walk(
            mib::HR_SW_RUN_TABLE,
            vec![vb(mib::HR_SW_RUN_NAME, 1, octets("init"))],
        )
        .failing(mib::HR_SW_RUN_PERF_TABLE);

    let err = query_table(&agent, "10.0.0.5", &SessionOptions::default(), &PROCESSES)
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::Timeout { .. }));
    assert_eq!(agent.opened(), 1);
    assert_eq!(agent.closed(), 1);
}

#[tokio::test]
async fn test_missing_target_rejected_before_open() {
    let agent = ScriptedAgent::default();

    let err = query_table(&agent, "  ", &SessionOptions::default(), &STORAGE)
        .await
        .unwrap_err();

    assert!(err.is_config());
    assert_eq!(err.to_string(), "ip is required");
    assert_eq!(agent.opened(), 0);
    assert_eq!(agent.closed(), 0);
}

#[tokio::test]
async fn test_unreachable_agent() {
    let agent = ScriptedAgent {
        unreachable: true,
        ..Default::default()
    };

    let err = query_sys_descr(&agent, "10.9.9.9", &SessionOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::Connect { .. }));
    assert_eq!(agent.closed(), 0);
}

#[tokio::test]
async fn test_processor_load_average() {
    let agent = ScriptedAgent::default().with_walk(
        mib::HR_PROCESSOR_LOAD,
        vec![
            vb(mib::HR_PROCESSOR_LOAD, 196, RawValue::Integer(10)),
            vb(mib::HR_PROCESSOR_LOAD, 197, RawValue::Integer(20)),
            vb(mib::HR_PROCESSOR_LOAD, 198, RawValue::Integer(30)),
        ],
    );

    let report = query_processor_load(&agent, "10.0.0.5", &SessionOptions::default())
        .await
        .unwrap();

    assert_eq!(report.table.count, 3);
    assert_eq!(report.average, Some(20.0));
}

#[tokio::test]
async fn test_processor_load_without_processors() {
    let agent = ScriptedAgent::default();

    let report = query_processor_load(&agent, "10.0.0.5", &SessionOptions::default())
        .await
        .unwrap();

    assert_eq!(report.table.count, 0);
    assert_eq!(report.average, None);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["average"].is_null());
    assert_eq!(json["count"], 0);
}

#[tokio::test]
async fn test_sys_descr() {
    let agent = ScriptedAgent::default().with_value(VarBind::new(
        mib::SYS_DESCR,
        octets("Linux edge01 6.1.0 #1 SMP x86_64\0"),
    ));

    let result = query_sys_descr(&agent, "10.0.0.5", &SessionOptions::default())
        .await
        .unwrap();

    assert_eq!(result.oid, mib::SYS_DESCR);
    assert_eq!(result.value, "Linux edge01 6.1.0 #1 SMP x86_64");
    assert_eq!(agent.closed(), 1);
}

#[tokio::test]
async fn test_sys_descr_error_binding_fails() {
    let agent = ScriptedAgent::default();

    let err = query_sys_descr(&agent, "10.0.0.5", &SessionOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        QueryError::Binding {
            kind: BindingError::NoSuchObject,
            ..
        }
    ));
}

#[tokio::test]
async fn test_system_counts_skip_error_bindings() {
    let agent = ScriptedAgent::default()
        .with_value(VarBind::new(mib::HR_SYSTEM_NUM_USERS, RawValue::Unsigned32(3)))
        .with_value(VarBind::new(mib::HR_SYSTEM_PROCESSES, RawValue::Unsigned32(212)));

    let counts = query_system_counts(&agent, "10.0.0.5", &SessionOptions::default())
        .await
        .unwrap();

    assert_eq!(counts.users, Some(3));
    assert_eq!(counts.processes, Some(212));
    assert_eq!(counts.max_processes, None);
}

#[tokio::test]
async fn test_column_query_sorted() {
    let descr = mib::HR_STORAGE_DESCR;
    let agent = ScriptedAgent::default().with_walk(
        descr,
        vec![
            vb(descr, 31, octets("/")),
            vb(descr, 3, octets("Virtual memory")),
            VarBind::error(format!("{}.5", descr), BindingError::NoSuchInstance),
            vb(descr, 1, octets("Physical memory")),
        ],
    );

    let column = storage_column("descr").unwrap();
    let result = query_column(&agent, "10.0.0.5", &SessionOptions::default(), column)
        .await
        .unwrap();

    assert_eq!(result.oid, descr);
    let indices: Vec<_> = result.data.iter().map(|r| r.index.clone()).collect();
    assert_eq!(
        indices,
        vec![
            RowIndex::Numeric(1),
            RowIndex::Numeric(3),
            RowIndex::Numeric(31)
        ]
    );
    assert_eq!(result.data[0].value, Cell::Text("Physical memory".to_string()));
}

#[tokio::test]
async fn test_column_query_sorts_composite_indices() {
    // hrSWRunPerfCPU addressed through a multi-part index
    let column = mib::HR_SW_RUN_PERF_CPU;
    let agent = ScriptedAgent::default().with_walk(
        column,
        vec![
            vb(column, 2, RawValue::Integer(5)),
            VarBind::new(format!("{}.7.1", column), RawValue::Integer(71)),
            VarBind::new(format!("{}.10.2", column), RawValue::Integer(102)),
            vb(column, 1, RawValue::Integer(9)),
            VarBind::new(format!("{}.10.1", column), RawValue::Integer(101)),
        ],
    );

    let spec = process_column("perfcpu").unwrap();
    let result = query_column(&agent, "10.0.0.5", &SessionOptions::default(), spec)
        .await
        .unwrap();

    let indices: Vec<_> = result.data.iter().map(|r| r.index.clone()).collect();
    assert_eq!(
        indices,
        vec![
            RowIndex::Numeric(1),
            RowIndex::Numeric(2),
            RowIndex::Composite("10.1".to_string()),
            RowIndex::Composite("10.2".to_string()),
            RowIndex::Composite("7.1".to_string()),
        ]
    );
    assert_eq!(result.data[2].value, Cell::Number(101));
    assert_eq!(result.count, 5);
}

//! Built-in HOST-RESOURCES-MIB tables and their finalize steps.

use serde::Serialize;

use crate::metrics::StorageUsage;
use crate::mib;
use crate::oid::RowIndex;
use crate::table::{ColumnSpec, IndexKind, PartialRecord, TableSpec};
use crate::value::{number, object_id, text};

/// One hrStorageEntry with its derived usage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageRow {
    pub index: RowIndex,
    pub descr: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub type_oid: String,
    pub is_ram: bool,
    pub alloc_bytes: i64,
    pub size_units: i64,
    pub used_units: i64,
    #[serde(flatten)]
    pub usage: StorageUsage,
}

/// One hrSWRunEntry, optionally enriched from hrSWRunPerfEntry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRow {
    pub index: RowIndex,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_ticks: Option<i64>,
    #[serde(rename = "memKB", skip_serializing_if = "Option::is_none")]
    pub mem_kb: Option<i64>,
}

/// Load of a single processor over the last minute, in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessorLoadRow {
    pub index: RowIndex,
    pub load: i64,
}

fn finalize_storage(index: &RowIndex, record: &PartialRecord) -> Option<StorageRow> {
    let alloc = record.number("allocUnits")?;
    let size = record.number("size")?;
    let used = record.number("used")?;
    let usage = StorageUsage::compute(alloc, size, used)?;

    let type_oid = record.text("type").unwrap_or_default().to_string();

    Some(StorageRow {
        index: index.clone(),
        descr: record.text("descr").unwrap_or_default().to_string(),
        type_name: mib::storage_type_name(&type_oid).to_string(),
        is_ram: type_oid == mib::HR_STORAGE_RAM,
        type_oid,
        alloc_bytes: alloc,
        size_units: size,
        used_units: used,
        usage,
    })
}

fn finalize_process(index: &RowIndex, record: &PartialRecord) -> Option<ProcessRow> {
    let name = record.text("name").filter(|n| !n.is_empty())?;

    Some(ProcessRow {
        index: index.clone(),
        name: name.to_string(),
        path: record.text("path").map(str::to_string),
        status: record.number("status").map(mib::run_status_name),
        cpu_ticks: record.number("perfCpu"),
        mem_kb: record.number("perfMem"),
    })
}

fn finalize_processor_load(index: &RowIndex, record: &PartialRecord) -> Option<ProcessorLoadRow> {
    Some(ProcessorLoadRow {
        index: index.clone(),
        load: record.number("load")?,
    })
}

/// hrStorageTable, walked as one subtree.
pub static STORAGE: TableSpec<StorageRow> = TableSpec {
    name: "hrStorage",
    walks: &[mib::HR_STORAGE_TABLE],
    index: IndexKind::Numeric,
    columns: &[
        ColumnSpec {
            name: "type",
            oid: mib::HR_STORAGE_TYPE,
            transform: object_id,
        },
        ColumnSpec {
            name: "descr",
            oid: mib::HR_STORAGE_DESCR,
            transform: text,
        },
        ColumnSpec {
            name: "allocUnits",
            oid: mib::HR_STORAGE_ALLOCATION_UNITS,
            transform: number,
        },
        ColumnSpec {
            name: "size",
            oid: mib::HR_STORAGE_SIZE,
            transform: number,
        },
        ColumnSpec {
            name: "used",
            oid: mib::HR_STORAGE_USED,
            transform: number,
        },
    ],
    finalize: finalize_storage,
};

/// hrSWRunTable joined with hrSWRunPerfTable.
pub static PROCESSES: TableSpec<ProcessRow> = TableSpec {
    name: "hrSWRun",
    walks: &[mib::HR_SW_RUN_TABLE, mib::HR_SW_RUN_PERF_TABLE],
    index: IndexKind::Numeric,
    columns: &[
        ColumnSpec {
            name: "name",
            oid: mib::HR_SW_RUN_NAME,
            transform: text,
        },
        ColumnSpec {
            name: "path",
            oid: mib::HR_SW_RUN_PATH,
            transform: text,
        },
        ColumnSpec {
            name: "status",
            oid: mib::HR_SW_RUN_STATUS,
            transform: number,
        },
        ColumnSpec {
            name: "perfCpu",
            oid: mib::HR_SW_RUN_PERF_CPU,
            transform: number,
        },
        ColumnSpec {
            name: "perfMem",
            oid: mib::HR_SW_RUN_PERF_MEM,
            transform: number,
        },
    ],
    finalize: finalize_process,
};

/// hrProcessorLoad column of hrProcessorTable.
pub static PROCESSOR_LOAD: TableSpec<ProcessorLoadRow> = TableSpec {
    name: "hrProcessorLoad",
    walks: &[mib::HR_PROCESSOR_LOAD],
    index: IndexKind::Numeric,
    columns: &[ColumnSpec {
        name: "load",
        oid: mib::HR_PROCESSOR_LOAD,
        transform: number,
    }],
    finalize: finalize_processor_load,
};

/// Resolve a single-column listing name (`alloc`, `descr`, ...) of hrStorageTable.
pub fn storage_column(name: &str) -> Option<&'static ColumnSpec> {
    let column = match name {
        "type" => "type",
        "descr" => "descr",
        "alloc" => "allocUnits",
        "size" => "size",
        "used" => "used",
        _ => return None,
    };
    STORAGE.column(column)
}

/// Resolve a single-column listing name (`name`, `perfcpu`, ...) of the process tables.
pub fn process_column(name: &str) -> Option<&'static ColumnSpec> {
    let column = match name {
        "name" => "name",
        "path" => "path",
        "status" => "status",
        "perfcpu" => "perfCpu",
        "perfmem" => "perfMem",
        _ => return None,
    };
    PROCESSES.column(column)
}

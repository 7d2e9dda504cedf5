//! HOST-RESOURCES-MIB and SNMPv2-MIB object identifiers used by the tables.

/// sysDescr.0 (SNMPv2-MIB).
pub const SYS_DESCR: &str = "1.3.6.1.2.1.1.1.0";

/// hrSystemNumUsers.0
pub const HR_SYSTEM_NUM_USERS: &str = "1.3.6.1.2.1.25.1.5.0";
/// hrSystemProcesses.0
pub const HR_SYSTEM_PROCESSES: &str = "1.3.6.1.2.1.25.1.6.0";
/// hrSystemMaxProcesses.0
pub const HR_SYSTEM_MAX_PROCESSES: &str = "1.3.6.1.2.1.25.1.7.0";

pub const HR_STORAGE_TABLE: &str = "1.3.6.1.2.1.25.2.3.1";
pub const HR_STORAGE_TYPE: &str = "1.3.6.1.2.1.25.2.3.1.2";
pub const HR_STORAGE_DESCR: &str = "1.3.6.1.2.1.25.2.3.1.3";
pub const HR_STORAGE_ALLOCATION_UNITS: &str = "1.3.6.1.2.1.25.2.3.1.4";
pub const HR_STORAGE_SIZE: &str = "1.3.6.1.2.1.25.2.3.1.5";
pub const HR_STORAGE_USED: &str = "1.3.6.1.2.1.25.2.3.1.6";

/// hrStorageRam storage type.
pub const HR_STORAGE_RAM: &str = "1.3.6.1.2.1.25.2.1.2";

pub const HR_PROCESSOR_LOAD: &str = "1.3.6.1.2.1.25.3.3.1.2";

pub const HR_SW_RUN_TABLE: &str = "1.3.6.1.2.1.25.4.2.1";
pub const HR_SW_RUN_NAME: &str = "1.3.6.1.2.1.25.4.2.1.2";
pub const HR_SW_RUN_PATH: &str = "1.3.6.1.2.1.25.4.2.1.4";
pub const HR_SW_RUN_STATUS: &str = "1.3.6.1.2.1.25.4.2.1.7";

pub const HR_SW_RUN_PERF_TABLE: &str = "1.3.6.1.2.1.25.5.1.1";
pub const HR_SW_RUN_PERF_CPU: &str = "1.3.6.1.2.1.25.5.1.1.1";
pub const HR_SW_RUN_PERF_MEM: &str = "1.3.6.1.2.1.25.5.1.1.2";

/// hrStorageTypes registrations.
const STORAGE_TYPES: &[(&str, &str)] = &[
    ("1.3.6.1.2.1.25.2.1.1", "other"),
    ("1.3.6.1.2.1.25.2.1.2", "ram"),
    ("1.3.6.1.2.1.25.2.1.3", "virtualMemory"),
    ("1.3.6.1.2.1.25.2.1.4", "fixedDisk"),
    ("1.3.6.1.2.1.25.2.1.5", "removableDisk"),
    ("1.3.6.1.2.1.25.2.1.6", "floppyDisk"),
    ("1.3.6.1.2.1.25.2.1.7", "compactDisc"),
    ("1.3.6.1.2.1.25.2.1.8", "ramDisk"),
    ("1.3.6.1.2.1.25.2.1.9", "flashMemory"),
    ("1.3.6.1.2.1.25.2.1.10", "networkDisk"),
];

/// Resolve a storage type OID to its name, passing unknown OIDs through.
pub fn storage_type_name(oid: &str) -> &str {
    STORAGE_TYPES
        .iter()
        .find(|(known, _)| *known == oid)
        .map(|(_, name)| *name)
        .unwrap_or(oid)
}

/// Resolve an hrSWRunStatus code.
pub fn run_status_name(code: i64) -> String {
    match code {
        1 => "running".to_string(),
        2 => "runnable".to_string(),
        3 => "notRunnable".to_string(),
        4 => "invalid".to_string(),
        other => other.to_string(),
    }
}

//! Derived metrics computed from joined rows.

use serde::Serialize;

const BYTE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a byte count with binary unit steps.
///
/// Two decimals below 10 of a unit, one decimal otherwise: `1536 -> "1.50 KB"`,
/// `10240 -> "10.0 KB"`.
pub fn human_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;

    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if value < 10.0 {
        format!("{:.2} {}", value, BYTE_UNITS[unit])
    } else {
        format!("{:.1} {}", value, BYTE_UNITS[unit])
    }
}

/// Arithmetic mean rounded to two decimals, `None` for an empty set.
pub fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(round2(values.iter().sum::<f64>() / values.len() as f64))
}

/// Human-readable sizes of a storage area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrettyBytes {
    pub total: String,
    pub used: String,
    pub free: String,
}

/// Byte totals of a storage area.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub used_pct: f64,
    pub pretty: PrettyBytes,
}

impl StorageUsage {
    /// Compute usage from hrStorage allocation units, size and used counts.
    ///
    /// Returns `None` for negative inputs or when the byte products overflow.
    pub fn compute(alloc_units: i64, size_units: i64, used_units: i64) -> Option<Self> {
        let alloc = u64::try_from(alloc_units).ok()?;
        let size = u64::try_from(size_units).ok()?;
        let used = u64::try_from(used_units).ok()?;

        let total_bytes = alloc.checked_mul(size)?;
        let used_bytes = alloc.checked_mul(used)?;
        let free_bytes = total_bytes.saturating_sub(used_bytes);

        let used_pct = if size > 0 {
            round2(used as f64 / size as f64 * 100.0)
        } else {
            0.0
        };

        Some(Self {
            total_bytes,
            used_bytes,
            free_bytes,
            used_pct,
            pretty: PrettyBytes {
                total: human_bytes(total_bytes),
                used: human_bytes(used_bytes),
                free: human_bytes(free_bytes),
            },
        })
    }
}

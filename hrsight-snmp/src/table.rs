//! Table descriptions and the column joiner.
//!
//! A [`TableSpec`] is plain data: which subtrees to walk, which column OIDs to pick
//! out of them, how to coerce each column and how to finalize a joined row. The
//! same join/finalize routine serves every table.

use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::oid::{RowIndex, extract_index};
use crate::value::{Cell, Transform, VarBind};

/// Which row indices a table accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Only simple integer indices; composite suffixes are skipped.
    Numeric,
    /// Integer and composite indices; integers sort first.
    Mixed,
}

impl IndexKind {
    fn accepts(self, index: &RowIndex) -> bool {
        match self {
            Self::Numeric => index.is_numeric(),
            Self::Mixed => true,
        }
    }
}

/// One logical column of a table.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    /// Logical name used as the record key.
    pub name: &'static str,
    /// Column OID; row indices are the suffix after it.
    pub oid: &'static str,
    /// Coercion applied to every value of the column.
    pub transform: Transform,
}

/// Description of a logical table producing rows of type `R`.
#[derive(Debug)]
pub struct TableSpec<R> {
    pub name: &'static str,
    /// Subtrees walked to collect the columns, in request order.
    pub walks: &'static [&'static str],
    pub index: IndexKind,
    pub columns: &'static [ColumnSpec],
    /// Builds the final row, or `None` when required fields are missing.
    pub finalize: fn(&RowIndex, &PartialRecord) -> Option<R>,
}

impl<R> TableSpec<R> {
    /// Look up a column by logical name.
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Coerced cells of one row, keyed by logical column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRecord {
    cells: BTreeMap<&'static str, Cell>,
}

impl PartialRecord {
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Cell::as_text)
    }

    pub fn number(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(Cell::as_number)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn set(&mut self, column: &'static str, cell: Cell) {
        self.cells.insert(column, cell);
    }
}

/// Partial records keyed by row index, iterated in ascending index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRecordSet {
    rows: BTreeMap<RowIndex, PartialRecord>,
}

impl PartialRecordSet {
    pub fn get(&self, index: &RowIndex) -> Option<&PartialRecord> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, RowIndex, PartialRecord> {
        self.rows.iter()
    }

    fn upsert(&mut self, index: RowIndex, column: &'static str, cell: Cell) {
        self.rows.entry(index).or_default().set(column, cell);
    }

    /// Run the table's finalize step over every record, dropping incomplete rows.
    pub fn finalize<R>(&self, spec: &TableSpec<R>) -> Vec<R> {
        self.rows
            .iter()
            .filter_map(|(index, record)| {
                let row = (spec.finalize)(index, record);
                if row.is_none() {
                    tracing::trace!(table = spec.name, index = %index, "Dropping incomplete row");
                }
                row
            })
            .collect()
    }
}

/// Join the bindings of one or more walks into partial records.
///
/// Every column is matched against every binding, so walks rooted at unrelated
/// subtrees join on index equality alone. Error-marked bindings, bindings outside
/// the table's index kind and values that fail coercion are skipped.
pub fn join<R>(spec: &TableSpec<R>, walks: &[Vec<VarBind>]) -> PartialRecordSet {
    let mut set = PartialRecordSet::default();

    for column in spec.columns {
        for vb in walks.iter().flatten() {
            let Some(index) = extract_index(&vb.oid, column.oid) else {
                continue;
            };

            if let Some(error) = vb.error {
                tracing::trace!(oid = %vb.oid, error = %error, "Skipping error binding");
                continue;
            }

            if !spec.index.accepts(&index) {
                tracing::trace!(table = spec.name, oid = %vb.oid, "Skipping binding with unexpected index kind");
                continue;
            }

            match (column.transform)(&vb.value) {
                Some(cell) => set.upsert(index, column.name, cell),
                None => {
                    tracing::trace!(
                        table = spec.name,
                        column = column.name,
                        oid = %vb.oid,
                        "Value failed coercion"
                    );
                }
            }
        }
    }

    set
}

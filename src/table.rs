//! Two-keyed table: rows of columns over `FxHashMap`.
//!
//! Backs the jump-function, end-summary, incoming and value tables of the
//! solver, which all index by a (node, fact) pair and occasionally need a
//! whole row at once.

use rustc_hash::FxHashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct Table<R, C, T> {
    rows: FxHashMap<R, FxHashMap<C, T>>,
}

impl<R, C, T> Default for Table<R, C, T> {
    fn default() -> Self {
        Self {
            rows: FxHashMap::default(),
        }
    }
}

impl<R, C, T> Table<R, C, T>
where
    R: Eq + Hash,
    C: Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: &R, column: &C) -> Option<&T> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    pub fn contains(&self, row: &R, column: &C) -> bool {
        self.get(row, column).is_some()
    }

    pub fn insert(&mut self, row: R, column: C, value: T) -> Option<T> {
        self.rows.entry(row).or_default().insert(column, value)
    }

    /// Remove a cell; empty rows are dropped so iteration never sees them.
    pub fn remove(&mut self, row: &R, column: &C) -> Option<T> {
        let cells = self.rows.get_mut(row)?;
        let removed = cells.remove(column);
        if cells.is_empty() {
            self.rows.remove(row);
        }
        removed
    }

    pub fn row(&self, row: &R) -> Option<&FxHashMap<C, T>> {
        self.rows.get(row)
    }

    /// Mutable access to a row, creating it when absent.
    pub fn row_mut(&mut self, row: R) -> &mut FxHashMap<C, T> {
        self.rows.entry(row).or_default()
    }

    /// Mutable access to a cell, creating it from `Default` when absent.
    pub fn cell_mut(&mut self, row: R, column: C) -> &mut T
    where
        T: Default,
    {
        self.rows.entry(row).or_default().entry(column).or_default()
    }

    pub fn cells(&self) -> impl Iterator<Item = (&R, &C, &T)> {
        self.rows
            .iter()
            .flat_map(|(r, cols)| cols.iter().map(move |(c, v)| (r, c, v)))
    }

    pub fn rows(&self) -> impl Iterator<Item = (&R, &FxHashMap<C, T>)> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

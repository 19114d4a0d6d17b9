//! Full-receipt matching index.
//!
//! # Invariants
//!
//! - Built from a single scan starting at the layout's first data row, rows
//!   visited in ascending index order; each bucket lists its rows in that
//!   same order. Rows above the first data row are never indexed.
//! - A row with an empty name, an empty quantity or an unparsable quantity
//!   is never indexed. Rows already reconciled (quantity cleared) are
//!   therefore invisible.
//! - [`RowIndex::consume`] hands out a bucket at most once. A fully received
//!   order takes every pending row sharing the observed `(name, quantity)`.

use std::collections::BTreeMap;

use crate::{normalize_name, parse_quantity, ColumnLayout, MatchKey};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowIndex {
    buckets: BTreeMap<MatchKey, Vec<usize>>,
}

impl RowIndex {
    /// Index `values` (row 1 first, 0-based columns) by normalized name and
    /// integer quantity, from `layout.first_data_row` down.
    pub fn build(values: &[Vec<String>], layout: &ColumnLayout) -> Self {
        let mut buckets: BTreeMap<MatchKey, Vec<usize>> = BTreeMap::new();
        let skip = layout.first_data_row.saturating_sub(1);

        for (i, row) in values.iter().enumerate().skip(skip) {
            let row_index = i + 1;
            let name = cell_at(row, layout.name_column).trim();
            let qty = cell_at(row, layout.quantity_column).trim();
            if name.is_empty() || qty.is_empty() {
                continue;
            }
            let Some(quantity) = parse_quantity(qty) else {
                tracing::debug!(row = row_index, quantity = qty, "row quantity unparsable; not indexed");
                continue;
            };
            let key = MatchKey {
                name: normalize_name(name),
                quantity,
            };
            buckets.entry(key).or_default().push(row_index);
        }

        Self { buckets }
    }

    /// Take every row mapped to `key`, removing the key. Empty when the key was
    /// never indexed or has already been consumed.
    pub fn consume(&mut self, key: &MatchKey) -> Vec<usize> {
        self.buckets.remove(key).unwrap_or_default()
    }

    /// Rows currently mapped to `key`, without consuming them.
    pub fn peek(&self, key: &MatchKey) -> &[usize] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct keys still available.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

fn cell_at(row: &[String], col: usize) -> &str {
    col.checked_sub(1)
        .and_then(|i| row.get(i))
        .map(String::as_str)
        .unwrap_or("")
}

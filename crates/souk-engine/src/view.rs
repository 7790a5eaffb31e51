use souk_model::{BitVec, RecordTable};

/// A read-only view of the table restricted to the rows a mask selects.
///
/// Views are cheap to build and rebuilt from scratch on every interaction;
/// the underlying table is never modified.
#[derive(Clone, Debug)]
pub struct TableView<'a> {
    table: &'a RecordTable,
    mask: BitVec,
}

impl<'a> TableView<'a> {
    /// A view over every row.
    pub fn all(table: &'a RecordTable) -> Self {
        Self {
            table,
            mask: BitVec::with_len_all_true(table.row_count()),
        }
    }

    pub fn with_mask(table: &'a RecordTable, mask: BitVec) -> Self {
        debug_assert_eq!(mask.len(), table.row_count(), "mask length mismatch");
        Self { table, mask }
    }

    pub fn table(&self) -> &'a RecordTable {
        self.table
    }

    pub fn mask(&self) -> &BitVec {
        &self.mask
    }

    /// Number of selected rows.
    pub fn len(&self) -> usize {
        self.mask.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indices of selected rows, ascending.
    pub fn rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.mask.iter_ones()
    }

    /// A narrower view keeping only selected rows for which `keep` holds.
    pub fn retain<F>(&self, keep: F) -> TableView<'a>
    where
        F: Fn(usize) -> bool,
    {
        let mut mask = BitVec::with_capacity_bits(self.mask.len());
        for row in 0..self.mask.len() {
            mask.push(self.mask.get(row) && keep(row));
        }
        TableView {
            table: self.table,
            mask,
        }
    }
}

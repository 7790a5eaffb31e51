use std::collections::BTreeSet;
use std::sync::Arc;

use ahash::AHashSet;
use souk_model::{BitVec, Column, RecordTable};

/// Distinct values of a column, sorted, for use as multi-select options.
///
/// `None` when the column is absent: the dimension gets no control and no
/// restriction. Options come from the unfiltered table so the option set
/// stays stable while other dimensions change.
pub fn filter_options(table: &RecordTable, column: &str) -> Option<Vec<Arc<str>>> {
    let col = table.column(column)?;
    let mut distinct: BTreeSet<Arc<str>> = BTreeSet::new();
    for row in 0..table.row_count() {
        if let Some(label) = col.label(row) {
            distinct.insert(label);
        }
    }
    Some(distinct.into_iter().collect())
}

/// One multi-select dimension: a column name plus the values kept.
#[derive(Clone, Debug)]
pub struct DimensionFilter {
    pub column: String,
    pub selected: AHashSet<Arc<str>>,
}

impl DimensionFilter {
    pub fn new(column: impl Into<String>, selected: impl IntoIterator<Item = Arc<str>>) -> Self {
        Self {
            column: column.into(),
            selected: selected.into_iter().collect(),
        }
    }

    /// The row mask this dimension contributes, or `None` when it imposes no
    /// restriction (column absent, or every distinct value selected).
    fn mask(&self, table: &RecordTable) -> Option<BitVec> {
        let col = table.column(&self.column)?;
        if self.selects_everything(table, col) {
            return None;
        }

        let mut mask = BitVec::with_capacity_bits(table.row_count());
        for row in 0..table.row_count() {
            let keep = match col.label(row) {
                Some(label) => self.selected.contains(label.as_ref()),
                // Nulls only survive the unrestricted (all-selected) case.
                None => false,
            };
            mask.push(keep);
        }
        Some(mask)
    }

    fn selects_everything(&self, table: &RecordTable, col: &Column) -> bool {
        (0..table.row_count()).all(|row| match col.label(row) {
            Some(label) => self.selected.contains(label.as_ref()),
            None => true,
        })
    }
}

/// The dashboard's composed filters. Dimensions AND together; an absent
/// column contributes nothing, so application order never matters.
#[derive(Clone, Debug, Default)]
pub struct FilterSet {
    filters: Vec<DimensionFilter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filter: DimensionFilter) {
        self.filters.push(filter);
    }

    pub fn apply(&self, table: &RecordTable) -> BitVec {
        let mut mask = BitVec::with_len_all_true(table.row_count());
        for filter in &self.filters {
            if let Some(dim_mask) = filter.mask(table) {
                mask.and_inplace(&dim_mask);
            }
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use souk_model::{ColumnSchema, ColumnType, TableBuilder};

    fn city_channel_table() -> RecordTable {
        let mut builder = TableBuilder::new(vec![
            ColumnSchema {
                name: "city".to_owned(),
                column_type: ColumnType::String,
            },
            ColumnSchema {
                name: "channel".to_owned(),
                column_type: ColumnType::String,
            },
        ]);
        for (city, channel) in [
            ("Dubai", "Online"),
            ("Dubai", "Store"),
            ("Abu Dhabi", "Online"),
            ("Sharjah", "Store"),
        ] {
            builder.append_row(&[city.into(), channel.into()]);
        }
        builder.finish()
    }

    fn selection(values: &[&str]) -> AHashSet<Arc<str>> {
        values.iter().map(|v| Arc::from(*v)).collect()
    }

    #[test]
    fn options_are_sorted_distinct_values() {
        let table = city_channel_table();
        let options = filter_options(&table, "city").expect("city present");
        let names: Vec<&str> = options.iter().map(|s| s.as_ref()).collect();
        assert_eq!(names, vec!["Abu Dhabi", "Dubai", "Sharjah"]);

        assert_eq!(filter_options(&table, "order_month"), None);
    }

    #[test]
    fn restriction_keeps_only_selected_values() {
        let table = city_channel_table();
        let mut filters = FilterSet::new();
        filters.push(DimensionFilter {
            column: "city".to_owned(),
            selected: selection(&["Dubai"]),
        });

        let mask = filters.apply(&table);
        assert_eq!(mask.iter_ones().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn absent_column_imposes_no_restriction() {
        let table = city_channel_table();
        let mut filters = FilterSet::new();
        filters.push(DimensionFilter {
            column: "order_month".to_owned(),
            selected: selection(&["2024-01"]),
        });

        assert!(filters.apply(&table).all_true());
    }

    #[test]
    fn all_values_selected_is_the_identity() {
        let table = city_channel_table();
        let mut filters = FilterSet::new();
        filters.push(DimensionFilter {
            column: "city".to_owned(),
            selected: selection(&["Abu Dhabi", "Dubai", "Sharjah"]),
        });

        assert!(filters.apply(&table).all_true());
    }
}

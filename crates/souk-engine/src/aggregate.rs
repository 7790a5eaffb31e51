use std::sync::Arc;

use ahash::AHashMap;

use crate::view::TableView;

/// Output column name for occurrence counts.
pub const COUNT_COLUMN: &str = "count";

/// One output row of a grouping: the key tuple and the aggregated value.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupRow {
    pub keys: Vec<Arc<str>>,
    pub value: f64,
}

/// The result of a group-by aggregation.
///
/// `key_columns` names each position of `GroupRow::keys`; `value_column` is
/// the aggregated source column (or [`COUNT_COLUMN`]). Rows are sorted by
/// key so repeated runs over the same view render identically.
#[derive(Clone, Debug, PartialEq)]
pub struct Grouped {
    pub key_columns: Vec<String>,
    pub value_column: String,
    pub rows: Vec<GroupRow>,
}

impl Grouped {
    pub(crate) fn empty(key_columns: Vec<String>, value_column: String) -> Self {
        Self {
            key_columns,
            value_column,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of the aggregated values across all groups.
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.value).sum()
    }

    /// Position of `column` within the key columns.
    pub fn key_index(&self, column: &str) -> Option<usize> {
        self.key_columns.iter().position(|c| c == column)
    }
}

/// Group the view's rows by `column` and count occurrences per distinct
/// value.
///
/// An absent column yields an empty grouping, never an error; callers treat
/// the empty result as "no chart to render". Rows with a null key are
/// skipped.
pub fn count_by(view: &TableView<'_>, column: &str) -> Grouped {
    let key_columns = vec![column.to_owned()];
    let value_column = COUNT_COLUMN.to_owned();
    let Some(col) = view.table().column(column) else {
        return Grouped::empty(key_columns, value_column);
    };

    let mut groups: AHashMap<Arc<str>, f64> = AHashMap::new();
    for row in view.rows() {
        if let Some(key) = col.label(row) {
            *groups.entry(key).or_insert(0.0) += 1.0;
        }
    }

    sorted_single_key(groups, key_columns, value_column)
}

/// Group by `key` and sum `value` per distinct key.
///
/// Null values contribute 0 to their group's sum; null keys are skipped.
pub fn sum_by(view: &TableView<'_>, key: &str, value: &str) -> Grouped {
    let key_columns = vec![key.to_owned()];
    let value_column = value.to_owned();
    let (Some(key_col), Some(value_col)) = (view.table().column(key), view.table().column(value))
    else {
        return Grouped::empty(key_columns, value_column);
    };

    let mut groups: AHashMap<Arc<str>, f64> = AHashMap::new();
    for row in view.rows() {
        let Some(k) = key_col.label(row) else {
            continue;
        };
        let entry = groups.entry(k).or_insert(0.0);
        if let Some(v) = value_col.number(row) {
            *entry += v;
        }
    }

    sorted_single_key(groups, key_columns, value_column)
}

/// Group by a pair of key columns and sum `value`.
pub fn sum_by_pair(view: &TableView<'_>, keys: (&str, &str), value: &str) -> Grouped {
    let key_columns = vec![keys.0.to_owned(), keys.1.to_owned()];
    let value_column = value.to_owned();
    let (Some(first), Some(second), Some(value_col)) = (
        view.table().column(keys.0),
        view.table().column(keys.1),
        view.table().column(value),
    ) else {
        return Grouped::empty(key_columns, value_column);
    };

    let mut groups: AHashMap<(Arc<str>, Arc<str>), f64> = AHashMap::new();
    for row in view.rows() {
        let (Some(a), Some(b)) = (first.label(row), second.label(row)) else {
            continue;
        };
        let entry = groups.entry((a, b)).or_insert(0.0);
        if let Some(v) = value_col.number(row) {
            *entry += v;
        }
    }

    let mut rows: Vec<GroupRow> = groups
        .into_iter()
        .map(|((a, b), value)| GroupRow {
            keys: vec![a, b],
            value,
        })
        .collect();
    rows.sort_by(|x, y| x.keys.cmp(&y.keys));

    Grouped {
        key_columns,
        value_column,
        rows,
    }
}

/// The `n` largest groups by value, descending.
///
/// The sort is stable, so groups with equal sums keep their incoming
/// (key-ascending) order; no secondary tie-break is applied.
pub fn top_n(mut grouped: Grouped, n: usize) -> Grouped {
    grouped
        .rows
        .sort_by(|a, b| b.value.total_cmp(&a.value));
    grouped.rows.truncate(n);
    grouped
}

fn sorted_single_key(
    groups: AHashMap<Arc<str>, f64>,
    key_columns: Vec<String>,
    value_column: String,
) -> Grouped {
    let mut rows: Vec<GroupRow> = groups
        .into_iter()
        .map(|(key, value)| GroupRow {
            keys: vec![key],
            value,
        })
        .collect();
    rows.sort_by(|a, b| a.keys.cmp(&b.keys));

    Grouped {
        key_columns,
        value_column,
        rows,
    }
}

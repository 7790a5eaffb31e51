use std::sync::Arc;

use ahash::AHashMap;

use crate::aggregate::{GroupRow, Grouped};
use crate::view::TableView;

/// Derived column name used by the age-group chart binding.
pub const AGE_GROUP_COLUMN: &str = "age_group";

/// Age buckets in ascending order.
pub const AGE_GROUPS: [&str; 6] = ["<20", "20-29", "30-39", "40-49", "50-59", "60+"];

/// Bucket an age into its group label.
///
/// The labels are read literally: `20-29` holds ages 20 through 29 and `60+`
/// is unbounded above. Negative or non-finite ages have no bucket.
pub fn age_group(age: f64) -> Option<&'static str> {
    if !age.is_finite() || age < 0.0 {
        return None;
    }

    let idx = match age {
        a if a < 20.0 => 0,
        a if a < 30.0 => 1,
        a if a < 40.0 => 2,
        a if a < 50.0 => 3,
        a if a < 60.0 => 4,
        _ => 5,
    };
    Some(AGE_GROUPS[idx])
}

/// Sum `value` grouped by the derived age bucket of `age`.
///
/// The bucket is computed per row as a pure function; nothing is written
/// back into the table. Rows whose age has no bucket are skipped. Output
/// rows are in bucket order, observed buckets only.
pub fn sum_by_age_group(view: &TableView<'_>, age: &str, value: &str) -> Grouped {
    let key_columns = vec![AGE_GROUP_COLUMN.to_owned()];
    let value_column = value.to_owned();
    let (Some(age_col), Some(value_col)) = (view.table().column(age), view.table().column(value))
    else {
        return Grouped::empty(key_columns, value_column);
    };

    let mut groups: AHashMap<&'static str, f64> = AHashMap::new();
    for row in view.rows() {
        let Some(bucket) = age_col.number(row).and_then(age_group) else {
            continue;
        };
        let entry = groups.entry(bucket).or_insert(0.0);
        if let Some(v) = value_col.number(row) {
            *entry += v;
        }
    }

    let rows: Vec<GroupRow> = AGE_GROUPS
        .iter()
        .filter_map(|bucket| {
            groups.get(bucket).map(|&value| GroupRow {
                keys: vec![Arc::from(*bucket)],
                value,
            })
        })
        .collect();

    Grouped {
        key_columns,
        value_column,
        rows,
    }
}

//! End-to-end page scenarios over small hand-built tables.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use souk_engine::{
    build_sections, sum_by_age_group, ChartKind, Page, Section, TableView, AGE_GROUP_COLUMN,
};
use souk_model::{ColumnSchema, ColumnType, RecordTable, TableBuilder, Value};

fn build_table(columns: &[(&str, ColumnType)], rows: &[&[Value]]) -> RecordTable {
    let schema = columns
        .iter()
        .map(|(name, column_type)| ColumnSchema {
            name: (*name).to_owned(),
            column_type: *column_type,
        })
        .collect();
    let mut builder = TableBuilder::new(schema);
    for row in rows {
        builder.append_row(row);
    }
    builder.finish()
}

fn row_tuples(grouped: &souk_engine::Grouped) -> Vec<(Vec<&str>, f64)> {
    grouped
        .rows
        .iter()
        .map(|r| (r.keys.iter().map(|k| k.as_ref()).collect(), r.value))
        .collect()
}

#[test]
fn channel_city_breakdown_groups_and_conserves_the_total() {
    let table = build_table(
        &[
            ("city", ColumnType::String),
            ("channel", ColumnType::String),
            ("line_value_aed", ColumnType::Number),
        ],
        &[
            &["Dubai".into(), "Online".into(), 100.0.into()],
            &["Dubai".into(), "Store".into(), 50.0.into()],
            &["Abu Dhabi".into(), "Online".into(), 30.0.into()],
        ],
    );
    let view = TableView::all(&table);

    let sections = build_sections(Page::ChannelCity, &view);
    assert_eq!(sections.len(), 1);
    let Section::Chart(spec) = &sections[0] else {
        panic!("expected a chart section");
    };

    assert_eq!(spec.kind, ChartKind::Bar);
    assert_eq!(spec.category, "city");
    assert_eq!(spec.value, "line_value_aed");
    assert_eq!(spec.series.as_deref(), Some("channel"));

    // Keys are (channel, city), sorted ascending.
    assert_eq!(
        row_tuples(&spec.data),
        vec![
            (vec!["Online", "Abu Dhabi"], 30.0),
            (vec!["Online", "Dubai"], 100.0),
            (vec!["Store", "Dubai"], 50.0),
        ]
    );
    assert_eq!(spec.data.total(), 180.0);
}

#[test]
fn age_binning_buckets_each_row_exactly_once() {
    let table = build_table(
        &[
            ("age", ColumnType::Number),
            ("line_value_aed", ColumnType::Number),
        ],
        &[
            &[15.0.into(), 1.0.into()],
            &[25.0.into(), 1.0.into()],
            &[45.0.into(), 1.0.into()],
            &[65.0.into(), 1.0.into()],
        ],
    );
    let view = TableView::all(&table);

    let grouped = sum_by_age_group(&view, "age", "line_value_aed");
    assert_eq!(grouped.key_columns, vec![AGE_GROUP_COLUMN.to_owned()]);
    assert_eq!(
        row_tuples(&grouped),
        vec![
            (vec!["<20"], 1.0),
            (vec!["20-29"], 1.0),
            (vec!["40-49"], 1.0),
            (vec!["60+"], 1.0),
        ]
    );
}

#[test]
fn promo_aggregation_only_counts_rows_that_used_a_promo() {
    let table = build_table(
        &[
            ("promo_code_type", ColumnType::String),
            ("promo_used", ColumnType::Boolean),
            ("line_value_aed", ColumnType::Number),
        ],
        &[
            &["A".into(), true.into(), 10.0.into()],
            &["B".into(), false.into(), 20.0.into()],
            &["A".into(), true.into(), 30.0.into()],
        ],
    );
    let view = TableView::all(&table);

    let sections = build_sections(Page::Marketing, &view);
    assert_eq!(sections.len(), 2);

    // First slot (ad_channel) lacks its column and degrades to a warning.
    assert!(matches!(&sections[0], Section::Warning(_)));

    let Section::Chart(promo) = &sections[1] else {
        panic!("expected the promo chart");
    };
    assert_eq!(promo.kind, ChartKind::Pie);
    assert_eq!(row_tuples(&promo.data), vec![(vec!["A"], 40.0)]);
}

#[test]
fn operations_page_counts_each_present_flag_independently() {
    let table = build_table(
        &[
            ("returned", ColumnType::Boolean),
            ("delivery_type", ColumnType::String),
        ],
        &[
            &[true.into(), "Home".into()],
            &[false.into(), "Home".into()],
            &[false.into(), "Pickup".into()],
        ],
    );
    let view = TableView::all(&table);

    let sections = build_sections(Page::Operations, &view);
    assert_eq!(sections.len(), 4);

    let Section::Chart(returns) = &sections[0] else {
        panic!("expected the returns chart");
    };
    assert_eq!(
        row_tuples(&returns.data),
        vec![(vec!["false"], 2.0), (vec!["true"], 1.0)]
    );

    // stock_out_flag is absent.
    assert!(matches!(&sections[1], Section::Warning(_)));

    let Section::Chart(delivery) = &sections[2] else {
        panic!("expected the delivery chart");
    };
    assert_eq!(
        row_tuples(&delivery.data),
        vec![(vec!["Home"], 2.0), (vec!["Pickup"], 1.0)]
    );

    // payment_method is absent.
    assert!(matches!(&sections[3], Section::Warning(_)));
}

#[test]
fn filtered_out_rows_leave_empty_charts_not_failures() {
    let table = build_table(
        &[
            ("channel", ColumnType::String),
            ("city", ColumnType::String),
            ("line_value_aed", ColumnType::Number),
        ],
        &[&["Online".into(), "Dubai".into(), 10.0.into()]],
    );
    let mut mask = souk_model::BitVec::new();
    mask.push(false);
    let view = TableView::with_mask(&table, mask);

    let sections = build_sections(Page::ChannelCity, &view);
    let Section::Chart(spec) = &sections[0] else {
        panic!("expected a chart section");
    };
    assert!(spec.data.is_empty());
}

#[test]
fn top_categories_keeps_ten_largest_descending() {
    let mut rows: Vec<Vec<Value>> = Vec::new();
    for i in 0..12 {
        rows.push(vec![
            Value::String(Arc::from(format!("cat{i:02}"))),
            Value::Number((i + 1) as f64),
        ]);
    }
    let row_refs: Vec<&[Value]> = rows.iter().map(|r| r.as_slice()).collect();
    let table = build_table(
        &[
            ("category", ColumnType::String),
            ("line_value_aed", ColumnType::Number),
        ],
        &row_refs,
    );
    let view = TableView::all(&table);

    let sections = build_sections(Page::CustomerInsights, &view);
    let Section::Chart(top) = &sections[2] else {
        panic!("expected the top-categories chart");
    };

    assert_eq!(top.data.rows.len(), 10);
    assert_eq!(top.data.rows[0].keys[0].as_ref(), "cat11");
    assert_eq!(top.data.rows[0].value, 12.0);
    assert_eq!(top.data.rows[9].keys[0].as_ref(), "cat02");
}

use crate::age::{sum_by_age_group, AGE_GROUP_COLUMN};
use crate::aggregate::{count_by, sum_by, sum_by_pair, top_n, Grouped, COUNT_COLUMN};
use crate::view::TableView;

/// The transaction value column every sum-based chart aggregates.
pub const VALUE_COLUMN: &str = "line_value_aed";

const TOP_CATEGORIES: usize = 10;

/// The four dashboard destinations, in fixed navigation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    ChannelCity,
    CustomerInsights,
    Marketing,
    Operations,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::ChannelCity,
        Page::CustomerInsights,
        Page::Marketing,
        Page::Operations,
    ];

    /// User-facing destination label, also used as the page title.
    pub fn label(&self) -> &'static str {
        match self {
            Page::ChannelCity => "Channel & City Breakdown",
            Page::CustomerInsights => "Customer Insights",
            Page::Marketing => "Marketing Performance",
            Page::Operations => "Operational Metrics",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Pie,
}

/// A renderer-agnostic chart: aggregated rows plus column-name bindings.
///
/// `category` names the axis/slice-name key, `value` the magnitude, and
/// `series` the optional color dimension for grouped bars. The renderer
/// looks bindings up in `data.key_columns`; it never re-aggregates.
#[derive(Clone, Debug)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub data: Grouped,
    pub category: String,
    pub value: String,
    pub series: Option<String>,
}

/// One slot of a page: either a chart or the inline warning standing in for
/// it when its prerequisite columns are missing.
#[derive(Clone, Debug)]
pub enum Section {
    Chart(ChartSpec),
    Warning(String),
}

/// A chart's declarative capability row: the columns it needs and how to
/// build it once they are present.
struct ChartDef {
    required: &'static [&'static str],
    build: fn(&TableView<'_>) -> ChartSpec,
}

const CHANNEL_CITY_CHARTS: &[ChartDef] = &[ChartDef {
    required: &["channel", "city", VALUE_COLUMN],
    build: sales_by_city_and_channel,
}];

const CUSTOMER_CHARTS: &[ChartDef] = &[
    ChartDef {
        required: &["gender", VALUE_COLUMN],
        build: sales_by_gender,
    },
    ChartDef {
        required: &["age", VALUE_COLUMN],
        build: spending_by_age_group,
    },
    ChartDef {
        required: &["category", VALUE_COLUMN],
        build: top_categories,
    },
];

const MARKETING_CHARTS: &[ChartDef] = &[
    ChartDef {
        required: &["ad_channel", VALUE_COLUMN],
        build: sales_by_ad_channel,
    },
    ChartDef {
        required: &["promo_code_type", "promo_used", VALUE_COLUMN],
        build: promo_type_roi,
    },
];

const OPERATIONS_CHARTS: &[ChartDef] = &[
    ChartDef {
        required: &["returned"],
        build: |view| counted_bar(view, "returned", "Return Status"),
    },
    ChartDef {
        required: &["stock_out_flag"],
        build: |view| counted_bar(view, "stock_out_flag", "Stock-Outs"),
    },
    ChartDef {
        required: &["delivery_type"],
        build: |view| counted_bar(view, "delivery_type", "Delivery Types"),
    },
    ChartDef {
        required: &["payment_method"],
        build: |view| counted_bar(view, "payment_method", "Payment Methods"),
    },
];

fn chart_defs(page: Page) -> &'static [ChartDef] {
    match page {
        Page::ChannelCity => CHANNEL_CITY_CHARTS,
        Page::CustomerInsights => CUSTOMER_CHARTS,
        Page::Marketing => MARKETING_CHARTS,
        Page::Operations => OPERATIONS_CHARTS,
    }
}

/// Compose a page from its chart table.
///
/// Every chart slot is checked independently: present columns produce a
/// chart spec over the view, missing ones produce an inline warning. The
/// page itself always renders.
pub fn build_sections(page: Page, view: &TableView<'_>) -> Vec<Section> {
    chart_defs(page)
        .iter()
        .map(|def| {
            if view.table().has_columns(def.required) {
                Section::Chart((def.build)(view))
            } else {
                Section::Warning(format!(
                    "Required columns not found in dataset: {}.",
                    def.required.join(", ")
                ))
            }
        })
        .collect()
}

fn sales_by_city_and_channel(view: &TableView<'_>) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Bar,
        title: "Sales by City & Channel".to_owned(),
        data: sum_by_pair(view, ("channel", "city"), VALUE_COLUMN),
        category: "city".to_owned(),
        value: VALUE_COLUMN.to_owned(),
        series: Some("channel".to_owned()),
    }
}

fn sales_by_gender(view: &TableView<'_>) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Pie,
        title: "Sales by Gender".to_owned(),
        data: sum_by(view, "gender", VALUE_COLUMN),
        category: "gender".to_owned(),
        value: VALUE_COLUMN.to_owned(),
        series: None,
    }
}

fn spending_by_age_group(view: &TableView<'_>) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Bar,
        title: "Spending by Age Group".to_owned(),
        data: sum_by_age_group(view, "age", VALUE_COLUMN),
        category: AGE_GROUP_COLUMN.to_owned(),
        value: VALUE_COLUMN.to_owned(),
        series: None,
    }
}

fn top_categories(view: &TableView<'_>) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Bar,
        title: "Top 10 Categories by Sales".to_owned(),
        data: top_n(sum_by(view, "category", VALUE_COLUMN), TOP_CATEGORIES),
        category: "category".to_owned(),
        value: VALUE_COLUMN.to_owned(),
        series: None,
    }
}

fn sales_by_ad_channel(view: &TableView<'_>) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Bar,
        title: "Sales by Ad Channel".to_owned(),
        data: sum_by(view, "ad_channel", VALUE_COLUMN),
        category: "ad_channel".to_owned(),
        value: VALUE_COLUMN.to_owned(),
        series: None,
    }
}

fn promo_type_roi(view: &TableView<'_>) -> ChartSpec {
    // Only rows that actually used a promo code count toward promo ROI.
    let promo_used = view.retain(|row| {
        view.table()
            .column("promo_used")
            .and_then(|col| col.boolean(row))
            .unwrap_or(false)
    });

    ChartSpec {
        kind: ChartKind::Pie,
        title: "Promo Type ROI".to_owned(),
        data: sum_by(&promo_used, "promo_code_type", VALUE_COLUMN),
        category: "promo_code_type".to_owned(),
        value: VALUE_COLUMN.to_owned(),
        series: None,
    }
}

fn counted_bar(view: &TableView<'_>, column: &str, title: &str) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Bar,
        title: title.to_owned(),
        data: count_by(view, column),
        category: column.to_owned(),
        value: COUNT_COLUMN.to_owned(),
        series: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use souk_model::{ColumnSchema, ColumnType, RecordTable, TableBuilder};

    fn minimal_table() -> RecordTable {
        let mut builder = TableBuilder::new(vec![ColumnSchema {
            name: "city".to_owned(),
            column_type: ColumnType::String,
        }]);
        builder.append_row(&["Dubai".into()]);
        builder.finish()
    }

    #[test]
    fn navigation_order_is_fixed() {
        let labels: Vec<&str> = Page::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Channel & City Breakdown",
                "Customer Insights",
                "Marketing Performance",
                "Operational Metrics",
            ]
        );
    }

    #[test]
    fn missing_prerequisites_become_warnings_per_section() {
        let table = minimal_table();
        let view = TableView::all(&table);

        for page in Page::ALL {
            let sections = build_sections(page, &view);
            assert!(!sections.is_empty(), "{page:?} renders sections");
            for section in sections {
                match section {
                    Section::Warning(msg) => {
                        assert!(msg.contains("Required columns not found"), "{msg}")
                    }
                    Section::Chart(spec) => {
                        panic!("unexpected chart on bare table: {}", spec.title)
                    }
                }
            }
        }
    }
}

use pretty_assertions::assert_eq;
use souk_model::{import_csv, ColumnType, CsvOptions, Value};

const SAMPLE: &str = "\
city,channel,order_month,line_value_aed,gender,age,category,ad_channel,promo_code_type,promo_used,returned,stock_out_flag,delivery_type,payment_method
Dubai,Online,2024-01,149.50,Female,34,Grocery,Social,SAVE10,true,no,no,Home,Card
Abu Dhabi,Store,2024-01,89.00,Male,52,Electronics,Search,,false,no,no,Pickup,Cash
Dubai,Store,2024-02,230.25,Female,27,Fashion,Email,VIP,true,yes,no,Home,Card
Sharjah,Online,2024-02,19.99,Male,61,Grocery,Social,SAVE10,true,no,yes,Express,Wallet
";

#[test]
fn retail_snapshot_imports_with_expected_schema() {
    let table = import_csv(SAMPLE.as_bytes(), CsvOptions::default()).expect("import");

    assert_eq!(table.row_count(), 4);
    assert_eq!(table.column_count(), 14);

    let type_of = |name: &str| {
        table
            .schema()
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.column_type)
            .expect("column present")
    };
    assert_eq!(type_of("city"), ColumnType::String);
    assert_eq!(type_of("order_month"), ColumnType::String);
    assert_eq!(type_of("line_value_aed"), ColumnType::Number);
    assert_eq!(type_of("age"), ColumnType::Number);
    assert_eq!(type_of("promo_used"), ColumnType::Boolean);
    // `yes`/`no` flags are textual booleans.
    assert_eq!(type_of("returned"), ColumnType::Boolean);
}

#[test]
fn retail_snapshot_values_and_stats() {
    let table = import_csv(SAMPLE.as_bytes(), CsvOptions::default()).expect("import");

    assert_eq!(table.value(0, "line_value_aed"), Value::Number(149.5));
    assert_eq!(table.value(2, "returned"), Value::Boolean(true));
    assert_eq!(table.value(3, "city"), "Sharjah".into());

    let city = table.column("city").expect("city column");
    assert_eq!(city.stats().distinct_count, 3);
    assert_eq!(city.stats().null_count, 0);

    // Empty promo_code_type field on row 2 is a null, not an empty string.
    assert_eq!(table.value(1, "promo_code_type"), Value::Null);
    let promo = table.column("promo_code_type").expect("promo column");
    assert_eq!(promo.stats().null_count, 1);
    assert_eq!(promo.stats().distinct_count, 2);
}

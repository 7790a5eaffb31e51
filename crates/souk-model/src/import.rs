use std::borrow::Cow;
use std::io::BufRead;
use std::sync::Arc;

use csv::ByteRecord;
use encoding_rs::WINDOWS_1252;
use thiserror::Error;

use crate::table::{ColumnSchema, RecordTable, TableBuilder};
use crate::types::{ColumnType, Value};

#[derive(Clone, Debug)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_header: bool,
    /// Rows sampled for column type inference before streaming the rest.
    pub sample_rows: usize,
    /// How to decode raw CSV bytes into text fields.
    pub encoding: CsvTextEncoding,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            sample_rows: 100,
            encoding: CsvTextEncoding::Auto,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CsvTextEncoding {
    /// Attempt to decode as UTF-8; if a field contains invalid UTF-8, fall
    /// back to Windows-1252. This matches common behavior for CSV files
    /// exported from Excel on Windows.
    Auto,
    /// Decode as UTF-8 and reject invalid byte sequences.
    Utf8,
    /// Decode as Windows-1252 (aka CP-1252).
    Windows1252,
}

#[derive(Debug, Error)]
pub enum CsvImportError {
    #[error("csv input was empty")]
    EmptyInput,
    #[error("csv parse error at row {row}: {reason}")]
    Parse { row: u64, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Import a CSV stream into a [`RecordTable`].
///
/// Column types are inferred from the first `options.sample_rows` records;
/// fields that fail their column's typed parse degrade to null rather than
/// aborting the import.
pub fn import_csv<R: BufRead>(reader: R, options: CsvOptions) -> Result<RecordTable, CsvImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        // Headers are handled manually so row positions in errors stay
        // consistent with the raw file.
        .has_headers(false)
        // Accept rows with varying column counts; short rows pad with nulls.
        .flexible(true)
        .from_reader(reader);

    let mut record = ByteRecord::new();
    let mut record_index: u64 = 0;

    let has_first = csv_reader
        .read_byte_record(&mut record)
        .map_err(|e| map_csv_error(e, record_index + 1))?;
    if !has_first {
        return Err(CsvImportError::EmptyInput);
    }
    record_index += 1;

    let mut header_names: Vec<String> = Vec::new();
    let mut sample_rows: Vec<Vec<String>> = Vec::new();
    let mut column_count: usize;

    if options.has_header {
        header_names = decode_record_to_strings(&record, record_index, options.encoding)?;
        column_count = header_names.len();
    } else {
        let row = decode_record_to_strings(&record, record_index, options.encoding)?;
        column_count = row.len();
        sample_rows.push(row);
    }

    while sample_rows.len() < options.sample_rows {
        record.clear();
        match csv_reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                record_index += 1;
                let row = decode_record_to_strings(&record, record_index, options.encoding)?;
                column_count = column_count.max(row.len());
                sample_rows.push(row);
            }
            Err(e) => return Err(map_csv_error(e, record_index + 1)),
        }
    }

    // An empty row still implies a single empty field.
    if column_count == 0 {
        column_count = 1;
    }

    if options.has_header {
        if header_names.len() < column_count {
            header_names
                .extend((header_names.len()..column_count).map(|i| format!("Column{}", i + 1)));
        }
    } else {
        header_names = (0..column_count)
            .map(|i| format!("Column{}", i + 1))
            .collect();
    }

    let column_types = infer_column_types(&sample_rows, column_count);
    let schema: Vec<ColumnSchema> = header_names
        .into_iter()
        .zip(column_types.iter().copied())
        .map(|(name, column_type)| ColumnSchema { name, column_type })
        .collect();

    let mut builder = TableBuilder::new(schema);
    let mut row_values: Vec<Value> = vec![Value::Null; column_count];

    for row in &sample_rows {
        for (i, column_type) in column_types.iter().copied().enumerate() {
            let field = row.get(i).map(|s| s.as_str()).unwrap_or("");
            row_values[i] = parse_typed_value(field, column_type);
        }
        builder.append_row(&row_values);
    }

    // Stream the remainder.
    loop {
        record.clear();
        match csv_reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                record_index += 1;
                for (i, column_type) in column_types.iter().copied().enumerate() {
                    let raw = record.get(i).unwrap_or(b"");
                    let field = decode_field(raw, record_index, i, options.encoding)?;
                    row_values[i] = parse_typed_value(field.as_ref(), column_type);
                }
                builder.append_row(&row_values);
            }
            Err(e) => return Err(map_csv_error(e, record_index + 1)),
        }
    }

    Ok(builder.finish())
}

fn parse_typed_value(field: &str, column_type: ColumnType) -> Value {
    let v = field.trim();
    if v.is_empty() {
        return Value::Null;
    }

    match column_type {
        ColumnType::Number => parse_number(v).map(Value::Number).unwrap_or(Value::Null),
        ColumnType::Boolean => parse_bool(v).map(Value::Boolean).unwrap_or(Value::Null),
        ColumnType::String => Value::String(Arc::from(v)),
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn parse_number(v: &str) -> Option<f64> {
    let parsed: f64 = v.trim().parse().ok()?;
    parsed.is_finite().then_some(parsed)
}

fn infer_column_types(sample_rows: &[Vec<String>], column_count: usize) -> Vec<ColumnType> {
    let mut out = Vec::with_capacity(column_count);
    for col in 0..column_count {
        let mut is_bool = true;
        let mut saw_text_bool = false;
        let mut is_number = true;
        let mut saw_value = false;

        for row in sample_rows {
            let v = row.get(col).map(|s| s.trim()).unwrap_or("");
            if v.is_empty() {
                continue;
            }
            saw_value = true;

            match parse_bool(v) {
                Some(_) => {
                    // Pure 0/1 columns stay numeric; a textual form commits
                    // the column to booleans.
                    let lowered = v.to_ascii_lowercase();
                    if lowered != "0" && lowered != "1" {
                        saw_text_bool = true;
                    }
                }
                None => is_bool = false,
            }
            if parse_number(v).is_none() {
                is_number = false;
            }
        }

        let ty = if !saw_value {
            ColumnType::String
        } else if is_bool && saw_text_bool {
            ColumnType::Boolean
        } else if is_number {
            ColumnType::Number
        } else {
            ColumnType::String
        };
        out.push(ty);
    }
    out
}

fn decode_record_to_strings(
    record: &ByteRecord,
    row: u64,
    encoding: CsvTextEncoding,
) -> Result<Vec<String>, CsvImportError> {
    if record.len() == 0 {
        return Ok(vec![String::new()]);
    }

    let mut out = Vec::with_capacity(record.len());
    for (idx, field) in record.iter().enumerate() {
        let s = decode_field(field, row, idx, encoding)?;
        out.push(s.into_owned());
    }
    Ok(out)
}

fn decode_field<'a>(
    field: &'a [u8],
    row: u64,
    column: usize,
    encoding: CsvTextEncoding,
) -> Result<Cow<'a, str>, CsvImportError> {
    // A UTF-8 BOM at the start of the file commonly appears in Excel-exported
    // CSVs; strip it from the first field.
    let field = if row == 1 && column == 0 && field.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &field[3..]
    } else {
        field
    };

    match encoding {
        CsvTextEncoding::Utf8 => {
            std::str::from_utf8(field)
                .map(Cow::Borrowed)
                .map_err(|e| CsvImportError::Parse {
                    row,
                    reason: format!("invalid UTF-8 in column {}: {e}", column + 1),
                })
        }
        CsvTextEncoding::Windows1252 => {
            let (cow, _, _) = WINDOWS_1252.decode(field);
            Ok(cow)
        }
        CsvTextEncoding::Auto => match std::str::from_utf8(field) {
            Ok(s) => Ok(Cow::Borrowed(s)),
            Err(_) => {
                let (cow, _, _) = WINDOWS_1252.decode(field);
                Ok(cow)
            }
        },
    }
}

fn map_csv_error(err: csv::Error, fallback_row: u64) -> CsvImportError {
    let reason = err.to_string();
    let pos = err.position().cloned();

    match err.into_kind() {
        csv::ErrorKind::Io(e) => CsvImportError::Io(e),
        _ => {
            let row = pos
                .map(|p| p.record())
                .filter(|r| *r > 0)
                .unwrap_or(fallback_row);
            CsvImportError::Parse { row, reason }
        }
    }
}

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::bitmap::BitVec;
use crate::types::{ColumnType, Value};

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSchema {
    pub name: String,
    pub column_type: ColumnType,
}

/// Per-column statistics collected while the table is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColumnStats {
    pub null_count: u64,
    pub distinct_count: u64,
}

#[derive(Clone, Debug)]
enum ColumnData {
    Number(Vec<f64>),
    Boolean(BitVec),
    /// Dictionary-encoded strings: `indices[row]` points into `dictionary`.
    Text {
        indices: Vec<u32>,
        dictionary: Arc<Vec<Arc<str>>>,
    },
}

#[derive(Clone, Debug)]
pub struct Column {
    schema: ColumnSchema,
    data: ColumnData,
    validity: BitVec,
    stats: ColumnStats,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.schema.column_type
    }

    pub fn stats(&self) -> ColumnStats {
        self.stats
    }

    pub fn value(&self, row: usize) -> Value {
        if row >= self.validity.len() || !self.validity.get(row) {
            return Value::Null;
        }

        match &self.data {
            ColumnData::Number(values) => Value::Number(values[row]),
            ColumnData::Boolean(bits) => Value::Boolean(bits.get(row)),
            ColumnData::Text {
                indices,
                dictionary,
            } => Value::String(dictionary[indices[row] as usize].clone()),
        }
    }

    pub fn number(&self, row: usize) -> Option<f64> {
        match &self.data {
            ColumnData::Number(values) if row < values.len() && self.validity.get(row) => {
                Some(values[row])
            }
            _ => None,
        }
    }

    pub fn boolean(&self, row: usize) -> Option<bool> {
        match &self.data {
            ColumnData::Boolean(bits) if row < bits.len() && self.validity.get(row) => {
                Some(bits.get(row))
            }
            _ => None,
        }
    }

    /// The value rendered as a categorical label, `None` for nulls.
    ///
    /// This is what filters match against and what grouping uses as keys, so
    /// booleans label as `true`/`false` and whole numbers drop the `.0`.
    pub fn label(&self, row: usize) -> Option<Arc<str>> {
        if row >= self.validity.len() || !self.validity.get(row) {
            return None;
        }

        match &self.data {
            ColumnData::Text {
                indices,
                dictionary,
            } => Some(dictionary[indices[row] as usize].clone()),
            ColumnData::Number(values) => Some(Arc::from(Value::Number(values[row]).to_string())),
            ColumnData::Boolean(bits) => {
                Some(Arc::from(if bits.get(row) { "true" } else { "false" }))
            }
        }
    }

    /// The dictionary backing a string column, if there is one.
    pub fn dictionary(&self) -> Option<&[Arc<str>]> {
        match &self.data {
            ColumnData::Text { dictionary, .. } => Some(dictionary),
            _ => None,
        }
    }
}

/// An immutable columnar table of transaction-line records.
///
/// Built once via [`TableBuilder`]; filtering layers select rows with bit
/// masks and never modify the table itself.
#[derive(Clone, Debug)]
pub struct RecordTable {
    schema: Vec<ColumnSchema>,
    columns: Vec<Column>,
    by_name: HashMap<String, usize>,
    rows: usize,
}

impl RecordTable {
    pub fn schema(&self) -> &[ColumnSchema] {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.by_name.get(name).map(|&idx| &self.columns[idx])
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// True when every named column is present.
    ///
    /// Chart capability gates check this before building an aggregation.
    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.has_column(name))
    }

    pub fn value(&self, row: usize, name: &str) -> Value {
        self.column(name)
            .map(|col| col.value(row))
            .unwrap_or(Value::Null)
    }
}

enum ColumnBuilder {
    Number {
        values: Vec<f64>,
        validity: BitVec,
        distinct: HashSet<u64>,
    },
    Boolean {
        bits: BitVec,
        validity: BitVec,
        distinct: HashSet<bool>,
    },
    Text {
        indices: Vec<u32>,
        validity: BitVec,
        dictionary: Vec<Arc<str>>,
        dict_map: HashMap<Arc<str>, u32>,
    },
}

impl ColumnBuilder {
    fn new(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Number => ColumnBuilder::Number {
                values: Vec::new(),
                validity: BitVec::new(),
                distinct: HashSet::new(),
            },
            ColumnType::Boolean => ColumnBuilder::Boolean {
                bits: BitVec::new(),
                validity: BitVec::new(),
                distinct: HashSet::new(),
            },
            ColumnType::String => ColumnBuilder::Text {
                indices: Vec::new(),
                validity: BitVec::new(),
                dictionary: Vec::new(),
                dict_map: HashMap::new(),
            },
        }
    }

    fn push(&mut self, value: &Value) {
        match self {
            ColumnBuilder::Number {
                values,
                validity,
                distinct,
            } => match value {
                Value::Number(v) => {
                    values.push(*v);
                    validity.push(true);
                    distinct.insert(v.to_bits());
                }
                // Nulls and type mismatches store as null.
                _ => {
                    values.push(0.0);
                    validity.push(false);
                }
            },
            ColumnBuilder::Boolean {
                bits,
                validity,
                distinct,
            } => match value {
                Value::Boolean(v) => {
                    bits.push(*v);
                    validity.push(true);
                    distinct.insert(*v);
                }
                _ => {
                    bits.push(false);
                    validity.push(false);
                }
            },
            ColumnBuilder::Text {
                indices,
                validity,
                dictionary,
                dict_map,
            } => match value {
                Value::String(s) => {
                    let idx = match dict_map.get(s.as_ref()) {
                        Some(&idx) => idx,
                        None => {
                            let idx = dictionary.len() as u32;
                            dictionary.push(s.clone());
                            dict_map.insert(s.clone(), idx);
                            idx
                        }
                    };
                    indices.push(idx);
                    validity.push(true);
                }
                _ => {
                    indices.push(0);
                    validity.push(false);
                }
            },
        }
    }

    fn finish(self, schema: ColumnSchema, rows: usize) -> Column {
        let (data, validity, distinct_count) = match self {
            ColumnBuilder::Number {
                values,
                validity,
                distinct,
            } => (
                ColumnData::Number(values),
                validity,
                distinct.len() as u64,
            ),
            ColumnBuilder::Boolean {
                bits,
                validity,
                distinct,
            } => (
                ColumnData::Boolean(bits),
                validity,
                distinct.len() as u64,
            ),
            ColumnBuilder::Text {
                indices,
                validity,
                dictionary,
                ..
            } => {
                let distinct = dictionary.len() as u64;
                (
                    ColumnData::Text {
                        indices,
                        dictionary: Arc::new(dictionary),
                    },
                    validity,
                    distinct,
                )
            }
        };

        let null_count = (rows - validity.count_ones()) as u64;
        Column {
            schema,
            data,
            validity,
            stats: ColumnStats {
                null_count,
                distinct_count,
            },
        }
    }
}

pub struct TableBuilder {
    schema: Vec<ColumnSchema>,
    builders: Vec<ColumnBuilder>,
    rows: usize,
}

impl TableBuilder {
    pub fn new(schema: Vec<ColumnSchema>) -> Self {
        let builders = schema
            .iter()
            .map(|col| ColumnBuilder::new(col.column_type))
            .collect();

        Self {
            schema,
            builders,
            rows: 0,
        }
    }

    pub fn append_row(&mut self, row: &[Value]) {
        assert_eq!(
            row.len(),
            self.builders.len(),
            "row length must match schema"
        );

        for (builder, value) in self.builders.iter_mut().zip(row.iter()) {
            builder.push(value);
        }
        self.rows += 1;
    }

    pub fn finish(self) -> RecordTable {
        let rows = self.rows;
        let columns: Vec<Column> = self
            .schema
            .iter()
            .cloned()
            .zip(self.builders)
            .map(|(schema, builder)| builder.finish(schema, rows))
            .collect();

        // First occurrence wins for duplicate column names.
        let mut by_name = HashMap::with_capacity(columns.len());
        for (idx, col) in columns.iter().enumerate() {
            by_name.entry(col.name().to_owned()).or_insert(idx);
        }

        RecordTable {
            schema: self.schema,
            columns,
            by_name,
            rows,
        }
    }
}

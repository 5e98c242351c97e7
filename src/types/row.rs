use serde::{Deserialize, Serialize};

use crate::types::{RowId, error::DatabaseError, record::decode_record, value::Value};

/// Where a declared column sits in a row and how its fields print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnFormat {
    pub index: usize,
    pub rowid_alias: bool,
    pub real_affinity: bool,
}

/// One decoded table row: its rowid key plus the record's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub row_id: RowId,
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(row_id: RowId, values: Vec<Value>) -> Self {
        Self { row_id, values }
    }

    pub fn from_payload(row_id: RowId, header: &[u8], body: &[u8]) -> Result<Self, DatabaseError> {
        Ok(Self {
            row_id,
            values: decode_record(header, body)?,
        })
    }

    pub fn get_value(&self, column_index: usize) -> Option<&Value> {
        self.values.get(column_index)
    }

    /// Text form of a column. The rowid-alias column is the table's INTEGER
    /// PRIMARY KEY, stored as NULL with the key kept in the rowid. Fields
    /// missing from a short record render as NULL. Columns with REAL affinity
    /// hold whole numbers as integers on disk and still render as reals.
    pub fn render(&self, format: &ColumnFormat) -> String {
        match self.values.get(format.index) {
            None | Some(Value::Null) if format.rowid_alias => self.row_id.to_string(),
            Some(Value::Integer(i)) if format.real_affinity => Value::Real(*i as f64).to_string(),
            Some(value) => value.to_string(),
            None => String::new(),
        }
    }
}

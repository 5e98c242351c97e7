use pindai::{
    types::{RowId, value::Value},
    utils::mock::{DatabaseBuilder, RowData},
};

#[derive(Debug, Clone, Copy)]
pub enum RowType {
    Small,
    Medium,
    Large,
}

impl RowType {
    pub fn create_sql(&self) -> &'static str {
        match self {
            RowType::Small => "CREATE TABLE test_table(id INTEGER PRIMARY KEY, name TEXT)",
            RowType::Medium => {
                "CREATE TABLE test_table(id INTEGER PRIMARY KEY, name TEXT, score REAL, active INTEGER)"
            }
            RowType::Large => {
                "CREATE TABLE test_table(id INTEGER PRIMARY KEY, description TEXT, data BLOB, metadata TEXT)"
            }
        }
    }

    /// Rows per leaf that keep every page within 4096 bytes.
    pub fn leaf_capacity(&self) -> usize {
        match self {
            RowType::Small => 200,
            RowType::Medium => 80,
            RowType::Large => 4,
        }
    }
}

pub struct DataGenerator {
    seed: u64,
}

impl DataGenerator {
    pub fn new() -> Self {
        Self { seed: 42 }
    }

    pub fn generate_row(&self, id: RowId, row_type: RowType) -> RowData {
        let values = match row_type {
            RowType::Small => vec![Value::Null, Value::Text("short".to_string())],
            RowType::Medium => vec![
                Value::Null,
                Value::Text(format!("user_name_{}", id)),
                Value::Real(id as f64 * 1.5 + 0.1),
                Value::Integer(((id as u64 ^ self.seed) % 2) as i64),
            ],
            RowType::Large => {
                let blob_data = (0..200).map(|i| ((id + i) % 256) as u8).collect();
                vec![
                    Value::Null,
                    Value::Text(format!(
                        "Row {} carries a long description to widen the payload. {}",
                        id,
                        "x".repeat(400)
                    )),
                    Value::Blob(blob_data),
                    Value::Text(format!(
                        "{{\"id\":{},\"timestamp\":{},\"tags\":[\"bench\",\"row_{}\"]}}",
                        id,
                        1_640_995_200 + id,
                        id
                    )),
                ]
            }
        };
        (id, values)
    }

    pub fn database(&self, row_count: usize, row_type: RowType) -> DatabaseBuilder {
        let rows = (1..=row_count as RowId)
            .map(|id| self.generate_row(id, row_type))
            .collect();
        DatabaseBuilder::new()
            .leaf_capacity(row_type.leaf_capacity())
            .fanout(300)
            .table("test_table", row_type.create_sql(), rows)
    }
}

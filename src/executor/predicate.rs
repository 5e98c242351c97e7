use crate::{
    planner::query_intent::EqualityPredicate,
    storage::schema::TableSchema,
    types::{
        error::DatabaseError,
        row::{ColumnFormat, Row},
    },
};

/// An equality predicate with its column resolved against a table schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: ColumnFormat,
    pub literal: String,
}

impl Predicate {
    pub fn bind(predicate: &EqualityPredicate, schema: &TableSchema) -> Result<Self, DatabaseError> {
        let column_index = schema.get_column_index(&predicate.column).ok_or_else(|| {
            DatabaseError::ColumnNotFound {
                name: predicate.column.clone(),
                table: schema.table_name.clone(),
            }
        })?;

        Ok(Self {
            column: schema.column_format(column_index),
            literal: predicate.literal.clone(),
        })
    }

    /// Plain string equality on the column's rendered text; no coercion.
    pub fn evaluate(&self, row: &Row) -> bool {
        row.render(&self.column) == self.literal
    }
}

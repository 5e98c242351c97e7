use serde::{Deserialize, Serialize};

/// What to emit for each surviving row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    AllColumns,
    ColumnList(Vec<String>),
    CountStar,
}

/// `column = literal`, compared on the column's rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualityPredicate {
    pub column: String,
    pub literal: String,
}

impl EqualityPredicate {
    pub fn new(column: impl Into<String>, literal: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            literal: literal.into(),
        }
    }
}

/// The supported query shape: one table, one projection, at most one
/// equality predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub from_table: String,
    pub projection: Projection,
    pub predicate: Option<EqualityPredicate>,
}

impl QueryIntent {
    pub fn new(from_table: impl Into<String>, projection: Projection) -> Self {
        Self {
            from_table: from_table.into(),
            projection,
            predicate: None,
        }
    }

    pub fn with_predicate(mut self, predicate: EqualityPredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }
}
